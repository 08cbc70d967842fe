use super::error::Result;
use super::record::{MetricsRecord, StoredMetrics};

/// Storage for the single metrics row.
pub trait PersistenceBackend: Send + Sync {
    /// Returns the row if it has been created.
    fn get_singleton(&self) -> Result<Option<StoredMetrics>>;

    /// Creates the row at version 0. Returns `false` if it already existed.
    fn insert(&self, record: &MetricsRecord) -> Result<bool>;

    /// Overwrites the row only if it is still at `expected_version`, bumping
    /// the version. Returns `false` when another writer got there first.
    fn update(&self, id: i64, expected_version: i64, record: &MetricsRecord) -> Result<bool>;
}

impl<T: PersistenceBackend + ?Sized> PersistenceBackend for std::sync::Arc<T> {
    fn get_singleton(&self) -> Result<Option<StoredMetrics>> {
        (**self).get_singleton()
    }

    fn insert(&self, record: &MetricsRecord) -> Result<bool> {
        (**self).insert(record)
    }

    fn update(&self, id: i64, expected_version: i64, record: &MetricsRecord) -> Result<bool> {
        (**self).update(id, expected_version, record)
    }
}
