pub mod backend;
pub mod cache;
pub mod error;
pub mod record;
pub mod sqlite;
pub mod store;

pub use backend::PersistenceBackend;
pub use cache::SnapshotCache;
pub use error::MetricsError;
pub use record::{ImpactFactors, MetricsRecord, StoredMetrics};
pub use sqlite::SqliteBackend;
pub use store::MetricsStore;
