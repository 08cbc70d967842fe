use std::thread;

use chrono::Utc;

use super::backend::PersistenceBackend;
use super::cache::SnapshotCache;
use super::error::{MetricsError, Result};
use super::record::{ImpactFactors, MetricsRecord, StoredMetrics};

pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 64;

/// Owner of the cumulative metrics row.
///
/// Reads go through a [`SnapshotCache`]. Writes are read-add-write with a
/// version check, retried when another writer (thread or process) moved the
/// row in between, so no contribution is ever lost. The cache is invalidated
/// only after a write has landed.
pub struct MetricsStore<B> {
    backend: B,
    cache: SnapshotCache<MetricsRecord>,
    factors: ImpactFactors,
    max_attempts: u32,
}

impl<B: PersistenceBackend> MetricsStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_factors(backend, ImpactFactors::default())
    }

    pub fn with_factors(backend: B, factors: ImpactFactors) -> Self {
        Self {
            backend,
            cache: SnapshotCache::new(),
            factors,
            max_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn factors(&self) -> &ImpactFactors {
        &self.factors
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current totals, creating the all-zero row on first use.
    pub fn read(&self) -> Result<MetricsRecord> {
        self.cache
            .get_or_load(|| self.load_or_create().map(|stored| stored.record))
    }

    /// Adds one simulated route to the totals and returns the new totals.
    ///
    /// On error nothing was written and the cached snapshot is kept.
    pub fn accumulate(&self, distance_km: f64, emissions_kg: f64) -> Result<MetricsRecord> {
        check_delta("distance_km", distance_km)?;
        check_delta("emissions_kg", emissions_kg)?;

        for attempt in 1..=self.max_attempts {
            let now = Utc::now();
            let written = match self.backend.get_singleton()? {
                Some(current) => {
                    let next = current
                        .record
                        .accumulate(distance_km, emissions_kg, &self.factors, now);
                    self.backend
                        .update(current.id, current.version, &next)?
                        .then_some(next)
                }
                None => {
                    let first = MetricsRecord::zero(now).accumulate(
                        distance_km,
                        emissions_kg,
                        &self.factors,
                        now,
                    );
                    self.backend.insert(&first)?.then_some(first)
                }
            };

            if let Some(record) = written {
                self.cache.invalidate();
                log::debug!(
                    "Metrics now {:.2} km / {:.2} kg over {} routes",
                    record.total_distance_km,
                    record.total_emissions_kg,
                    record.route_count
                );
                return Ok(record);
            }

            log::warn!("Metrics write conflict (attempt {}), retrying", attempt);
            thread::yield_now();
        }

        Err(MetricsError::Contention {
            attempts: self.max_attempts,
        })
    }

    fn load_or_create(&self) -> Result<StoredMetrics> {
        if let Some(stored) = self.backend.get_singleton()? {
            return Ok(stored);
        }
        if self.backend.insert(&MetricsRecord::zero(Utc::now()))? {
            log::info!("Created empty metrics record");
        }
        self.backend
            .get_singleton()?
            .ok_or(MetricsError::MissingRecord)
    }
}

fn check_delta(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MetricsError::InvalidDelta { field, value })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sdk::metrics::sqlite::SqliteBackend;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Wraps a real backend and can be told to fail writes or count reads.
    pub(crate) struct FlakyBackend {
        pub(crate) inner: SqliteBackend,
        pub(crate) fail_writes: AtomicBool,
        /// Once a write has landed, every later read fails.
        pub(crate) fail_reads_after_write: AtomicBool,
        pub(crate) reads: AtomicUsize,
        wrote: AtomicBool,
    }

    impl FlakyBackend {
        pub(crate) fn new() -> Self {
            Self {
                inner: SqliteBackend::in_memory().unwrap(),
                fail_writes: AtomicBool::new(false),
                fail_reads_after_write: AtomicBool::new(false),
                reads: AtomicUsize::new(0),
                wrote: AtomicBool::new(false),
            }
        }

        fn read_error() -> MetricsError {
            MetricsError::Storage(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
                Some("disk I/O error".to_string()),
            ))
        }

        fn note_write(&self, landed: bool) -> bool {
            if landed {
                self.wrote.store(true, Ordering::SeqCst);
            }
            landed
        }

        fn write_error() -> MetricsError {
            MetricsError::Storage(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_READONLY),
                Some("attempt to write a readonly database".to_string()),
            ))
        }
    }

    impl PersistenceBackend for FlakyBackend {
        fn get_singleton(&self) -> Result<Option<StoredMetrics>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads_after_write.load(Ordering::SeqCst)
                && self.wrote.load(Ordering::SeqCst)
            {
                return Err(Self::read_error());
            }
            self.inner.get_singleton()
        }

        fn insert(&self, record: &MetricsRecord) -> Result<bool> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(Self::write_error());
            }
            self.inner.insert(record).map(|landed| self.note_write(landed))
        }

        fn update(&self, id: i64, expected_version: i64, record: &MetricsRecord) -> Result<bool> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(Self::write_error());
            }
            self.inner
                .update(id, expected_version, record)
                .map(|landed| self.note_write(landed))
        }
    }

    /// Always reports a lost race on update.
    struct AlwaysConflicting(SqliteBackend);

    impl PersistenceBackend for AlwaysConflicting {
        fn get_singleton(&self) -> Result<Option<StoredMetrics>> {
            self.0.get_singleton()
        }
        fn insert(&self, record: &MetricsRecord) -> Result<bool> {
            self.0.insert(record)
        }
        fn update(&self, _: i64, _: i64, _: &MetricsRecord) -> Result<bool> {
            Ok(false)
        }
    }

    fn store() -> MetricsStore<SqliteBackend> {
        MetricsStore::new(SqliteBackend::in_memory().unwrap())
    }

    #[test]
    fn test_first_read_creates_zero_row() {
        let store = store();
        let record = store.read().unwrap();
        assert_eq!(record.total_distance_km, 0.0);
        assert_eq!(record.total_emissions_kg, 0.0);
        assert_eq!(record.route_count, 0);
        assert!(store.backend.get_singleton().unwrap().is_some());
    }

    #[test]
    fn test_consecutive_reads_are_identical_and_cached() {
        let store = MetricsStore::new(FlakyBackend::new());
        let first = store.read().unwrap();
        let reads_after_first = store.backend.reads.load(Ordering::SeqCst);
        let second = store.read().unwrap();

        assert_eq!(first, second);
        assert_eq!(store.backend.reads.load(Ordering::SeqCst), reads_after_first);
    }

    #[test]
    fn test_two_accumulates_add_up() {
        let store = store();
        store.read().unwrap();
        store.accumulate(100.0, 40.0).unwrap();
        let record = store.accumulate(100.0, 40.0).unwrap();

        assert_eq!(record.total_distance_km, 200.0);
        assert_eq!(record.total_emissions_kg, 80.0);
        assert_eq!(store.read().unwrap(), record);
    }

    #[test]
    fn test_accumulate_without_row_starts_from_zero() {
        let store = store();
        let record = store.accumulate(12.0, 3.0).unwrap();
        assert_eq!(record.total_distance_km, 12.0);
        assert_eq!(record.route_count, 1);
        assert_eq!(store.read().unwrap().total_emissions_kg, 3.0);
    }

    #[test]
    fn test_read_after_write_sees_new_totals() {
        let store = store();
        let before = store.read().unwrap();
        store.accumulate(5.0, 2.0).unwrap();
        let after = store.read().unwrap();
        assert!(after.total_distance_km > before.total_distance_km);
        assert_eq!(after.route_count, 1);
    }

    #[test]
    fn test_failed_write_keeps_totals_and_cache() {
        let store = MetricsStore::new(FlakyBackend::new());
        store.accumulate(10.0, 4.0).unwrap();
        let cached = store.read().unwrap();

        store.backend.fail_writes.store(true, Ordering::SeqCst);
        let err = store.accumulate(99.0, 99.0).unwrap_err();
        assert!(matches!(err, MetricsError::Storage(_)));

        assert_eq!(store.cache.get(), Some(cached.clone()));
        assert_eq!(
            store.backend.get_singleton().unwrap().unwrap().record,
            cached
        );
    }

    #[test]
    fn test_negative_delta_rejected_before_io() {
        let store = MetricsStore::new(FlakyBackend::new());
        let err = store.accumulate(-1.0, 0.0).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidDelta { field: "distance_km", .. }));
        let err = store.accumulate(1.0, f64::NAN).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidDelta { field: "emissions_kg", .. }));
        assert_eq!(store.backend.reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_endless_conflicts_give_up() {
        let backend = AlwaysConflicting(SqliteBackend::in_memory().unwrap());
        let store = MetricsStore::new(backend).max_attempts(3);
        store.read().unwrap();
        let err = store.accumulate(1.0, 1.0).unwrap_err();
        assert!(matches!(err, MetricsError::Contention { attempts: 3 }));
        assert_eq!(store.read().unwrap().route_count, 0);
    }

    #[test]
    fn test_concurrent_accumulate_loses_nothing() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 25;

        let store = Arc::new(store());
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..PER_THREAD {
                        store.accumulate(1.5, 0.5).unwrap();
                        store.read().unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let total = store.read().unwrap();
        let n = (THREADS * PER_THREAD) as f64;
        assert_eq!(total.route_count, (THREADS * PER_THREAD) as u64);
        assert!((total.total_distance_km - 1.5 * n).abs() < 1e-9);
        assert!((total.total_emissions_kg - 0.5 * n).abs() < 1e-9);
    }
}
