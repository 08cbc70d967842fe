use std::sync::{Mutex, MutexGuard, PoisonError};

struct Slot<T> {
    generation: u64,
    value: Option<T>,
}

/// Read-through snapshot with explicit invalidation.
///
/// Each invalidation bumps a generation counter. A load that began before an
/// invalidation is returned to its caller but never installed, so a slow
/// reader cannot put pre-write values back after a writer invalidated.
pub struct SnapshotCache<T> {
    slot: Mutex<Slot<T>>,
}

impl<T: Clone> SnapshotCache<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                generation: 0,
                value: None,
            }),
        }
    }

    pub fn get(&self) -> Option<T> {
        self.lock().value.clone()
    }

    pub fn get_or_load<E>(&self, load: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let generation = {
            let slot = self.lock();
            if let Some(value) = &slot.value {
                return Ok(value.clone());
            }
            slot.generation
        };

        let value = load()?;

        let mut slot = self.lock();
        if slot.generation == generation && slot.value.is_none() {
            slot.value = Some(value.clone());
        }
        Ok(value)
    }

    pub fn invalidate(&self) {
        let mut slot = self.lock();
        slot.generation = slot.generation.wrapping_add(1);
        slot.value = None;
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Default for SnapshotCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_loads_once_until_invalidated() {
        let cache = SnapshotCache::new();
        let loads = Cell::new(0);
        let load = || -> Result<i32, ()> {
            loads.set(loads.get() + 1);
            Ok(loads.get())
        };

        assert_eq!(cache.get_or_load(load), Ok(1));
        assert_eq!(cache.get_or_load(load), Ok(1));
        assert_eq!(loads.get(), 1);

        cache.invalidate();
        assert_eq!(cache.get(), None);
        assert_eq!(cache.get_or_load(load), Ok(2));
        assert_eq!(loads.get(), 2);
    }

    #[test]
    fn test_failed_load_leaves_cache_empty() {
        let cache: SnapshotCache<i32> = SnapshotCache::new();
        assert_eq!(cache.get_or_load(|| Err("db down")), Err("db down"));
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_load_racing_an_invalidation_is_not_installed() {
        let cache = SnapshotCache::new();
        let stale = cache.get_or_load(|| -> Result<&str, ()> {
            // A writer lands while this read is in flight.
            cache.invalidate();
            Ok("before write")
        });

        assert_eq!(stale, Ok("before write"));
        assert_eq!(cache.get(), None);
        assert_eq!(
            cache.get_or_load(|| -> Result<&str, ()> { Ok("after write") }),
            Ok("after write")
        );
    }
}
