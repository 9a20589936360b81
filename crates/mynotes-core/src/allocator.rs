//! Dense, recycling identifier allocation.
//!
//! Each collection owns one counter. The first allocation on a fresh counter
//! returns `0`; later allocations reuse released IDs in release order before
//! extending the dense range. Every allocation is a read followed by a
//! versioned compare-and-swap, retried a bounded number of times, so no two
//! concurrent callers ever receive the same ID.

use tracing::{debug, info, warn};

use crate::backend::{CounterRecord, CounterStore, FreeOutcome};
use crate::error::{CoreError, CoreResult};
use crate::types::Id;

/// Compare-and-swap attempts before allocation reports contention.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 16;

/// Allocates and releases IDs for one counter.
#[derive(Debug, Clone)]
pub struct IdAllocator<S> {
    store: S,
    key: String,
    max_attempts: u32,
}

impl<S: CounterStore> IdAllocator<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the retry bound. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a fresh ID: the free list head if any, otherwise the next
    /// never-issued value.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Exhausted`] when every value below [`Id::NONE`] is in use.
    /// - [`CoreError::Contention`] after losing `max_attempts` races.
    /// - [`CoreError::Store`] on backend failure.
    pub async fn allocate(&self) -> CoreResult<Id> {
        for attempt in 1..=self.max_attempts {
            match self.store.load_counter(&self.key).await? {
                None => {
                    let record = CounterRecord::initial(&self.key);
                    if self.store.create_counter(&record).await? {
                        info!(counter = %self.key, "Created id counter");
                        return Ok(Id::new(0));
                    }
                }
                Some(mut record) => {
                    let expected = record.version;
                    let id = record.take_next().ok_or_else(|| CoreError::Exhausted {
                        key: self.key.clone(),
                    })?;
                    record.version = expected.wrapping_add(1);
                    if self.store.swap_counter(expected, &record).await? {
                        debug!(counter = %self.key, id = %id, attempt, "Allocated id");
                        return Ok(id);
                    }
                }
            }
            debug!(counter = %self.key, attempt, "Lost counter update race, retrying");
        }

        warn!(
            counter = %self.key,
            attempts = self.max_attempts,
            "Id allocation gave up under contention"
        );
        Err(CoreError::Contention {
            key: self.key.clone(),
            attempts: self.max_attempts,
        })
    }

    /// Returns `id` to the free list tail so a later [`allocate`](Self::allocate)
    /// can reuse it.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the counter was never created.
    /// - [`CoreError::InvalidRelease`] if `id` is already free, was never
    ///   issued, or is [`Id::NONE`].
    pub async fn free(&self, id: Id) -> CoreResult<()> {
        match self.store.push_free(&self.key, id).await? {
            FreeOutcome::Released => {
                debug!(counter = %self.key, id = %id, "Released id");
                Ok(())
            }
            FreeOutcome::Rejected(reason) => Err(CoreError::InvalidRelease {
                key: self.key.clone(),
                id,
                reason,
            }),
            FreeOutcome::MissingCounter => Err(CoreError::not_found("counter", &self.key)),
        }
    }

    /// Current counter state, or `None` before the first allocation.
    pub async fn snapshot(&self) -> CoreResult<Option<CounterRecord>> {
        self.store.load_counter(&self.key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseRejection;
    use crate::memory::MemoryStore;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn allocator() -> IdAllocator<Arc<MemoryStore>> {
        IdAllocator::new(Arc::new(MemoryStore::new()), "notes")
    }

    #[tokio::test]
    async fn test_fresh_counter_starts_at_zero() {
        let alloc = allocator();
        assert!(alloc.snapshot().await.unwrap().is_none());
        assert_eq!(alloc.allocate().await.unwrap(), Id(0));
        assert_eq!(alloc.allocate().await.unwrap(), Id(1));
        assert_eq!(alloc.allocate().await.unwrap(), Id(2));

        let snapshot = alloc.snapshot().await.unwrap().unwrap();
        assert_eq!(snapshot.next_value, 3);
        assert!(snapshot.free.is_empty());
    }

    #[tokio::test]
    async fn test_freed_ids_are_reused_in_release_order() {
        let alloc = allocator();
        for _ in 0..5 {
            alloc.allocate().await.unwrap();
        }
        alloc.free(Id(1)).await.unwrap();
        alloc.free(Id(3)).await.unwrap();

        assert_eq!(alloc.allocate().await.unwrap(), Id(1));
        assert_eq!(alloc.allocate().await.unwrap(), Id(3));
        assert_eq!(alloc.allocate().await.unwrap(), Id(5));
    }

    #[tokio::test]
    async fn test_counters_are_independent() {
        let store = Arc::new(MemoryStore::new());
        let notes = IdAllocator::new(store.clone(), "notes");
        let comments = IdAllocator::new(store, "comments");

        assert_eq!(notes.allocate().await.unwrap(), Id(0));
        assert_eq!(notes.allocate().await.unwrap(), Id(1));
        assert_eq!(comments.allocate().await.unwrap(), Id(0));
    }

    #[tokio::test]
    async fn test_free_on_missing_counter_is_not_found() {
        let alloc = allocator();
        let err = alloc.free(Id(0)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_invalid_releases_are_rejected() {
        let alloc = allocator();
        alloc.allocate().await.unwrap();
        alloc.allocate().await.unwrap();
        alloc.free(Id(0)).await.unwrap();

        let double = alloc.free(Id(0)).await.unwrap_err();
        assert!(matches!(
            double,
            CoreError::InvalidRelease {
                reason: ReleaseRejection::AlreadyFree,
                ..
            }
        ));

        let unissued = alloc.free(Id(9)).await.unwrap_err();
        assert!(matches!(
            unissued,
            CoreError::InvalidRelease {
                reason: ReleaseRejection::NeverAllocated,
                ..
            }
        ));

        let sentinel = alloc.free(Id::NONE).await.unwrap_err();
        assert!(matches!(
            sentinel,
            CoreError::InvalidRelease {
                reason: ReleaseRejection::Sentinel,
                ..
            }
        ));

        let snapshot = alloc.snapshot().await.unwrap().unwrap();
        assert_eq!(snapshot.free, vec![Id(0)]);
    }

    #[tokio::test]
    async fn test_allocation_at_sentinel_is_exhausted() {
        let store = Arc::new(MemoryStore::new());
        store
            .put_counter(CounterRecord {
                key: "notes".to_string(),
                next_value: u64::MAX,
                free: Vec::new(),
                version: 0,
            })
            .unwrap();
        let alloc = IdAllocator::new(store, "notes");
        assert!(matches!(
            alloc.allocate().await,
            Err(CoreError::Exhausted { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_allocations_are_unique() {
        const TASKS: u32 = 32;
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();

        for _ in 0..TASKS {
            // A task can lose at most TASKS - 1 races, one per competing winner.
            let alloc = IdAllocator::new(store.clone(), "notes").with_max_attempts(TASKS + 1);
            handles.push(tokio::spawn(async move { alloc.allocate().await }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            let id = handle.await.unwrap().unwrap();
            assert!(seen.insert(id), "duplicate id {id}");
        }
        let expected: HashSet<Id> = (0..u64::from(TASKS)).map(Id).collect();
        assert_eq!(seen, expected);
    }

    /// Fails the first `failures` swaps as if another writer got there first.
    struct RacyStore {
        inner: MemoryStore,
        failures: AtomicU32,
    }

    #[async_trait]
    impl CounterStore for RacyStore {
        async fn load_counter(&self, key: &str) -> CoreResult<Option<CounterRecord>> {
            self.inner.load_counter(key).await
        }

        async fn create_counter(&self, record: &CounterRecord) -> CoreResult<bool> {
            self.inner.create_counter(record).await
        }

        async fn swap_counter(
            &self,
            expected_version: u64,
            record: &CounterRecord,
        ) -> CoreResult<bool> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Ok(false);
            }
            self.inner.swap_counter(expected_version, record).await
        }

        async fn push_free(&self, key: &str, id: Id) -> CoreResult<FreeOutcome> {
            self.inner.push_free(key, id).await
        }
    }

    #[tokio::test]
    async fn test_lost_races_are_retried() {
        let store = RacyStore {
            inner: MemoryStore::new(),
            failures: AtomicU32::new(0),
        };
        let alloc = IdAllocator::new(store, "notes").with_max_attempts(4);
        assert_eq!(alloc.allocate().await.unwrap(), Id(0));

        alloc.store().failures.store(3, Ordering::SeqCst);
        assert_eq!(alloc.allocate().await.unwrap(), Id(1));
    }

    #[tokio::test]
    async fn test_persistent_contention_gives_up() {
        let store = RacyStore {
            inner: MemoryStore::new(),
            failures: AtomicU32::new(0),
        };
        let alloc = IdAllocator::new(store, "notes").with_max_attempts(3);
        alloc.allocate().await.unwrap();

        alloc.store().failures.store(10, Ordering::SeqCst);
        let err = alloc.allocate().await.unwrap_err();
        assert!(matches!(err, CoreError::Contention { attempts: 3, .. }));
    }
}
