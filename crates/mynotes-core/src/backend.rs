//! Storage seams for the engines.
//!
//! [`CounterStore`] persists identifier counters and supports the atomic
//! operations [`IdAllocator`](crate::IdAllocator) is built on: create-if-
//! absent, compare-and-swap on a version, and a validated free-list push.
//! [`MembershipStore`] persists liker sets with per-member atomic updates so
//! concurrent toggles on the same document never lose each other's writes.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, ReleaseRejection};
use crate::ordered::OrderedSet;
use crate::types::{Id, Target};

// ============================================================================
// Counters
// ============================================================================

/// Persistent state of one identifier counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRecord {
    pub key: String,
    /// Next never-issued value.
    pub next_value: u64,
    /// Released IDs, reissued head first in release order.
    pub free: Vec<Id>,
    /// Bumped on every write; compare-and-swap token.
    pub version: u64,
}

impl CounterRecord {
    /// State written when a counter is first used: ID `0` already issued.
    #[must_use]
    pub fn initial(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            next_value: 1,
            free: Vec::new(),
            version: 0,
        }
    }

    /// Takes the next ID to issue, preferring the free list head.
    ///
    /// Returns `None` once `next_value` reaches [`Id::NONE`]. Stores with a
    /// narrower column refuse to persist a record past their own limit and
    /// report [`CoreError::Exhausted`](crate::CoreError::Exhausted). Does not
    /// touch `version`; callers bump it when swapping the record in.
    pub fn take_next(&mut self) -> Option<Id> {
        if !self.free.is_empty() {
            return Some(self.free.remove(0));
        }
        if self.next_value >= Id::NONE.get() {
            return None;
        }
        let id = Id::new(self.next_value);
        self.next_value += 1;
        Some(id)
    }

    /// Checks whether `id` may be pushed onto this counter's free list.
    pub fn check_release(&self, id: Id) -> Result<(), ReleaseRejection> {
        if id.is_none() {
            Err(ReleaseRejection::Sentinel)
        } else if id.get() >= self.next_value {
            Err(ReleaseRejection::NeverAllocated)
        } else if self.free.contains(&id) {
            Err(ReleaseRejection::AlreadyFree)
        } else {
            Ok(())
        }
    }
}

/// Result of [`CounterStore::push_free`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeOutcome {
    Released,
    Rejected(ReleaseRejection),
    MissingCounter,
}

/// Persistence for identifier counters.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Reads a counter, or `None` if it was never created.
    async fn load_counter(&self, key: &str) -> CoreResult<Option<CounterRecord>>;

    /// Inserts `record` unless a counter with its key exists.
    /// Returns whether this call created it.
    async fn create_counter(&self, record: &CounterRecord) -> CoreResult<bool>;

    /// Replaces the stored counter with `record` iff its version still equals
    /// `expected_version`. Returns whether the swap happened.
    async fn swap_counter(&self, expected_version: u64, record: &CounterRecord)
    -> CoreResult<bool>;

    /// Appends `id` to the free list tail in one atomic step, validating it
    /// with [`CounterRecord::check_release`] semantics.
    async fn push_free(&self, key: &str, id: Id) -> CoreResult<FreeOutcome>;
}

#[async_trait]
impl<S: CounterStore + ?Sized> CounterStore for Arc<S> {
    async fn load_counter(&self, key: &str) -> CoreResult<Option<CounterRecord>> {
        (**self).load_counter(key).await
    }

    async fn create_counter(&self, record: &CounterRecord) -> CoreResult<bool> {
        (**self).create_counter(record).await
    }

    async fn swap_counter(
        &self,
        expected_version: u64,
        record: &CounterRecord,
    ) -> CoreResult<bool> {
        (**self).swap_counter(expected_version, record).await
    }

    async fn push_free(&self, key: &str, id: Id) -> CoreResult<FreeOutcome> {
        (**self).push_free(key, id).await
    }
}

// ============================================================================
// Memberships
// ============================================================================

/// Persistence for per-document liker sets.
///
/// Add and remove are keyed by member value, never by position, and each is
/// a single atomic update in the backend. Both return the member count after
/// the update, or `None` when the target document does not exist.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn load_members(&self, target: Target) -> CoreResult<Option<OrderedSet<Id>>>;

    /// Adds `member` if absent.
    async fn add_member(&self, target: Target, member: Id) -> CoreResult<Option<usize>>;

    /// Removes `member` if present.
    async fn remove_member(&self, target: Target, member: Id) -> CoreResult<Option<usize>>;
}

#[async_trait]
impl<S: MembershipStore + ?Sized> MembershipStore for Arc<S> {
    async fn load_members(&self, target: Target) -> CoreResult<Option<OrderedSet<Id>>> {
        (**self).load_members(target).await
    }

    async fn add_member(&self, target: Target, member: Id) -> CoreResult<Option<usize>> {
        (**self).add_member(target, member).await
    }

    async fn remove_member(&self, target: Target, member: Id) -> CoreResult<Option<usize>> {
        (**self).remove_member(target, member).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_record_has_zero_issued() {
        let mut record = CounterRecord::initial("notes");
        assert_eq!(record.take_next(), Some(Id(1)));
        assert_eq!(record.next_value, 2);
    }

    #[test]
    fn test_take_next_prefers_free_head() {
        let mut record = CounterRecord {
            key: "notes".to_string(),
            next_value: 5,
            free: vec![Id(1), Id(3)],
            version: 2,
        };
        assert_eq!(record.take_next(), Some(Id(1)));
        assert_eq!(record.take_next(), Some(Id(3)));
        assert_eq!(record.take_next(), Some(Id(5)));
    }

    #[test]
    fn test_take_next_stops_before_sentinel() {
        let mut record = CounterRecord {
            key: "notes".to_string(),
            next_value: u64::MAX - 1,
            free: Vec::new(),
            version: 0,
        };
        assert_eq!(record.take_next(), Some(Id(u64::MAX - 1)));
        assert_eq!(record.take_next(), None);
    }

    #[test]
    fn test_check_release_rules() {
        let record = CounterRecord {
            key: "notes".to_string(),
            next_value: 4,
            free: vec![Id(2)],
            version: 0,
        };
        assert_eq!(record.check_release(Id(1)), Ok(()));
        assert_eq!(
            record.check_release(Id(2)),
            Err(ReleaseRejection::AlreadyFree)
        );
        assert_eq!(
            record.check_release(Id(4)),
            Err(ReleaseRejection::NeverAllocated)
        );
        assert_eq!(
            record.check_release(Id::NONE),
            Err(ReleaseRejection::Sentinel)
        );
    }
}
