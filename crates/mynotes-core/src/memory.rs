//! In-process store for tests, benches and single-node tooling.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::backend::{CounterRecord, CounterStore, FreeOutcome, MembershipStore};
use crate::error::{CoreError, CoreResult};
use crate::ordered::OrderedSet;
use crate::types::{Id, Target};

/// Counters and liker sets held in mutex-guarded maps.
///
/// Every trait method takes the lock once, so each call is atomic with
/// respect to the others.
#[derive(Debug, Default)]
pub struct MemoryStore {
    counters: Mutex<HashMap<String, CounterRecord>>,
    documents: Mutex<HashMap<Target, OrderedSet<Id>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a likeable document with no likes. Returns `false` if it
    /// already existed.
    pub fn insert_document(&self, target: Target) -> CoreResult<bool> {
        let mut docs = lock(&self.documents)?;
        if docs.contains_key(&target) {
            return Ok(false);
        }
        docs.insert(target, OrderedSet::new());
        Ok(true)
    }

    pub fn remove_document(&self, target: Target) -> CoreResult<Option<OrderedSet<Id>>> {
        Ok(lock(&self.documents)?.remove(&target))
    }

    /// Current liker set of `target`.
    pub fn members(&self, target: Target) -> CoreResult<Option<OrderedSet<Id>>> {
        Ok(lock(&self.documents)?.get(&target).cloned())
    }

    /// Overwrites a counter unconditionally.
    pub fn put_counter(&self, record: CounterRecord) -> CoreResult<()> {
        lock(&self.counters)?.insert(record.key.clone(), record);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> CoreResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| CoreError::store("memory store lock poisoned"))
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn load_counter(&self, key: &str) -> CoreResult<Option<CounterRecord>> {
        Ok(lock(&self.counters)?.get(key).cloned())
    }

    async fn create_counter(&self, record: &CounterRecord) -> CoreResult<bool> {
        let mut counters = lock(&self.counters)?;
        if counters.contains_key(&record.key) {
            return Ok(false);
        }
        counters.insert(record.key.clone(), record.clone());
        Ok(true)
    }

    async fn swap_counter(
        &self,
        expected_version: u64,
        record: &CounterRecord,
    ) -> CoreResult<bool> {
        let mut counters = lock(&self.counters)?;
        match counters.get_mut(&record.key) {
            Some(current) if current.version == expected_version => {
                *current = record.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn push_free(&self, key: &str, id: Id) -> CoreResult<FreeOutcome> {
        let mut counters = lock(&self.counters)?;
        let Some(record) = counters.get_mut(key) else {
            return Ok(FreeOutcome::MissingCounter);
        };
        if let Err(reason) = record.check_release(id) {
            return Ok(FreeOutcome::Rejected(reason));
        }
        record.free.push(id);
        record.version = record.version.wrapping_add(1);
        Ok(FreeOutcome::Released)
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn load_members(&self, target: Target) -> CoreResult<Option<OrderedSet<Id>>> {
        self.members(target)
    }

    async fn add_member(&self, target: Target, member: Id) -> CoreResult<Option<usize>> {
        let mut docs = lock(&self.documents)?;
        Ok(docs.get_mut(&target).map(|members| {
            if let Err(index) = members.bi_search(&member) {
                members.insert(index, member);
            }
            members.len()
        }))
    }

    async fn remove_member(&self, target: Target, member: Id) -> CoreResult<Option<usize>> {
        let mut docs = lock(&self.documents)?;
        Ok(docs.get_mut(&target).map(|members| {
            if let Ok(index) = members.bi_search(&member) {
                members.remove(index);
            }
            members.len()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_counter_only_once() {
        let store = MemoryStore::new();
        let record = CounterRecord::initial("accounts");
        assert!(store.create_counter(&record).await.unwrap());
        assert!(!store.create_counter(&record).await.unwrap());
    }

    #[tokio::test]
    async fn test_swap_requires_matching_version() {
        let store = MemoryStore::new();
        let mut record = CounterRecord::initial("accounts");
        store.create_counter(&record).await.unwrap();

        record.next_value = 2;
        record.version = 1;
        assert!(!store.swap_counter(7, &record).await.unwrap());
        assert!(store.swap_counter(0, &record).await.unwrap());
        assert!(!store.swap_counter(0, &record).await.unwrap());

        let stored = store.load_counter("accounts").await.unwrap().unwrap();
        assert_eq!(stored.next_value, 2);
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_push_free_bumps_version() {
        let store = MemoryStore::new();
        store
            .create_counter(&CounterRecord::initial("notes"))
            .await
            .unwrap();
        assert_eq!(
            store.push_free("notes", Id(0)).await.unwrap(),
            FreeOutcome::Released
        );
        let stored = store.load_counter("notes").await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.free, vec![Id(0)]);
        assert_eq!(
            store.push_free("missing", Id(0)).await.unwrap(),
            FreeOutcome::MissingCounter
        );
    }

    #[tokio::test]
    async fn test_member_updates_are_idempotent() {
        let store = MemoryStore::new();
        let target = Target::comment(Id(4));
        store.insert_document(target).unwrap();

        assert_eq!(store.add_member(target, Id(1)).await.unwrap(), Some(1));
        assert_eq!(store.add_member(target, Id(1)).await.unwrap(), Some(1));
        assert_eq!(store.remove_member(target, Id(2)).await.unwrap(), Some(1));
        assert_eq!(store.remove_member(target, Id(1)).await.unwrap(), Some(0));
        assert_eq!(
            store.add_member(Target::note(Id(4)), Id(1)).await.unwrap(),
            None
        );
    }

    #[test]
    fn test_remove_document_returns_members() {
        let store = MemoryStore::new();
        let target = Target::note(Id(1));
        assert!(store.insert_document(target).unwrap());
        assert!(!store.insert_document(target).unwrap());
        assert!(store.remove_document(target).unwrap().is_some());
        assert!(store.members(target).unwrap().is_none());
    }
}
