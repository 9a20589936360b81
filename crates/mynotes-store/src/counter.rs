//! `CounterStore` implementation backed by the `id_counters` table.
//!
//! Every write is a single statement: creation is insert-if-absent, swaps
//! are guarded by the version column, and releases validate and append in
//! the same `UPDATE`.

use async_trait::async_trait;
use mynotes_core::{
    CoreError, CoreResult, CounterRecord, CounterStore, FreeOutcome, Id, ReleaseRejection,
};

use crate::error::{StoreResult, id_to_db, to_db};
use crate::models::CounterRow;
use crate::store::Store;

/// Times a release is retried when the counter changes between the guarded
/// append and the follow-up read that explains its failure.
const PUSH_FREE_ATTEMPTS: u32 = 3;

/// Fails with [`CoreError::Exhausted`] when `record` would advance the
/// counter past what a BIGINT column holds.
///
/// Free-list entries are always below `next_value`, so checking it covers
/// the whole record.
fn ensure_storable(record: &CounterRecord) -> CoreResult<()> {
    if to_db(record.next_value).is_err() {
        tracing::warn!(counter = %record.key, "Counter reached the BIGINT limit");
        return Err(CoreError::Exhausted {
            key: record.key.clone(),
        });
    }
    Ok(())
}

impl Store {
    /// Get a counter by key.
    pub async fn get_counter(&self, key: &str) -> StoreResult<Option<CounterRecord>> {
        sqlx::query_as::<_, CounterRow>(
            "SELECT key, next_value, free, version FROM id_counters WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(self.pool())
        .await?
        .map(CounterRecord::try_from)
        .transpose()
    }

    async fn insert_counter(&self, record: &CounterRecord) -> StoreResult<bool> {
        let free = record
            .free
            .iter()
            .map(|id| id_to_db(*id))
            .collect::<StoreResult<Vec<i64>>>()?;

        let result = sqlx::query(
            r#"
            INSERT INTO id_counters (key, next_value, free, version)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (key) DO NOTHING
            "#,
        )
        .bind(&record.key)
        .bind(to_db(record.next_value)?)
        .bind(free)
        .bind(to_db(record.version)?)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn compare_and_swap_counter(
        &self,
        expected_version: u64,
        record: &CounterRecord,
    ) -> StoreResult<bool> {
        let free = record
            .free
            .iter()
            .map(|id| id_to_db(*id))
            .collect::<StoreResult<Vec<i64>>>()?;

        let result = sqlx::query(
            r#"
            UPDATE id_counters SET next_value = $2, free = $3, version = $4
            WHERE key = $1 AND version = $5
            "#,
        )
        .bind(&record.key)
        .bind(to_db(record.next_value)?)
        .bind(free)
        .bind(to_db(record.version)?)
        .bind(to_db(expected_version)?)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn append_free(&self, key: &str, id: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE id_counters
            SET free = array_append(free, $2), version = version + 1
            WHERE key = $1 AND $2 < next_value AND NOT ($2 = ANY(free))
            "#,
        )
        .bind(key)
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl CounterStore for Store {
    async fn load_counter(&self, key: &str) -> CoreResult<Option<CounterRecord>> {
        Ok(self.get_counter(key).await?)
    }

    async fn create_counter(&self, record: &CounterRecord) -> CoreResult<bool> {
        ensure_storable(record)?;
        Ok(self.insert_counter(record).await?)
    }

    async fn swap_counter(
        &self,
        expected_version: u64,
        record: &CounterRecord,
    ) -> CoreResult<bool> {
        ensure_storable(record)?;
        Ok(self.compare_and_swap_counter(expected_version, record).await?)
    }

    async fn push_free(&self, key: &str, id: Id) -> CoreResult<FreeOutcome> {
        let Ok(db_id) = id_to_db(id) else {
            // Nothing at or above 2^63 can have been issued by a BIGINT counter.
            let reason = if id.is_none() {
                ReleaseRejection::Sentinel
            } else {
                ReleaseRejection::NeverAllocated
            };
            return Ok(FreeOutcome::Rejected(reason));
        };

        for _ in 0..PUSH_FREE_ATTEMPTS {
            if self.append_free(key, db_id).await? {
                return Ok(FreeOutcome::Released);
            }

            match self.get_counter(key).await? {
                None => return Ok(FreeOutcome::MissingCounter),
                Some(record) => {
                    if let Err(reason) = record.check_release(id) {
                        return Ok(FreeOutcome::Rejected(reason));
                    }
                }
            }
            tracing::debug!(counter = %key, id = %id, "Counter changed during release, retrying");
        }

        Err(CoreError::Contention {
            key: key.to_string(),
            attempts: PUSH_FREE_ATTEMPTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(next_value: u64) -> CounterRecord {
        CounterRecord {
            next_value,
            ..CounterRecord::initial("notes")
        }
    }

    #[test]
    fn test_ensure_storable_accepts_bigint_range() {
        assert!(ensure_storable(&CounterRecord::initial("notes")).is_ok());
        assert!(ensure_storable(&record_at(i64::MAX as u64)).is_ok());
    }

    #[test]
    fn test_last_bigint_id_exhausts_counter() {
        let mut record = record_at(i64::MAX as u64);
        assert_eq!(record.take_next(), Some(Id::new(i64::MAX as u64)));
        assert!(matches!(
            ensure_storable(&record),
            Err(CoreError::Exhausted { key }) if key == "notes"
        ));
    }
}
