//! `MembershipStore` implementation over the `likes` arrays of notes and
//! comments.
//!
//! Adds and removes address the member by value inside a single `UPDATE`,
//! which PostgreSQL evaluates against the latest row version, so concurrent
//! toggles by different users on one document all survive.

use async_trait::async_trait;
use mynotes_core::{CoreResult, Id, MembershipStore, OrderedSet, Target, TargetType};

use crate::error::{StoreResult, id_from_db, id_to_db};
use crate::store::Store;

/// Table holding the documents of a target kind.
fn likes_table(kind: TargetType) -> &'static str {
    match kind {
        TargetType::Note => "notes",
        TargetType::Comment => "comments",
    }
}

impl Store {
    /// Liker set of a note or comment, or `None` if it does not exist.
    pub async fn get_likes(&self, target: Target) -> StoreResult<Option<OrderedSet<Id>>> {
        let row: Option<(Vec<i64>,)> = sqlx::query_as(&format!(
            "SELECT likes FROM {} WHERE id = $1",
            likes_table(target.kind)
        ))
        .bind(id_to_db(target.id)?)
        .fetch_optional(self.pool())
        .await?;

        row.map(|(likes,)| {
            likes
                .into_iter()
                .map(id_from_db)
                .collect::<StoreResult<Vec<Id>>>()
                .map(OrderedSet::from_unsorted)
        })
        .transpose()
    }

    async fn add_like(&self, target: Target, member: Id) -> StoreResult<Option<usize>> {
        let count: Option<(i32,)> = sqlx::query_as(&format!(
            r#"
            UPDATE {} SET likes = ARRAY(
                SELECT DISTINCT m FROM unnest(array_append(likes, $2)) AS m ORDER BY m
            )
            WHERE id = $1
            RETURNING cardinality(likes)
            "#,
            likes_table(target.kind)
        ))
        .bind(id_to_db(target.id)?)
        .bind(id_to_db(member)?)
        .fetch_optional(self.pool())
        .await?;

        Ok(count.map(|(c,)| c.max(0) as usize))
    }

    async fn remove_like(&self, target: Target, member: Id) -> StoreResult<Option<usize>> {
        let count: Option<(i32,)> = sqlx::query_as(&format!(
            r#"
            UPDATE {} SET likes = array_remove(likes, $2)
            WHERE id = $1
            RETURNING cardinality(likes)
            "#,
            likes_table(target.kind)
        ))
        .bind(id_to_db(target.id)?)
        .bind(id_to_db(member)?)
        .fetch_optional(self.pool())
        .await?;

        Ok(count.map(|(c,)| c.max(0) as usize))
    }
}

#[async_trait]
impl MembershipStore for Store {
    async fn load_members(&self, target: Target) -> CoreResult<Option<OrderedSet<Id>>> {
        Ok(self.get_likes(target).await?)
    }

    async fn add_member(&self, target: Target, member: Id) -> CoreResult<Option<usize>> {
        Ok(self.add_like(target, member).await?)
    }

    async fn remove_member(&self, target: Target, member: Id) -> CoreResult<Option<usize>> {
        Ok(self.remove_like(target, member).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_likes_table() {
        assert_eq!(likes_table(TargetType::Note), "notes");
        assert_eq!(likes_table(TargetType::Comment), "comments");
    }
}
