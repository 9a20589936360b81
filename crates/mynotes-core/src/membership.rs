//! Like toggling on notes and comments.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::MembershipStore;
use crate::error::{CoreError, CoreResult};
use crate::types::{Id, Target};

/// A user's like status on a target together with the target's like count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
    pub count: usize,
}

/// Flips membership of users in per-document liker sets.
///
/// The decision to add or remove is made against a fresh read; the write is
/// keyed by the user ID so a concurrent toggle by another user on the same
/// document is never overwritten. The returned count is whatever the store
/// reports after the write.
#[derive(Debug, Clone)]
pub struct MembershipToggle<S> {
    store: S,
}

impl<S: MembershipStore> MembershipToggle<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Likes `target` for `user` if they have not yet, otherwise unlikes it.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotFound`] if the target document does not exist.
    pub async fn toggle(&self, target: Target, user: Id) -> CoreResult<LikeState> {
        let members = self
            .store
            .load_members(target)
            .await?
            .ok_or_else(|| target_not_found(target))?;

        let state = match members.bi_search(&user) {
            Ok(_) => self
                .store
                .remove_member(target, user)
                .await?
                .map(|count| LikeState {
                    liked: false,
                    count,
                }),
            Err(_) => self
                .store
                .add_member(target, user)
                .await?
                .map(|count| LikeState { liked: true, count }),
        }
        .ok_or_else(|| target_not_found(target))?;

        debug!(target = %target, user = %user, liked = state.liked, count = state.count, "Toggled like");
        Ok(state)
    }

    /// Reports whether `user` likes `target` without changing anything.
    pub async fn status(&self, target: Target, user: Id) -> CoreResult<LikeState> {
        let members = self
            .store
            .load_members(target)
            .await?
            .ok_or_else(|| target_not_found(target))?;

        Ok(LikeState {
            liked: members.contains(&user),
            count: members.len(),
        })
    }
}

fn target_not_found(target: Target) -> CoreError {
    CoreError::not_found(target.kind.as_str(), target.id)
}
