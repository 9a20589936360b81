//! Route definitions for the HTTP API.

pub mod accounts;
pub mod comments;
pub mod health;
pub mod likes;
pub mod notes;
pub mod search;

use axum::Router;
use mynotes_core::{Account, Collection, Id, Note, Target, TargetType};
use mynotes_store::StoreError;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(notes::routes())
        .merge(comments::routes())
        .merge(likes::routes())
        .merge(search::routes())
        .with_state(state)
}

// ============================================================================
// Shared Helpers
// ============================================================================

/// Loads the caller's account. Unknown callers are unauthorized.
pub(crate) async fn require_account(state: &AppState, user: Id) -> ApiResult<Account> {
    state.store().get_account(user).await.map_err(|e| match e {
        StoreError::AccountNotFound(id) => ApiError::Unauthorized(format!("Unknown account {}", id)),
        other => ApiError::Store(other),
    })
}

/// Whether `caller` may see `note`: published, or written by the caller.
///
/// Unpublished notes of other authors are reported as missing.
pub(crate) fn check_visible(note: &Note, caller: Option<Id>) -> ApiResult<()> {
    if note.published || caller == Some(note.author) {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("note {}", note.id)))
    }
}

/// Loads a note the caller may read.
pub(crate) async fn visible_note(state: &AppState, id: Id, caller: Option<Id>) -> ApiResult<Note> {
    let note = state.store().get_note(id).await?;
    check_visible(&note, caller)?;
    Ok(note)
}

/// Resolves the note whose discussion `target` belongs to, failing unless the
/// caller may see that note.
pub(crate) async fn discussion_note(
    state: &AppState,
    target: Target,
    caller: Option<Id>,
) -> ApiResult<Id> {
    let note = match target.kind {
        TargetType::Note => target.id,
        TargetType::Comment => state.store().get_comment(target.id).await?.note,
    };
    visible_note(state, note, caller).await?;
    Ok(note)
}

/// Loads a note the caller wrote.
pub(crate) async fn owned_note(state: &AppState, id: Id, caller: Id) -> ApiResult<Note> {
    let note = state.store().get_note(id).await?;
    if note.author == caller {
        Ok(note)
    } else {
        Err(ApiError::Forbidden(format!(
            "Note {} belongs to another account",
            id
        )))
    }
}

/// Returns released ids to their collection's free list.
///
/// Release failures are logged, not returned: the rows are already gone, so
/// the worst case is an id that is never reused.
pub(crate) async fn release_ids(state: &AppState, collection: Collection, ids: &[Id]) {
    let allocator = state.allocator(collection);
    for id in ids {
        if let Err(e) = allocator.free(*id).await {
            tracing::warn!(collection = %collection, id = %id, error = %e, "Failed to release id");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use chrono::Utc;
    use mynotes_core::{Likes, School};
    use mynotes_store::{Store, StoreConfig};
    use tower::ServiceExt;

    use crate::config::ServerConfig;

    /// Router over a pool that never connects; only requests rejected before
    /// reaching the database can be exercised.
    fn test_router() -> Router {
        let store = Store::connect_lazy(&StoreConfig::default()).unwrap();
        build_router(AppState::new(store, ServerConfig::default()))
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = test_router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn note_by(author: Id, published: bool) -> Note {
        Note {
            id: Id::new(7),
            author,
            likes: Likes::new(),
            school: School::None,
            year: 0,
            month: 0,
            name: "algebra".to_string(),
            theme: String::new(),
            subject: String::new(),
            content: String::new(),
            published,
            created: Utc::now(),
            comments: Vec::new(),
        }
    }

    #[test]
    fn test_unpublished_note_hidden_from_others() {
        let author = Id::new(1);
        let draft = note_by(author, false);

        assert!(check_visible(&draft, Some(author)).is_ok());
        assert!(matches!(
            check_visible(&draft, Some(Id::new(2))),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            check_visible(&draft, None),
            Err(ApiError::NotFound(_))
        ));

        let published = note_by(author, true);
        assert!(check_visible(&published, Some(Id::new(2))).is_ok());
        assert!(check_visible(&published, None).is_ok());
    }

    #[tokio::test]
    async fn test_health_route() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, json) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_user_header_is_unauthorized() {
        let request = Request::post("/notes")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name": "algebra"}"#))
            .unwrap();
        let (status, json) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_malformed_user_header_is_bad_request() {
        let request = Request::delete("/comments/3")
            .header("x-user-id", "jane")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_like_target_is_bad_request() {
        let request = Request::post("/likes/account/3")
            .header("x-user-id", "1")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_search_for_me_requires_caller() {
        let request = Request::get("/search?author=%21me")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
