//! Comment routes.
//!
//! - POST /comments - Comment on a note or reply to a comment
//! - DELETE /comments/{id} - Delete one's own comment and its replies

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
};
use serde::{Deserialize, Serialize};

use mynotes_core::{Collection, Comment, Id, Target};
use mynotes_store::NewComment;

use crate::error::{ApiError, ApiResult};
use crate::extract::UserIdentity;
use crate::routes::{discussion_note, release_ids, require_account};
use crate::state::AppState;

/// Longest accepted comment, in characters.
const MAX_COMMENT_CHARS: usize = 4000;

/// Request body for POST /comments.
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub target: Target,
    pub content: String,
}

/// Response for DELETE /comments/{id}.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteCommentResponse {
    /// Every deleted comment ID, replies included.
    pub deleted: Vec<Id>,
}

fn validate_content(content: &str) -> ApiResult<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest("Comment must not be empty".to_string()));
    }
    if content.chars().count() > MAX_COMMENT_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Comment must be at most {} characters",
            MAX_COMMENT_CHARS
        )));
    }
    Ok(content.to_string())
}

/// POST /comments - Comment on a note or reply to a comment.
///
/// # Response
///
/// - 201 Created: the new comment
/// - 400 Bad Request: empty or oversized content
/// - 401 Unauthorized: unknown caller
/// - 404 Not Found: target missing or not visible
async fn create_comment(
    State(state): State<AppState>,
    UserIdentity(user): UserIdentity,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let content = validate_content(&request.content)?;
    require_account(&state, user).await?;
    let note = discussion_note(&state, request.target, Some(user)).await?;

    let id = state.allocator(Collection::Comments).allocate().await?;
    let new_comment = NewComment {
        id,
        author: user,
        note,
        target: request.target,
        content,
    };
    let comment = match state.store().insert_comment(&new_comment).await {
        Ok(comment) => comment,
        Err(e) => {
            release_ids(&state, Collection::Comments, &[id]).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        comment_id = %comment.id,
        target = %comment.target,
        author = %user,
        "Comment created"
    );

    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /comments/{id} - Delete one's own comment with its replies.
///
/// # Response
///
/// - 200 OK: `{ "deleted": [...] }`
/// - 403 Forbidden: not the author
/// - 404 Not Found: no such comment
async fn delete_comment(
    State(state): State<AppState>,
    UserIdentity(user): UserIdentity,
    Path(id): Path<Id>,
) -> ApiResult<Json<DeleteCommentResponse>> {
    let comment = state.store().get_comment(id).await?;
    if comment.author != user {
        return Err(ApiError::Forbidden(format!(
            "Comment {} belongs to another account",
            id
        )));
    }

    let deleted = state.store().delete_comment(id).await?;
    release_ids(&state, Collection::Comments, &deleted).await;

    tracing::info!(comment_id = %id, deleted = deleted.len(), "Comment deleted");

    Ok(Json(DeleteCommentResponse { deleted }))
}

/// Build comment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/comments", post(create_comment))
        .route("/comments/{id}", delete(delete_comment))
}
