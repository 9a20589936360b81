//! Note routes.
//!
//! - POST /notes - Create a note
//! - GET /notes/{id} - Read a note
//! - PUT /notes/{id} - Save a note
//! - DELETE /notes/{id} - Delete a note and its discussion
//! - GET /notes/{id}/draft - Note metadata for the editor
//! - PUT /notes/{id}/published - Publish or unpublish
//! - GET /notes/{id}/comments - Comments on a note
//!
//! Creating and saving notes are rate limited per account.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use mynotes_core::{Collection, Comment, Draft, Id, Note, NoteFields};

use crate::error::{ApiError, ApiResult};
use crate::extract::{MaybeUser, UserIdentity};
use crate::routes::{owned_note, release_ids, require_account, visible_note};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for PUT /notes/{id}/published.
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub published: bool,
}

/// Response for DELETE /notes/{id}.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteNoteResponse {
    /// ID of the deleted note.
    pub id: Id,
    /// IDs of the comments deleted with it.
    pub comments_deleted: Vec<Id>,
}

/// Response for GET /notes/{id}/comments.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentsResponse {
    pub comments: Vec<Comment>,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn validate_fields(mut fields: NoteFields) -> ApiResult<NoteFields> {
    fields.name = fields.name.trim().to_string();
    if fields.name.is_empty() {
        return Err(ApiError::BadRequest("Note name must not be empty".to_string()));
    }
    if !(0..=12).contains(&fields.month) {
        return Err(ApiError::BadRequest(format!(
            "Month must be between 0 and 12, got {}",
            fields.month
        )));
    }
    if fields.year < 0 {
        return Err(ApiError::BadRequest(format!(
            "Year must not be negative, got {}",
            fields.year
        )));
    }
    Ok(fields)
}

/// Claims the caller's next rate-limited action slot.
async fn claim_action(state: &AppState, user: Id) -> ApiResult<()> {
    let spacing = state.config().action_spacing;
    let spacing = chrono::Duration::from_std(spacing)
        .map_err(|e| ApiError::Internal(format!("Invalid action spacing: {}", e)))?;

    if state.store().claim_action(user, Utc::now(), spacing).await? {
        Ok(())
    } else {
        tracing::debug!(account_id = %user, "Action rejected by rate limit");
        Err(ApiError::TooManyRequests(format!(
            "Wait {} seconds between note saves",
            spacing.num_seconds()
        )))
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /notes - Create a note owned by the caller.
///
/// # Response
///
/// - 201 Created: the new note (unpublished)
/// - 400 Bad Request: invalid fields
/// - 401 Unauthorized: unknown caller
/// - 429 Too Many Requests: saved too recently
async fn create_note(
    State(state): State<AppState>,
    UserIdentity(user): UserIdentity,
    Json(fields): Json<NoteFields>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    let fields = validate_fields(fields)?;
    require_account(&state, user).await?;
    claim_action(&state, user).await?;

    let id = state.allocator(Collection::Notes).allocate().await?;
    let note = match state.store().insert_note(id, user, &fields).await {
        Ok(note) => note,
        Err(e) => {
            release_ids(&state, Collection::Notes, &[id]).await;
            return Err(e.into());
        }
    };

    tracing::info!(note_id = %note.id, author = %user, "Note created");

    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /notes/{id} - Read a note.
///
/// # Response
///
/// - 200 OK: the note
/// - 404 Not Found: missing, or unpublished and not the caller's
async fn get_note(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<Note>> {
    Ok(Json(visible_note(&state, id, caller).await?))
}

/// PUT /notes/{id} - Save a note's metadata and content.
///
/// # Response
///
/// - 200 OK: the saved note
/// - 403 Forbidden: not the author
/// - 404 Not Found: no such note
/// - 429 Too Many Requests: saved too recently
async fn save_note(
    State(state): State<AppState>,
    UserIdentity(user): UserIdentity,
    Path(id): Path<Id>,
    Json(fields): Json<NoteFields>,
) -> ApiResult<Json<Note>> {
    let fields = validate_fields(fields)?;
    owned_note(&state, id, user).await?;
    claim_action(&state, user).await?;

    let note = state.store().update_note(id, &fields).await?;

    tracing::info!(note_id = %id, author = %user, "Note saved");

    Ok(Json(note))
}

/// DELETE /notes/{id} - Delete a note with all its comments.
///
/// Releases the note ID and every deleted comment ID.
///
/// # Response
///
/// - 200 OK: `{ "id": ..., "comments_deleted": [...] }`
/// - 403 Forbidden: not the author
/// - 404 Not Found: no such note
async fn delete_note(
    State(state): State<AppState>,
    UserIdentity(user): UserIdentity,
    Path(id): Path<Id>,
) -> ApiResult<Json<DeleteNoteResponse>> {
    owned_note(&state, id, user).await?;

    let comments_deleted = state.store().delete_note(id).await?;
    release_ids(&state, Collection::Notes, &[id]).await;
    release_ids(&state, Collection::Comments, &comments_deleted).await;

    tracing::info!(
        note_id = %id,
        comments = comments_deleted.len(),
        "Note deleted"
    );

    Ok(Json(DeleteNoteResponse {
        id,
        comments_deleted,
    }))
}

/// GET /notes/{id}/draft - Note metadata for the editor.
///
/// # Response
///
/// - 200 OK: the draft
/// - 403 Forbidden: not the author
/// - 404 Not Found: no such note
async fn get_draft(
    State(state): State<AppState>,
    UserIdentity(user): UserIdentity,
    Path(id): Path<Id>,
) -> ApiResult<Json<Draft>> {
    let note = owned_note(&state, id, user).await?;
    Ok(Json(note.draft()))
}

/// PUT /notes/{id}/published - Publish or unpublish a note.
///
/// # Response
///
/// - 200 OK: the updated draft
/// - 403 Forbidden: not the author
/// - 404 Not Found: no such note
async fn set_published(
    State(state): State<AppState>,
    UserIdentity(user): UserIdentity,
    Path(id): Path<Id>,
    Json(request): Json<PublishRequest>,
) -> ApiResult<Json<Draft>> {
    owned_note(&state, id, user).await?;
    let note = state.store().set_published(id, request.published).await?;

    tracing::info!(note_id = %id, published = request.published, "Note visibility changed");

    Ok(Json(note.draft()))
}

/// GET /notes/{id}/comments - Every comment in a note's discussion.
///
/// # Response
///
/// - 200 OK: `{ "comments": [...] }`
/// - 404 Not Found: missing, or unpublished and not the caller's
async fn list_comments(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<CommentsResponse>> {
    visible_note(&state, id, caller).await?;
    let comments = state.store().comments_for_note(id).await?;
    Ok(Json(CommentsResponse { comments }))
}

/// Build note routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notes", post(create_note))
        .route(
            "/notes/{id}",
            get(get_note).put(save_note).delete(delete_note),
        )
        .route("/notes/{id}/draft", get(get_draft))
        .route("/notes/{id}/published", put(set_published))
        .route("/notes/{id}/comments", get(list_comments))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mynotes_core::School;

    fn fields(name: &str, month: i32) -> NoteFields {
        NoteFields {
            name: name.to_string(),
            month,
            ..NoteFields::default()
        }
    }

    #[test]
    fn test_validate_fields_trims_name() {
        let valid = validate_fields(fields("  algebra  ", 3)).unwrap();
        assert_eq!(valid.name, "algebra");
    }

    #[test]
    fn test_validate_fields_rejects_bad_input() {
        assert!(validate_fields(fields("", 1)).is_err());
        assert!(validate_fields(fields("algebra", 13)).is_err());
        assert!(validate_fields(fields("algebra", -1)).is_err());
        let mut negative_year = fields("algebra", 1);
        negative_year.year = -2;
        assert!(validate_fields(negative_year).is_err());
    }

    #[test]
    fn test_note_fields_deserialize_with_defaults() {
        let json = r#"{"name": "algebra", "school": "high", "year": 2}"#;
        let fields: NoteFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.school, School::High);
        assert_eq!(fields.year, 2);
        assert_eq!(fields.month, 0);
        assert!(fields.content.is_empty());
    }

    #[test]
    fn test_delete_response_serialize() {
        let response = DeleteNoteResponse {
            id: Id::new(3),
            comments_deleted: vec![Id::new(1), Id::new(4)],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["comments_deleted"], serde_json::json!([1, 4]));
    }
}
