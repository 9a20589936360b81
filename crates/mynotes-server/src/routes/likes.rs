//! Like routes.
//!
//! - GET /likes/{target}/{id} - Like status of the caller
//! - POST /likes/{target}/{id} - Toggle the caller's like
//!
//! `{target}` is `note` or `comment`.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use mynotes_core::{Id, LikeState, Target, TargetType};

use crate::error::{ApiError, ApiResult};
use crate::extract::UserIdentity;
use crate::routes::{discussion_note, require_account};
use crate::state::AppState;

/// Like state of one target for the caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct LikeResponse {
    pub target: Target,
    #[serde(flatten)]
    pub state: LikeState,
}

fn parse_target(kind: &str, id: Id) -> ApiResult<Target> {
    let kind: TargetType = kind
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("{}", e)))?;
    Ok(Target { kind, id })
}

/// GET /likes/{target}/{id} - Whether the caller likes a target.
///
/// # Response
///
/// - 200 OK: `{ "target": {...}, "liked": bool, "count": n }`
/// - 400 Bad Request: unknown target type
/// - 404 Not Found: no such target, or it belongs to another account's
///   unpublished note
async fn like_status(
    State(state): State<AppState>,
    UserIdentity(user): UserIdentity,
    Path((kind, id)): Path<(String, Id)>,
) -> ApiResult<Json<LikeResponse>> {
    let target = parse_target(&kind, id)?;
    discussion_note(&state, target, Some(user)).await?;
    let like = state.likes().status(target, user).await?;
    Ok(Json(LikeResponse {
        target,
        state: like,
    }))
}

/// POST /likes/{target}/{id} - Like a target, or unlike it if already liked.
///
/// # Response
///
/// - 200 OK: `{ "target": {...}, "liked": bool, "count": n }`
/// - 400 Bad Request: unknown target type
/// - 401 Unauthorized: unknown caller
/// - 404 Not Found: no such target, or it belongs to another account's
///   unpublished note
async fn toggle_like(
    State(state): State<AppState>,
    UserIdentity(user): UserIdentity,
    Path((kind, id)): Path<(String, Id)>,
) -> ApiResult<Json<LikeResponse>> {
    let target = parse_target(&kind, id)?;
    require_account(&state, user).await?;
    discussion_note(&state, target, Some(user)).await?;

    let like = state.likes().toggle(target, user).await?;

    tracing::info!(
        target = %target,
        user = %user,
        liked = like.liked,
        count = like.count,
        "Like toggled"
    );

    Ok(Json(LikeResponse {
        target,
        state: like,
    }))
}

/// Build like routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/likes/{target}/{id}", get(like_status).post(toggle_like))
}
