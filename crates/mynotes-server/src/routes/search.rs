//! Note search.
//!
//! - GET /search - Search published notes
//!
//! Text filters match by prefix; a leading `!` asks for an exact match.
//! `author=!me` selects the caller's own notes, drafts included.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use mynotes_core::{EXACT_LABEL, Id, NotePreview, School, SearchRequest, TextFilter};

use crate::error::{ApiError, ApiResult};
use crate::extract::MaybeUser;
use crate::state::AppState;

/// Author term standing for the caller.
const ME: &str = "me";

/// Raw query parameters for GET /search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub author: Option<String>,
    pub name: Option<String>,
    pub theme: Option<String>,
    pub subject: Option<String>,
    pub school: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
}

/// Response for GET /search.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<NotePreview>,
}

fn text_filter(raw: Option<&str>) -> Option<TextFilter> {
    raw.and_then(TextFilter::parse)
}

fn is_me(raw: &str) -> bool {
    raw.trim()
        .strip_prefix(EXACT_LABEL)
        .is_some_and(|term| term == ME)
}

/// Turns query parameters into a search request for `caller`.
///
/// Unparsable years and months are ignored rather than rejected.
pub(crate) fn build_search_request(
    params: &SearchParams,
    caller: Option<Id>,
) -> ApiResult<SearchRequest> {
    let mut request = SearchRequest {
        name: text_filter(params.name.as_deref()),
        theme: text_filter(params.theme.as_deref()),
        subject: text_filter(params.subject.as_deref()),
        school: params
            .school
            .as_deref()
            .map(School::from_name)
            .filter(|school| *school != School::None),
        year: params.year.as_deref().and_then(|y| y.trim().parse().ok()),
        month: params.month.as_deref().and_then(|m| m.trim().parse().ok()),
        published_only: true,
        ..SearchRequest::default()
    };

    match params.author.as_deref() {
        Some(author) if is_me(author) => {
            let me = caller.ok_or_else(|| {
                ApiError::Unauthorized("author=!me requires an X-User-Id header".to_string())
            })?;
            request.author_id = Some(me);
            request.published_only = false;
        }
        other => request.author = text_filter(other),
    }

    Ok(request)
}

/// GET /search - Search notes.
///
/// # Query Parameters
///
/// - `author`, `name`, `theme`, `subject`: text filters
/// - `school`: `elementary-middle`, `high` or `university`
/// - `year`, `month`: exact integers
///
/// # Response
///
/// - 200 OK: `{ "results": [...] }`, at most 50 previews ordered by ID
/// - 401 Unauthorized: `author=!me` without a caller
async fn search(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let request = build_search_request(&params, caller)?;
    let results = state.store().search_notes(&request).await?;

    tracing::debug!(results = results.len(), "Search completed");

    Ok(Json(SearchResponse { results }))
}

/// Build search routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/search", get(search))
}
