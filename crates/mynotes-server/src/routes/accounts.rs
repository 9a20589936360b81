//! Account routes.
//!
//! - POST /accounts - Register an account
//! - GET /accounts/{id} - Public account view
//! - PUT /accounts/me/config - Change the caller's name and colors
//! - GET /accounts/{id}/notes - Notes written by an account

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};

use mynotes_core::{Account, AccountConfig, Collection, Id, NotePreview, SearchRequest};
use mynotes_store::NewAccount;

use crate::error::{ApiError, ApiResult};
use crate::extract::{MaybeUser, UserIdentity};
use crate::routes::{release_ids, require_account};
use crate::state::AppState;

/// Longest accepted account name, in characters.
const MAX_NAME_CHARS: usize = 64;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /accounts.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
}

/// Request body for PUT /accounts/me/config.
#[derive(Debug, Deserialize)]
pub struct ConfigureRequest {
    /// New account name.
    #[serde(default)]
    pub name: Option<String>,
    /// Space separated hex colors, `#` optional.
    #[serde(default)]
    pub colors: Option<String>,
}

/// Response for GET /accounts/{id}/notes.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountNotesResponse {
    pub notes: Vec<NotePreview>,
}

// ============================================================================
// Validation
// ============================================================================

fn validate_name(name: &str) -> ApiResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Name must be at most {} characters",
            MAX_NAME_CHARS
        )));
    }
    if name.starts_with(mynotes_core::EXACT_LABEL) {
        return Err(ApiError::BadRequest(format!(
            "Name must not start with {:?}",
            mynotes_core::EXACT_LABEL
        )));
    }
    Ok(name.to_string())
}

fn validate_email(email: &str) -> ApiResult<String> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(email.to_lowercase())
        }
        _ => Err(ApiError::BadRequest(format!("Invalid e-mail {:?}", email))),
    }
}

fn validate_colors(raw: &str) -> ApiResult<AccountConfig> {
    let config = AccountConfig::from_color_list(raw);
    for color in &config.colors {
        let hex = &color[1..];
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ApiError::BadRequest(format!("Invalid color {:?}", color)));
        }
    }
    Ok(config)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /accounts - Register an account.
///
/// # Response
///
/// - 201 Created: the new account
/// - 400 Bad Request: invalid name or e-mail
/// - 409 Conflict: name or e-mail already taken
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    let name = validate_name(&request.name)?;
    let email = validate_email(&request.email)?;

    let id = state.allocator(Collection::Accounts).allocate().await?;
    let account = match state
        .store()
        .insert_account(&NewAccount { id, name, email })
        .await
    {
        Ok(account) => account,
        Err(e) => {
            release_ids(&state, Collection::Accounts, &[id]).await;
            return Err(e.into());
        }
    };

    tracing::info!(account_id = %account.id, name = %account.name, "Account registered");

    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /accounts/{id} - Get an account.
///
/// The e-mail is only shown to the account itself.
///
/// # Response
///
/// - 200 OK: the account
/// - 404 Not Found: no such account
async fn get_account(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<Account>> {
    let account = state.store().get_account(id).await?;
    if caller == Some(id) {
        Ok(Json(account))
    } else {
        Ok(Json(account.censored()))
    }
}

/// PUT /accounts/me/config - Change the caller's name and/or colors.
///
/// # Response
///
/// - 200 OK: the updated account
/// - 400 Bad Request: invalid name or colors
/// - 409 Conflict: name already taken
async fn configure(
    State(state): State<AppState>,
    UserIdentity(user): UserIdentity,
    Json(request): Json<ConfigureRequest>,
) -> ApiResult<Json<Account>> {
    require_account(&state, user).await?;

    let name = request.name.as_deref().map(validate_name).transpose()?;
    let config = request.colors.as_deref().map(validate_colors).transpose()?;

    let account = state
        .store()
        .update_account_config(
            user,
            name.as_deref(),
            config.as_ref().map(|c| c.colors.as_slice()),
        )
        .await?;

    tracing::info!(account_id = %user, "Account configuration updated");

    Ok(Json(account))
}

/// GET /accounts/{id}/notes - Notes written by an account.
///
/// Unpublished notes are only listed for their author.
///
/// # Response
///
/// - 200 OK: `{ "notes": [...] }`
/// - 404 Not Found: no such account
async fn account_notes(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<AccountNotesResponse>> {
    state.store().get_account(id).await?;

    let request = SearchRequest {
        author_id: Some(id),
        published_only: caller != Some(id),
        ..SearchRequest::default()
    };
    let notes = state.store().search_notes(&request).await?;

    Ok(Json(AccountNotesResponse { notes }))
}

/// Build account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(register))
        .route("/accounts/me/config", put(configure))
        .route("/accounts/{id}", get(get_account))
        .route("/accounts/{id}/notes", get(account_notes))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  jane ").unwrap(), "jane");
        assert!(validate_name("   ").is_err());
        assert!(validate_name("!me").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_CHARS + 1)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email("Jane@Example.com").unwrap(),
            "jane@example.com"
        );
        assert!(validate_email("jane").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("jane@localhost").is_err());
    }

    #[test]
    fn test_validate_colors() {
        let config = validate_colors("ff0000 #00FF00").unwrap();
        assert_eq!(config.colors, vec!["#ff0000", "#00FF00"]);
        assert!(validate_colors("red").is_err());
        assert!(validate_colors("#12345").is_err());
        assert!(validate_colors("").unwrap().colors.is_empty());
    }

    #[test]
    fn test_register_request_deserialize() {
        let json = r#"{"name": "jane", "email": "jane@example.com"}"#;
        let request: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.name, "jane");
    }

    #[test]
    fn test_configure_request_fields_optional() {
        let request: ConfigureRequest = serde_json::from_str("{}").unwrap();
        assert!(request.name.is_none());
        assert!(request.colors.is_none());
    }
}
