//! Caller identity extraction from the X-User-Id header.
//!
//! Authentication happens in front of this service; whatever authenticated
//! the request forwards the account ID in `X-User-Id`.

use axum::{extract::FromRequestParts, http::request::Parts};
use mynotes_core::Id;

use crate::error::ApiError;

/// Header carrying the caller's account ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The calling account. Rejects requests without a valid `X-User-Id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserIdentity(pub Id);

/// The calling account, if the request names one.
///
/// A present but malformed header is still rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybeUser(pub Option<Id>);

impl<S: Send + Sync> FromRequestParts<S> for UserIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parse_user_header(parts)? {
            Some(id) => Ok(Self(id)),
            None => Err(ApiError::Unauthorized(
                "Missing X-User-Id header".to_string(),
            )),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_user_header(parts).map(Self)
    }
}

fn parse_user_header(parts: &Parts) -> Result<Option<Id>, ApiError> {
    let Some(header_value) = parts.headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };

    let raw = header_value.to_str().map_err(|_| {
        ApiError::BadRequest("X-User-Id header contains invalid characters".to_string())
    })?;

    let id: Id = raw
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid X-User-Id {:?}: {}", raw, e)))?;

    if id.is_none() {
        return Err(ApiError::BadRequest(
            "X-User-Id names the reserved id".to_string(),
        ));
    }

    tracing::debug!(user_id = %id, "Resolved caller identity");
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_identity_from_header() {
        let mut parts = parts_with(Some("42"));
        let identity = UserIdentity::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity, UserIdentity(Id::new(42)));
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let mut parts = parts_with(None);
        let err = UserIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let maybe = MaybeUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(maybe, MaybeUser(None));
    }

    #[tokio::test]
    async fn test_malformed_header_is_bad_request() {
        for bad in ["abc", "-1", "18446744073709551615"] {
            let mut parts = parts_with(Some(bad));
            let err = MaybeUser::from_request_parts(&mut parts, &())
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)), "{bad}");
        }
    }
}
