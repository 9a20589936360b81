//! Error types for the storage layer.

use mynotes_core::{CoreError, Id};
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Account not found.
    #[error("account not found: {0}")]
    AccountNotFound(Id),

    /// Note not found.
    #[error("note not found: {0}")]
    NoteNotFound(Id),

    /// Comment not found.
    #[error("comment not found: {0}")]
    CommentNotFound(Id),

    /// Another account already uses this name.
    #[error("account name already taken: {0}")]
    NameTaken(String),

    /// Another account already uses this e-mail.
    #[error("e-mail already registered: {0}")]
    EmailTaken(String),

    /// Value does not fit the signed 64-bit column it is stored in.
    #[error("value out of storable range: {0}")]
    IdOutOfRange(u64),

    /// A row holds data the domain types cannot represent.
    #[error("invalid stored data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    /// Whether this error reports a missing row.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_) | Self::NoteNotFound(_) | Self::CommentNotFound(_)
        )
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AccountNotFound(id) => CoreError::not_found("account", id),
            StoreError::NoteNotFound(id) => CoreError::not_found("note", id),
            StoreError::CommentNotFound(id) => CoreError::not_found("comment", id),
            other => CoreError::store(other),
        }
    }
}

/// Converts an application value to its BIGINT column representation.
pub(crate) fn to_db(value: u64) -> StoreResult<i64> {
    i64::try_from(value).map_err(|_| StoreError::IdOutOfRange(value))
}

/// Converts an [`Id`] to its BIGINT column representation.
pub(crate) fn id_to_db(id: Id) -> StoreResult<i64> {
    to_db(id.get())
}

/// Converts a BIGINT column back to an unsigned value.
pub(crate) fn from_db(value: i64) -> StoreResult<u64> {
    u64::try_from(value).map_err(|_| StoreError::InvalidData(format!("negative value {value}")))
}

pub(crate) fn id_from_db(value: i64) -> StoreResult<Id> {
    from_db(value).map(Id::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_conversion_bounds() {
        assert_eq!(to_db(0).unwrap(), 0);
        assert_eq!(to_db(i64::MAX as u64).unwrap(), i64::MAX);
        assert!(matches!(
            id_to_db(Id::NONE),
            Err(StoreError::IdOutOfRange(u64::MAX))
        ));
        assert_eq!(id_from_db(7).unwrap(), Id::new(7));
        assert!(matches!(id_from_db(-1), Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn test_not_found_maps_to_core_not_found() {
        let core: CoreError = StoreError::NoteNotFound(Id::new(3)).into();
        assert!(core.is_not_found());

        let core: CoreError = StoreError::NameTaken("jane".to_string()).into();
        assert!(matches!(core, CoreError::Store(_)));
    }
}
