//! Error types for the allocation and membership engines.

use std::fmt;

use thiserror::Error;

use crate::types::Id;

/// Boxed error raised by a storage backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for engine operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Reason a store refused to return an ID to a free list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseRejection {
    /// The ID is already on the free list.
    AlreadyFree,
    /// The ID was never handed out by the counter.
    NeverAllocated,
    /// The ID is the [`Id::NONE`] sentinel.
    Sentinel,
}

impl fmt::Display for ReleaseRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlreadyFree => "already free",
            Self::NeverAllocated => "never allocated",
            Self::Sentinel => "sentinel id",
        })
    }
}

/// Errors raised by the identifier allocator and membership toggle.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Counter or target document does not exist.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// The storage backend failed.
    #[error("store error: {0}")]
    Store(#[source] BoxError),

    /// Allocation lost every compare-and-swap race it attempted.
    #[error("counter {key} still contended after {attempts} attempts")]
    Contention { key: String, attempts: u32 },

    /// Every identifier below the sentinel has been handed out.
    #[error("counter {key} has no identifiers left")]
    Exhausted { key: String },

    /// Release refused by the store.
    #[error("cannot release id {id} on counter {key}: {reason}")]
    InvalidRelease {
        key: String,
        id: Id,
        reason: ReleaseRejection,
    },
}

impl CoreError {
    /// Wraps a backend error.
    pub fn store(err: impl Into<BoxError>) -> Self {
        Self::Store(err.into())
    }

    pub fn not_found(kind: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
