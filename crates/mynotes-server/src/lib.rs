//! mynotes-server: HTTP API server for myNotes
//!
//! This crate provides:
//! - REST endpoints for accounts, notes, drafts, comments, likes and search
//! - Identifier allocation for every created entity
//! - Per-account rate limiting of note writes
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - JSON error responses
//!
//! Callers are identified by the `X-User-Id` header, which a fronting layer
//! sets after authenticating the request.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mynotes_server::{AppState, ServerConfig, routes};
//! use mynotes_store::{Store, StoreConfig};
//!
//! let store = Store::connect(StoreConfig::from_env()?).await?;
//! let app = routes::build_router(AppState::new(store, ServerConfig::from_env()?));
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export dependent crates
pub use mynotes_core;
pub use mynotes_store;
