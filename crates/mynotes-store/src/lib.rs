//! mynotes-store: PostgreSQL storage for myNotes
//!
//! This crate provides:
//! - PostgreSQL tables for accounts, notes, comments and id counters
//! - `CounterStore` and `MembershipStore` implementations for the core engines
//! - Note search query building
//! - Migration management
//!
//! # Usage
//!
//! ```rust,ignore
//! use mynotes_core::{Collection, IdAllocator};
//! use mynotes_store::{Store, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let store = Store::connect(config).await?;
//!
//! let notes = IdAllocator::new(store.clone(), Collection::Notes.counter_key());
//! let id = notes.allocate().await?;
//! ```

pub mod counter;
pub mod error;
pub mod membership;
pub mod models;
pub mod schema;
pub mod search;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use models::{NewAccount, NewComment};
pub use search::{SearchBind, build_search_sql};
pub use store::{Store, StoreConfig};

// Re-export mynotes-core for downstream crates
pub use mynotes_core;
