//! mynotes-core: Core types and engines for myNotes
//!
//! This crate provides:
//! - Domain types (accounts, notes, comments, search filters)
//! - `OrderedSet`, the sorted array backing like sets
//! - `IdAllocator`, dense recycling identifier allocation over a `CounterStore`
//! - `MembershipToggle`, like toggling over a `MembershipStore`
//! - `MemoryStore`, an in-process implementation of both store traits

pub mod allocator;
pub mod backend;
pub mod error;
pub mod membership;
pub mod memory;
pub mod ordered;
pub mod types;

pub use allocator::{DEFAULT_MAX_ATTEMPTS, IdAllocator};
pub use backend::{CounterRecord, CounterStore, FreeOutcome, MembershipStore};
pub use error::{BoxError, CoreError, CoreResult, ReleaseRejection};
pub use membership::{LikeState, MembershipToggle};
pub use memory::MemoryStore;
pub use ordered::OrderedSet;
pub use types::{
    Account, AccountConfig, Collection, Comment, Draft, EXACT_LABEL, Id, Likes,
    MAX_PREVIEW_CHARS, MAX_SEARCH_RESULTS, Note, NoteFields, NotePreview, School,
    SearchRequest, Target, TargetType, TargetTypeParseError, TextFilter,
};
