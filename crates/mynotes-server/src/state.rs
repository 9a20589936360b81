//! Application state shared across handlers.

use std::sync::Arc;

use mynotes_core::{Collection, IdAllocator, MembershipToggle};
use mynotes_store::Store;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Database store.
    store: Arc<Store>,
    /// Server configuration.
    config: Arc<ServerConfig>,
    /// Id allocators for accounts, notes and comments.
    allocators: Arc<Allocators>,
    /// Like toggling over note and comment liker sets.
    likes: Arc<MembershipToggle<Store>>,
}

struct Allocators {
    accounts: IdAllocator<Store>,
    notes: IdAllocator<Store>,
    comments: IdAllocator<Store>,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Store, config: ServerConfig) -> Self {
        let allocator = |collection: Collection| {
            IdAllocator::new(store.clone(), collection.counter_key())
                .with_max_attempts(config.allocator_max_attempts)
        };
        let allocators = Allocators {
            accounts: allocator(Collection::Accounts),
            notes: allocator(Collection::Notes),
            comments: allocator(Collection::Comments),
        };

        Self {
            likes: Arc::new(MembershipToggle::new(store.clone())),
            store: Arc::new(store),
            config: Arc::new(config),
            allocators: Arc::new(allocators),
        }
    }

    /// Get a reference to the database store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the id allocator of a collection.
    pub fn allocator(&self, collection: Collection) -> &IdAllocator<Store> {
        match collection {
            Collection::Accounts => &self.allocators.accounts,
            Collection::Notes => &self.allocators.notes,
            Collection::Comments => &self.allocators.comments,
        }
    }

    /// Get a reference to the like toggle.
    pub fn likes(&self) -> &MembershipToggle<Store> {
        &self.likes
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
