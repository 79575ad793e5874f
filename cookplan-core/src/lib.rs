//! Cookplan core library
//!
//! Local-first synchronization engine for recipes, the cooking plan and
//! the shopping list. Keeps a durable local cache, an in-memory reactive
//! state and a row-oriented remote store consistent through optimistic
//! local mutation followed by full resync.

pub mod bootstrap;
pub mod cache;
pub mod events;
pub mod models;
pub mod remote;
pub mod states;
pub mod sync;

pub use bootstrap::{Bootstrap, DEFAULT_STORE_NAME};
pub use cache::{CacheError, CacheSnapshot, LocalCache, MemoryCache};
pub use events::{Event, EventBus};
pub use models::{Recipe, RecipeDraft, ValidationError, ID_TEMPORARY, SEPARATOR_TAGS};
pub use remote::{
    FileRemote, FileRemoteFactory, MemoryRemote, MemoryRemoteFactory, RemoteError, RemoteStore,
    RemoteStoreFactory, SheetGrid,
};
pub use states::{
    RecipesSnapshot, RecipesState, SavingSettingsState, ScreenState, SettingsState, StateStore,
    SyncState, Target,
};
pub use sync::{EngineError, SyncEngine};
