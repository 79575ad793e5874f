mod config_cmd;
mod plan;
mod recipe;
mod store;
mod sync_cmd;

pub use config_cmd::ConfigCommand;
pub use plan::{PlanCommand, ShopCommand};
pub use recipe::RecipeCommand;
pub use store::StoreCommand;
pub use sync_cmd::SyncCommand;

use std::sync::Arc;

use cookplan_core::{
    Event, EventBus, FileRemoteFactory, LocalCache, RecipesSnapshot, RecipesState,
    RemoteStoreFactory, StateStore, SyncEngine,
};

use crate::config::Config;
use crate::db::{init_db, SqliteCache};

/// Wired-up engine over the configured cache and remote store, driven
/// one intent at a time by the CLI.
pub struct App {
    pub engine: SyncEngine,
    pub states: StateStore,
    pub bus: EventBus,
    pub cache: Arc<SqliteCache>,
}

impl App {
    pub async fn open(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let pool = init_db(config.database_path.clone()).await?;
        let cache = Arc::new(SqliteCache::new(pool));

        let store_id = cache.read_all().await?.store_id.ok_or(
            "no remote store configured; run `cookplan store create` or `cookplan store set <id>`",
        )?;

        tracing::debug!(store_id = %store_id, "opening remote store");
        let factory = FileRemoteFactory::new(config.store_dir.clone());
        let remote = factory.open(&store_id).await?;

        let states = StateStore::new();
        let bus = EventBus::new();
        let engine = SyncEngine::new(remote, cache.clone(), states.clone(), bus.clone());

        Ok(Self {
            engine,
            states,
            bus,
            cache,
        })
    }

    /// Runs one intent to completion and returns the resulting snapshot.
    /// Errors the engine surfaced on the bus become command errors.
    pub async fn dispatch(&self, event: Event) -> Result<RecipesSnapshot, Box<dyn std::error::Error>> {
        let mut events = self.bus.subscribe();
        self.engine.handle(event).await;

        while let Ok(event) = events.try_recv() {
            if let Event::Error { message } = event {
                return Err(message.into());
            }
        }

        match self.states.recipes() {
            RecipesState::Success(snapshot) => Ok(snapshot),
            RecipesState::Loading => Err("no data available yet; run `cookplan sync`".into()),
        }
    }

    /// Resyncs and returns the fresh snapshot.
    pub async fn sync(&self) -> Result<RecipesSnapshot, Box<dyn std::error::Error>> {
        self.dispatch(Event::Reload).await
    }
}
