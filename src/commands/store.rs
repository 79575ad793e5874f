//! Remote store binding commands, driven through the bootstrap
//! controller the same way a UI would be.

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};

use cookplan_core::{
    Bootstrap, Event, EventBus, FileRemoteFactory, LocalCache, SettingsState, StateStore,
};

use crate::config::Config;
use crate::db::{init_db, SqliteCache};

#[derive(Args)]
pub struct StoreCommand {
    #[command(subcommand)]
    pub command: StoreSubcommand,
}

#[derive(Subcommand)]
pub enum StoreSubcommand {
    /// Show the current remote store binding
    Show,

    /// Bind to an existing remote store
    Set {
        /// Remote store identifier
        id: String,
    },

    /// Create a new remote store and bind to it
    Create,

    /// Remove the binding (and the cached data)
    Unset,
}

impl StoreCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let pool = init_db(config.database_path.clone()).await?;
        let cache = Arc::new(SqliteCache::new(pool));

        match &self.command {
            StoreSubcommand::Show => {
                match cache.read_all().await?.store_id {
                    Some(id) => println!("Bound to remote store: {}", id),
                    None => println!("Not bound to a remote store."),
                }
                Ok(())
            }
            StoreSubcommand::Set { id } => {
                run_bootstrap(
                    config,
                    cache,
                    Event::StoreIdChanged { id: Some(id.clone()) },
                    |s| s.store_id.as_deref() == Some(id.as_str()),
                )
                .await?;
                println!("Bound to remote store: {}", id);
                Ok(())
            }
            StoreSubcommand::Create => {
                let settings = run_bootstrap(config, cache, Event::CreateStore, |s| {
                    s.store_id.is_some()
                })
                .await?;
                let id = settings.store_id.ok_or("store binding missing after create")?;
                println!("Created and bound remote store: {}", id);
                Ok(())
            }
            StoreSubcommand::Unset => {
                run_bootstrap(config, cache, Event::StoreIdChanged { id: None }, |s| {
                    s.store_id.is_none()
                })
                .await?;
                println!("Removed remote store binding.");
                Ok(())
            }
        }
    }
}

/// Spawns the bootstrap controller, publishes one settings intent and
/// waits for the binding to reach the expected state.
async fn run_bootstrap(
    config: &Config,
    cache: Arc<SqliteCache>,
    event: Event,
    reached: impl Fn(&SettingsState) -> bool,
) -> Result<SettingsState, Box<dyn std::error::Error>> {
    let factory = Arc::new(FileRemoteFactory::new(config.store_dir.clone()));
    let states = StateStore::new();
    let bus = EventBus::new();

    let bootstrap = Bootstrap::new(factory, cache, states.clone(), bus.clone());
    let task = tokio::spawn(bootstrap.run());

    let mut errors = bus.subscribe();
    bus.publish(event);

    let mut settings = states.observe_settings();
    let result = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            tokio::select! {
                changed = settings.changed() => {
                    changed.map_err(|_| "bootstrap stopped unexpectedly".to_string())?;
                    let current = settings.borrow_and_update().clone();
                    if reached(&current) {
                        return Ok::<_, String>(current);
                    }
                }
                event = errors.recv() => {
                    if let Ok(Event::Error { message }) = event {
                        return Err(message);
                    }
                }
            }
        }
    })
    .await;

    task.abort();

    match result {
        Ok(Ok(settings)) => Ok(settings),
        Ok(Err(message)) => Err(message.into()),
        Err(_) => Err("timed out waiting for the store binding".into()),
    }
}
