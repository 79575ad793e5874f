//! Settings/bootstrap controller.
//!
//! Owns the binding between the local cache and a remote store id, and
//! supervises the sync engine: every rebind shuts the running engine down,
//! advances the store epoch so in-flight resyncs of the old engine are
//! discarded on publish, and starts a fresh engine against the new store.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::cache::LocalCache;
use crate::events::{Event, EventBus};
use crate::remote::RemoteStoreFactory;
use crate::states::{SavingSettingsState, ScreenState, SettingsState, StateStore};
use crate::sync::SyncEngine;

/// Title given to stores created through [`Event::CreateStore`].
pub const DEFAULT_STORE_NAME: &str = "Recipes";

pub struct Bootstrap {
    factory: Arc<dyn RemoteStoreFactory>,
    cache: Arc<dyn LocalCache>,
    states: StateStore,
    bus: EventBus,
    /// Subscribed at construction so events published right after spawning
    /// [`Bootstrap::run`] are not lost.
    events: Option<broadcast::Receiver<Event>>,
}

impl Bootstrap {
    pub fn new(
        factory: Arc<dyn RemoteStoreFactory>,
        cache: Arc<dyn LocalCache>,
        states: StateStore,
        bus: EventBus,
    ) -> Self {
        let events = Some(bus.subscribe());
        Self {
            factory,
            cache,
            states,
            bus,
            events,
        }
    }

    /// Seeds the settings state from the cache, then runs the engine
    /// supervisor and the settings-intent loop until the bus closes.
    pub async fn run(mut self) {
        let mut events = self.events.take().unwrap_or_else(|| self.bus.subscribe());
        self.seed_from_cache().await;
        tokio::join!(self.supervise(), self.consume_events(&mut events));
    }

    async fn seed_from_cache(&self) {
        match self.cache.read_all().await {
            Ok(snapshot) => {
                if snapshot.store_id.is_none() {
                    self.states.set_screen(ScreenState::Settings);
                }
                self.states.set_settings(SettingsState {
                    store_id: snapshot.store_id,
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to read settings from local cache");
                self.states.set_screen(ScreenState::Settings);
            }
        }
    }

    /// Restarts the sync engine on every settings change. The previous
    /// engine is signalled to stop after its in-flight intent; its late
    /// publishes are rejected by the advanced epoch.
    async fn supervise(&self) {
        let mut settings = self.states.observe_settings();
        let mut running: Option<(watch::Sender<bool>, JoinHandle<()>)> = None;

        loop {
            let store_id = settings.borrow_and_update().store_id.clone();

            if let Some((stop, _)) = running.take() {
                let _ = stop.send(true);
            }
            self.states.advance_epoch();

            if let Some(id) = store_id.filter(|id| !id.trim().is_empty()) {
                match self.factory.open(&id).await {
                    Ok(remote) => {
                        let engine = SyncEngine::new(
                            remote,
                            Arc::clone(&self.cache),
                            self.states.clone(),
                            self.bus.clone(),
                        );
                        let (stop, stop_rx) = watch::channel(false);
                        let handle = tokio::spawn(engine.run(stop_rx));
                        running = Some((stop, handle));
                        tracing::info!(store_id = %id, "sync engine started");
                    }
                    Err(e) => {
                        tracing::error!(store_id = %id, error = %e, "failed to open remote store");
                        self.bus.publish(Event::Error {
                            message: e.to_string(),
                        });
                        self.states.set_screen(ScreenState::Settings);
                    }
                }
            }

            if settings.changed().await.is_err() {
                break;
            }
        }

        if let Some((stop, _)) = running.take() {
            let _ = stop.send(true);
        }
    }

    async fn consume_events(&self, events: &mut broadcast::Receiver<Event>) {
        loop {
            match events.recv().await {
                Ok(Event::StoreIdChanged { id }) => self.bind(id).await,
                Ok(Event::CreateStore) => self.create_store().await,
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "bootstrap lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Persists a new binding. The cache clears its recipe/plan/shop
    /// content in the same transaction; publishing the settings change
    /// makes the supervisor restart the engine.
    async fn bind(&self, store_id: Option<String>) {
        let store_id = store_id.filter(|id| !id.trim().is_empty());

        if let Err(e) = self.cache.set_store_id(store_id.as_deref()).await {
            tracing::error!(error = %e, "failed to persist store binding");
            self.bus.publish(Event::Error {
                message: e.to_string(),
            });
            return;
        }

        if store_id.is_none() {
            self.states.set_screen(ScreenState::Settings);
        }
        self.states.set_settings(SettingsState { store_id });
    }

    async fn create_store(&self) {
        self.states.set_saving(SavingSettingsState::Saving);
        match self.factory.create_store(DEFAULT_STORE_NAME).await {
            Ok(store_id) => {
                tracing::info!(store_id = %store_id, "created remote store");
                self.bus.publish(Event::Notification {
                    message: format!("Created remote store {}", store_id),
                });
                self.bind(Some(store_id)).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to create remote store");
                self.bus.publish(Event::Error {
                    message: e.to_string(),
                });
            }
        }
        self.states.set_saving(SavingSettingsState::NotSaving);
    }
}
