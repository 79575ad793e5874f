//! The sync engine.
//!
//! Consumes intents, applies an optimistic in-memory update, persists the
//! change to the remote store and ends every mutation with a full resync:
//! re-read the remote, overwrite the local cache transactionally, publish
//! the result as the new `Success` snapshot. The engine never merges
//! partial updates; the last resync to complete wins.
//!
//! Intents are processed sequentially by [`SyncEngine::run`], so two
//! optimistic updates can never interleave within one engine.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::cache::LocalCache;
use crate::events::{Event, EventBus};
use crate::models::{RecipeDraft, ID_TEMPORARY};
use crate::remote::RemoteStore;
use crate::states::{
    RecipesSnapshot, RecipesState, ScreenState, StateStore, SyncState, Target,
};

use super::plan_shop::{self, PlanShopUpdate};
use super::EngineError;

pub struct SyncEngine {
    remote: Arc<dyn RemoteStore>,
    cache: Arc<dyn LocalCache>,
    states: StateStore,
    bus: EventBus,
    /// Epoch this engine was created under; publishes under a later epoch
    /// are discarded by the state store.
    epoch: u64,
}

impl SyncEngine {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        cache: Arc<dyn LocalCache>,
        states: StateStore,
        bus: EventBus,
    ) -> Self {
        let epoch = states.epoch();
        Self {
            remote,
            cache,
            states,
            bus,
            epoch,
        }
    }

    /// Seeds state from the cache, performs an initial reload and then
    /// processes bus intents one at a time until `shutdown` flips or the
    /// bus closes. A shutdown signal lets the in-flight intent finish.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut events = self.bus.subscribe();
        self.load_from_cache().await;
        self.handle(Event::Reload).await;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                event = events.recv() => match event {
                    Ok(event) => {
                        if event.is_recipe_intent() {
                            self.handle(event).await;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "event bus lagged, reloading");
                        self.handle(Event::Reload).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        tracing::debug!(epoch = self.epoch, "sync engine stopped");
    }

    /// Runs one intent inside the sync guard: mark syncing, dispatch, and
    /// on failure publish an error event and fall back to the last good
    /// cache-backed snapshot.
    pub async fn handle(&self, event: Event) {
        if !event.is_recipe_intent() {
            return;
        }
        self.set_sync(SyncState::Syncing);
        if let Err(e) = self.dispatch(event).await {
            tracing::warn!(error = %e, "intent failed, restoring cached state");
            self.bus.publish(Event::Error {
                message: e.to_string(),
            });
            self.load_from_cache().await;
        }
        self.set_sync(SyncState::NotSyncing);
    }

    async fn dispatch(&self, event: Event) -> Result<(), EngineError> {
        match event {
            Event::Reload => self.resync().await,
            Event::Delete { id } => self.delete_recipe(id).await,
            Event::Add {
                title,
                url,
                tags,
                target,
            } => self.add_recipe(title, url, tags, target).await,
            Event::Update {
                id,
                title,
                url,
                tags,
            } => self.update_recipe(id, title, url, tags).await,
            Event::AddToPlan { id } => {
                self.update_plan_and_shop(
                    PlanShopUpdate {
                        add_to_plan: Some(id),
                        remove_from_shop: Some(id),
                        ..Default::default()
                    },
                    true,
                )
                .await
            }
            Event::AddToShop { id } => {
                self.update_plan_and_shop(
                    PlanShopUpdate {
                        add_to_shop: Some(id),
                        ..Default::default()
                    },
                    true,
                )
                .await
            }
            Event::RemoveFromPlan {
                id,
                increment_counter,
            } => {
                self.update_plan_and_shop(
                    PlanShopUpdate {
                        remove_from_plan: Some(id),
                        increment_counter,
                        ..Default::default()
                    },
                    true,
                )
                .await
            }
            Event::RemoveFromShop { id } => {
                self.update_plan_and_shop(
                    PlanShopUpdate {
                        remove_from_shop: Some(id),
                        ..Default::default()
                    },
                    true,
                )
                .await
            }
            _ => Ok(()),
        }
    }

    /// Full reconciliation: concurrently read recipes and plan/shop from
    /// the remote, overwrite the cache, publish the snapshot.
    async fn resync(&self) -> Result<(), EngineError> {
        let (recipes, (plan, shop)) =
            futures::try_join!(self.remote.get_recipes(), self.remote.get_plan_and_shop())?;

        self.cache.replace_all(&recipes, &plan, &shop).await?;

        tracing::debug!(
            recipes = recipes.len(),
            plan = plan.len(),
            shop = shop.len(),
            "resynced from remote store"
        );
        self.publish(RecipesSnapshot::new(recipes, plan, shop));
        Ok(())
    }

    /// Soft-deletes the row and drops its plan/shop memberships in the
    /// same intent, so the resynced snapshot never carries a dangling id.
    async fn delete_recipe(&self, id: i64) -> Result<(), EngineError> {
        let update = PlanShopUpdate {
            remove_from_plan: Some(id),
            remove_from_shop: Some(id),
            ..Default::default()
        };

        if let RecipesState::Success(s) = self.states.recipes() {
            let recipes = s.recipes.into_iter().filter(|r| r.id != id).collect();
            let (plan, shop) = plan_shop::apply(&s.plan, &s.shop, &update);
            self.publish(RecipesSnapshot::new(recipes, plan, shop));
        }

        self.remote.delete(id).await?;
        self.update_plan_and_shop(update, false).await
    }

    async fn add_recipe(
        &self,
        title: String,
        url: Option<String>,
        tags: std::collections::BTreeSet<String>,
        target: Target,
    ) -> Result<(), EngineError> {
        let draft = RecipeDraft::new(title, url, tags)?;
        self.states.set_screen(target.into());

        if let RecipesState::Success(s) = self.states.recipes() {
            let mut recipes = s.recipes;
            recipes.push(draft.with_id(ID_TEMPORARY, 0));
            let mut plan = s.plan;
            let mut shop = s.shop;
            match target {
                Target::Plan => plan.push(ID_TEMPORARY),
                Target::Shop => shop.push(ID_TEMPORARY),
                Target::Recipes => {}
            }
            self.publish(RecipesSnapshot::new(recipes, plan, shop));
        }

        let id = self.remote.get_new_id().await?;
        self.remote
            .update_recipe(id, &draft.title, draft.url.as_deref(), &draft.tags)
            .await?;

        // The optimistic publish above already reflected the membership
        // change, so the plan/shop write runs non-optimistically.
        match target {
            Target::Plan => {
                self.update_plan_and_shop(
                    PlanShopUpdate {
                        add_to_plan: Some(id),
                        ..Default::default()
                    },
                    false,
                )
                .await?
            }
            Target::Shop => {
                self.update_plan_and_shop(
                    PlanShopUpdate {
                        add_to_shop: Some(id),
                        ..Default::default()
                    },
                    false,
                )
                .await?
            }
            Target::Recipes => {}
        }

        self.resync().await
    }

    async fn update_recipe(
        &self,
        id: i64,
        title: String,
        url: Option<String>,
        tags: std::collections::BTreeSet<String>,
    ) -> Result<(), EngineError> {
        let draft = RecipeDraft::new(title, url, tags)?;

        let screen = match self.states.screen() {
            ScreenState::Add { target } => target.into(),
            _ => ScreenState::Recipes,
        };
        self.states.set_screen(screen);

        if let RecipesState::Success(s) = self.states.recipes() {
            let recipes = s
                .recipes
                .into_iter()
                .map(|r| if r.id == id { draft.with_id(id, r.counter) } else { r })
                .collect();
            self.publish(RecipesSnapshot::new(recipes, s.plan, s.shop));
        }

        self.remote
            .update_recipe(id, &draft.title, draft.url.as_deref(), &draft.tags)
            .await?;

        self.resync().await
    }

    /// Two-phase membership change: optimistic transform of the in-memory
    /// lists, then the same transform against freshly read remote lists
    /// before the batched write, then resync.
    async fn update_plan_and_shop(
        &self,
        update: PlanShopUpdate,
        optimistic: bool,
    ) -> Result<(), EngineError> {
        if optimistic {
            if let RecipesState::Success(s) = self.states.recipes() {
                let (plan, shop) = plan_shop::apply(&s.plan, &s.shop, &update);
                self.publish(RecipesSnapshot::new(s.recipes, plan, shop));
            }
        }

        let (old_plan, old_shop) = self.remote.get_plan_and_shop().await?;
        let (new_plan, new_shop) = plan_shop::apply(&old_plan, &old_shop, &update);
        self.remote
            .update_plan_and_shop(&new_plan, &new_shop, update.counter_id())
            .await?;

        self.resync().await
    }

    /// Restores the last good snapshot from the local cache. An empty
    /// cache maps back to `Loading`.
    async fn load_from_cache(&self) {
        match self.cache.read_all().await {
            Ok(snapshot) => {
                let state = if snapshot.recipes.is_empty() {
                    RecipesState::Loading
                } else {
                    RecipesState::Success(RecipesSnapshot::new(
                        snapshot.recipes,
                        snapshot.plan,
                        snapshot.shop,
                    ))
                };
                let _ = self.states.set_recipes_for_epoch(self.epoch, state);
            }
            Err(e) => tracing::error!(error = %e, "failed to read local cache"),
        }
    }

    fn publish(&self, snapshot: RecipesSnapshot) {
        if !self
            .states
            .set_recipes_for_epoch(self.epoch, RecipesState::Success(snapshot))
        {
            tracing::debug!(epoch = self.epoch, "discarding snapshot from superseded engine");
        }
    }

    fn set_sync(&self, state: SyncState) {
        let _ = self.states.set_sync_for_epoch(self.epoch, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheSnapshot, LocalCache, MemoryCache};
    use crate::models::Recipe;
    use crate::remote::{MemoryRemote, RemoteStore};
    use std::collections::BTreeSet;
    use std::time::Duration;

    struct Fixture {
        remote: Arc<MemoryRemote>,
        cache: Arc<MemoryCache>,
        states: StateStore,
        bus: EventBus,
        engine: Arc<SyncEngine>,
    }

    fn fixture() -> Fixture {
        let remote = Arc::new(MemoryRemote::new());
        let cache = Arc::new(MemoryCache::new());
        let states = StateStore::new();
        let bus = EventBus::new();
        let engine = Arc::new(SyncEngine::new(
            remote.clone(),
            cache.clone(),
            states.clone(),
            bus.clone(),
        ));
        Fixture {
            remote,
            cache,
            states,
            bus,
            engine,
        }
    }

    fn tags(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    async fn seed_remote(remote: &MemoryRemote, titles: &[&str]) {
        for (i, title) in titles.iter().enumerate() {
            remote
                .update_recipe(i as i64 + 1, title, None, &BTreeSet::new())
                .await
                .unwrap();
        }
    }

    fn success(states: &StateStore) -> RecipesSnapshot {
        match states.recipes() {
            RecipesState::Success(s) => s,
            RecipesState::Loading => panic!("expected Success state"),
        }
    }

    fn assert_no_orphans(snapshot: &RecipesSnapshot) {
        let by_id = snapshot.by_id();
        for id in snapshot.plan.iter().chain(&snapshot.shop) {
            if *id != ID_TEMPORARY {
                assert!(by_id.contains_key(id), "orphan membership for id {}", id);
            }
        }
    }

    #[tokio::test]
    async fn test_resync_is_idempotent() {
        let f = fixture();
        seed_remote(&f.remote, &["One", "Two"]).await;
        f.remote.update_plan_and_shop(&[1], &[2], None).await.unwrap();

        f.engine.handle(Event::Reload).await;
        let first = success(&f.states);

        f.engine.handle(Event::Reload).await;
        let second = success(&f.states);

        assert_eq!(first, second);
        assert_eq!(first.plan, vec![1]);
        assert_eq!(first.shop, vec![2]);
        assert_no_orphans(&first);
    }

    #[tokio::test]
    async fn test_resync_materializes_cache() {
        let f = fixture();
        seed_remote(&f.remote, &["One"]).await;
        f.remote.update_plan_and_shop(&[1], &[], None).await.unwrap();

        f.engine.handle(Event::Reload).await;

        let cached = f.cache.read_all().await.unwrap();
        let snapshot = success(&f.states);
        assert_eq!(cached.recipes, snapshot.recipes);
        assert_eq!(cached.plan, snapshot.plan);
        assert_eq!(cached.shop, snapshot.shop);
    }

    #[tokio::test]
    async fn test_add_with_target_plan_goes_through_temporary_id() {
        let f = fixture();
        f.engine.handle(Event::Reload).await;
        assert_eq!(success(&f.states).recipes.len(), 0);

        let gate = f.remote.gate_next_write();
        let engine = f.engine.clone();
        let task = tokio::spawn(async move {
            engine
                .handle(Event::Add {
                    title: "Soup".into(),
                    url: None,
                    tags: BTreeSet::new(),
                    target: Target::Plan,
                })
                .await;
        });

        // Optimistic window: the write is gated, so the published state
        // must carry the temporary id.
        let mut rx = f.states.observe_recipes();
        let optimistic = tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|state| {
                matches!(state, RecipesState::Success(s) if !s.recipes.is_empty())
            }),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();

        let RecipesState::Success(s) = optimistic else {
            unreachable!()
        };
        assert_eq!(s.recipes[0].id, ID_TEMPORARY);
        assert_eq!(s.recipes[0].title, "Soup");
        assert_eq!(s.plan, vec![ID_TEMPORARY]);

        gate.notify_one();
        task.await.unwrap();

        let finished = success(&f.states);
        assert_eq!(finished.recipes.len(), 1);
        assert_eq!(finished.recipes[0].id, 1);
        assert_eq!(finished.plan, vec![1]);
        assert!(finished.shop.is_empty());
        assert_no_orphans(&finished);
        assert_eq!(f.states.screen(), ScreenState::Plan);
    }

    #[tokio::test]
    async fn test_add_with_target_shop() {
        let f = fixture();
        f.engine
            .handle(Event::Add {
                title: "Bread".into(),
                url: Some("https://example.com/bread".into()),
                tags: tags(&["baking"]),
                target: Target::Shop,
            })
            .await;

        let snapshot = success(&f.states);
        assert_eq!(snapshot.recipes[0].id, 1);
        assert_eq!(snapshot.shop, vec![1]);
        assert!(snapshot.plan.is_empty());
        assert_eq!(snapshot.all_tags(), tags(&["baking"]));
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_remaining_row_ids() {
        let f = fixture();
        seed_remote(&f.remote, &["One", "Two", "Three"]).await;
        f.engine.handle(Event::Reload).await;

        f.engine.handle(Event::Delete { id: 2 }).await;

        let ids: Vec<i64> = success(&f.states).recipes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);

        // A later add still gets the next row position after the tombstone.
        f.engine
            .handle(Event::Add {
                title: "Four".into(),
                url: None,
                tags: BTreeSet::new(),
                target: Target::Recipes,
            })
            .await;
        let ids: Vec<i64> = success(&f.states).recipes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[tokio::test]
    async fn test_delete_drops_plan_and_shop_memberships() {
        let f = fixture();
        seed_remote(&f.remote, &["One", "Two"]).await;
        f.remote.update_plan_and_shop(&[1], &[2], None).await.unwrap();
        f.engine.handle(Event::Reload).await;

        f.engine.handle(Event::Delete { id: 1 }).await;

        let snapshot = success(&f.states);
        let ids: Vec<i64> = snapshot.recipes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2]);
        assert!(snapshot.plan.is_empty());
        assert_eq!(snapshot.shop, vec![2]);
        assert_no_orphans(&snapshot);

        // The membership removal is persisted remotely, not only local.
        let (plan, shop) = f.remote.get_plan_and_shop().await.unwrap();
        assert!(plan.is_empty());
        assert_eq!(shop, vec![2]);
    }

    #[tokio::test]
    async fn test_move_shop_to_plan() {
        let f = fixture();
        seed_remote(&f.remote, &["One", "Two", "Three", "Four", "Five"]).await;
        f.remote.update_plan_and_shop(&[], &[5], None).await.unwrap();
        f.engine.handle(Event::Reload).await;

        f.engine.handle(Event::AddToPlan { id: 5 }).await;

        let snapshot = success(&f.states);
        assert_eq!(snapshot.plan, vec![5]);
        assert!(snapshot.shop.is_empty());
    }

    #[tokio::test]
    async fn test_memberships_stay_deduplicated() {
        let f = fixture();
        seed_remote(&f.remote, &["One", "Two"]).await;
        f.engine.handle(Event::Reload).await;

        f.engine.handle(Event::AddToShop { id: 2 }).await;
        f.engine.handle(Event::AddToShop { id: 2 }).await;
        f.engine.handle(Event::AddToPlan { id: 1 }).await;
        f.engine.handle(Event::AddToPlan { id: 1 }).await;

        let snapshot = success(&f.states);
        assert_eq!(snapshot.plan, vec![1]);
        assert_eq!(snapshot.shop, vec![2]);
        assert_no_orphans(&snapshot);
    }

    #[tokio::test]
    async fn test_remove_from_plan_increments_counter_once() {
        let f = fixture();
        seed_remote(&f.remote, &["One"]).await;
        f.remote.update_plan_and_shop(&[1], &[], None).await.unwrap();
        f.engine.handle(Event::Reload).await;

        f.engine
            .handle(Event::RemoveFromPlan {
                id: 1,
                increment_counter: true,
            })
            .await;

        let snapshot = success(&f.states);
        assert!(snapshot.plan.is_empty());
        assert_eq!(snapshot.recipes[0].counter, 1);
    }

    #[tokio::test]
    async fn test_remove_from_plan_without_increment() {
        let f = fixture();
        seed_remote(&f.remote, &["One"]).await;
        f.remote.update_plan_and_shop(&[1], &[], None).await.unwrap();
        f.engine.handle(Event::Reload).await;

        f.engine
            .handle(Event::RemoveFromPlan {
                id: 1,
                increment_counter: false,
            })
            .await;

        let snapshot = success(&f.states);
        assert!(snapshot.plan.is_empty());
        assert_eq!(snapshot.recipes[0].counter, 0);
    }

    #[tokio::test]
    async fn test_update_replaces_in_place_and_keeps_counter() {
        let f = fixture();
        seed_remote(&f.remote, &["One", "Two"]).await;
        f.remote.update_plan_and_shop(&[1], &[], Some(2)).await.unwrap();
        f.engine.handle(Event::Reload).await;

        f.engine
            .handle(Event::Update {
                id: 2,
                title: "Better Two".into(),
                url: Some("https://example.com/two".into()),
                tags: tags(&["slow"]),
            })
            .await;

        let snapshot = success(&f.states);
        let recipe = snapshot.recipe(2).unwrap();
        assert_eq!(recipe.title, "Better Two");
        assert_eq!(recipe.url.as_deref(), Some("https://example.com/two"));
        assert_eq!(recipe.counter, 1);
        assert_eq!(recipe.tags, tags(&["slow"]));
        assert_eq!(snapshot.recipes.len(), 2);
    }

    #[tokio::test]
    async fn test_update_restores_screen_from_add_target() {
        let f = fixture();
        seed_remote(&f.remote, &["One"]).await;
        f.engine.handle(Event::Reload).await;
        f.states.set_screen(ScreenState::Add {
            target: Target::Shop,
        });

        f.engine
            .handle(Event::Update {
                id: 1,
                title: "One".into(),
                url: None,
                tags: BTreeSet::new(),
            })
            .await;

        assert_eq!(f.states.screen(), ScreenState::Shop);
    }

    #[tokio::test]
    async fn test_failed_write_restores_cached_snapshot() {
        let f = fixture();
        seed_remote(&f.remote, &["One"]).await;
        f.engine.handle(Event::Reload).await;
        let before = success(&f.states);

        let mut events = f.bus.subscribe();
        f.remote.set_failing(true);
        f.engine
            .handle(Event::Update {
                id: 1,
                title: "Broken".into(),
                url: None,
                tags: BTreeSet::new(),
            })
            .await;

        assert_eq!(success(&f.states), before);
        assert_eq!(f.states.sync(), SyncState::NotSyncing);

        let mut errors = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, Event::Error { .. }) {
                errors += 1;
            }
        }
        assert_eq!(errors, 1);
    }

    #[tokio::test]
    async fn test_validation_rejected_before_any_write() {
        let f = fixture();
        seed_remote(&f.remote, &["One"]).await;
        f.engine.handle(Event::Reload).await;
        let grid_before = f.remote.grid();

        let mut events = f.bus.subscribe();
        f.engine
            .handle(Event::Add {
                title: "   ".into(),
                url: None,
                tags: BTreeSet::new(),
                target: Target::Recipes,
            })
            .await;

        assert_eq!(f.remote.grid(), grid_before);
        assert!(matches!(events.try_recv(), Ok(Event::Error { .. })));
    }

    #[tokio::test]
    async fn test_empty_cache_falls_back_to_loading() {
        let f = fixture();
        f.remote.set_failing(true);
        f.engine.handle(Event::Reload).await;
        assert_eq!(f.states.recipes(), RecipesState::Loading);
    }

    #[tokio::test]
    async fn test_stale_engine_publish_is_discarded() {
        let f = fixture();
        seed_remote(&f.remote, &["One"]).await;
        f.states.advance_epoch();

        f.engine.handle(Event::Reload).await;

        // The resync still wrote through to the cache, but the snapshot
        // publish was rejected.
        assert_eq!(f.states.recipes(), RecipesState::Loading);
        assert_eq!(f.cache.read_all().await.unwrap().recipes.len(), 1);
    }

    #[tokio::test]
    async fn test_run_loop_processes_bus_intents() {
        let f = fixture();
        seed_remote(&f.remote, &["One"]).await;
        let (stop_tx, stop_rx) = watch::channel(false);
        let engine = Arc::try_unwrap(f.engine).unwrap_or_else(|_| panic!("engine still shared"));
        let task = tokio::spawn(engine.run(stop_rx));

        let mut rx = f.states.observe_recipes();
        tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|s| matches!(s, RecipesState::Success(s) if !s.recipes.is_empty())),
        )
        .await
        .unwrap()
        .unwrap();

        f.bus.publish(Event::AddToPlan { id: 1 });
        tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|s| matches!(s, RecipesState::Success(s) if s.plan == vec![1])),
        )
        .await
        .unwrap()
        .unwrap();

        stop_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_seeds_from_cache_before_first_resync() {
        let remote = Arc::new(MemoryRemote::new());
        remote.set_failing(true);
        let recipe = Recipe {
            id: 1,
            title: "Cached".into(),
            url: None,
            counter: 0,
            tags: BTreeSet::new(),
        };
        let cache = Arc::new(MemoryCache::with_snapshot(CacheSnapshot {
            recipes: vec![recipe],
            plan: vec![1],
            shop: vec![],
            store_id: Some("store".into()),
        }));
        let states = StateStore::new();
        let bus = EventBus::new();
        let engine = SyncEngine::new(remote, cache, states.clone(), bus.clone());

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(engine.run(stop_rx));

        let mut rx = states.observe_recipes();
        let state = tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|s| matches!(s, RecipesState::Success(_))),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();

        let RecipesState::Success(s) = state else { unreachable!() };
        assert_eq!(s.recipes[0].title, "Cached");

        stop_tx.send(true).unwrap();
        task.await.unwrap();
    }
}
