//! Reactive application states.
//!
//! Each state lives in its own `tokio::sync::watch` channel inside an
//! explicit, injectable [`StateStore`]: readers observe the latest value as
//! a stream, writers replace it atomically. Snapshots are plain values that
//! get wholesale-replaced, never mutated in place.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::models::Recipe;

/// The authoritative recipe/plan/shop snapshot held by a `Success` state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipesSnapshot {
    pub recipes: Vec<Recipe>,
    pub plan: Vec<i64>,
    pub shop: Vec<i64>,
}

impl RecipesSnapshot {
    pub fn new(recipes: Vec<Recipe>, plan: Vec<i64>, shop: Vec<i64>) -> Self {
        Self { recipes, plan, shop }
    }

    /// Recipes indexed by id. Derived from `recipes`, never stored.
    pub fn by_id(&self) -> HashMap<i64, &Recipe> {
        self.recipes.iter().map(|r| (r.id, r)).collect()
    }

    /// Union of all tags across the snapshot, sorted.
    pub fn all_tags(&self) -> BTreeSet<String> {
        self.recipes.iter().flat_map(|r| r.tags.iter().cloned()).collect()
    }

    pub fn recipe(&self, id: i64) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }
}

/// Recipe data as seen by the UI: loading until the first cache read or
/// resync produces a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecipesState {
    #[default]
    Loading,
    Success(RecipesSnapshot),
}

/// Busy flag guarding a reconciliation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    Syncing,
    #[default]
    NotSyncing,
}

impl SyncState {
    pub fn is_syncing(self) -> bool {
        matches!(self, SyncState::Syncing)
    }
}

/// The remote store binding. `None` means not yet configured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsState {
    pub store_id: Option<String>,
}

/// Feedback while a new remote store is being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SavingSettingsState {
    Saving,
    #[default]
    NotSaving,
}

/// Destination of an add intent: which list the new recipe lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Recipes,
    Plan,
    Shop,
}

/// Current navigation target. The engine drives this on add/update and the
/// bootstrap controller sends the user here while unconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenState {
    Recipes,
    #[default]
    Plan,
    Shop,
    Add {
        target: Target,
    },
    Settings,
}

impl From<Target> for ScreenState {
    fn from(target: Target) -> Self {
        match target {
            Target::Recipes => ScreenState::Recipes,
            Target::Plan => ScreenState::Plan,
            Target::Shop => ScreenState::Shop,
        }
    }
}

struct Inner {
    recipes: watch::Sender<RecipesState>,
    sync: watch::Sender<SyncState>,
    settings: watch::Sender<SettingsState>,
    screen: watch::Sender<ScreenState>,
    saving: watch::Sender<SavingSettingsState>,
    epoch: AtomicU64,
}

/// Shared container for all reactive states.
///
/// The store also carries an engine epoch: the bootstrap controller bumps
/// it whenever the remote store binding changes, and a sync engine only
/// publishes through the `*_for_epoch` setters with the epoch it was
/// created under. A superseded engine's publishes are silently discarded.
#[derive(Clone)]
pub struct StateStore {
    inner: Arc<Inner>,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                recipes: watch::channel(RecipesState::default()).0,
                sync: watch::channel(SyncState::default()).0,
                settings: watch::channel(SettingsState::default()).0,
                screen: watch::channel(ScreenState::default()).0,
                saving: watch::channel(SavingSettingsState::default()).0,
                epoch: AtomicU64::new(0),
            }),
        }
    }

    pub fn recipes(&self) -> RecipesState {
        self.inner.recipes.borrow().clone()
    }

    pub fn set_recipes(&self, state: RecipesState) {
        self.inner.recipes.send_replace(state);
    }

    /// Publishes a recipes state only if `epoch` is still current.
    /// Returns whether the publish happened.
    pub fn set_recipes_for_epoch(&self, epoch: u64, state: RecipesState) -> bool {
        if epoch != self.epoch() {
            return false;
        }
        self.inner.recipes.send_replace(state);
        true
    }

    pub fn observe_recipes(&self) -> watch::Receiver<RecipesState> {
        self.inner.recipes.subscribe()
    }

    pub fn sync(&self) -> SyncState {
        *self.inner.sync.borrow()
    }

    pub fn set_sync_for_epoch(&self, epoch: u64, state: SyncState) -> bool {
        if epoch != self.epoch() {
            return false;
        }
        self.inner.sync.send_replace(state);
        true
    }

    pub fn observe_sync(&self) -> watch::Receiver<SyncState> {
        self.inner.sync.subscribe()
    }

    pub fn settings(&self) -> SettingsState {
        self.inner.settings.borrow().clone()
    }

    pub fn set_settings(&self, state: SettingsState) {
        self.inner.settings.send_replace(state);
    }

    pub fn observe_settings(&self) -> watch::Receiver<SettingsState> {
        self.inner.settings.subscribe()
    }

    pub fn screen(&self) -> ScreenState {
        *self.inner.screen.borrow()
    }

    pub fn set_screen(&self, state: ScreenState) {
        self.inner.screen.send_replace(state);
    }

    pub fn observe_screen(&self) -> watch::Receiver<ScreenState> {
        self.inner.screen.subscribe()
    }

    pub fn saving(&self) -> SavingSettingsState {
        *self.inner.saving.borrow()
    }

    pub fn set_saving(&self, state: SavingSettingsState) {
        self.inner.saving.send_replace(state);
    }

    pub fn observe_saving(&self) -> watch::Receiver<SavingSettingsState> {
        self.inner.saving.subscribe()
    }

    /// The current engine epoch.
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    /// Invalidates all engines created under earlier epochs and returns the
    /// new epoch.
    pub fn advance_epoch(&self) -> u64 {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecipeDraft;
    use std::collections::BTreeSet;

    fn recipe(id: i64, title: &str, tags: &[&str]) -> Recipe {
        let tags: BTreeSet<String> = tags.iter().map(|s| s.to_string()).collect();
        RecipeDraft::new(title, None, tags).unwrap().with_id(id, 0)
    }

    #[test]
    fn test_snapshot_derivations() {
        let snapshot = RecipesSnapshot::new(
            vec![recipe(1, "Soup", &["quick"]), recipe(2, "Stew", &["slow", "quick"])],
            vec![1],
            vec![2],
        );

        let by_id = snapshot.by_id();
        assert_eq!(by_id.len(), 2);
        assert_eq!(by_id[&2].title, "Stew");

        let tags: Vec<_> = snapshot.all_tags().into_iter().collect();
        assert_eq!(tags, vec!["quick".to_string(), "slow".to_string()]);
    }

    #[test]
    fn test_defaults() {
        let states = StateStore::new();
        assert_eq!(states.recipes(), RecipesState::Loading);
        assert_eq!(states.sync(), SyncState::NotSyncing);
        assert_eq!(states.settings(), SettingsState { store_id: None });
        assert_eq!(states.screen(), ScreenState::Plan);
        assert_eq!(states.saving(), SavingSettingsState::NotSaving);
    }

    #[test]
    fn test_epoch_guard_discards_stale_publish() {
        let states = StateStore::new();
        let stale = states.epoch();
        states.advance_epoch();

        let snapshot = RecipesSnapshot::new(vec![recipe(1, "Soup", &[])], vec![], vec![]);
        assert!(!states.set_recipes_for_epoch(stale, RecipesState::Success(snapshot.clone())));
        assert_eq!(states.recipes(), RecipesState::Loading);

        assert!(states.set_recipes_for_epoch(states.epoch(), RecipesState::Success(snapshot)));
        assert!(matches!(states.recipes(), RecipesState::Success(_)));
    }

    #[tokio::test]
    async fn test_observers_see_replacement() {
        let states = StateStore::new();
        let mut rx = states.observe_sync();
        states.set_sync_for_epoch(states.epoch(), SyncState::Syncing);
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_syncing());
    }
}
