//! In-memory remote store double.
//!
//! Backed by the same [`SheetGrid`] encoding as the real adapters, so row
//! positioning, soft deletes and counter bumps behave identically. Tests
//! can inject failures and gate the next write to observe optimistic
//! windows.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::models::Recipe;

use super::grid::SheetGrid;
use super::{RemoteError, RemoteStore, RemoteStoreFactory};

#[derive(Debug, Default)]
pub struct MemoryRemote {
    grid: Mutex<SheetGrid>,
    failing: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid(grid: SheetGrid) -> Self {
        Self {
            grid: Mutex::new(grid),
            ..Self::default()
        }
    }

    /// Copy of the current grid, for assertions.
    pub fn grid(&self) -> SheetGrid {
        self.grid.lock().unwrap().clone()
    }

    /// While set, every operation fails with [`RemoteError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Holds the next write operation until the returned handle is
    /// notified. One-shot.
    pub fn gate_next_write(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    fn check_available(&self) -> Result<(), RemoteError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("injected failure".into()));
        }
        Ok(())
    }

    async fn pass_write_gate(&self) {
        let gate = self.gate.lock().unwrap().take();
        if let Some(notify) = gate {
            notify.notified().await;
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn get_recipes(&self) -> Result<Vec<Recipe>, RemoteError> {
        self.check_available()?;
        Ok(self.grid.lock().unwrap().recipes())
    }

    async fn get_new_id(&self) -> Result<i64, RemoteError> {
        self.pass_write_gate().await;
        self.check_available()?;
        Ok(self.grid.lock().unwrap().new_id())
    }

    async fn get_plan_and_shop(&self) -> Result<(Vec<i64>, Vec<i64>), RemoteError> {
        self.check_available()?;
        Ok(self.grid.lock().unwrap().plan_and_shop())
    }

    async fn update_recipe(
        &self,
        id: i64,
        title: &str,
        url: Option<&str>,
        tags: &BTreeSet<String>,
    ) -> Result<(), RemoteError> {
        self.pass_write_gate().await;
        self.check_available()?;
        self.grid.lock().unwrap().write_recipe(id, title, url, tags);
        Ok(())
    }

    async fn update_plan_and_shop(
        &self,
        plan: &[i64],
        shop: &[i64],
        increment_counter_id: Option<i64>,
    ) -> Result<(), RemoteError> {
        self.pass_write_gate().await;
        self.check_available()?;
        let mut grid = self.grid.lock().unwrap();
        grid.set_plan_and_shop(plan, shop);
        if let Some(id) = increment_counter_id {
            grid.increment_counter(id);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RemoteError> {
        self.pass_write_gate().await;
        self.check_available()?;
        self.grid.lock().unwrap().mark_deleted(id);
        Ok(())
    }
}

/// Factory over a shared map of named in-memory stores.
#[derive(Debug, Default)]
pub struct MemoryRemoteFactory {
    stores: Mutex<HashMap<String, Arc<MemoryRemote>>>,
    next: AtomicU64,
}

impl MemoryRemoteFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pre-seeded store under a fixed id.
    pub fn insert(&self, store_id: impl Into<String>, store: Arc<MemoryRemote>) {
        self.stores.lock().unwrap().insert(store_id.into(), store);
    }
}

#[async_trait]
impl RemoteStoreFactory for MemoryRemoteFactory {
    async fn create_store(&self, name: &str) -> Result<String, RemoteError> {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        let store_id = format!("{}-{}", name.to_lowercase().replace(' ', "-"), n);
        self.stores
            .lock()
            .unwrap()
            .insert(store_id.clone(), Arc::new(MemoryRemote::new()));
        Ok(store_id)
    }

    async fn open(&self, store_id: &str) -> Result<Arc<dyn RemoteStore>, RemoteError> {
        self.stores
            .lock()
            .unwrap()
            .get(store_id)
            .cloned()
            .map(|store| store as Arc<dyn RemoteStore>)
            .ok_or_else(|| RemoteError::UnknownStore(store_id.to_string()))
    }
}
