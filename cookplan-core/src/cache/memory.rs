//! In-memory cache for tests and ephemeral sessions.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::Recipe;

use super::{CacheError, CacheSnapshot, LocalCache};

#[derive(Debug, Default)]
pub struct MemoryCache {
    snapshot: Mutex<CacheSnapshot>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: CacheSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }
}

#[async_trait]
impl LocalCache for MemoryCache {
    async fn read_all(&self) -> Result<CacheSnapshot, CacheError> {
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn replace_all(
        &self,
        recipes: &[Recipe],
        plan: &[i64],
        shop: &[i64],
    ) -> Result<(), CacheError> {
        let mut snapshot = self.snapshot.lock().unwrap();
        snapshot.recipes = recipes.to_vec();
        snapshot.plan = plan.to_vec();
        snapshot.shop = shop.to_vec();
        Ok(())
    }

    async fn set_store_id(&self, store_id: Option<&str>) -> Result<(), CacheError> {
        let mut snapshot = self.snapshot.lock().unwrap();
        *snapshot = CacheSnapshot {
            store_id: store_id.map(str::to_string),
            ..CacheSnapshot::default()
        };
        Ok(())
    }
}
