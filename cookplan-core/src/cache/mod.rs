//! Local cache contract.
//!
//! The cache is a durable materialization of the last successful resync
//! plus the remote store binding. It is never treated as more current than
//! the remote store; the engine overwrites it wholesale after every
//! reconciliation and falls back to it when an intent fails.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Recipe;

pub use memory::MemoryCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("local cache error: {0}")]
    Storage(String),
}

/// Everything the cache holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheSnapshot {
    pub recipes: Vec<Recipe>,
    pub plan: Vec<i64>,
    pub shop: Vec<i64>,
    pub store_id: Option<String>,
}

/// Durable storage with simple CRUD and transactional replace. Callers
/// serialize access; the cache has no concurrency control of its own.
#[async_trait]
pub trait LocalCache: Send + Sync {
    async fn read_all(&self) -> Result<CacheSnapshot, CacheError>;

    /// Transactionally replaces the recipe, plan and shop content with the
    /// given values. Full overwrite, not a merge.
    async fn replace_all(
        &self,
        recipes: &[Recipe],
        plan: &[i64],
        shop: &[i64],
    ) -> Result<(), CacheError>;

    /// Rebinds the cache to a remote store, clearing the recipe, plan and
    /// shop content in the same transaction: cached data is store-specific.
    async fn set_store_id(&self, store_id: Option<&str>) -> Result<(), CacheError>;
}
