//! Remote store adapter: the row-oriented contract the sync engine writes
//! against, plus an in-memory double and a file-backed implementation.
//!
//! The contract deliberately mirrors a spreadsheet-like tabular store: a
//! "recipes" table whose 1-based row position is the recipe id, and two
//! cells holding the plan and shopping lists. A real network-backed
//! adapter would live behind the same traits.

mod file;
mod grid;
mod memory;

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Recipe;

pub use file::{FileRemote, FileRemoteFactory};
pub use grid::{SheetGrid, DELETED_MARKER};
pub use memory::{MemoryRemote, MemoryRemoteFactory};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
    #[error("remote store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("remote store data error: {0}")]
    Data(String),
    #[error("no remote store named {0:?}")]
    UnknownStore(String),
}

/// Row-oriented operations against one bound remote store.
///
/// All writes are last-writer-wins; the engine recovers from concurrent
/// edits by resyncing, never by merging.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All live recipes: non-empty rows without the deleted marker, ids
    /// derived from row position.
    async fn get_recipes(&self) -> Result<Vec<Recipe>, RemoteError>;

    /// The id the next appended recipe will get (row count + 1, counting
    /// soft-deleted rows).
    async fn get_new_id(&self) -> Result<i64, RemoteError>;

    async fn get_plan_and_shop(&self) -> Result<(Vec<i64>, Vec<i64>), RemoteError>;

    /// Writes title, url and tags of the given row, leaving the deleted
    /// marker and counter columns untouched.
    async fn update_recipe(
        &self,
        id: i64,
        title: &str,
        url: Option<&str>,
        tags: &BTreeSet<String>,
    ) -> Result<(), RemoteError>;

    /// Replaces both lists in one batched write; when
    /// `increment_counter_id` is set, the same batch bumps that recipe's
    /// counter (read-then-write).
    async fn update_plan_and_shop(
        &self,
        plan: &[i64],
        shop: &[i64],
        increment_counter_id: Option<i64>,
    ) -> Result<(), RemoteError>;

    /// Soft delete: marks the row deleted without removing it, so row
    /// positions of later recipes stay stable.
    async fn delete(&self, id: i64) -> Result<(), RemoteError>;
}

/// Creates and opens remote stores by identifier.
#[async_trait]
pub trait RemoteStoreFactory: Send + Sync {
    async fn create_store(&self, name: &str) -> Result<String, RemoteError>;

    async fn open(&self, store_id: &str) -> Result<Arc<dyn RemoteStore>, RemoteError>;
}
