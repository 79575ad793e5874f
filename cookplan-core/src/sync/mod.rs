//! The sync engine: optimistic local mutation, remote persistence, and
//! reconciliation by full resync.

mod engine;
pub mod plan_shop;

use thiserror::Error;

use crate::cache::CacheError;
use crate::models::ValidationError;
use crate::remote::RemoteError;

pub use engine::SyncEngine;

/// Everything that can abort an intent. Caught at the intent-handler
/// boundary, surfaced as an error event and answered with a reload from
/// the local cache.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
