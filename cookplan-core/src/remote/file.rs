//! File-backed remote store.
//!
//! Persists the [`SheetGrid`] as a JSON document. This gives the CLI a
//! working store behind the same contract a network adapter would
//! implement; every operation reads the file, applies the change and
//! writes it back, so the file is always a full materialization.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::models::Recipe;

use super::grid::SheetGrid;
use super::{RemoteError, RemoteStore, RemoteStoreFactory};

#[derive(Debug)]
pub struct FileRemote {
    path: PathBuf,
}

impl FileRemote {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<SheetGrid, RemoteError> {
        let bytes = tokio::fs::read(&self.path).await?;
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Data(e.to_string()))
    }

    async fn save(&self, grid: &SheetGrid) -> Result<(), RemoteError> {
        let json =
            serde_json::to_vec_pretty(grid).map_err(|e| RemoteError::Data(e.to_string()))?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for FileRemote {
    async fn get_recipes(&self) -> Result<Vec<Recipe>, RemoteError> {
        Ok(self.load().await?.recipes())
    }

    async fn get_new_id(&self) -> Result<i64, RemoteError> {
        Ok(self.load().await?.new_id())
    }

    async fn get_plan_and_shop(&self) -> Result<(Vec<i64>, Vec<i64>), RemoteError> {
        Ok(self.load().await?.plan_and_shop())
    }

    async fn update_recipe(
        &self,
        id: i64,
        title: &str,
        url: Option<&str>,
        tags: &BTreeSet<String>,
    ) -> Result<(), RemoteError> {
        let mut grid = self.load().await?;
        grid.write_recipe(id, title, url, tags);
        self.save(&grid).await
    }

    async fn update_plan_and_shop(
        &self,
        plan: &[i64],
        shop: &[i64],
        increment_counter_id: Option<i64>,
    ) -> Result<(), RemoteError> {
        let mut grid = self.load().await?;
        grid.set_plan_and_shop(plan, shop);
        if let Some(id) = increment_counter_id {
            grid.increment_counter(id);
        }
        self.save(&grid).await
    }

    async fn delete(&self, id: i64) -> Result<(), RemoteError> {
        let mut grid = self.load().await?;
        grid.mark_deleted(id);
        self.save(&grid).await
    }
}

/// Creates and opens JSON grid files under one directory; the store id is
/// the file stem.
#[derive(Debug)]
pub struct FileRemoteFactory {
    dir: PathBuf,
}

impl FileRemoteFactory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, store_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", store_id))
    }
}

#[async_trait]
impl RemoteStoreFactory for FileRemoteFactory {
    async fn create_store(&self, name: &str) -> Result<String, RemoteError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let store_id = format!("{}-{}", name.to_lowercase().replace(' ', "-"), millis);

        let remote = FileRemote::new(self.path_for(&store_id));
        remote.save(&SheetGrid::new()).await?;
        Ok(store_id)
    }

    async fn open(&self, store_id: &str) -> Result<Arc<dyn RemoteStore>, RemoteError> {
        let path = self.path_for(store_id);
        if !path.exists() {
            return Err(RemoteError::UnknownStore(store_id.to_string()));
        }
        Ok(Arc::new(FileRemote::new(path)))
    }
}
