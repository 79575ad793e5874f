//! SQLite implementation of the local cache contract.
//!
//! Tables hold exactly what the last successful resync produced; every
//! write is a transactional full overwrite.

use async_trait::async_trait;
use sqlx::SqlitePool;

use cookplan_core::{CacheError, CacheSnapshot, LocalCache, Recipe};

pub struct SqliteCache {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: i64,
    title: String,
    url: Option<String>,
    counter: i64,
    tags: Option<String>,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Recipe {
            id: row.id,
            title: row.title,
            url: row.url,
            counter: row.counter,
            tags: Recipe::parse_tags(row.tags.as_deref()),
        }
    }
}

impl SqliteCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn storage_err(e: sqlx::Error) -> CacheError {
    CacheError::Storage(e.to_string())
}

#[async_trait]
impl LocalCache for SqliteCache {
    async fn read_all(&self) -> Result<CacheSnapshot, CacheError> {
        let rows: Vec<RecipeRow> = sqlx::query_as("SELECT * FROM recipes ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        let plan: Vec<(i64,)> = sqlx::query_as("SELECT recipe_id FROM plan ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        let shop: Vec<(i64,)> = sqlx::query_as("SELECT recipe_id FROM shop ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        let store_id: Option<(String,)> = sqlx::query_as("SELECT store_id FROM settings LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(CacheSnapshot {
            recipes: rows.into_iter().map(Recipe::from).collect(),
            plan: plan.into_iter().map(|r| r.0).collect(),
            shop: shop.into_iter().map(|r| r.0).collect(),
            store_id: store_id.map(|r| r.0),
        })
    }

    async fn replace_all(
        &self,
        recipes: &[Recipe],
        plan: &[i64],
        shop: &[i64],
    ) -> Result<(), CacheError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query("DELETE FROM recipes")
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        for recipe in recipes {
            let tags = recipe.tags_string();
            sqlx::query("INSERT INTO recipes (id, title, url, counter, tags) VALUES (?, ?, ?, ?, ?)")
                .bind(recipe.id)
                .bind(&recipe.title)
                .bind(&recipe.url)
                .bind(recipe.counter)
                .bind(if tags.is_empty() { None } else { Some(tags) })
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
        }

        sqlx::query("DELETE FROM plan")
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        for id in plan {
            sqlx::query("INSERT INTO plan (recipe_id) VALUES (?)")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
        }

        sqlx::query("DELETE FROM shop")
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        for id in shop {
            sqlx::query("INSERT INTO shop (recipe_id) VALUES (?)")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
        }

        tx.commit().await.map_err(storage_err)
    }

    async fn set_store_id(&self, store_id: Option<&str>) -> Result<(), CacheError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        for table in ["settings", "recipes", "plan", "shop"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
        }
        if let Some(id) = store_id {
            sqlx::query("INSERT INTO settings (store_id) VALUES (?)")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
        }

        tx.commit().await.map_err(storage_err)
    }
}
