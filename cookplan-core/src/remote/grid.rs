//! The tabular row encoding shared by all remote store implementations.
//!
//! Column layout per recipe row: 0=title, 1=url, 2=deleted marker,
//! 3=counter, 4=tags. Plan and shop each occupy a single cell of
//! comma-joined ids.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{join_tags, Recipe};

pub(crate) const COLUMN_TITLE: usize = 0;
pub(crate) const COLUMN_URL: usize = 1;
pub(crate) const COLUMN_DELETED: usize = 2;
pub(crate) const COLUMN_COUNTER: usize = 3;
pub(crate) const COLUMN_TAGS: usize = 4;
const COLUMN_COUNT: usize = 5;

/// Value of the deleted-marker column for soft-deleted rows.
pub const DELETED_MARKER: &str = "deleted";

const SEPARATOR_IDS: char = ',';

/// In-memory form of the remote tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetGrid {
    rows: Vec<Vec<String>>,
    plan_cell: String,
    shop_cell: String,
}

impl SheetGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses all live recipes. A row is a recipe iff it has any non-blank
    /// cell and is not marked deleted; the id is its 1-based position.
    /// Counter and tags parse with permissive defaults.
    pub fn recipes(&self) -> Vec<Recipe> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                if row.iter().all(|cell| cell.trim().is_empty()) {
                    return None;
                }
                if cell(row, COLUMN_DELETED) == Some(DELETED_MARKER) {
                    return None;
                }
                Some(Recipe {
                    id: i as i64 + 1,
                    title: row
                        .get(COLUMN_TITLE)
                        .map(|c| c.trim().to_string())
                        .unwrap_or_default(),
                    url: cell(row, COLUMN_URL).map(str::to_string),
                    counter: cell(row, COLUMN_COUNTER)
                        .and_then(|c| c.parse().ok())
                        .unwrap_or(0),
                    tags: Recipe::parse_tags(row.get(COLUMN_TAGS).map(String::as_str)),
                })
            })
            .collect()
    }

    /// Next free row position, counting soft-deleted rows.
    pub fn new_id(&self) -> i64 {
        self.rows.len() as i64 + 1
    }

    pub fn plan_and_shop(&self) -> (Vec<i64>, Vec<i64>) {
        (parse_ids(&self.plan_cell), parse_ids(&self.shop_cell))
    }

    pub fn set_plan_and_shop(&mut self, plan: &[i64], shop: &[i64]) {
        self.plan_cell = join_ids(plan);
        self.shop_cell = join_ids(shop);
    }

    /// Writes title, url and tags of row `id`, growing the table as
    /// needed. The deleted-marker and counter columns are preserved.
    pub fn write_recipe(&mut self, id: i64, title: &str, url: Option<&str>, tags: &BTreeSet<String>) {
        let Some(row) = self.row_mut(id) else { return };
        row[COLUMN_TITLE] = title.to_string();
        row[COLUMN_URL] = url.unwrap_or("").to_string();
        row[COLUMN_TAGS] = join_tags(tags);
    }

    pub fn mark_deleted(&mut self, id: i64) {
        if let Some(row) = self.row_mut(id) {
            row[COLUMN_DELETED] = DELETED_MARKER.to_string();
        }
    }

    /// Read-then-write counter bump; a missing or malformed counter counts
    /// as zero.
    pub fn increment_counter(&mut self, id: i64) {
        if let Some(row) = self.row_mut(id) {
            let old: i64 = row[COLUMN_COUNTER].trim().parse().unwrap_or(0);
            row[COLUMN_COUNTER] = (old + 1).to_string();
        }
    }

    fn row_mut(&mut self, id: i64) -> Option<&mut Vec<String>> {
        if id < 1 {
            return None;
        }
        let index = id as usize - 1;
        while self.rows.len() <= index {
            self.rows.push(vec![String::new(); COLUMN_COUNT]);
        }
        let row = &mut self.rows[index];
        while row.len() < COLUMN_COUNT {
            row.push(String::new());
        }
        Some(row)
    }
}

fn cell(row: &[String], column: usize) -> Option<&str> {
    row.get(column).map(|c| c.trim()).filter(|c| !c.is_empty())
}

fn parse_ids(raw: &str) -> Vec<i64> {
    raw.split(SEPARATOR_IDS)
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(&SEPARATOR_IDS.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn tags(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_write_then_read() {
        let mut grid = SheetGrid::new();
        grid.write_recipe(1, "Soup", Some("https://example.com"), &tags(&["quick"]));

        let recipes = grid.recipes();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].id, 1);
        assert_eq!(recipes[0].title, "Soup");
        assert_eq!(recipes[0].url.as_deref(), Some("https://example.com"));
        assert_eq!(recipes[0].counter, 0);
        assert_eq!(recipes[0].tags, tags(&["quick"]));
    }

    #[test]
    fn test_deleted_rows_keep_later_row_positions() {
        let mut grid = SheetGrid::new();
        grid.write_recipe(1, "One", None, &BTreeSet::new());
        grid.write_recipe(2, "Two", None, &BTreeSet::new());
        grid.write_recipe(3, "Three", None, &BTreeSet::new());

        grid.mark_deleted(2);

        let ids: Vec<i64> = grid.recipes().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(grid.new_id(), 4);
    }

    #[test]
    fn test_blank_rows_are_not_recipes() {
        let mut grid = SheetGrid::new();
        grid.write_recipe(3, "Three", None, &BTreeSet::new());

        let ids: Vec<i64> = grid.recipes().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3]);
        assert_eq!(grid.new_id(), 4);
    }

    #[test]
    fn test_permissive_counter_and_tags() {
        let mut grid = SheetGrid::new();
        grid.write_recipe(1, "Soup", None, &BTreeSet::new());
        grid.increment_counter(1);
        grid.increment_counter(1);

        let recipes = grid.recipes();
        assert_eq!(recipes[0].counter, 2);
        assert!(recipes[0].tags.is_empty());
    }

    #[test]
    fn test_update_preserves_deleted_and_counter_columns() {
        let mut grid = SheetGrid::new();
        grid.write_recipe(1, "Soup", None, &BTreeSet::new());
        grid.increment_counter(1);
        grid.write_recipe(1, "Better Soup", None, &tags(&["slow"]));

        let recipes = grid.recipes();
        assert_eq!(recipes[0].title, "Better Soup");
        assert_eq!(recipes[0].counter, 1);

        grid.mark_deleted(1);
        grid.write_recipe(1, "Ghost", None, &BTreeSet::new());
        assert!(grid.recipes().is_empty());
    }

    #[test]
    fn test_plan_and_shop_cells() {
        let mut grid = SheetGrid::new();
        assert_eq!(grid.plan_and_shop(), (vec![], vec![]));

        grid.set_plan_and_shop(&[3, 1], &[2]);
        assert_eq!(grid.plan_and_shop(), (vec![3, 1], vec![2]));

        grid.set_plan_and_shop(&[], &[]);
        assert_eq!(grid.plan_and_shop(), (vec![], vec![]));
    }

    #[test]
    fn test_grid_json_roundtrip() {
        let mut grid = SheetGrid::new();
        grid.write_recipe(1, "Soup", None, &tags(&["quick"]));
        grid.set_plan_and_shop(&[1], &[]);

        let json = serde_json::to_string(&grid).unwrap();
        let parsed: SheetGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(grid, parsed);
    }
}
