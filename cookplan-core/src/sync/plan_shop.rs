//! Pure plan/shop list transform.
//!
//! The same transform runs twice per intent: once optimistically against
//! the in-memory state, and once against freshly read remote lists right
//! before the batched write, so concurrent remote edits survive.

use crate::models::ID_TEMPORARY;

/// One plan/shop mutation, expressed as optional membership changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanShopUpdate {
    pub add_to_plan: Option<i64>,
    pub add_to_shop: Option<i64>,
    pub remove_from_plan: Option<i64>,
    pub remove_from_shop: Option<i64>,
    pub increment_counter: bool,
}

impl PlanShopUpdate {
    /// The id whose counter the batched write should bump, if any.
    pub fn counter_id(&self) -> Option<i64> {
        if self.increment_counter {
            self.remove_from_plan
        } else {
            None
        }
    }
}

/// Applies the update to both lists. Survivors keep their order (minus the
/// removed id and any lingering [`ID_TEMPORARY`]), added ids are appended,
/// and duplicates collapse to the first occurrence.
pub fn apply(plan: &[i64], shop: &[i64], update: &PlanShopUpdate) -> (Vec<i64>, Vec<i64>) {
    (
        apply_one(plan, update.add_to_plan, update.remove_from_plan),
        apply_one(shop, update.add_to_shop, update.remove_from_shop),
    )
}

fn apply_one(list: &[i64], add: Option<i64>, remove: Option<i64>) -> Vec<i64> {
    let mut result: Vec<i64> = list
        .iter()
        .copied()
        .filter(|&id| Some(id) != remove && id != ID_TEMPORARY)
        .collect();
    if let Some(id) = add {
        result.push(id);
    }

    let mut seen = std::collections::HashSet::new();
    result.retain(|&id| seen.insert(id));
    result
}
