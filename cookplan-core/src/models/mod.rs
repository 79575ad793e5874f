mod recipe;

pub(crate) use recipe::join_tags;
pub use recipe::{Recipe, RecipeDraft, ValidationError, ID_TEMPORARY, SEPARATOR_TAGS};
