//! Recipe model and tag encoding.
//!
//! Recipe ids are assigned by the remote store as 1-based row positions.
//! A recipe inserted optimistically before the remote has assigned an id
//! carries the [`ID_TEMPORARY`] sentinel until the next resync.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel id for a recipe that has not yet been assigned a remote id.
pub const ID_TEMPORARY: i64 = -1;

/// Separator used when joining tags into a single cell or column.
/// Tags may not contain this character.
pub const SEPARATOR_TAGS: char = ';';

/// Errors rejected before any remote or cache write is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be blank")]
    BlankTitle,
    #[error("url must not be blank when present")]
    BlankUrl,
    #[error("invalid tag {0:?}: tags must be non-blank and must not contain '{SEPARATOR_TAGS}'")]
    InvalidTag(String),
}

/// A recipe as it exists in a snapshot: remote-assigned id, title,
/// optional source url, times-cooked counter and a set of tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub url: Option<String>,
    pub counter: i64,
    pub tags: BTreeSet<String>,
}

impl Recipe {
    /// Joins the tags into the single-cell wire encoding.
    pub fn tags_string(&self) -> String {
        join_tags(&self.tags)
    }

    /// Parses a tags cell. Missing input or blank members map to nothing;
    /// members are trimmed.
    pub fn parse_tags(raw: Option<&str>) -> BTreeSet<String> {
        raw.map(|s| {
            s.split(SEPARATOR_TAGS)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if let Some(url) = &self.url {
            write!(f, " ({})", url)?;
        }
        if !self.tags.is_empty() {
            write!(f, " [{}]", self.tags_string())?;
        }
        Ok(())
    }
}

/// Validated input for an add or update intent, before an id is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub title: String,
    pub url: Option<String>,
    pub tags: BTreeSet<String>,
}

impl RecipeDraft {
    /// Validates and normalizes user input: the title is trimmed and must
    /// not be blank, a blank url collapses to `None`, tags are trimmed and
    /// must not be blank or contain [`SEPARATOR_TAGS`].
    pub fn new(
        title: impl Into<String>,
        url: Option<String>,
        tags: BTreeSet<String>,
    ) -> Result<Self, ValidationError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::BlankTitle);
        }

        let url = match url {
            Some(u) => {
                let u = u.trim().to_string();
                if u.is_empty() {
                    return Err(ValidationError::BlankUrl);
                }
                Some(u)
            }
            None => None,
        };

        let mut normalized = BTreeSet::new();
        for tag in tags {
            let tag = tag.trim().to_string();
            if tag.is_empty() || tag.contains(SEPARATOR_TAGS) {
                return Err(ValidationError::InvalidTag(tag));
            }
            normalized.insert(tag);
        }

        Ok(Self {
            title,
            url,
            tags: normalized,
        })
    }

    /// Materializes the draft as a recipe with the given id and counter.
    pub fn with_id(&self, id: i64, counter: i64) -> Recipe {
        Recipe {
            id,
            title: self.title.clone(),
            url: self.url.clone(),
            counter,
            tags: self.tags.clone(),
        }
    }
}

pub(crate) fn join_tags(tags: &BTreeSet<String>) -> String {
    tags.iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(&SEPARATOR_TAGS.to_string())
}
