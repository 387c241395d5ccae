// file: src/models/dataset.rs
// description: per-tag dataset grouping submissions and official announcements
// reference: internal data structures

use super::article::Article;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything stored for one challenge tag. Announcements live in a
/// companion file on disk, so they are skipped here when empty to keep
/// serialized output aligned with the file layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagDataset {
    pub tag: String,
    pub submissions: Vec<Article>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub announcements: Vec<Article>,
    #[serde(rename = "fetchedAt")]
    pub fetched_at: DateTime<Utc>,
}

impl TagDataset {
    pub fn new(
        tag: impl Into<String>,
        submissions: Vec<Article>,
        announcements: Vec<Article>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            tag: tag.into(),
            submissions,
            announcements,
            fetched_at,
        }
    }

    pub fn total_articles(&self) -> usize {
        self.submissions.len() + self.announcements.len()
    }
}
