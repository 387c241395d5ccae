// file: src/storage/store.rs
// description: JSON document store for per-tag datasets, tag index, and backups
// reference: static-site data layout under public/data

use crate::config::StorageConfig;
use crate::error::Result;
use crate::models::{Article, TagDataset};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub const INDEX_FILE: &str = "tags.json";
pub const REFRESH_MARKER: &str = ".refresh";

/// On-disk shape of `<tag>.json`. Announcements never appear here; they
/// get a companion file so the main document stays submissions-only.
#[derive(Debug, Serialize, Deserialize)]
struct SubmissionsFile {
    tag: String,
    submissions: Vec<Article>,
    #[serde(rename = "fetchedAt")]
    fetched_at: DateTime<Utc>,
}

/// On-disk shape of `<tag>-announcements.json`.
#[derive(Debug, Serialize, Deserialize)]
struct AnnouncementsFile {
    tag: String,
    announcements: Vec<Article>,
    #[serde(rename = "fetchedAt")]
    fetched_at: DateTime<Utc>,
}

/// Flat-file store rooted at the data directory. Directories are created
/// lazily on the first write, so constructing a store never touches disk.
#[derive(Debug, Clone)]
pub struct DataStore {
    data_dir: PathBuf,
    backup_dir: PathBuf,
}

impl DataStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            backup_dir: config.backup_dir.clone(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn submissions_path(&self, tag: &str) -> PathBuf {
        self.data_dir.join(format!("{tag}.json"))
    }

    fn announcements_path(&self, tag: &str) -> PathBuf {
        self.data_dir.join(format!("{tag}-announcements.json"))
    }

    fn index_path(&self) -> PathBuf {
        self.data_dir.join(INDEX_FILE)
    }

    fn refresh_path(&self) -> PathBuf {
        self.data_dir.join(REFRESH_MARKER)
    }

    async fn ensure_data_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).await?;
        Ok(())
    }

    /// Writes a dataset to `<tag>.json` plus the announcements companion.
    /// Saving with no announcements deletes any stale companion left over
    /// from an earlier fetch.
    pub async fn save(&self, dataset: &TagDataset) -> Result<()> {
        self.ensure_data_dir().await?;

        let main = SubmissionsFile {
            tag: dataset.tag.clone(),
            submissions: dataset.submissions.clone(),
            fetched_at: dataset.fetched_at,
        };
        let contents = serde_json::to_string_pretty(&main)?;
        fs::write(self.submissions_path(&dataset.tag), contents).await?;

        if dataset.announcements.is_empty() {
            remove_if_exists(&self.announcements_path(&dataset.tag)).await?;
        } else {
            let companion = AnnouncementsFile {
                tag: dataset.tag.clone(),
                announcements: dataset.announcements.clone(),
                fetched_at: dataset.fetched_at,
            };
            let contents = serde_json::to_string_pretty(&companion)?;
            fs::write(self.announcements_path(&dataset.tag), contents).await?;
        }

        debug!(
            "Saved {} submissions and {} announcements for tag {}",
            dataset.submissions.len(),
            dataset.announcements.len(),
            dataset.tag
        );

        self.touch_refresh().await;
        Ok(())
    }

    /// Loads a dataset, merging the announcements companion back in.
    /// A missing or unparsable main document reads as absent; a missing
    /// companion just means there were no announcements.
    pub async fn load(&self, tag: &str) -> Option<TagDataset> {
        let main: SubmissionsFile = read_optional(&self.submissions_path(tag)).await?;
        let announcements = match read_optional::<AnnouncementsFile>(&self.announcements_path(tag)).await
        {
            Some(companion) => companion.announcements,
            None => Vec::new(),
        };

        Some(TagDataset {
            tag: main.tag,
            submissions: main.submissions,
            announcements,
            fetched_at: main.fetched_at,
        })
    }

    /// Loads every dataset named by the tag index, skipping entries whose
    /// files have gone missing.
    pub async fn load_all(&self) -> Vec<TagDataset> {
        let mut datasets = Vec::new();
        for tag in self.list_tags().await {
            if let Some(dataset) = self.load(&tag).await {
                datasets.push(dataset);
            }
        }
        datasets
    }

    pub async fn list_tags(&self) -> Vec<String> {
        read_optional::<Vec<String>>(&self.index_path())
            .await
            .unwrap_or_default()
    }

    /// Adds a tag to the index, keeping it sorted and deduplicated.
    /// Returns false without rewriting the file when the tag is already
    /// present.
    pub async fn index_add(&self, tag: &str) -> Result<bool> {
        let mut tags = self.list_tags().await;
        if tags.iter().any(|t| t == tag) {
            return Ok(false);
        }

        tags.push(tag.to_string());
        tags.sort();
        tags.dedup();

        self.ensure_data_dir().await?;
        fs::write(self.index_path(), serde_json::to_string_pretty(&tags)?).await?;
        debug!("Added {} to tag index ({} total)", tag, tags.len());
        Ok(true)
    }

    /// Removes a tag from the index; returns false when it was not listed.
    pub async fn index_remove(&self, tag: &str) -> Result<bool> {
        let mut tags = self.list_tags().await;
        let before = tags.len();
        tags.retain(|t| t != tag);
        if tags.len() == before {
            return Ok(false);
        }

        self.ensure_data_dir().await?;
        fs::write(self.index_path(), serde_json::to_string_pretty(&tags)?).await?;
        debug!("Removed {} from tag index ({} remain)", tag, tags.len());
        Ok(true)
    }

    /// Copies `<tag>.json` into the backup directory with a millisecond
    /// timestamp suffix. Returns the backup path, or None when there is
    /// nothing to back up.
    pub async fn backup(&self, tag: &str) -> Result<Option<PathBuf>> {
        let source = self.submissions_path(tag);
        if !fs::try_exists(&source).await.unwrap_or(false) {
            return Ok(None);
        }

        fs::create_dir_all(&self.backup_dir).await?;
        let destination = self
            .backup_dir
            .join(format!("{}_{}.json", tag, Utc::now().timestamp_millis()));
        fs::copy(&source, &destination).await?;

        debug!("Backed up {} to {}", tag, destination.display());
        Ok(Some(destination))
    }

    /// Deletes both documents for a tag. Already-absent files are fine.
    pub async fn remove(&self, tag: &str) -> Result<()> {
        remove_if_exists(&self.submissions_path(tag)).await?;
        remove_if_exists(&self.announcements_path(tag)).await?;
        self.touch_refresh().await;
        Ok(())
    }

    /// Rewrites the change marker polled by the front-end with the current
    /// epoch milliseconds. Failures are logged and swallowed; the marker
    /// is advisory.
    async fn touch_refresh(&self) {
        let stamp = Utc::now().timestamp_millis().to_string();
        if let Err(e) = fs::write(self.refresh_path(), stamp).await {
            debug!("Could not update refresh marker: {}", e);
        }
    }
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Reads an optional JSON document. Missing files and unparsable content
/// both collapse to None.
async fn read_optional<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                debug!("Could not read {}: {}", path.display(), e);
            }
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Could not parse {}: {}", path.display(), e);
            None
        }
    }
}
