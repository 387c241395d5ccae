// file: src/pipeline/sync.rs
// description: fetch, classify, and persist orchestration for challenge tags
// reference: sequential per-tag pipeline with backup-before-update

use crate::api::client::{ArticleSource, fetch_all_articles};
use crate::config::ApiConfig;
use crate::error::{ChallengeError, Result};
use crate::models::TagDataset;
use crate::pipeline::classifier;
use crate::storage::DataStore;
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

/// Pacing and page-size knobs for a sync run.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    pub page_size: u32,
    pub page_delay: Duration,
    pub tag_delay: Duration,
}

impl SyncOptions {
    pub fn from_api(config: &ApiConfig) -> Self {
        Self {
            page_size: config.page_size,
            page_delay: Duration::from_millis(config.page_delay_ms),
            tag_delay: Duration::from_millis(config.tag_delay_ms),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The dataset was written to disk and the tag indexed.
    Saved(TagDataset),
    /// The fetch succeeded but nothing survived classification; nothing
    /// was written.
    NoValidSubmissions { scanned: usize },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateStatus {
    Updated {
        submissions: usize,
        announcements: usize,
    },
    NoSubmissions {
        scanned: usize,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct TagUpdateOutcome {
    pub tag: String,
    #[serde(flatten)]
    pub status: UpdateStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateReport {
    pub outcomes: Vec<TagUpdateOutcome>,
}

impl UpdateReport {
    pub fn updated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, UpdateStatus::Updated { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, UpdateStatus::Failed { .. }))
            .count()
    }

    pub fn total_submissions(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                UpdateStatus::Updated { submissions, .. } => submissions,
                _ => 0,
            })
            .sum()
    }
}

/// Full pipeline for one tag: validate, fetch every page, classify, and
/// persist. An empty classification result is reported, not persisted,
/// so a previously stored dataset survives a bad fetch window.
pub async fn fetch_tag<S: ArticleSource>(
    source: &S,
    store: &DataStore,
    tag: &str,
    options: &SyncOptions,
) -> Result<FetchOutcome> {
    classifier::validate_tag(tag)?;

    let raw = fetch_all_articles(source, tag, options.page_size, options.page_delay).await?;
    let scanned = raw.len();
    let classified = classifier::classify(raw);

    if classified.is_empty() {
        info!(
            "No valid challenge submissions for tag {} ({} articles scanned)",
            tag, scanned
        );
        return Ok(FetchOutcome::NoValidSubmissions { scanned });
    }

    let dataset = TagDataset::new(
        tag,
        classified.submissions,
        classified.announcements,
        Utc::now(),
    );
    store.save(&dataset).await?;
    store.index_add(tag).await?;

    info!(
        "Saved {} submissions and {} announcements for tag: {}",
        dataset.submissions.len(),
        dataset.announcements.len(),
        tag
    );
    Ok(FetchOutcome::Saved(dataset))
}

/// Like [`fetch_tag`], but snapshots the existing dataset into the backup
/// directory first so a bad refresh can be recovered by hand.
pub async fn update_tag<S: ArticleSource>(
    source: &S,
    store: &DataStore,
    tag: &str,
    options: &SyncOptions,
) -> Result<FetchOutcome> {
    if let Some(path) = store.backup(tag).await? {
        info!("Backed up current data for {} to {}", tag, path.display());
    }
    fetch_tag(source, store, tag, options).await
}

/// Updates every indexed tag in order, pausing between tags. A failing
/// tag is recorded and the run continues; the per-tag outcomes land in
/// the returned report. An empty index is an error.
pub async fn update_all<S: ArticleSource>(
    source: &S,
    store: &DataStore,
    options: &SyncOptions,
) -> Result<UpdateReport> {
    let tags = store.list_tags().await;
    if tags.is_empty() {
        return Err(ChallengeError::NoKnownTags);
    }

    info!("Updating {} known tags", tags.len());
    let bar = update_progress_bar(tags.len() as u64);

    let mut report = UpdateReport::default();
    let last = tags.len() - 1;

    for (index, tag) in tags.iter().enumerate() {
        bar.set_message(tag.clone());

        let status = match update_tag(source, store, tag, options).await {
            Ok(FetchOutcome::Saved(dataset)) => UpdateStatus::Updated {
                submissions: dataset.submissions.len(),
                announcements: dataset.announcements.len(),
            },
            Ok(FetchOutcome::NoValidSubmissions { scanned }) => {
                UpdateStatus::NoSubmissions { scanned }
            }
            Err(e) => {
                error!("Failed to update tag {}: {}", tag, e);
                UpdateStatus::Failed {
                    error: e.to_string(),
                }
            }
        };

        report.outcomes.push(TagUpdateOutcome {
            tag: tag.clone(),
            status,
        });
        bar.inc(1);

        if index < last {
            tokio::time::sleep(options.tag_delay).await;
        }
    }

    bar.finish_and_clear();
    info!(
        "Update complete: {} updated, {} failed out of {} tags",
        report.updated_count(),
        report.failed_count(),
        report.outcomes.len()
    );
    Ok(report)
}

fn update_progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("Failed to create progress bar template")
            .progress_chars("=>-"),
    );
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::mock::MockSource;
    use crate::config::StorageConfig;
    use crate::models::article::sample;
    use crate::models::{Article, ArticleOrganization};
    use pretty_assertions::assert_eq;
    use tempfile::{TempDir, tempdir};

    fn store(dir: &TempDir) -> DataStore {
        DataStore::new(&StorageConfig {
            data_dir: dir.path().join("data"),
            backup_dir: dir.path().join("backup"),
        })
    }

    fn options() -> SyncOptions {
        SyncOptions {
            page_size: 30,
            page_delay: Duration::ZERO,
            tag_delay: Duration::ZERO,
        }
    }

    fn announced(mut article: Article) -> Article {
        article.organization = Some(ArticleOrganization {
            name: "The DEV Team".to_string(),
            username: "devteam".to_string(),
            profile_image_90: None,
        });
        article
    }

    /// 31 articles across two non-empty pages: ids 1-3 are announcements,
    /// 4-25 plain submissions, 26-31 unrelated posts without the marker.
    fn mixed_feed() -> Vec<Article> {
        (1..=31u64)
            .map(|id| {
                let mut article = sample(id);
                if id <= 3 {
                    article = announced(article);
                } else if id > 25 {
                    article.tag_list = vec!["webdev".to_string()];
                }
                article
            })
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_tag_end_to_end() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        let source = MockSource::paged(mixed_feed(), 30);

        let outcome = fetch_tag(&source, &store, "frontendchallenge", &options())
            .await
            .unwrap();

        let FetchOutcome::Saved(dataset) = outcome else {
            panic!("expected a saved dataset");
        };
        assert_eq!(dataset.submissions.len(), 22);
        assert_eq!(dataset.announcements.len(), 3);

        // Pages 1 and 2 carry data, page 3 terminates the walk.
        assert_eq!(source.call_count(), 3);

        let stored = store.load("frontendchallenge").await.unwrap();
        assert_eq!(stored.submissions.len(), 22);
        assert_eq!(stored.announcements.len(), 3);
        assert_eq!(store.list_tags().await, vec!["frontendchallenge".to_string()]);
        assert!(store.data_dir().join("frontendchallenge.json").exists());
        assert!(
            store
                .data_dir()
                .join("frontendchallenge-announcements.json")
                .exists()
        );
    }

    #[tokio::test]
    async fn test_fetch_tag_rejects_reserved_tag_before_any_request() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        let source = MockSource::new(vec![vec![sample(1)]]);

        let err = fetch_tag(&source, &store, "devchallenge", &options())
            .await
            .unwrap_err();

        assert!(matches!(err, ChallengeError::Validation(_)));
        assert_eq!(source.call_count(), 0);
        assert!(store.list_tags().await.is_empty());
        assert!(!store.data_dir().exists());
    }

    #[tokio::test]
    async fn test_fetch_tag_with_no_survivors_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        let mut unrelated = sample(1);
        unrelated.tag_list = vec!["rust".to_string()];
        let source = MockSource::new(vec![vec![unrelated]]);

        let outcome = fetch_tag(&source, &store, "frontendchallenge", &options())
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            FetchOutcome::NoValidSubmissions { scanned: 1 }
        ));
        assert!(store.load("frontendchallenge").await.is_none());
        assert!(store.list_tags().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_tag_backs_up_previous_dataset() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        let first = MockSource::new(vec![vec![sample(1)]]);
        fetch_tag(&first, &store, "frontendchallenge", &options())
            .await
            .unwrap();

        let second = MockSource::new(vec![vec![sample(1), sample(2)]]);
        update_tag(&second, &store, "frontendchallenge", &options())
            .await
            .unwrap();

        let backups: Vec<_> = std::fs::read_dir(dir.path().join("backup"))
            .unwrap()
            .collect();
        assert_eq!(backups.len(), 1);

        let stored = store.load("frontendchallenge").await.unwrap();
        assert_eq!(stored.submissions.len(), 2);
    }

    #[tokio::test]
    async fn test_update_tag_without_previous_data_skips_backup() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        let source = MockSource::new(vec![vec![sample(1)]]);

        update_tag(&source, &store, "frontendchallenge", &options())
            .await
            .unwrap();

        assert!(!dir.path().join("backup").exists());
    }

    #[tokio::test]
    async fn test_update_all_continues_past_failing_tag() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        store.index_add("achallenge").await.unwrap();
        store.index_add("bchallenge").await.unwrap();

        let source = MockSource::new(vec![])
            .with_tag_pages("bchallenge", vec![vec![sample(1), sample(2)]])
            .failing_for("achallenge");

        let report = update_all(&source, &store, &options()).await.unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.updated_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.total_submissions(), 2);

        assert_eq!(report.outcomes[0].tag, "achallenge");
        assert!(matches!(
            report.outcomes[0].status,
            UpdateStatus::Failed { .. }
        ));
        assert!(matches!(
            report.outcomes[1].status,
            UpdateStatus::Updated {
                submissions: 2,
                announcements: 0
            }
        ));

        // The failing tag wrote nothing; the healthy one is stored.
        assert!(store.load("achallenge").await.is_none());
        assert!(store.load("bchallenge").await.is_some());
    }

    #[tokio::test]
    async fn test_update_all_with_empty_index_is_an_error() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        let source = MockSource::new(vec![]);

        let err = update_all(&source, &store, &options()).await.unwrap_err();
        assert!(matches!(err, ChallengeError::NoKnownTags));
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_all_visits_tags_in_index_order() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        store.index_add("cchallenge").await.unwrap();
        store.index_add("achallenge").await.unwrap();
        store.index_add("bchallenge").await.unwrap();

        let source = MockSource::new(vec![]);
        update_all(&source, &store, &options()).await.unwrap();

        let visited: Vec<String> = source.calls().into_iter().map(|(tag, _)| tag).collect();
        assert_eq!(visited, vec!["achallenge", "bchallenge", "cchallenge"]);
    }
}
