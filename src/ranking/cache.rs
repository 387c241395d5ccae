// file: src/ranking/cache.rs
// description: disk-backed relevance score cache keyed by tag and content hash
// reference: one JSON entry per tag with a 24h expiry window

use crate::config::CacheConfig;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
struct CachedScores {
    tag: String,
    data_hash: String,
    scores: Vec<ScoredArticle>,
    /// Write instant in epoch milliseconds.
    timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ScoredArticle {
    article_id: u64,
    score: f64,
}

/// One cache entry per tag under the cache directory. An entry is served
/// only while its content hash matches and its age stays inside the
/// expiry window; unreadable entries are deleted on sight.
#[derive(Debug, Clone)]
pub struct ScoreCache {
    dir: PathBuf,
    expiry_hours: u64,
}

impl ScoreCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            expiry_hours: config.expiry_hours,
        }
    }

    fn entry_path(&self, tag: &str) -> PathBuf {
        self.dir.join(format!("{tag}.json"))
    }

    fn max_age_ms(&self) -> i64 {
        self.expiry_hours as i64 * 60 * 60 * 1000
    }

    /// Returns the cached scores when the entry parses, carries the same
    /// content hash, and is no older than the expiry window at `now`.
    pub fn get(&self, tag: &str, hash: &str, now: DateTime<Utc>) -> Option<HashMap<u64, f64>> {
        let path = self.entry_path(tag);
        let contents = fs::read_to_string(&path).ok()?;

        let entry: CachedScores = match serde_json::from_str(&contents) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Evicting unreadable cache entry {}: {}", path.display(), e);
                let _ = fs::remove_file(&path);
                return None;
            }
        };

        if now.timestamp_millis() - entry.timestamp > self.max_age_ms() {
            return None;
        }
        if entry.data_hash != hash {
            return None;
        }

        Some(
            entry
                .scores
                .into_iter()
                .map(|s| (s.article_id, s.score))
                .collect(),
        )
    }

    /// Writes an entry for the tag. Failures are logged and swallowed;
    /// scoring works without the cache, just slower.
    pub fn put(&self, tag: &str, hash: &str, scores: &HashMap<u64, f64>, now: DateTime<Utc>) {
        let mut records: Vec<ScoredArticle> = scores
            .iter()
            .map(|(&article_id, &score)| ScoredArticle { article_id, score })
            .collect();
        records.sort_by_key(|record| record.article_id);

        let entry = CachedScores {
            tag: tag.to_string(),
            data_hash: hash.to_string(),
            scores: records,
            timestamp: now.timestamp_millis(),
        };

        if let Err(e) = self.write_entry(tag, &entry) {
            warn!("Failed to cache relevance scores for {}: {}", tag, e);
        }
    }

    fn write_entry(&self, tag: &str, entry: &CachedScores) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let contents = serde_json::to_string_pretty(entry)?;
        fs::write(self.entry_path(tag), contents)?;
        Ok(())
    }

    /// Deletes every entry past the expiry window, plus any entry that no
    /// longer parses. Content hashes are not consulted. Returns the number
    /// of files removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> Result<usize> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if self.should_evict(&path, now) {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }

        if removed > 0 {
            debug!("Swept {} stale relevance cache entries", removed);
        }
        Ok(removed)
    }

    fn should_evict(&self, path: &Path, now: DateTime<Utc>) -> bool {
        let Ok(contents) = fs::read_to_string(path) else {
            return true;
        };
        match serde_json::from_str::<CachedScores>(&contents) {
            Ok(entry) => now.timestamp_millis() - entry.timestamp > self.max_age_ms(),
            Err(_) => true,
        }
    }
}
