// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod api;
pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod pipeline;
pub mod ranking;
pub mod storage;
pub mod utils;

pub use api::{ArticleSource, ForemClient, fetch_all_articles};
pub use config::{ApiConfig, CacheConfig, Config, StorageConfig};
pub use error::{ChallengeError, Result};
pub use mcp::ChallengeMcp;
pub use models::{Article, ArticleOrganization, ArticleUser, TagDataset};
pub use pipeline::{
    Classified, FetchOutcome, MARKER_TAG, RemovalDecision, SyncOptions, UpdateReport,
    UpdateStatus, classify, fetch_tag, plan_removal, remove_tag, update_all, update_tag,
    validate_tag,
};
pub use ranking::{ScoreCache, compute_scores, dataset_hash, relevance_scores, sort_by_score};
pub use storage::DataStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _config = Config::default_config();
        let _decision = plan_removal(&[], "anychallenge", true);
    }
}
