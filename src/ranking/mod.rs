// file: src/ranking/mod.rs
// description: relevance scoring module exports
// reference: internal module structure

pub mod cache;
pub mod score;

pub use cache::ScoreCache;
pub use score::{compute_scores, dataset_hash, relevance_scores, sort_by_score};
