// file: src/ranking/score.rs
// description: deterministic relevance scoring and dataset fingerprinting
// reference: weighted popularity/recency ranking (50/30/20)

use crate::models::Article;
use crate::ranking::cache::ScoreCache;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

const REACTION_WEIGHT: f64 = 50.0;
const COMMENT_WEIGHT: f64 = 30.0;
const RECENCY_WEIGHT: f64 = 20.0;

/// Order-sensitive fingerprint over the scoring-relevant fields. Any
/// change in membership, ordering, reactions, comments, or timestamps
/// produces a different value.
pub fn dataset_hash(articles: &[Article]) -> String {
    let joined = articles
        .iter()
        .map(|article| {
            format!(
                "{}-{}-{}-{}-{}",
                article.id,
                article.positive_reactions_count,
                article.comments_count,
                article
                    .edited_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
                article.published_at.to_rfc3339(),
            )
        })
        .collect::<Vec<_>>()
        .join("|");

    let mut hash: i32 = 0;
    for byte in joined.bytes() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(byte));
    }
    hash.to_string()
}

/// Scores every article relative to the best performers in the slice:
/// reactions and comments are normalized against the slice maxima, and
/// recency against the min/max activity window. When all articles share
/// one activity instant, each gets full recency credit.
pub fn compute_scores(articles: &[Article]) -> HashMap<u64, f64> {
    if articles.is_empty() {
        return HashMap::new();
    }

    let max_reactions = articles
        .iter()
        .map(|a| a.positive_reactions_count)
        .max()
        .unwrap_or(0);
    let max_comments = articles.iter().map(|a| a.comments_count).max().unwrap_or(0);

    let instants: Vec<i64> = articles
        .iter()
        .map(|a| a.recency_instant().timestamp_millis())
        .collect();
    let min_instant = instants.iter().copied().min().unwrap_or(0);
    let max_instant = instants.iter().copied().max().unwrap_or(0);

    let mut scores = HashMap::with_capacity(articles.len());
    for (article, instant) in articles.iter().zip(&instants) {
        let reaction_score = if max_reactions > 0 {
            f64::from(article.positive_reactions_count) / f64::from(max_reactions) * REACTION_WEIGHT
        } else {
            0.0
        };

        let comment_score = if max_comments > 0 {
            f64::from(article.comments_count) / f64::from(max_comments) * COMMENT_WEIGHT
        } else {
            0.0
        };

        let recency_score = if max_instant > min_instant {
            (instant - min_instant) as f64 / (max_instant - min_instant) as f64 * RECENCY_WEIGHT
        } else {
            RECENCY_WEIGHT
        };

        scores.insert(article.id, reaction_score + comment_score + recency_score);
    }

    scores
}

/// Stable descending sort by score; ties keep their input order. Articles
/// missing from the score map sort as zero.
pub fn sort_by_score(articles: &mut [Article], scores: &HashMap<u64, f64>) {
    articles.sort_by(|a, b| {
        let a_score = scores.get(&a.id).copied().unwrap_or(0.0);
        let b_score = scores.get(&b.id).copied().unwrap_or(0.0);
        b_score
            .partial_cmp(&a_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Scores for one tag's submissions, memoized on disk by content hash.
/// A cache hit skips recomputation entirely; a miss computes and stores.
pub fn relevance_scores(
    cache: &ScoreCache,
    tag: &str,
    articles: &[Article],
    now: DateTime<Utc>,
) -> HashMap<u64, f64> {
    let hash = dataset_hash(articles);

    if let Some(scores) = cache.get(tag, &hash, now) {
        debug!("Relevance cache hit for tag {}", tag);
        return scores;
    }

    let scores = compute_scores(articles);
    cache.put(tag, &hash, &scores, now);
    scores
}
