// file: src/pipeline/classifier.rs
// description: query-tag validation and submission/announcement partitioning
// reference: https://dev.to/t/devchallenge

use crate::error::{ChallengeError, Result};
use crate::models::Article;
use tracing::debug;

/// Tag every genuine challenge entry must carry in addition to the
/// challenge-specific tag it was fetched under.
pub const MARKER_TAG: &str = "devchallenge";

/// Umbrella tag spanning all challenges; too broad to fetch directly.
pub const RESERVED_TAG: &str = "devchallenge";

/// Suffix every queryable challenge tag must end with.
pub const REQUIRED_SUFFIX: &str = "challenge";

/// Organization username whose posts are official announcements rather
/// than submissions.
pub const ANNOUNCEMENT_ORG: &str = "devteam";

/// Rejects query tags that are empty, reserved, or not challenge-shaped.
/// Matching is case-insensitive; the error message names the violated rule.
pub fn validate_tag(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(ChallengeError::Validation(
            "Tag must not be empty".to_string(),
        ));
    }

    let lower = tag.to_lowercase();

    if lower == RESERVED_TAG {
        return Err(ChallengeError::Validation(format!(
            "Cannot fetch \"{RESERVED_TAG}\" directly - it contains too many submissions. \
             Use specific challenge tags like \"frontendchallenge\" or \"algoliachallenge\"."
        )));
    }

    if !lower.ends_with(REQUIRED_SUFFIX) {
        return Err(ChallengeError::Validation(format!(
            "Invalid tag \"{tag}\" - only challenge tags ending with \"{REQUIRED_SUFFIX}\" \
             are allowed. Examples: frontendchallenge, algoliachallenge, reactchallenge"
        )));
    }

    Ok(())
}

#[derive(Debug, Default)]
pub struct Classified {
    pub submissions: Vec<Article>,
    pub announcements: Vec<Article>,
}

impl Classified {
    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty() && self.announcements.is_empty()
    }

    pub fn retained(&self) -> usize {
        self.submissions.len() + self.announcements.len()
    }
}

/// Splits raw articles into submissions and announcements, dropping
/// everything without the marker tag. Relative order is preserved in
/// both partitions.
pub fn classify(articles: Vec<Article>) -> Classified {
    let total = articles.len();
    let mut classified = Classified::default();

    for article in articles {
        if !article.has_tag(MARKER_TAG) {
            debug!(
                "Dropping article {} without {} tag: {}",
                article.id, MARKER_TAG, article.title
            );
            continue;
        }

        if article.organization_username() == Some(ANNOUNCEMENT_ORG) {
            classified.announcements.push(article);
        } else {
            classified.submissions.push(article);
        }
    }

    debug!(
        "Classified {} of {} articles ({} submissions, {} announcements)",
        classified.retained(),
        total,
        classified.submissions.len(),
        classified.announcements.len()
    );

    classified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleOrganization;
    use crate::models::article::sample;
    use pretty_assertions::assert_eq;

    fn announcement(id: u64) -> Article {
        let mut article = sample(id);
        article.organization = Some(ArticleOrganization {
            name: "The DEV Team".to_string(),
            username: "devteam".to_string(),
            profile_image_90: None,
        });
        article
    }

    #[test]
    fn test_validate_accepts_challenge_tags() {
        assert!(validate_tag("reactchallenge").is_ok());
        assert!(validate_tag("AlgoliaChallenge").is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_tag() {
        let err = validate_tag("").unwrap_err();
        assert!(matches!(err, ChallengeError::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_reserved_tag() {
        for tag in ["devchallenge", "DevChallenge", "DEVCHALLENGE"] {
            let err = validate_tag(tag).unwrap_err();
            assert!(
                err.to_string().contains("too many submissions"),
                "unexpected message for {tag}: {err}"
            );
        }
    }

    #[test]
    fn test_validate_rejects_missing_suffix() {
        let err = validate_tag("react").unwrap_err();
        assert!(err.to_string().contains("ending with \"challenge\""));
    }

    #[test]
    fn test_classify_partitions_by_organization() {
        let articles = vec![sample(1), announcement(2), sample(3), announcement(4)];

        let classified = classify(articles);

        let submission_ids: Vec<u64> = classified.submissions.iter().map(|a| a.id).collect();
        let announcement_ids: Vec<u64> = classified.announcements.iter().map(|a| a.id).collect();
        assert_eq!(submission_ids, vec![1, 3]);
        assert_eq!(announcement_ids, vec![2, 4]);
    }

    #[test]
    fn test_classify_drops_articles_without_marker() {
        let mut unrelated = sample(2);
        unrelated.tag_list = vec!["rust".to_string(), "webdev".to_string()];

        let classified = classify(vec![sample(1), unrelated]);

        assert_eq!(classified.retained(), 1);
        assert_eq!(classified.submissions[0].id, 1);
    }

    #[test]
    fn test_classify_matches_marker_case_insensitively() {
        let mut mixed_case = sample(1);
        mixed_case.tag_list = vec!["DevChallenge".to_string()];

        let classified = classify(vec![mixed_case]);

        assert_eq!(classified.submissions.len(), 1);
    }

    #[test]
    fn test_classify_other_organizations_are_submissions() {
        let mut sponsored = sample(1);
        sponsored.organization = Some(ArticleOrganization {
            name: "Some Sponsor".to_string(),
            username: "sponsor".to_string(),
            profile_image_90: None,
        });

        let classified = classify(vec![sponsored]);

        assert_eq!(classified.submissions.len(), 1);
        assert!(classified.announcements.is_empty());
    }

    #[test]
    fn test_classify_empty_input() {
        let classified = classify(vec![]);
        assert!(classified.is_empty());
    }
}
