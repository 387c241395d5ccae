// file: src/models/article.rs
// description: Forem article model with classification and recency helpers
// reference: https://developers.forem.com/api/v1

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleUser {
    pub name: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_90: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleOrganization {
    pub name: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_90: Option<String>,
}

/// One article as returned by the Forem `/articles` endpoint. Unknown
/// upstream fields are ignored on deserialization; optional fields are
/// omitted again when the article is written back to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readable_publish_date: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    pub comments_count: u32,
    pub positive_reactions_count: u32,
    #[serde(default)]
    pub public_reactions_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_time_minutes: Option<u32>,
    #[serde(default)]
    pub tag_list: Vec<String>,
    pub user: ArticleUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<ArticleOrganization>,
}

impl Article {
    /// Latest activity instant: the later of the edit and publish times.
    pub fn recency_instant(&self) -> DateTime<Utc> {
        match self.edited_at {
            Some(edited) => edited.max(self.published_at),
            None => self.published_at,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag_list.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn organization_username(&self) -> Option<&str> {
        self.organization.as_ref().map(|org| org.username.as_str())
    }
}

#[cfg(test)]
pub(crate) fn sample(id: u64) -> Article {
    use chrono::TimeZone;

    Article {
        id,
        title: format!("Entry {id}"),
        description: String::new(),
        url: format!("https://dev.to/someone/entry-{id}"),
        cover_image: None,
        readable_publish_date: None,
        published_at: Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap(),
        edited_at: None,
        comments_count: 0,
        positive_reactions_count: 0,
        public_reactions_count: 0,
        reading_time_minutes: Some(3),
        tag_list: vec!["devchallenge".to_string()],
        user: ArticleUser {
            name: "Sample Author".to_string(),
            username: format!("author{id}"),
            profile_image_90: None,
        },
        organization: None,
    }
}
