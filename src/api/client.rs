// file: src/api/client.rs
// description: Forem REST client with sequential page walking
// reference: https://developers.forem.com/api/v1

use crate::config::ApiConfig;
use crate::error::{ChallengeError, Result};
use crate::models::Article;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Seam between the pipeline and the remote article listing. The pipeline
/// only ever asks for one page at a time, so tests can swap in an
/// in-memory source.
pub trait ArticleSource {
    fn fetch_page(
        &self,
        tag: &str,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<Vec<Article>>>;
}

#[derive(Debug, Clone)]
pub struct ForemClient {
    client: Client,
    base_url: String,
}

impl ForemClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl ArticleSource for ForemClient {
    async fn fetch_page(&self, tag: &str, page: u32, per_page: u32) -> Result<Vec<Article>> {
        let url = format!("{}/articles", self.base_url);

        debug!("Requesting page {} for tag {} ({} per page)", page, tag, per_page);

        let response = self
            .client
            .get(&url)
            .query(&[("tag", tag)])
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ChallengeError::Api { status, body });
        }

        let articles: Vec<Article> = response.json().await?;
        Ok(articles)
    }
}

/// Walks pages in order until the source returns an empty page, waiting
/// `page_delay` between requests to stay under upstream rate limits.
/// A failing page aborts the whole fetch; partial results are discarded.
pub async fn fetch_all_articles<S: ArticleSource>(
    source: &S,
    tag: &str,
    page_size: u32,
    page_delay: Duration,
) -> Result<Vec<Article>> {
    let mut all = Vec::new();
    let mut page = 1u32;

    loop {
        let articles = source.fetch_page(tag, page, page_size).await?;
        if articles.is_empty() {
            break;
        }
        all.extend(articles);
        page += 1;
        tokio::time::sleep(page_delay).await;
    }

    info!("Fetched {} articles for tag: {}", all.len(), tag);
    Ok(all)
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// In-memory [`ArticleSource`] that records every page request.
    pub(crate) struct MockSource {
        default_pages: Vec<Vec<Article>>,
        pages_by_tag: HashMap<String, Vec<Vec<Article>>>,
        fail_tags: HashSet<String>,
        fail_on_page: Option<u32>,
        calls: Mutex<Vec<(String, u32)>>,
    }

    impl MockSource {
        pub(crate) fn new(default_pages: Vec<Vec<Article>>) -> Self {
            Self {
                default_pages,
                pages_by_tag: HashMap::new(),
                fail_tags: HashSet::new(),
                fail_on_page: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Chunks a flat article list into pages of `per_page`.
        pub(crate) fn paged(articles: Vec<Article>, per_page: usize) -> Self {
            let pages = articles.chunks(per_page).map(<[Article]>::to_vec).collect();
            Self::new(pages)
        }

        pub(crate) fn with_tag_pages(mut self, tag: &str, pages: Vec<Vec<Article>>) -> Self {
            self.pages_by_tag.insert(tag.to_string(), pages);
            self
        }

        pub(crate) fn failing_for(mut self, tag: &str) -> Self {
            self.fail_tags.insert(tag.to_string());
            self
        }

        pub(crate) fn failing_on_page(mut self, page: u32) -> Self {
            self.fail_on_page = Some(page);
            self
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub(crate) fn calls(&self) -> Vec<(String, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ArticleSource for MockSource {
        async fn fetch_page(&self, tag: &str, page: u32, _per_page: u32) -> Result<Vec<Article>> {
            self.calls.lock().unwrap().push((tag.to_string(), page));

            if self.fail_tags.contains(tag) || self.fail_on_page == Some(page) {
                return Err(ChallengeError::Api {
                    status: 500,
                    body: "mock failure".to_string(),
                });
            }

            let pages = self.pages_by_tag.get(tag).unwrap_or(&self.default_pages);
            Ok(pages.get((page - 1) as usize).cloned().unwrap_or_default())
        }
    }
}
