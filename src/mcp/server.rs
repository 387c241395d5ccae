// file: src/mcp/server.rs
// description: MCP server exposing challenge submission tools
// reference: https://docs.rs/rmcp

use crate::api::client::ForemClient;
use crate::config::Config;
use crate::pipeline::sync::{self, FetchOutcome, SyncOptions};
use crate::storage::DataStore;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TagParams {
    /// Challenge tag to operate on, e.g. "frontendchallenge".
    pub tag: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateParams {
    /// Specific tag to update; when omitted, every known tag is updated.
    pub tag: Option<String>,
}

/// Tool server over the same pipeline the CLI uses. Domain failures
/// (unknown tags, validation, upstream errors) come back as tool-level
/// error results with a JSON body; protocol errors are left to rmcp.
#[derive(Clone)]
pub struct ChallengeMcp {
    client: ForemClient,
    store: DataStore,
    options: SyncOptions,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ChallengeMcp {
    pub fn new(config: &Config) -> Self {
        Self {
            client: ForemClient::new(&config.api),
            store: DataStore::new(&config.storage),
            options: SyncOptions::from_api(&config.api),
            tool_router: Self::tool_router(),
        }
    }

    pub fn get_tool_router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    #[tool(
        description = "Get a list of all existing challenge tags that have been fetched and stored"
    )]
    async fn get_existing_tags(&self) -> Result<CallToolResult, McpError> {
        info!("MCP: Listing existing tags");

        let tags = self.store.list_tags().await;
        let message = if tags.is_empty() {
            "No challenge tags stored yet. Use fetch_submissions to add one.".to_string()
        } else {
            format!("Found {} existing challenge tags", tags.len())
        };

        let payload = json!({
            "count": tags.len(),
            "tags": tags,
            "message": message,
        });
        Ok(CallToolResult::success(vec![Content::text(pretty(
            &payload,
        ))]))
    }

    #[tool(description = "Get stored challenge submissions and announcements for a specific tag")]
    async fn get_tag_submissions(
        &self,
        Parameters(params): Parameters<TagParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: Getting submissions for tag {}", params.tag);

        match self.store.load(&params.tag).await {
            Some(dataset) => {
                let payload = json!({
                    "tag": dataset.tag,
                    "submissions_count": dataset.submissions.len(),
                    "announcements_count": dataset.announcements.len(),
                    "fetched_at": dataset.fetched_at,
                    "submissions": dataset.submissions,
                    "announcements": dataset.announcements,
                });
                Ok(CallToolResult::success(vec![Content::text(pretty(
                    &payload,
                ))]))
            }
            None => {
                let payload = json!({
                    "error": format!("No data found for tag: {}", params.tag),
                    "available_tags": self.store.list_tags().await,
                    "suggestion": format!(
                        "Use fetch_submissions with tag \"{}\" to fetch it first",
                        params.tag
                    ),
                });
                Ok(CallToolResult::error(vec![Content::text(pretty(
                    &payload,
                ))]))
            }
        }
    }

    #[tool(description = "Get stored submissions for every known challenge tag at once")]
    async fn get_all_submissions(&self) -> Result<CallToolResult, McpError> {
        info!("MCP: Getting submissions for all tags");

        let datasets = self.store.load_all().await;
        let total_submissions: usize = datasets.iter().map(|d| d.submissions.len()).sum();
        let total_announcements: usize = datasets.iter().map(|d| d.announcements.len()).sum();

        let payload = json!({
            "total_tags": datasets.len(),
            "total_submissions": total_submissions,
            "total_announcements": total_announcements,
            "tags_data": datasets,
        });
        Ok(CallToolResult::success(vec![Content::text(pretty(
            &payload,
        ))]))
    }

    #[tool(
        description = "Fetch fresh challenge submissions for a tag from dev.to and store them as JSON"
    )]
    async fn fetch_submissions(
        &self,
        Parameters(params): Parameters<TagParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: Fetching submissions for tag {}", params.tag);

        match sync::fetch_tag(&self.client, &self.store, &params.tag, &self.options).await {
            Ok(FetchOutcome::Saved(dataset)) => {
                let payload = json!({
                    "success": true,
                    "message": format!(
                        "Fetched {} submissions and {} announcements for tag: {}",
                        dataset.submissions.len(),
                        dataset.announcements.len(),
                        dataset.tag
                    ),
                    "tag": dataset.tag,
                    "submissions_count": dataset.submissions.len(),
                    "announcements_count": dataset.announcements.len(),
                    "fetched_at": dataset.fetched_at,
                    "submissions": dataset.submissions,
                });
                Ok(CallToolResult::success(vec![Content::text(pretty(
                    &payload,
                ))]))
            }
            Ok(FetchOutcome::NoValidSubmissions { scanned }) => {
                let payload = json!({
                    "success": true,
                    "tag": params.tag,
                    "submissions_count": 0,
                    "message": format!(
                        "No valid challenge submissions found for tag: {} ({} articles scanned). \
                         Submissions must also carry the \"devchallenge\" tag.",
                        params.tag, scanned
                    ),
                });
                Ok(CallToolResult::success(vec![Content::text(pretty(
                    &payload,
                ))]))
            }
            Err(e) => Ok(tool_failure(&e.to_string())),
        }
    }

    #[tool(
        description = "Re-fetch stored challenge data; pass a tag for one challenge or omit it to update all known tags"
    )]
    async fn update_submissions(
        &self,
        Parameters(params): Parameters<UpdateParams>,
    ) -> Result<CallToolResult, McpError> {
        match params.tag {
            Some(tag) => {
                info!("MCP: Updating submissions for tag {}", tag);
                match sync::update_tag(&self.client, &self.store, &tag, &self.options).await {
                    Ok(FetchOutcome::Saved(dataset)) => {
                        let payload = json!({
                            "success": true,
                            "message": format!("Updated submissions for tag: {}", dataset.tag),
                            "tag": dataset.tag,
                            "submissions_count": dataset.submissions.len(),
                            "announcements_count": dataset.announcements.len(),
                            "fetched_at": dataset.fetched_at,
                        });
                        Ok(CallToolResult::success(vec![Content::text(pretty(
                            &payload,
                        ))]))
                    }
                    Ok(FetchOutcome::NoValidSubmissions { scanned }) => {
                        let payload = json!({
                            "success": true,
                            "tag": tag,
                            "submissions_count": 0,
                            "message": format!(
                                "No valid challenge submissions found for tag: {} \
                                 ({} articles scanned)",
                                tag, scanned
                            ),
                        });
                        Ok(CallToolResult::success(vec![Content::text(pretty(
                            &payload,
                        ))]))
                    }
                    Err(e) => Ok(tool_failure(&e.to_string())),
                }
            }
            None => {
                info!("MCP: Updating submissions for all known tags");
                match sync::update_all(&self.client, &self.store, &self.options).await {
                    Ok(report) => {
                        let payload = json!({
                            "success": true,
                            "message": format!(
                                "Updated {} of {} tags",
                                report.updated_count(),
                                report.outcomes.len()
                            ),
                            "total_tags_updated": report.updated_count(),
                            "total_submissions": report.total_submissions(),
                            "outcomes": report.outcomes,
                        });
                        Ok(CallToolResult::success(vec![Content::text(pretty(
                            &payload,
                        ))]))
                    }
                    Err(e) => Ok(tool_failure(&e.to_string())),
                }
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for ChallengeMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Fetch, query, and update dev.to challenge submissions stored as local JSON. \
                 Start with get_existing_tags to see what is already available."
                    .to_string(),
            ),
        }
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn tool_failure(message: &str) -> CallToolResult {
    let payload = json!({ "error": message });
    CallToolResult::error(vec![Content::text(pretty(&payload))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, CacheConfig, StorageConfig};
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> Config {
        Config {
            api: ApiConfig {
                base_url: "https://dev.to/api".to_string(),
                page_size: 30,
                page_delay_ms: 0,
                tag_delay_ms: 0,
            },
            storage: StorageConfig {
                data_dir: dir.path().join("data"),
                backup_dir: dir.path().join("backup"),
            },
            cache: CacheConfig {
                dir: dir.path().join("cache"),
                expiry_hours: 24,
            },
        }
    }

    #[test]
    fn test_router_exposes_all_tools() {
        let dir = TempDir::new().unwrap();
        let server = ChallengeMcp::new(&test_config(&dir));

        let mut names: Vec<String> = server
            .get_tool_router()
            .list_all()
            .iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();

        assert_eq!(
            names,
            vec![
                "fetch_submissions",
                "get_all_submissions",
                "get_existing_tags",
                "get_tag_submissions",
                "update_submissions",
            ]
        );
    }

    #[tokio::test]
    async fn test_get_tag_submissions_unknown_tag_is_tool_error() {
        let dir = TempDir::new().unwrap();
        let server = ChallengeMcp::new(&test_config(&dir));

        let result = server
            .get_tag_submissions(Parameters(TagParams {
                tag: "missingchallenge".to_string(),
            }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn test_get_existing_tags_on_empty_store() {
        let dir = TempDir::new().unwrap();
        let server = ChallengeMcp::new(&test_config(&dir));

        let result = server.get_existing_tags().await.unwrap();
        assert_ne!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn test_fetch_submissions_rejects_reserved_tag() {
        let dir = TempDir::new().unwrap();
        let server = ChallengeMcp::new(&test_config(&dir));

        // Validation fires before any network access.
        let result = server
            .fetch_submissions(Parameters(TagParams {
                tag: "devchallenge".to_string(),
            }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
    }
}
