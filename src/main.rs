// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use challenge_sync::mcp::ChallengeMcp;
use challenge_sync::pipeline::removal::{self, RemovalDecision};
use challenge_sync::pipeline::sync::{self, FetchOutcome, SyncOptions, UpdateStatus};
use challenge_sync::ranking::{ScoreCache, relevance_scores, sort_by_score};
use challenge_sync::storage::DataStore;
use challenge_sync::utils::logging::{format_error, format_info, format_success, format_warning};
use challenge_sync::{Config, ForemClient, MARKER_TAG};
use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand};
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "challenge_sync")]
#[command(version = "0.1.0")]
#[command(
    about = "Aggregates dev.to challenge submissions with relevance ranking",
    long_about = None
)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch submissions for a challenge tag and store them as JSON
    Fetch {
        tag: String,
    },

    /// Re-fetch one tag, or every known tag when no tag is given
    Update {
        tag: Option<String>,
    },

    /// Remove a tag's stored data (a backup is taken first)
    Remove {
        tag: String,

        #[arg(long, action = ArgAction::SetTrue)]
        yes: bool,
    },

    /// List all tags with stored data
    List,

    Stats,

    /// Show a tag's submissions ranked by relevance score
    Rank {
        tag: String,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Delete expired relevance cache entries
    Sweep,

    /// Start MCP (Model Context Protocol) server for agentic tool integration
    Mcp {
        #[arg(long, default_value = "stdio")]
        transport: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    challenge_sync::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Challenge Sync");
    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    match cli.command {
        Commands::Fetch { tag } => {
            cmd_fetch(&config, &tag).await?;
        }
        Commands::Update { tag } => {
            cmd_update(&config, tag.as_deref()).await?;
        }
        Commands::Remove { tag, yes } => {
            cmd_remove(&config, &tag, yes).await?;
        }
        Commands::List => {
            cmd_list(&config).await?;
        }
        Commands::Stats => {
            cmd_stats(&config).await?;
        }
        Commands::Rank { tag, limit } => {
            cmd_rank(&config, &tag, limit).await?;
        }
        Commands::Sweep => {
            cmd_sweep(&config)?;
        }
        Commands::Mcp { transport } => {
            cmd_mcp(&config, &transport).await?;
        }
    }

    Ok(())
}

async fn cmd_fetch(config: &Config, tag: &str) -> Result<()> {
    info!("Fetching submissions for tag: {}", tag);

    let client = ForemClient::new(&config.api);
    let store = DataStore::new(&config.storage);
    let options = SyncOptions::from_api(&config.api);

    match sync::fetch_tag(&client, &store, tag, &options).await? {
        FetchOutcome::Saved(dataset) => {
            println!(
                "{}",
                format_success(&format!(
                    "Fetched {} submissions and {} announcements for tag: {}",
                    dataset.submissions.len(),
                    dataset.announcements.len(),
                    dataset.tag
                ))
            );
        }
        FetchOutcome::NoValidSubmissions { scanned } => {
            println!(
                "{}",
                format_warning(&format!(
                    "No valid challenge submissions found for tag: {} ({} articles scanned). \
                     Submissions must also carry the \"{}\" tag.",
                    tag, scanned, MARKER_TAG
                ))
            );
        }
    }

    Ok(())
}

async fn cmd_update(config: &Config, tag: Option<&str>) -> Result<()> {
    let client = ForemClient::new(&config.api);
    let store = DataStore::new(&config.storage);
    let options = SyncOptions::from_api(&config.api);

    match tag {
        Some(tag) => {
            info!("Updating tag: {}", tag);
            match sync::update_tag(&client, &store, tag, &options).await? {
                FetchOutcome::Saved(dataset) => {
                    println!(
                        "{}",
                        format_success(&format!(
                            "Updated {}: {} submissions, {} announcements",
                            dataset.tag,
                            dataset.submissions.len(),
                            dataset.announcements.len()
                        ))
                    );
                }
                FetchOutcome::NoValidSubmissions { scanned } => {
                    println!(
                        "{}",
                        format_warning(&format!(
                            "No valid submissions for {}; kept existing data ({} articles scanned)",
                            tag, scanned
                        ))
                    );
                }
            }
        }
        None => {
            info!("Updating all known tags");
            let report = sync::update_all(&client, &store, &options).await?;

            for outcome in &report.outcomes {
                match &outcome.status {
                    UpdateStatus::Updated {
                        submissions,
                        announcements,
                    } => {
                        println!(
                            "{}",
                            format_success(&format!(
                                "{}: {} submissions, {} announcements",
                                outcome.tag, submissions, announcements
                            ))
                        );
                    }
                    UpdateStatus::NoSubmissions { scanned } => {
                        println!(
                            "{}",
                            format_warning(&format!(
                                "{}: no valid submissions ({} articles scanned)",
                                outcome.tag, scanned
                            ))
                        );
                    }
                    UpdateStatus::Failed { error } => {
                        println!(
                            "{}",
                            format_error(&format!("{}: {}", outcome.tag, error))
                        );
                    }
                }
            }

            println!(
                "\nUpdated {}/{} tags ({} submissions total)",
                report.updated_count(),
                report.outcomes.len(),
                report.total_submissions()
            );
        }
    }

    Ok(())
}

async fn cmd_remove(config: &Config, tag: &str, assume_yes: bool) -> Result<()> {
    let store = DataStore::new(&config.storage);
    let available = store.list_tags().await;

    // Only prompt when there is actually something to remove.
    let confirmed = if available.iter().any(|t| t == tag) {
        assume_yes || confirm_removal(tag)?
    } else {
        false
    };

    match removal::plan_removal(&available, tag, confirmed) {
        RemovalDecision::NotTracked => {
            error!("No stored data for tag: {}", tag);
            if !available.is_empty() {
                println!("Available tags: {}", available.join(", "));
            }
            return Err(anyhow::anyhow!("nothing to remove for tag: {}", tag));
        }
        RemovalDecision::Declined => {
            println!("Removal aborted");
        }
        RemovalDecision::Proceed => {
            removal::remove_tag(&store, tag).await?;
            println!(
                "{}",
                format_success(&format!("Removed stored data for tag: {}", tag))
            );
        }
    }

    Ok(())
}

fn confirm_removal(tag: &str) -> Result<bool> {
    print!("Remove stored submissions and announcements for \"{}\"? [y/N] ", tag);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

async fn cmd_list(config: &Config) -> Result<()> {
    let store = DataStore::new(&config.storage);
    let tags = store.list_tags().await;

    if tags.is_empty() {
        println!(
            "{}",
            format_info("No tags stored yet. Run fetch <tag> to add one.")
        );
        return Ok(());
    }

    for tag in tags {
        println!("{tag}");
    }

    Ok(())
}

async fn cmd_stats(config: &Config) -> Result<()> {
    info!("Gathering statistics");

    let store = DataStore::new(&config.storage);
    let datasets = store.load_all().await;

    if datasets.is_empty() {
        println!("{}", format_info("No stored datasets."));
        return Ok(());
    }

    println!(
        "{:<28} {:>12} {:>14}  {}",
        "TAG", "SUBMISSIONS", "ANNOUNCEMENTS", "FETCHED AT"
    );
    for dataset in &datasets {
        println!(
            "{:<28} {:>12} {:>14}  {}",
            dataset.tag,
            dataset.submissions.len(),
            dataset.announcements.len(),
            dataset.fetched_at.format("%Y-%m-%d %H:%M UTC")
        );
    }

    let total_submissions: usize = datasets.iter().map(|d| d.submissions.len()).sum();
    let total_announcements: usize = datasets.iter().map(|d| d.announcements.len()).sum();
    println!(
        "\nTotal: {} tags, {} submissions, {} announcements",
        datasets.len(),
        total_submissions,
        total_announcements
    );

    Ok(())
}

async fn cmd_rank(config: &Config, tag: &str, limit: usize) -> Result<()> {
    let store = DataStore::new(&config.storage);

    let Some(dataset) = store.load(tag).await else {
        error!("No data found for tag: {}", tag);
        return Err(anyhow::anyhow!(
            "no data found for tag: {tag}; run fetch {tag} first"
        ));
    };

    if dataset.submissions.is_empty() {
        println!("No submissions stored for tag: {}", tag);
        return Ok(());
    }

    let cache = ScoreCache::new(&config.cache);
    let scores = relevance_scores(&cache, tag, &dataset.submissions, Utc::now());
    let mut ranked = dataset.submissions;
    sort_by_score(&mut ranked, &scores);

    println!("\nTop submissions for \"{}\"\n", tag);
    println!("{}", "=".repeat(80));

    for (idx, article) in ranked.iter().take(limit).enumerate() {
        let score = scores.get(&article.id).copied().unwrap_or(0.0);
        println!("\n{}. {} (Score: {:.1})", idx + 1, article.title, score);
        println!(
            "   {} reactions | {} comments | by @{}",
            article.positive_reactions_count, article.comments_count, article.user.username
        );
        println!("   {}", article.url);
    }

    println!("\n{}", "=".repeat(80));
    Ok(())
}

fn cmd_sweep(config: &Config) -> Result<()> {
    info!("Sweeping relevance cache");

    let cache = ScoreCache::new(&config.cache);
    let removed = cache.sweep(Utc::now())?;

    println!(
        "{}",
        format_success(&format!("Removed {} stale cache entries", removed))
    );
    Ok(())
}

async fn cmd_mcp(config: &Config, transport: &str) -> Result<()> {
    info!("Starting MCP server (transport: {})", transport);

    if transport != "stdio" {
        error!("Only stdio transport is currently supported");
        return Err(anyhow::anyhow!("Unsupported transport: {}", transport));
    }

    let server = ChallengeMcp::new(config);

    info!("MCP server ready. Available tools:");
    for tool in server.get_tool_router().list_all() {
        info!(
            "  - {}: {}",
            tool.name,
            tool.description.as_deref().unwrap_or("No description")
        );
    }

    let service = server
        .serve(stdio())
        .await
        .context("Failed to start MCP stdio transport")?;
    service.waiting().await?;

    Ok(())
}
