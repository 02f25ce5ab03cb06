use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rmcp::{transport::stdio, ServiceExt};
use terragrunt_mcp::config::{self, RepoLocation, ServerConfig};
use terragrunt_mcp::credential::{self, ProcessEnv};
use terragrunt_mcp::github::OctocrabConnector;
use terragrunt_mcp::logging::{self, LoggingConfig};
use terragrunt_mcp::server::TerragruntMcpServer;

/// MCP server for Terragrunt: lets LLMs read the Terragrunt docs and open GitHub issues.
///
/// The GitHub token is read on every tool call from GITHUB_TOKEN, GH_TOKEN, or
/// GITHUB_PERSONAL_ACCESS_TOKEN.
#[derive(Parser)]
#[command(name = "terragrunt-mcp", version, about)]
struct Cli {
    /// Owner of the repository holding the docs and issues
    #[arg(long, env = "TERRAGRUNT_MCP_OWNER", default_value = config::DEFAULT_OWNER)]
    owner: String,

    /// Repository holding the docs and issues
    #[arg(long, env = "TERRAGRUNT_MCP_REPO", default_value = config::DEFAULT_REPO)]
    repo: String,

    /// Directory whose subdirectories are the documentation categories
    #[arg(long, env = "TERRAGRUNT_MCP_DOCS_ROOT", default_value = config::DEFAULT_DOCS_ROOT)]
    docs_root: String,

    /// Branch, tag, or SHA to read docs from (default: the repo's default branch)
    #[arg(long = "git-ref", env = "TERRAGRUNT_MCP_REF")]
    git_ref: Option<String>,

    /// Issues per API page (max 100)
    #[arg(long, env = "TERRAGRUNT_MCP_PER_PAGE", default_value_t = config::DEFAULT_PER_PAGE)]
    per_page: u32,

    /// Upper bound on pages read when fetching all open issues
    #[arg(
        long,
        env = "TERRAGRUNT_MCP_MAX_ISSUE_PAGES",
        default_value_t = config::DEFAULT_MAX_ISSUE_PAGES
    )]
    max_issue_pages: u32,

    /// Log filter directive (RUST_LOG overrides it)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also write logs to this file
    #[arg(long, env = "LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init(&LoggingConfig {
        level: cli.log_level.clone(),
        file: cli.log_file.clone(),
    })?;

    let config = ServerConfig::new(
        RepoLocation {
            owner: cli.owner,
            name: cli.repo,
            git_ref: cli.git_ref,
        },
        &cli.docs_root,
        cli.per_page,
        cli.max_issue_pages,
    )?;

    if let Err(e) = credential::resolve(&ProcessEnv) {
        tracing::warn!(error = %e, "No usable GitHub token yet, tool calls will fail until one is set");
    }

    tracing::info!(
        owner = %config.repo.owner,
        repo = %config.repo.name,
        docs_root = %config.docs_root,
        per_page = config.per_page,
        max_issue_pages = config.max_issue_pages,
        "Starting terragrunt-mcp server"
    );

    let connector = Arc::new(OctocrabConnector::new(config.repo.clone()));
    let service = TerragruntMcpServer::new(config, Arc::new(ProcessEnv), connector)?;
    let running = service.serve(stdio()).await?;
    running.waiting().await?;

    Ok(())
}
