//! Tool dispatch: lookup, credential, validation, invocation, formatting.
//!
//! Every outcome is a [`CallToolResult`] with at least one text block. Failures are reported as
//! `Error handling <tool>: <message>` (or `Unknown tool: <name>`) with `is_error` set, and never
//! as protocol errors.

use std::sync::Arc;

use rmcp::model::{CallToolResult, Content};
use tracing::Instrument;

use crate::config::ServerConfig;
use crate::credential::{self, EnvSource};
use crate::docs::{no_documents_message, Category, Document, DocumentationClient};
use crate::error::{Result, TerragruntMcpError};
use crate::github::{GithubApi, GithubConnector};
use crate::issues::{Issue, IssueClient};
use crate::tools::{ToolCall, ToolDefinition, ToolRegistry};
use crate::validation::JsonObject;

pub const NO_CATEGORIES_MESSAGE: &str = "No documentation categories found.";
pub const NO_OPEN_ISSUES_MESSAGE: &str = "No open issues found.";

pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    config: Arc<ServerConfig>,
    env: Arc<dyn EnvSource>,
    connector: Arc<dyn GithubConnector>,
}

impl ToolDispatcher {
    pub fn new(
        config: ServerConfig,
        env: Arc<dyn EnvSource>,
        connector: Arc<dyn GithubConnector>,
    ) -> Result<Self> {
        Ok(Self {
            registry: Arc::new(ToolRegistry::new()?),
            config: Arc::new(config),
            env,
            connector,
        })
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn dispatch(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let Some(definition) = self.registry.get(name) else {
            tracing::warn!(tool = name, "Call to unknown tool");
            let message = TerragruntMcpError::UnknownTool(name.to_string()).to_string();
            return CallToolResult::error(vec![Content::text(message)]);
        };

        let span = tracing::info_span!("tool_call", tool = name);
        let outcome = self
            .run(definition, arguments.unwrap_or_default())
            .instrument(span)
            .await;

        match outcome {
            Ok(blocks) => {
                tracing::info!(tool = name, blocks = blocks.len(), "Tool call succeeded");
                CallToolResult::success(blocks.into_iter().map(Content::text).collect())
            }
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "Tool call failed");
                CallToolResult::error(vec![Content::text(format!(
                    "Error handling {}: {}",
                    name, e
                ))])
            }
        }
    }

    async fn run(&self, definition: &ToolDefinition, arguments: JsonObject) -> Result<Vec<String>> {
        let credential = credential::resolve(self.env.as_ref())?;
        tracing::debug!("Credential resolved");

        let call = definition.validate(&arguments)?;
        tracing::debug!(?call, "Arguments validated");

        let api = self.connector.connect(&credential)?;
        self.invoke(call, api).await
    }

    async fn invoke(&self, call: ToolCall, api: GithubApi) -> Result<Vec<String>> {
        match call {
            ToolCall::ListDocCategories => {
                let categories = self.docs(&api).list_categories().await?;
                Ok(format_categories(&categories))
            }
            ToolCall::ListAllDocsByCategory(args) => {
                let documents = self.docs(&api).list_documents(args.category()).await?;
                Ok(format_documents(args.category(), &documents))
            }
            ToolCall::ReadDocumentFromCategory(args) => {
                let document = self
                    .docs(&api)
                    .get_document(args.category(), args.document())
                    .await?;
                Ok(vec![document.content])
            }
            ToolCall::ReadAllDocsFromCategory(args) => {
                let merged = self
                    .docs(&api)
                    .get_merged_documents(args.category())
                    .await?;
                Ok(vec![merged])
            }
            ToolCall::GetAllOpenIssues(args) => {
                let client = IssueClient::new(
                    api.issues.clone(),
                    self.config.per_page,
                    self.config.max_issue_pages,
                );
                let issues = if args.all() {
                    client.all_open_issues().await?
                } else {
                    client.open_issues().await?
                };
                Ok(vec![format_issues(&issues)])
            }
        }
    }

    fn docs(&self, api: &GithubApi) -> DocumentationClient {
        DocumentationClient::new(api.contents.clone(), self.config.docs_root.clone())
    }
}

fn format_categories(categories: &[Category]) -> Vec<String> {
    if categories.is_empty() {
        return vec![NO_CATEGORIES_MESSAGE.to_string()];
    }
    categories
        .iter()
        .map(|c| format!("{}: {}", c.name, c.url))
        .collect()
}

fn format_documents(category: &str, documents: &[Document]) -> Vec<String> {
    if documents.is_empty() {
        return vec![no_documents_message(category)];
    }
    documents
        .iter()
        .map(|d| format!("{}: {}", d.name, d.url))
        .collect()
}

fn format_issues(issues: &[Issue]) -> String {
    if issues.is_empty() {
        return NO_OPEN_ISSUES_MESSAGE.to_string();
    }
    issues
        .iter()
        .map(|i| format!("#{}: {}", i.number, i.title))
        .collect::<Vec<_>>()
        .join("\n")
}
