//! MCP protocol integration test.
//!
//! Runs the server over an in-memory duplex transport against a real rmcp client and an
//! in-memory GitHub, checking tool discovery and that every tool outcome, including failures,
//! arrives as a successful `tools/call` response carrying text.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{CallToolRequestParams, CallToolResult, ClientInfo};
use rmcp::service::{RoleClient, RunningService};
use rmcp::{ClientHandler, ServiceExt};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use terragrunt_mcp::config::ServerConfig;
use terragrunt_mcp::credential::{Credential, EnvSource};
use terragrunt_mcp::error::{Result as ToolResult, TerragruntMcpError};
use terragrunt_mcp::github::{
    ContentEntry, EntryKind, GithubApi, GithubConnector, IssueListing, IssuePage, RepoContents,
};
use terragrunt_mcp::issues::Issue;
use terragrunt_mcp::server::TerragruntMcpServer;

const TOKEN: &str = "0123456789abcdef0123456789abcdef01234567";

#[derive(Debug, Clone, Default)]
struct DummyClient;

impl ClientHandler for DummyClient {
    fn get_info(&self) -> ClientInfo {
        ClientInfo::default()
    }
}

struct StaticGithub;

fn dir_entry(name: &str, path: &str, kind: EntryKind) -> ContentEntry {
    ContentEntry {
        name: name.to_string(),
        path: path.to_string(),
        kind,
        html_url: Some(format!("https://example.test/{}", path)),
    }
}

#[async_trait]
impl RepoContents for StaticGithub {
    async fn list_directory(&self, path: &str) -> ToolResult<Vec<ContentEntry>> {
        match path {
            "docs/_docs" => Ok(vec![dir_entry("cli", "docs/_docs/cli", EntryKind::Dir)]),
            "docs/_docs/cli" => Ok(vec![dir_entry(
                "getting-started.md",
                "docs/_docs/cli/getting-started.md",
                EntryKind::File,
            )]),
            _ => Err(TerragruntMcpError::RemoteUnavailable("Not Found".to_string())),
        }
    }

    async fn read_file(&self, path: &str) -> ToolResult<String> {
        match path {
            "docs/_docs/cli/getting-started.md" => Ok("# Getting started\n".to_string()),
            _ => Err(TerragruntMcpError::RemoteUnavailable("Not Found".to_string())),
        }
    }
}

#[async_trait]
impl IssueListing for StaticGithub {
    async fn open_issues_page(&self, page: u32, _per_page: u8) -> ToolResult<IssuePage> {
        let issue = |number: u64, title: &str| Issue {
            number,
            title: title.to_string(),
            state: "open".to_string(),
            url: format!("https://example.test/issues/{}", number),
            labels: Vec::new(),
            author: "octocat".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        Ok(match page {
            1 => IssuePage {
                issues: vec![issue(42, "Support stacks")],
                has_next: true,
            },
            2 => IssuePage {
                issues: vec![issue(41, "Fix hooks")],
                has_next: false,
            },
            _ => IssuePage::default(),
        })
    }
}

struct StaticConnector;

impl GithubConnector for StaticConnector {
    fn connect(&self, _credential: &Credential) -> ToolResult<GithubApi> {
        let github = Arc::new(StaticGithub);
        Ok(GithubApi {
            contents: github.clone(),
            issues: github,
        })
    }
}

struct Harness {
    client: RunningService<RoleClient, DummyClient>,
    server_handle: JoinHandle<anyhow::Result<()>>,
}

impl Harness {
    async fn start(env: HashMap<String, String>) -> anyhow::Result<Self> {
        let (server_transport, client_transport) = tokio::io::duplex(65536);

        let env: Arc<dyn EnvSource> = Arc::new(env);
        let server =
            TerragruntMcpServer::new(ServerConfig::default(), env, Arc::new(StaticConnector))?;
        let server_handle = tokio::spawn(async move {
            let service = server.serve(server_transport).await?;
            service.waiting().await?;
            anyhow::Ok(())
        });

        let client = DummyClient.serve(client_transport).await?;
        Ok(Self {
            client,
            server_handle,
        })
    }

    async fn with_token() -> anyhow::Result<Self> {
        let mut env = HashMap::new();
        env.insert("GH_TOKEN".to_string(), TOKEN.to_string());
        Self::start(env).await
    }

    async fn call(&self, name: &str, args: Value) -> anyhow::Result<CallToolResult> {
        let result = self
            .client
            .call_tool(CallToolRequestParams {
                meta: None,
                name: name.to_string().into(),
                arguments: args.as_object().cloned(),
                task: None,
            })
            .await?;
        Ok(result)
    }

    async fn stop(self) -> anyhow::Result<()> {
        self.client.cancel().await?;
        self.server_handle.await??;
        Ok(())
    }
}

fn texts(result: &CallToolResult) -> Vec<String> {
    result
        .content
        .iter()
        .filter_map(|c| c.raw.as_text())
        .map(|t| t.text.clone())
        .collect()
}

#[tokio::test]
async fn test_mcp_protocol_list_tools() -> anyhow::Result<()> {
    let harness = Harness::with_token().await?;

    let tools = harness.client.list_tools(None).await?;
    let tool_names: Vec<&str> = tools.tools.iter().map(|t| t.name.as_ref()).collect();
    assert_eq!(
        tool_names,
        [
            "list-doc-categories",
            "list-all-docs-by-category",
            "read-document-from-category",
            "read-all-docs-from-category",
            "get-all-open-issues",
        ]
    );

    let read_document = tools
        .tools
        .iter()
        .find(|t| t.name == "read-document-from-category")
        .expect("read-document-from-category is listed");
    let required = read_document
        .input_schema
        .get("required")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    assert!(required.contains(&json!("category")));
    assert!(required.contains(&json!("document")));

    harness.stop().await
}

#[tokio::test]
async fn test_mcp_protocol_read_document() -> anyhow::Result<()> {
    let harness = Harness::with_token().await?;

    let result = harness
        .call(
            "read-document-from-category",
            json!({ "category": "cli", "document": "getting-started" }),
        )
        .await?;
    assert_eq!(texts(&result), ["# Getting started\n"]);
    assert_ne!(result.is_error, Some(true));

    let result = harness
        .call(
            "read-document-from-category",
            json!({ "category": "cli", "document": "nonexistent" }),
        )
        .await?;
    assert_eq!(
        texts(&result),
        ["Error handling read-document-from-category: Document 'nonexistent' not found in category 'cli'"]
    );
    assert_eq!(result.is_error, Some(true));

    harness.stop().await
}

#[tokio::test]
async fn test_mcp_protocol_all_open_issues() -> anyhow::Result<()> {
    let harness = Harness::with_token().await?;

    let result = harness
        .call("get-all-open-issues", json!({ "all": true }))
        .await?;
    assert_eq!(texts(&result), ["#42: Support stacks\n#41: Fix hooks"]);

    harness.stop().await
}

#[tokio::test]
async fn test_mcp_protocol_failures_are_not_protocol_errors() -> anyhow::Result<()> {
    let harness = Harness::start(HashMap::new()).await?;

    let result = harness.call("list-doc-categories", json!({})).await?;
    assert_eq!(
        texts(&result),
        ["Error handling list-doc-categories: GitHub token is not set in the environment (GITHUB_TOKEN or GH_TOKEN or GITHUB_PERSONAL_ACCESS_TOKEN)"]
    );

    let result = harness.call("no-such-tool", json!({})).await?;
    assert_eq!(texts(&result), ["Unknown tool: no-such-tool"]);

    harness.stop().await
}
