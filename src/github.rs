//! GitHub access seams.
//!
//! [`RepoContents`] and [`IssueListing`] are the only calls the documentation and issue clients
//! make. [`OctocrabConnector`] builds a fresh octocrab-backed implementation for each tool call
//! from that call's credential.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Deserialize;

use crate::config::RepoLocation;
use crate::credential::Credential;
use crate::error::{Result, TerragruntMcpError};
use crate::issues::Issue;

/// Characters escaped inside one `/`-separated segment of a contents path.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Characters escaped in a query parameter value.
const QUERY_VALUE: &AsciiSet = &PATH_SEGMENT.add(b'&').add(b'=').add(b'+');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One entry of a contents API directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// One page of open issues.
#[derive(Debug, Clone, Default)]
pub struct IssuePage {
    pub issues: Vec<Issue>,
    pub has_next: bool,
}

#[async_trait]
pub trait RepoContents: Send + Sync {
    /// Entries of the directory at `path`, in the order the API returns them.
    async fn list_directory(&self, path: &str) -> Result<Vec<ContentEntry>>;

    /// Decoded text of the file at `path`.
    async fn read_file(&self, path: &str) -> Result<String>;
}

#[async_trait]
pub trait IssueListing: Send + Sync {
    /// Open issues on the 1-based `page`.
    async fn open_issues_page(&self, page: u32, per_page: u8) -> Result<IssuePage>;
}

/// The GitHub capabilities available to one tool call.
#[derive(Clone)]
pub struct GithubApi {
    pub contents: Arc<dyn RepoContents>,
    pub issues: Arc<dyn IssueListing>,
}

pub trait GithubConnector: Send + Sync {
    fn connect(&self, credential: &Credential) -> Result<GithubApi>;
}

/// Connects to api.github.com with the call's personal token.
#[derive(Debug, Clone)]
pub struct OctocrabConnector {
    repo: RepoLocation,
}

impl OctocrabConnector {
    pub fn new(repo: RepoLocation) -> Self {
        Self { repo }
    }
}

impl GithubConnector for OctocrabConnector {
    fn connect(&self, credential: &Credential) -> Result<GithubApi> {
        let github = octocrab::OctocrabBuilder::new()
            .personal_token(credential.expose().to_string())
            .build()
            .map_err(|e| {
                TerragruntMcpError::RemoteUnavailable(format!(
                    "failed to create GitHub client: {}",
                    e
                ))
            })?;

        let backend = Arc::new(OctocrabBackend {
            github,
            repo: self.repo.clone(),
        });
        Ok(GithubApi {
            contents: backend.clone(),
            issues: backend,
        })
    }
}

struct OctocrabBackend {
    github: octocrab::Octocrab,
    repo: RepoLocation,
}

#[derive(Debug, Deserialize)]
struct FileBody {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[async_trait]
impl RepoContents for OctocrabBackend {
    async fn list_directory(&self, path: &str) -> Result<Vec<ContentEntry>> {
        let route = contents_route(&self.repo, path)?;
        tracing::debug!(%route, "Listing directory");
        let entries: Vec<ContentEntry> = self.github.get(&route, None::<&()>).await?;
        Ok(entries)
    }

    async fn read_file(&self, path: &str) -> Result<String> {
        let route = contents_route(&self.repo, path)?;
        tracing::debug!(%route, "Reading file");
        let body: FileBody = self.github.get(&route, None::<&()>).await?;
        decode_file_body(path, body)
    }
}

#[async_trait]
impl IssueListing for OctocrabBackend {
    async fn open_issues_page(&self, page: u32, per_page: u8) -> Result<IssuePage> {
        let result = self
            .github
            .issues(&self.repo.owner, &self.repo.name)
            .list()
            .state(octocrab::params::State::Open)
            .per_page(per_page)
            .page(page)
            .send()
            .await?;

        Ok(IssuePage {
            issues: result.items.iter().map(issue_from_model).collect(),
            has_next: result.next.is_some(),
        })
    }
}

/// Contents API route for `path`, each segment and the ref percent-encoded.
fn contents_route(repo: &RepoLocation, path: &str) -> Result<String> {
    if path.split('/').any(|segment| segment == "..") {
        return Err(TerragruntMcpError::Config(
            "path must not contain '..' segments".to_string(),
        ));
    }
    let encoded_path = path
        .split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/");

    let mut route = format!(
        "/repos/{}/{}/contents/{}",
        repo.owner, repo.name, encoded_path
    );
    if let Some(ref git_ref) = repo.git_ref {
        route.push_str("?ref=");
        route.push_str(&utf8_percent_encode(git_ref, QUERY_VALUE).to_string());
    }
    Ok(route)
}

/// Decode base64 content (GitHub returns base64 with embedded newlines).
fn decode_file_body(path: &str, body: FileBody) -> Result<String> {
    let decode_error = |reason: &str| TerragruntMcpError::Decode {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    match body.encoding.as_deref() {
        Some("base64") | None => {}
        Some(other) => return Err(decode_error(&format!("unsupported encoding '{}'", other))),
    }

    let encoded = body.content.ok_or_else(|| decode_error("no content returned"))?;
    let cleaned: String = encoded.chars().filter(|ch| !ch.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&cleaned)
        .map_err(|e| decode_error(&e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| decode_error("content is not valid UTF-8"))
}

/// Format an issue state as a lowercase string.
fn format_state(state: &octocrab::models::IssueState) -> &'static str {
    match state {
        octocrab::models::IssueState::Open => "open",
        octocrab::models::IssueState::Closed => "closed",
        _ => "unknown",
    }
}

fn issue_from_model(issue: &octocrab::models::issues::Issue) -> Issue {
    Issue {
        number: issue.number,
        title: issue.title.clone(),
        state: format_state(&issue.state).to_string(),
        url: issue.html_url.to_string(),
        labels: issue.labels.iter().map(|l| l.name.clone()).collect(),
        author: issue.user.login.clone(),
        created_at: issue.created_at.to_string(),
        updated_at: issue.updated_at.to_string(),
    }
}
