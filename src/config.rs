use crate::error::{Result, TerragruntMcpError};

pub const DEFAULT_OWNER: &str = "gruntwork-io";
pub const DEFAULT_REPO: &str = "terragrunt";
pub const DEFAULT_DOCS_ROOT: &str = "docs/_docs";
pub const DEFAULT_PER_PAGE: u32 = 30;
pub const DEFAULT_MAX_ISSUE_PAGES: u32 = 100;

/// The repository the documentation and issues are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    pub owner: String,
    pub name: String,
    /// Branch, tag, or SHA. `None` reads the default branch.
    pub git_ref: Option<String>,
}

impl Default for RepoLocation {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            name: DEFAULT_REPO.to_string(),
            git_ref: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub repo: RepoLocation,
    pub docs_root: String,
    pub per_page: u8,
    pub max_issue_pages: u32,
}

impl ServerConfig {
    /// Validate the startup settings. Values end up in raw API routes, so they are checked the
    /// same way tool-supplied path segments are.
    pub fn new(
        repo: RepoLocation,
        docs_root: &str,
        per_page: u32,
        max_issue_pages: u32,
    ) -> Result<Self> {
        sanitize_github_name(&repo.owner, "owner")?;
        sanitize_github_name(&repo.name, "repo")?;
        if let Some(ref git_ref) = repo.git_ref {
            sanitize_url_value(git_ref, "ref")?;
        }

        let docs_root = docs_root.trim_matches('/');
        sanitize_url_value(docs_root, "docs root")?;

        if max_issue_pages == 0 {
            return Err(TerragruntMcpError::Config(
                "max issue pages must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            repo,
            docs_root: docs_root.to_string(),
            per_page: capped_per_page(per_page),
            max_issue_pages,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            repo: RepoLocation::default(),
            docs_root: DEFAULT_DOCS_ROOT.to_string(),
            per_page: capped_per_page(DEFAULT_PER_PAGE),
            max_issue_pages: DEFAULT_MAX_ISSUE_PAGES,
        }
    }
}

/// Cap per_page to 100 (GitHub API maximum), never below 1, and safely cast to u8.
pub fn capped_per_page(per_page: u32) -> u8 {
    per_page.clamp(1, 100) as u8
}

/// Validate that a GitHub owner/repo name doesn't contain characters that
/// could be used for URL injection in raw API routes.
pub fn sanitize_github_name(name: &str, field: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TerragruntMcpError::Config(format!(
            "{} must not be empty",
            field
        )));
    }
    for ch in ['/', '?', '#', '%', '\0', ' ', '\n', '\t'] {
        if name.contains(ch) {
            return Err(TerragruntMcpError::Config(format!(
                "{} contains invalid character '{}'",
                field,
                ch.escape_default()
            )));
        }
    }
    Ok(())
}

/// Validate a value for use in URL paths or query params. Unlike
/// `sanitize_github_name`, this allows slashes (for branch names like
/// `feature/foo` or paths like `docs/_docs`).
pub fn sanitize_url_value(value: &str, field: &str) -> Result<()> {
    if value.is_empty() {
        return Err(TerragruntMcpError::Config(format!(
            "{} must not be empty",
            field
        )));
    }
    for ch in ['?', '#', '&', '\0', '\n', '\r', '\t'] {
        if value.contains(ch) {
            return Err(TerragruntMcpError::Config(format!(
                "{} contains invalid character",
                field
            )));
        }
    }
    if value.split('/').any(|segment| segment == "..") {
        return Err(TerragruntMcpError::Config(format!(
            "{} must not contain '..' segments",
            field
        )));
    }
    Ok(())
}
