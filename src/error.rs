use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum TerragruntMcpError {
    #[error(
        "GitHub token is not set in the environment (GITHUB_TOKEN or GH_TOKEN or GITHUB_PERSONAL_ACCESS_TOKEN)"
    )]
    MissingCredential,

    #[error("GitHub token in {source_key} has an invalid format")]
    InvalidCredentialFormat { source_key: &'static str },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Document '{document}' not found in category '{category}'")]
    DocumentNotFound { category: String, document: String },

    #[error("GitHub API request failed: {0}")]
    RemoteUnavailable(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Could not decode content of {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Input schema of tool {tool} does not compile: {reason}")]
    InvalidToolSchema { tool: &'static str, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<octocrab::Error> for TerragruntMcpError {
    fn from(e: octocrab::Error) -> Self {
        TerragruntMcpError::RemoteUnavailable(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TerragruntMcpError>;
