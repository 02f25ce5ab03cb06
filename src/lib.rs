//! MCP server that exposes Terragrunt documentation and open GitHub issues to LLM agents.
//!
//! Documentation is read from the `docs` tree of the Terragrunt repository through the GitHub
//! contents API; issues come from the repository's issue list. Every tool call resolves its own
//! GitHub token from the environment and reports failures as plain text content.

pub mod config;
pub mod credential;
pub mod dispatcher;
pub mod docs;
pub mod error;
pub mod github;
pub mod issues;
pub mod logging;
pub mod server;
pub mod tools;
pub mod validation;
