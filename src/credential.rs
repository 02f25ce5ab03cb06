//! GitHub token resolution.
//!
//! The token is looked up on every tool call, so rotating it in the environment takes effect
//! on the next call without restarting the server. It is never accepted as a tool argument.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, TerragruntMcpError};

/// Environment keys checked for a token, highest priority first.
pub const TOKEN_SOURCES: [&str; 3] = ["GITHUB_TOKEN", "GH_TOKEN", "GITHUB_PERSONAL_ACCESS_TOKEN"];

static PREFIXED_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z]+_[A-Za-z0-9_]{16,}$").expect("prefixed token pattern is valid")
});

static CLASSIC_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-f]{40}$").expect("classic token pattern is valid"));

/// Read access to environment-like key/value pairs.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// A validated GitHub bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Resolve the token from the first non-empty source in [`TOKEN_SOURCES`] and check its shape.
pub fn resolve(env: &dyn EnvSource) -> Result<Credential> {
    let (source_key, token) = TOKEN_SOURCES
        .iter()
        .find_map(|key| {
            env.var(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(|value| (*key, value))
        })
        .ok_or(TerragruntMcpError::MissingCredential)?;

    if is_valid_format(&token) {
        Ok(Credential(token))
    } else {
        Err(TerragruntMcpError::InvalidCredentialFormat { source_key })
    }
}

/// `ghp_`-style prefixed tokens or classic 40-character hex tokens.
fn is_valid_format(token: &str) -> bool {
    PREFIXED_TOKEN.is_match(token) || CLASSIC_TOKEN.is_match(token)
}
