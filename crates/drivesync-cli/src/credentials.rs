//! Access token lookup
//!
//! Tokens are obtained out of band. The CLI reads, in order:
//!
//! 1. `DRIVESYNC_ACCESS_TOKEN`
//! 2. the token file (`auth.token_file`, default `<config dir>/token.json`),
//!    an authorized-user JSON document carrying `token` or `access_token`
//!
//! Expired tokens are not refreshed; Drive answers 401 and the command fails.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use drivesync_core::config::Config;

/// Environment variable holding a bearer token
pub const ACCESS_TOKEN_ENV: &str = "DRIVESYNC_ACCESS_TOKEN";

#[derive(Debug, Deserialize)]
struct TokenFile {
    #[serde(alias = "access_token")]
    token: Option<String>,
}

/// Returns the access token for `config`
pub fn access_token(config: &Config) -> Result<String> {
    resolve(std::env::var(ACCESS_TOKEN_ENV).ok(), &config.token_file())
}

fn resolve(from_env: Option<String>, token_file: &Path) -> Result<String> {
    if let Some(token) = from_env.filter(|t| !t.trim().is_empty()) {
        return Ok(token.trim().to_string());
    }
    read_token_file(token_file)
}

fn read_token_file(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!(
            "No access token: set {ACCESS_TOKEN_ENV} or create {}",
            path.display()
        );
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read token file {}", path.display()))?;
    let file: TokenFile = serde_json::from_str(&content)
        .with_context(|| format!("Malformed token file {}", path.display()))?;

    match file.token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => bail!("Token file {} has no access token", path.display()),
    }
}
