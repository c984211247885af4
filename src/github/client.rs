use anyhow::{Context, Result};
use octocrab::Octocrab;

/// Environment variable holding the GitHub token.
pub const ENV_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Environment variable overriding the API base URL (GitHub Enterprise).
pub const ENV_ENDPOINT_VAR: &str = "GITHUB_ENDPOINT";

pub const DEFAULT_ENDPOINT: &str = "https://api.github.com";

/// Read a non-empty, trimmed value from the environment.
fn non_empty_env(name: &str) -> Option<String> {
    let value = std::env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// The token from `GITHUB_TOKEN`, if set and non-empty.
pub fn get_token_from_env() -> Option<String> {
    non_empty_env(ENV_TOKEN_VAR)
}

/// The API base URL from `GITHUB_ENDPOINT`, if set and non-empty.
pub fn endpoint_from_env() -> Option<String> {
    non_empty_env(ENV_ENDPOINT_VAR)
}

/// Create a GitHub client for `endpoint`, authenticated when a token is given.
pub fn create_client(token: Option<&str>, endpoint: &str) -> Result<Octocrab> {
    let mut builder = Octocrab::builder()
        .base_uri(endpoint.to_string())
        .with_context(|| format!("Invalid GitHub endpoint: {}", endpoint))?;

    if let Some(token) = token {
        builder = builder.personal_token(token.to_string());
    } else {
        tracing::warn!("{} is not set; GitHub search requires authentication", ENV_TOKEN_VAR);
    }

    builder.build().context("Failed to create GitHub client")
}
