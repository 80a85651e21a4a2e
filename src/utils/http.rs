// src/utils/http.rs

//! HTTP client utilities.

use std::path::Path;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::ApiConfig;

/// Environment variable holding the API access token.
pub const TOKEN_VAR: &str = "ARENA_ACCESS_TOKEN";

/// Pick the access token: an explicit value wins, otherwise the
/// `ARENA_ACCESS_TOKEN=` line of `env_file`.
pub fn resolve_token(explicit: Option<&str>, env_file: &Path) -> Result<String> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }

    let prefix = format!("{TOKEN_VAR}=");
    let from_file = std::fs::read_to_string(env_file).ok().and_then(|content| {
        content
            .lines()
            .find_map(|line| line.strip_prefix(prefix.as_str()))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    });

    from_file.ok_or_else(|| {
        AppError::config(format!(
            "{TOKEN_VAR} not found. Set it as an env var or in {}",
            env_file.display()
        ))
    })
}

/// Create an HTTP client that sends the bearer token on every request.
pub fn create_async_client(config: &ApiConfig, token: &str) -> Result<reqwest::Client> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
        .map_err(|_| AppError::config("access token contains invalid header characters"))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}
