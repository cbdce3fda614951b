// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The Cyclocity client key is a secret and never lives in source. It is
//! read once at startup and handed to the Cyclocity service explicitly.

use std::env;

/// Default Cyclocity API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.cyclocity.fr";
/// Default client code for the Lyon web app.
pub const DEFAULT_CLIENT_CODE: &str = "vls.web.lyon:PRD";
/// Default contract (operator region).
pub const DEFAULT_CONTRACT: &str = "lyon";
/// Account queried by the legacy `/api/velov/trips` endpoint.
pub const DEFAULT_LEGACY_ACCOUNT_ID: &str = "17b0ba03-3184-4c02-89f1-51e8bb7a7d43";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cyclocity API base URL (overridable for local testing)
    pub api_url: String,
    /// Cyclocity client code (public)
    pub client_code: String,
    /// Contract identifier, e.g. "lyon"
    pub contract: String,
    /// Account used by the legacy trips endpoint
    pub legacy_account_id: String,
    /// Server port
    pub port: u16,

    /// Cyclocity client key. `None` means every authenticated request
    /// fails at the access token step.
    pub client_key: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:9".to_string(),
            client_code: DEFAULT_CLIENT_CODE.to_string(),
            contract: DEFAULT_CONTRACT.to_string(),
            legacy_account_id: DEFAULT_LEGACY_ACCOUNT_ID.to_string(),
            port: 8080,
            client_key: Some("test_client_key".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => 8080,
        };

        let client_key = env::var("VELOV_CLIENT_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            api_url: env::var("VELOV_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            client_code: env::var("VELOV_CLIENT_CODE")
                .unwrap_or_else(|_| DEFAULT_CLIENT_CODE.to_string()),
            contract: env::var("VELOV_CONTRACT").unwrap_or_else(|_| DEFAULT_CONTRACT.to_string()),
            legacy_account_id: env::var("VELOV_LEGACY_ACCOUNT_ID")
                .unwrap_or_else(|_| DEFAULT_LEGACY_ACCOUNT_ID.to_string()),
            port,
            client_key,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
