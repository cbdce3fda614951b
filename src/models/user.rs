// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credentials and tokens for a Cyclocity user session.

use serde::Deserialize;
use std::fmt;
use validator::Validate;

/// Login credentials supplied with each request. Never stored.
#[derive(Clone, Default, Deserialize, Validate)]
pub struct Credentials {
    /// Account email (missing field is treated as empty)
    #[serde(default)]
    #[validate(length(min = 1))]
    pub email: String,
    /// Account password
    #[serde(default)]
    #[validate(length(min = 1))]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Service-level token authorizing this application, not a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAccessToken(pub String);

impl ClientAccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Tokens returned by the identity token exchange.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTokens {
    /// Sent as `Authorization: Taknv1 ...` on trip requests
    pub access_token: String,
    /// Sent as the `Identity` header on trip requests
    pub id_token: String,
    /// Kept for completeness; nothing refreshes sessions
    #[serde(default)]
    pub refresh_token: Option<String>,
}
