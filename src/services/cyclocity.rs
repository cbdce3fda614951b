// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cyclocity API client for authenticating users and fetching trips.
//!
//! Handles:
//! - Client access token for this application
//! - User login and authorization code exchange
//! - Trip history for an authenticated account
//! - The legacy unauthenticated trips lookup

use crate::config::Config;
use crate::error::AppError;
use crate::models::{ClientAccessToken, Credentials, Trip, UserTokens};
use serde::{Deserialize, Serialize};

/// Media type required by the legacy trips endpoint.
const TRIP_V5_MEDIA_TYPE: &str = "application/vnd.trip.v5+json";

/// Browser-like agent for the legacy endpoint, which rejects bare clients.
const LEGACY_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Low-level failure talking to Cyclocity.
///
/// These carry upstream detail for the logs. Handlers only ever see the
/// generic per-step [`AppError`].
#[derive(Debug, thiserror::Error)]
pub enum CyclocityError {
    #[error("Cyclocity client key is not configured")]
    MissingClientKey,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("JSON parse error: {0}")]
    Decode(String),
}

/// Cyclocity API client.
#[derive(Clone)]
pub struct CyclocityClient {
    http: reqwest::Client,
    base_url: String,
    client_code: String,
    client_key: Option<String>,
}

impl CyclocityClient {
    /// Create a new Cyclocity client with application credentials.
    pub fn new(base_url: String, client_code: String, client_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            client_code,
            client_key,
        }
    }

    fn client_key(&self) -> Result<&str, CyclocityError> {
        self.client_key
            .as_deref()
            .ok_or(CyclocityError::MissingClientKey)
    }

    /// Request a client access token for this application.
    pub async fn get_client_token(&self) -> Result<ClientAccessToken, CyclocityError> {
        let body = ClientCredentials {
            client_code: &self.client_code,
            client_key: self.client_key()?,
        };

        let response = self
            .http
            .post(format!(
                "{}/auth/environments/PRD/client_tokens",
                self.base_url
            ))
            .json(&body)
            .send()
            .await?;

        let token: ClientTokenResponse = check_response_json(response).await?;
        Ok(ClientAccessToken(token.access_token))
    }

    /// Log a user in and exchange the authorization code for user tokens.
    pub async fn authenticate_user(
        &self,
        credentials: &Credentials,
        client_token: &ClientAccessToken,
    ) -> Result<UserTokens, CyclocityError> {
        let client_key = self.client_key()?;

        let response = self
            .http
            .get(format!("{}/identities/users/login", self.base_url))
            .query(&[
                ("takn", client_token.as_str()),
                ("email", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?;

        let login: LoginResponse = check_response_json(response).await?;

        let response = self
            .http
            .post(format!("{}/identities/token", self.base_url))
            .json(&TokenExchangeRequest {
                code: &login.authorization_code,
                client_code: &self.client_code,
                client_key,
            })
            .send()
            .await?;

        check_response_json(response).await
    }

    /// Fetch the trip history of an authenticated account.
    pub async fn get_trips(
        &self,
        contract: &str,
        account: &str,
        tokens: &UserTokens,
    ) -> Result<Vec<Trip>, CyclocityError> {
        let response = self
            .http
            .get(self.trips_url(contract, account))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Taknv1 {}", tokens.access_token),
            )
            .header("Identity", &tokens.id_token)
            .send()
            .await?;

        let body = check_response(response).await?.bytes().await?;
        parse_trips(&body)
    }

    /// Fetch trips without authentication, returning the body untouched.
    pub async fn get_trips_unauthenticated(
        &self,
        contract: &str,
        account: &str,
    ) -> Result<serde_json::Value, CyclocityError> {
        let response = self
            .http
            .get(self.trips_url(contract, account))
            .header(reqwest::header::ACCEPT, TRIP_V5_MEDIA_TYPE)
            .header(reqwest::header::USER_AGENT, LEGACY_USER_AGENT)
            .send()
            .await?;

        check_response_json(response).await
    }

    fn trips_url(&self, contract: &str, account: &str) -> String {
        format!(
            "{}/contracts/{}/accounts/{}/trips",
            self.base_url,
            urlencoding::encode(contract),
            urlencoding::encode(account)
        )
    }
}

/// Parse a trips payload.
///
/// An empty body or `null` means no history. Each element is read on its
/// own so one malformed trip cannot fail the others.
fn parse_trips(body: &[u8]) -> Result<Vec<Trip>, CyclocityError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let trips: Option<Vec<serde_json::Value>> =
        serde_json::from_slice(body).map_err(|e| CyclocityError::Decode(e.to_string()))?;

    Ok(trips
        .unwrap_or_default()
        .into_iter()
        .map(Trip::from_value)
        .collect())
}

/// Check response status, returning the response on success.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, CyclocityError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CyclocityError::Status { status, body });
    }
    Ok(response)
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, CyclocityError> {
    check_response(response)
        .await?
        .json()
        .await
        .map_err(|e| CyclocityError::Decode(e.to_string()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientCredentials<'a> {
    client_code: &'a str,
    client_key: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenExchangeRequest<'a> {
    code: &'a str,
    client_code: &'a str,
    client_key: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientTokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    authorization_code: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// CyclocityService - the per-request call sequence
// ─────────────────────────────────────────────────────────────────────────────

/// High-level service running the fixed Cyclocity call sequence.
///
/// Nothing is cached between requests: every call to
/// [`fetch_user_trips`](Self::fetch_user_trips) obtains a fresh client token
/// and a fresh user session.
#[derive(Clone)]
pub struct CyclocityService {
    client: CyclocityClient,
    contract: String,
    legacy_account_id: String,
}

impl CyclocityService {
    pub fn new(client: CyclocityClient, contract: String, legacy_account_id: String) -> Self {
        Self {
            client,
            contract,
            legacy_account_id,
        }
    }

    /// Build the service from application configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CyclocityClient::new(
                config.api_url.clone(),
                config.client_code.clone(),
                config.client_key.clone(),
            ),
            config.contract.clone(),
            config.legacy_account_id.clone(),
        )
    }

    /// Fetch the trips of the user owning `credentials`.
    ///
    /// Steps run strictly in order and the first failure ends the request.
    /// The cause is logged; the caller gets a fixed message for the step.
    pub async fn fetch_user_trips(&self, credentials: &Credentials) -> Result<Vec<Trip>, AppError> {
        let client_token = self.client.get_client_token().await.map_err(|e| {
            tracing::error!(error = %e, "Error getting access token");
            AppError::AccessToken
        })?;

        let user_tokens = self
            .client
            .authenticate_user(credentials, &client_token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Error authenticating user");
                AppError::Authentication
            })?;

        tracing::debug!(contract = %self.contract, "User authenticated, fetching trips");

        let trips = self
            .client
            .get_trips(&self.contract, &credentials.email, &user_tokens)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Error getting trips");
                AppError::Trips
            })?;

        tracing::info!(count = trips.len(), "Fetched user trips");
        Ok(trips)
    }

    /// Fetch trips for the configured legacy account without logging in.
    ///
    /// Upstream error statuses are passed through to the caller.
    pub async fn fetch_legacy_trips(&self) -> Result<serde_json::Value, AppError> {
        self.client
            .get_trips_unauthenticated(&self.contract, &self.legacy_account_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Error getting legacy trips");
                match e {
                    CyclocityError::Status { status, .. } => AppError::Upstream(status.as_u16()),
                    other => AppError::Internal(other.into()),
                }
            })
    }
}
