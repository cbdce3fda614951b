// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Legacy trips route for a single preconfigured account.
//!
//! No login takes place. Kept for the old frontend until it is confirmed
//! whether anything still calls it.

use crate::error::Result;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/velov/trips",
        get(get_legacy_trips).options(super::preflight),
    )
}

/// Return the raw upstream trips array for the legacy account.
async fn get_legacy_trips(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>> {
    let trips = state.cyclocity.fetch_legacy_trips().await?;
    Ok(Json(trips))
}
