// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated trip routes.

use crate::error::{AppError, Result};
use crate::models::{format_trips, Credentials, FormattedTrip};
use crate::services::{build_route_lines, build_station_heatmap, MapLayer};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/trips",
            post(get_trips)
                .options(super::preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/trips/map",
            post(get_trip_map)
                .options(super::preflight)
                .fallback(method_not_allowed),
        )
}

/// Trips of the authenticated user.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TripsResponse {
    pub trips: Vec<FormattedTrip>,
}

/// Map layers for the authenticated user's trips.
#[derive(Serialize)]
pub struct TripMapResponse {
    pub heatmap: MapLayer,
    pub routes: MapLayer,
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Extract credentials, rejecting a missing body or empty fields.
///
/// Runs before any upstream call is made.
fn require_credentials(
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Credentials> {
    let Json(credentials) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Unreadable trips request body");
        AppError::MissingCredentials
    })?;

    credentials
        .validate()
        .map_err(|_| AppError::MissingCredentials)?;

    Ok(credentials)
}

/// Log in with the posted credentials and return the formatted trips.
async fn get_trips(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TripsResponse>> {
    let credentials = require_credentials(payload)?;

    let trips = state.cyclocity.fetch_user_trips(&credentials).await?;

    Ok(Json(TripsResponse {
        trips: format_trips(&trips),
    }))
}

/// Log in with the posted credentials and return GeoJSON map layers.
async fn get_trip_map(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TripMapResponse>> {
    let credentials = require_credentials(payload)?;

    let trips = state.cyclocity.fetch_user_trips(&credentials).await?;
    let formatted = format_trips(&trips);

    let heatmap = build_station_heatmap(&formatted);
    let routes = build_route_lines(&formatted);

    tracing::debug!(
        trips = formatted.len(),
        points = heatmap.features().len(),
        lines = routes.features().len(),
        "Built trip map layers"
    );

    Ok(Json(TripMapResponse { heatmap, routes }))
}
