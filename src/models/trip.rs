// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Cyclocity trip model and the normalized shape returned to the frontend.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Identifier that Cyclocity may send as either a string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(untagged)]
pub enum Identifier {
    Text(String),
    Number(
        #[cfg_attr(feature = "binding-generation", ts(type = "number"))] serde_json::Number,
    ),
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Identifier::Text(value.to_string())
    }
}

/// Raw trip as returned by the Cyclocity trips endpoint.
///
/// The upstream contract is not guaranteed complete, so every field is
/// optional, unknown fields are ignored, and a field of the wrong type
/// reads as absent instead of rejecting the trip.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub id: Option<Identifier>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub end_time: Option<String>,
    /// Duration in seconds, kept in its original numeric form
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub duration: Option<serde_json::Number>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub bike_type: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub start_station: Option<Station>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub end_station: Option<Station>,
}

impl Trip {
    /// Read one element of the upstream trips array.
    ///
    /// An element that is not an object at all becomes an empty trip, so the
    /// response keeps one entry per upstream trip.
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Unreadable trip in upstream payload");
            Self::default()
        })
    }
}

/// Station reference inside a raw trip.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Station {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub id: Option<Identifier>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub name: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub position: Option<Position>,
}

/// WGS84 position of a station.
#[serde_as]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub lng: Option<f64>,
}

/// Trip flattened for the frontend. Missing data serializes as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct FormattedTrip {
    pub id: Option<Identifier>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub duration: Option<serde_json::Number>,
    pub bike_type: Option<String>,
    pub start_station: FormattedStation,
    pub end_station: FormattedStation,
}

/// Station with its position flattened to `lat`/`lng`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FormattedStation {
    pub id: Option<Identifier>,
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl FormattedStation {
    /// `(lng, lat)` when both coordinates are present and truthy.
    ///
    /// Zero and NaN count as missing, so a station sitting exactly on the
    /// equator or the prime meridian has no usable position.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let truthy = |v: Option<f64>| v.filter(|x| *x != 0.0 && !x.is_nan());
        Some((truthy(self.lng)?, truthy(self.lat)?))
    }
}

impl From<Option<&Station>> for FormattedStation {
    fn from(station: Option<&Station>) -> Self {
        let Some(station) = station else {
            return Self::default();
        };
        let position = station.position.unwrap_or_default();

        Self {
            id: station.id.clone(),
            name: station.name.clone(),
            lat: position.lat,
            lng: position.lng,
        }
    }
}

impl From<&Trip> for FormattedTrip {
    fn from(trip: &Trip) -> Self {
        Self {
            id: trip.id.clone(),
            start_time: trip.start_time.clone(),
            end_time: trip.end_time.clone(),
            duration: trip.duration.clone(),
            bike_type: trip.bike_type.clone(),
            start_station: FormattedStation::from(trip.start_station.as_ref()),
            end_station: FormattedStation::from(trip.end_station.as_ref()),
        }
    }
}

/// Format a batch of raw trips, preserving order.
pub fn format_trips(trips: &[Trip]) -> Vec<FormattedTrip> {
    trips.iter().map(FormattedTrip::from).collect()
}
