// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GeoJSON map layers built from formatted trips.
//!
//! - Station heatmap: one Point per trip endpoint
//! - Route lines: one straight LineString per trip
//!
//! An empty trip list produces an empty JSON array instead of a
//! FeatureCollection. The frontend relies on that shape, so it is modelled
//! explicitly by [`MapLayer`] rather than normalized away.

use crate::models::{FormattedStation, FormattedTrip};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::json;

/// Output of a layer builder.
#[derive(Debug, Clone, PartialEq)]
pub enum MapLayer {
    /// No trips were given. Serializes as `[]`.
    Empty,
    /// At least one trip was given, even if none produced a feature.
    Collection(FeatureCollection),
}

impl MapLayer {
    /// Features in the layer (none for `Empty`).
    pub fn features(&self) -> &[Feature] {
        match self {
            MapLayer::Empty => &[],
            MapLayer::Collection(collection) => &collection.features,
        }
    }

    fn from_features(features: Vec<Feature>) -> Self {
        MapLayer::Collection(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    }
}

impl Serialize for MapLayer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MapLayer::Empty => serializer.serialize_seq(Some(0))?.end(),
            MapLayer::Collection(collection) => collection.serialize(serializer),
        }
    }
}

/// Which end of a trip a heatmap point marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Start,
    End,
}

impl Endpoint {
    fn as_str(self) -> &'static str {
        match self {
            Endpoint::Start => "start",
            Endpoint::End => "end",
        }
    }
}

/// Build the station heatmap layer.
///
/// Start stations precede end stations for each trip, in trip order.
/// Stations without truthy coordinates are skipped.
pub fn build_station_heatmap(trips: &[FormattedTrip]) -> MapLayer {
    if trips.is_empty() {
        return MapLayer::Empty;
    }

    let features = trips
        .iter()
        .flat_map(|trip| {
            [
                (Endpoint::Start, &trip.start_station),
                (Endpoint::End, &trip.end_station),
            ]
        })
        .filter_map(|(endpoint, station)| station_point(endpoint, station))
        .collect();

    MapLayer::from_features(features)
}

/// Build the route lines layer.
///
/// Trips missing either station's coordinates are dropped.
pub fn build_route_lines(trips: &[FormattedTrip]) -> MapLayer {
    if trips.is_empty() {
        return MapLayer::Empty;
    }

    let features = trips.iter().filter_map(route_line).collect();
    MapLayer::from_features(features)
}

fn station_point(endpoint: Endpoint, station: &FormattedStation) -> Option<Feature> {
    let (lng, lat) = station.coordinates()?;
    let point = geo::Point::new(lng, lat);

    Some(feature(
        geojson::Value::from(&point),
        json!({
            "intensity": 1,
            "type": endpoint.as_str(),
        }),
    ))
}

fn route_line(trip: &FormattedTrip) -> Option<Feature> {
    let start = trip.start_station.coordinates()?;
    let end = trip.end_station.coordinates()?;
    let line = geo::LineString::from(vec![start, end]);

    Some(feature(
        geojson::Value::from(&line),
        json!({
            "id": trip.id,
            "startStation": trip.start_station.name,
            "endStation": trip.end_station.name,
            "duration": trip.duration,
            "bikeType": trip.bike_type,
            "startTime": trip.start_time,
            "endTime": trip.end_time,
        }),
    ))
}

fn feature(value: geojson::Value, properties: serde_json::Value) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: as_object(properties),
        foreign_members: None,
    }
}

fn as_object(value: serde_json::Value) -> Option<JsonObject> {
    match value {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    }
}
