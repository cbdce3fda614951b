// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod cyclocity;
pub mod map_layers;

pub use cyclocity::{CyclocityClient, CyclocityError, CyclocityService};
pub use map_layers::{build_route_lines, build_station_heatmap, MapLayer};
