// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! VeloV trips proxy
//!
//! This crate provides a small backend that logs users into the Cyclocity
//! bike-share API, fetches their trip history, and reshapes it into
//! map-ready GeoJSON.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::CyclocityService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub cyclocity: CyclocityService,
}

impl AppState {
    /// Build state with a Cyclocity service derived from `config`.
    pub fn new(config: Config) -> Self {
        let cyclocity = CyclocityService::from_config(&config);
        Self { config, cyclocity }
    }
}
