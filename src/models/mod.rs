// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod trip;
pub mod user;

pub use trip::{format_trips, FormattedStation, FormattedTrip, Identifier, Position, Station, Trip};
pub use user::{ClientAccessToken, Credentials, UserTokens};
