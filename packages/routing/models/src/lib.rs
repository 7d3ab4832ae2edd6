#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Normalized route types.

use serde::{Deserialize, Serialize};

/// A driving route flattened into one coordinate sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Route geometry as `[lon, lat]` pairs, legs in order.
    pub coordinates: Vec<[f64; 2]>,
    /// Length in meters.
    pub distance: f64,
    /// Length in kilometers, 2 decimals.
    pub distance_km: f64,
    /// Length in miles, 2 decimals.
    pub distance_miles: f64,
    /// Travel time in seconds.
    pub duration: f64,
    /// Travel time in minutes, 1 decimal.
    pub duration_minutes: f64,
    /// Delay caused by traffic in seconds.
    pub traffic_delay: f64,
}
