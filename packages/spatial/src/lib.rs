#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial primitives for the mirror backend.
//!
//! Decodes stored `GeoJSON` geometries into typed `geo` geometries, picks a
//! representative coordinate for each geometry type, computes great-circle
//! distances with the spherical law of cosines, and ranks candidates by
//! distance to a reference point.

pub mod distance;
pub mod geometry;
pub mod nearest;

pub use distance::{EARTH_RADIUS_KM, KM_TO_MILES, great_circle_distance_km, round_to};
pub use geometry::{parse_geojson_geometry, parse_geometry, representative_point};
pub use nearest::{Candidate, Ranked, nearest};

use thiserror::Error;

/// Errors that can occur while decoding geometries.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// The text is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The document is valid `GeoJSON` but not a geometry.
    #[error("Expected a GeoJSON geometry, found {found}")]
    NotAGeometry {
        /// The kind of document that was found instead.
        found: &'static str,
    },
}
