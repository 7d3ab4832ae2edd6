#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Infrastructure feature types shared across the mirror backend.
//!
//! Defines the closed set of infrastructure categories (each backed by its
//! own table), the raw feature rows read from the store, the aggregate
//! statistics shapes, and the nearest-feature result. These types are the
//! contract between the query layer, the AI tool bridge, and the HTTP API.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Infrastructure categories served by the map.
///
/// Every category maps to exactly one table. Request parameters are parsed
/// into this enum before any SQL is built, so caller-provided strings never
/// reach query text.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum InfrastructureCategory {
    /// Airport runways, terminals, aprons, and related features.
    #[serde(alias = "airport")]
    #[strum(to_string = "airports", serialize = "airport")]
    Airports,
    /// Port terminals, piers, and harbour features.
    #[serde(alias = "port")]
    #[strum(to_string = "ports", serialize = "port")]
    Ports,
    /// Warehouse and transportation buildings.
    #[serde(alias = "warehouse")]
    #[strum(to_string = "warehouses", serialize = "warehouse")]
    Warehouses,
}

impl InfrastructureCategory {
    /// Returns all categories in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Airports, Self::Ports, Self::Warehouses]
    }

    /// Returns the table holding features of this category.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Airports => "airports",
            Self::Ports => "ports",
            Self::Warehouses => "warehouses",
        }
    }

    /// Singular noun used in human-readable messages.
    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Airports => "airport",
            Self::Ports => "port",
            Self::Warehouses => "warehouse",
        }
    }

    /// Whether features of this category carry building attributes
    /// (`height`, `num_floors`).
    #[must_use]
    pub const fn has_building_attributes(self) -> bool {
        matches!(self, Self::Warehouses)
    }
}

/// A WGS84 point as sent by clients and by the AI tool catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees.
    #[serde(alias = "latitude")]
    pub lat: f64,
    /// Longitude in degrees.
    #[serde(alias = "longitude", alias = "lng")]
    pub lon: f64,
}

impl LatLon {
    /// Creates a new point.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Checks that the point is finite and within WGS84 bounds.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinateError`] if either component is NaN,
    /// infinite, or out of range.
    pub fn validate(&self) -> Result<(), InvalidCoordinateError> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(InvalidCoordinateError {
                message: format!("latitude {} is outside [-90, 90]", self.lat),
            });
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(InvalidCoordinateError {
                message: format!("longitude {} is outside [-180, 180]", self.lon),
            });
        }
        Ok(())
    }
}

/// Error returned when a [`LatLon`] is not a usable WGS84 coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCoordinateError {
    /// What was wrong with the coordinate.
    pub message: String,
}

impl std::fmt::Display for InvalidCoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid coordinate: {}", self.message)
    }
}

impl std::error::Error for InvalidCoordinateError {}

/// An infrastructure feature row as read from a category table.
///
/// `geometry` holds the stored GeoJSON geometry document as text; it is
/// decoded only where a typed view is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureFeatureRow {
    /// Feature ID, unique within its table.
    pub id: String,
    /// Display name.
    pub name: Option<String>,
    /// Feature subtype (e.g. "runway", "pier").
    pub subtype: Option<String>,
    /// Feature class (e.g. "international", "container").
    pub class: Option<String>,
    /// GeoJSON geometry document as stored.
    pub geometry: String,
    /// Building height in meters (warehouses only).
    pub height: Option<f64>,
    /// Number of floors (warehouses only).
    pub num_floors: Option<i32>,
}

/// Live totals for each category, used to ground the chat assistant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfrastructureCounts {
    /// Number of airport features.
    pub airports: u64,
    /// Number of port features.
    pub ports: u64,
    /// Number of warehouse features.
    pub warehouses: u64,
}

impl InfrastructureCounts {
    /// Returns the total for a single category.
    #[must_use]
    pub const fn get(&self, category: InfrastructureCategory) -> u64 {
        match category {
            InfrastructureCategory::Airports => self.airports,
            InfrastructureCategory::Ports => self.ports,
            InfrastructureCategory::Warehouses => self.warehouses,
        }
    }
}

/// Number of airport features sharing a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCount {
    /// Airport class, or `"unknown"` when unset.
    pub class: String,
    /// Feature count.
    pub count: u64,
}

/// Number of port features sharing a subtype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtypeCount {
    /// Port subtype, or `"unknown"` when unset.
    pub subtype: String,
    /// Feature count.
    pub count: u64,
}

/// Airport summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportStats {
    /// Total airport features.
    pub total: u64,
    /// Counts by class, largest first.
    pub by_class: Vec<ClassCount>,
}

/// Port summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortStats {
    /// Total port features.
    pub total: u64,
    /// Counts by subtype, largest first.
    pub by_subtype: Vec<SubtypeCount>,
}

/// Warehouse summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseStats {
    /// Total warehouse features.
    pub total: u64,
    /// Mean building height in meters, `None` when no heights are known.
    pub avg_height: Option<f64>,
    /// Mean floor count, `None` when no floor counts are known.
    pub avg_floors: Option<f64>,
}

/// Nested summary served by `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureStats {
    /// Airport summary.
    pub airports: AirportStats,
    /// Port summary.
    pub ports: PortStats,
    /// Warehouse summary.
    pub warehouses: WarehouseStats,
}

/// The closest feature of a category to a reference point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestFeature {
    /// Category the feature belongs to.
    pub category: InfrastructureCategory,
    /// Feature ID.
    pub id: String,
    /// Display name.
    pub name: Option<String>,
    /// Feature subtype.
    pub subtype: Option<String>,
    /// Feature class.
    pub class: Option<String>,
    /// Representative coordinate as `[lon, lat]`.
    pub coordinates: [f64; 2],
    /// Great-circle distance in kilometers, 2 decimals.
    pub distance_km: f64,
    /// Great-circle distance in miles, 2 decimals.
    pub distance_miles: f64,
}
