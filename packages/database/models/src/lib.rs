#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Row types for the supply-chain and simulation tables.
//!
//! These types represent data as retrieved from `PostgreSQL`. They
//! serialize directly into the listing responses of the HTTP API, so field
//! names follow the column names (`type` columns are renamed on the wire).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Open key-value attributes stored as `JSONB`.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// A facility participating in the supply chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRow {
    /// Primary key.
    pub id: i32,
    /// Facility name.
    pub name: String,
    /// Facility type (e.g. "port", "warehouse", "distribution_center").
    #[serde(rename = "type")]
    pub facility_type: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Throughput capacity, unit depends on facility type.
    pub capacity: Option<f64>,
    /// Additional attributes.
    pub properties: Option<Properties>,
}

/// A generic infrastructure asset (roads, rail yards, power nodes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureRow {
    /// Primary key.
    pub id: i32,
    /// Asset name.
    pub name: String,
    /// Asset type.
    #[serde(rename = "type")]
    pub infrastructure_type: String,
    /// Latitude (WGS84), if the asset is point-like.
    pub latitude: Option<f64>,
    /// Longitude (WGS84), if the asset is point-like.
    pub longitude: Option<f64>,
    /// Full GeoJSON geometry, if stored.
    pub geojson: Option<serde_json::Value>,
    /// Additional attributes.
    pub properties: Option<Properties>,
}

/// A directed supply-chain edge joined with both endpoint facilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRow {
    /// Primary key.
    pub id: i32,
    /// Connection type (e.g. "shipping", "trucking", "rail").
    pub connection_type: Option<String>,
    /// Volume flowing along the edge.
    pub flow_volume: Option<f64>,
    /// Origin facility name.
    pub from_facility_name: String,
    /// Origin latitude.
    pub from_latitude: f64,
    /// Origin longitude.
    pub from_longitude: f64,
    /// Destination facility name.
    pub to_facility_name: String,
    /// Destination latitude.
    pub to_latitude: f64,
    /// Destination longitude.
    pub to_longitude: f64,
}

/// A full simulation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRow {
    /// Primary key.
    pub id: i32,
    /// Scenario name (e.g. "Port of Long Beach closure").
    pub scenario_name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// First simulated day.
    pub start_date: Option<NaiveDate>,
    /// Number of simulated days.
    pub duration_days: Option<i32>,
    /// Total economic impact.
    pub total_impact: Option<f64>,
    /// Run status (e.g. "pending", "completed").
    pub status: Option<String>,
    /// When the simulation was created.
    pub created_at: Option<NaiveDateTime>,
    /// When the simulation finished running.
    pub completed_at: Option<NaiveDateTime>,
}

/// A simulation as shown in the listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummaryRow {
    /// Primary key.
    pub id: i32,
    /// Scenario name.
    pub scenario_name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Number of simulated days.
    pub duration_days: Option<i32>,
    /// Total economic impact.
    pub total_impact: Option<f64>,
    /// Run status.
    pub status: Option<String>,
    /// When the simulation was created.
    pub created_at: Option<NaiveDateTime>,
}

/// One day of a simulation's event timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEventRow {
    /// Day index, starting at 0.
    pub day: i32,
    /// Simulated wall-clock time of the day.
    pub timestamp: Option<NaiveDateTime>,
    /// Opaque event payload.
    pub events: Option<serde_json::Value>,
}

/// A facility's condition on one simulated day, joined with the facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityStateRow {
    /// Day index.
    pub day: i32,
    /// Operational status (e.g. "operational", "disrupted", "closed").
    pub status: Option<String>,
    /// Cost attributed to this facility on this day.
    pub impact_cost: Option<f64>,
    /// Facility ID.
    pub facility_id: i32,
    /// Facility name.
    pub facility_name: String,
    /// Facility latitude.
    pub latitude: f64,
    /// Facility longitude.
    pub longitude: f64,
    /// Facility type.
    pub facility_type: String,
}
