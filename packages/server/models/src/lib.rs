#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the mirror server.
//!
//! These types are serialized to JSON for the REST API. They wrap the
//! domain types from the model crates so the wire contract can evolve
//! independently of storage.

use std::collections::BTreeMap;

use mirror_ai_models::{ChatTurn, ToolCall};
use mirror_database_models::{
    ConnectionRow, FacilityRow, InfrastructureRow, SimulationSummaryRow,
};
use mirror_infrastructure_models::{LatLon, NearestFeature};
use mirror_routing_models::RouteResult;
use serde::{Deserialize, Serialize};

/// `GET /health` and `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `"ok"` when the process is serving.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// `GET /` service description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiIndex {
    /// Service name.
    pub message: String,
    /// Crate version.
    pub version: String,
    /// Endpoint groups keyed by name.
    pub endpoints: BTreeMap<String, String>,
}

/// Machine-readable error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable message.
    pub error: String,
    /// Error kind, e.g. `invalid_request`.
    pub kind: String,
}

/// `POST /api/chat` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The new user message.
    #[serde(default)]
    pub message: String,
    /// Earlier turns, oldest first.
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// `POST /api/chat` reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model text.
    pub text: String,
    /// Typed tool invocations for the client to execute.
    pub actions: Vec<ToolCall>,
    /// Raw tool-use blocks as returned by the provider.
    pub tool_calls: Vec<serde_json::Value>,
    /// Whether `actions` is non-empty.
    pub requires_action: bool,
}

/// `POST /api/route` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Route origin.
    pub start: Option<LatLon>,
    /// Route destination.
    pub end: Option<LatLon>,
}

/// `POST /api/route` reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    /// Always `true`; failures use the error body.
    pub success: bool,
    /// The normalized route.
    pub route: RouteResult,
}

/// `POST /api/find-nearest` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NearestRequest {
    /// Reference point.
    pub location: Option<LatLon>,
    /// Category name, e.g. `airports` or `port`.
    #[serde(alias = "type")]
    pub infrastructure_type: Option<String>,
}

/// `POST /api/find-nearest` reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestResponse {
    /// Always `true`; failures use the error body.
    pub success: bool,
    /// The closest feature.
    pub feature: NearestFeature,
}

/// `GET /api/facilities`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitiesResponse {
    /// All facilities, by ID.
    pub facilities: Vec<FacilityRow>,
}

/// `GET /api/infrastructure`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfrastructureResponse {
    /// All infrastructure assets, by type then ID.
    pub infrastructure: Vec<InfrastructureRow>,
}

/// `GET /api/infrastructure/connections`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionsResponse {
    /// All supply-chain connections, by ID.
    pub connections: Vec<ConnectionRow>,
}

/// `GET /api/simulations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationsResponse {
    /// All simulations, newest first.
    pub simulations: Vec<SimulationSummaryRow>,
}

/// `GET /api/simulations/{id}/timeline`
#[derive(Debug, Clone, Serialize)]
pub struct TimelineResponse<T> {
    /// The simulation the timeline belongs to.
    pub simulation_id: i32,
    /// Timeline entries in day order.
    pub timeline: Vec<T>,
}
