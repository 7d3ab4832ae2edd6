#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map-control tool catalog for the chat bridge.
//!
//! Defines the five tools the language model may propose, their typed
//! parameters, the JSON Schema descriptions sent with every request, and
//! the conversation turn shape accepted from clients. Tools are never run
//! server-side; a decoded [`MapAction`] is handed back to the client.

use std::str::FromStr as _;

use mirror_infrastructure_models::{InfrastructureCategory, LatLon};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Enumeration of all tool names the model can invoke.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolName {
    /// Move the camera to a coordinate.
    FlyToLocation,
    /// Show or hide infrastructure layers.
    FilterInfrastructure,
    /// Emphasize a named feature.
    HighlightFeature,
    /// Draw a driving route between two points.
    CalculateRoute,
    /// Locate the closest feature of a category.
    FindNearest,
}

/// Parameters for `fly_to_location`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlyToLocationParams {
    /// Target longitude.
    pub longitude: f64,
    /// Target latitude.
    pub latitude: f64,
    /// Map zoom level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    /// Camera pitch in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    /// Camera bearing in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
    /// Animation duration in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Parameters for `filter_infrastructure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterInfrastructureParams {
    /// Categories to keep visible.
    pub types: Vec<InfrastructureCategory>,
    /// Airport classes to keep, all when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airport_classes: Option<Vec<String>>,
    /// Port subtypes to keep, all when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_subtypes: Option<Vec<String>>,
}

/// Parameters for `highlight_feature`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightFeatureParams {
    /// Feature name, as shown on the map.
    pub name: String,
    /// Category the feature belongs to.
    #[serde(rename = "type")]
    pub feature_type: InfrastructureCategory,
}

/// Parameters for `calculate_route`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateRouteParams {
    /// Route origin.
    pub start: LatLon,
    /// Route destination.
    pub end: LatLon,
}

/// Parameters for `find_nearest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindNearestParams {
    /// Reference point.
    pub location: LatLon,
    /// Category to search.
    pub infrastructure_type: InfrastructureCategory,
}

/// A decoded tool invocation, serialized as `{"name": ..., "input": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "input", rename_all = "snake_case")]
pub enum MapAction {
    /// `fly_to_location`
    FlyToLocation(FlyToLocationParams),
    /// `filter_infrastructure`
    FilterInfrastructure(FilterInfrastructureParams),
    /// `highlight_feature`
    HighlightFeature(HighlightFeatureParams),
    /// `calculate_route`
    CalculateRoute(CalculateRouteParams),
    /// `find_nearest`
    FindNearest(FindNearestParams),
}

impl MapAction {
    /// Decodes a raw tool-use block into a typed action.
    ///
    /// # Errors
    ///
    /// Returns [`ToolDecodeError`] if `name` is not in the catalog or
    /// `input` does not match that tool's parameters.
    pub fn decode(name: &str, input: serde_json::Value) -> Result<Self, ToolDecodeError> {
        let tool = ToolName::from_str(name).map_err(|_| ToolDecodeError {
            tool: name.to_string(),
            message: "unknown tool".to_string(),
        })?;

        let invalid = |e: serde_json::Error| ToolDecodeError {
            tool: name.to_string(),
            message: e.to_string(),
        };

        Ok(match tool {
            ToolName::FlyToLocation => Self::FlyToLocation(
                serde_json::from_value(input).map_err(invalid)?,
            ),
            ToolName::FilterInfrastructure => Self::FilterInfrastructure(
                serde_json::from_value(input).map_err(invalid)?,
            ),
            ToolName::HighlightFeature => Self::HighlightFeature(
                serde_json::from_value(input).map_err(invalid)?,
            ),
            ToolName::CalculateRoute => Self::CalculateRoute(
                serde_json::from_value(input).map_err(invalid)?,
            ),
            ToolName::FindNearest => {
                Self::FindNearest(serde_json::from_value(input).map_err(invalid)?)
            }
        })
    }

    /// Returns the catalog name of this action's tool.
    #[must_use]
    pub const fn tool_name(&self) -> ToolName {
        match self {
            Self::FlyToLocation(_) => ToolName::FlyToLocation,
            Self::FilterInfrastructure(_) => ToolName::FilterInfrastructure,
            Self::HighlightFeature(_) => ToolName::HighlightFeature,
            Self::CalculateRoute(_) => ToolName::CalculateRoute,
            Self::FindNearest(_) => ToolName::FindNearest,
        }
    }
}

/// A proposed tool invocation returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call identifier.
    pub id: String,
    /// The decoded action.
    #[serde(flatten)]
    pub action: MapAction,
}

/// Error returned when a tool-use block does not fit the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDecodeError {
    /// The tool name as sent by the model.
    pub tool: String,
    /// What was wrong.
    pub message: String,
}

impl std::fmt::Display for ToolDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid call to tool '{}': {}", self.tool, self.message)
    }
}

impl std::error::Error for ToolDecodeError {}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    /// The end user.
    User,
    /// The model.
    Assistant,
}

/// One prior turn of a conversation, as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// `"user"` or `"assistant"`; anything else is rejected by the bridge.
    pub role: String,
    /// Plain-text content of the turn.
    pub content: String,
}

/// Returns the JSON Schema definitions for the five map tools.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn tool_definitions() -> Vec<serde_json::Value> {
    vec![
        serde_json::json!({
            "name": "fly_to_location",
            "description": "Move the map camera to a location. Use this when the user asks to go to, show, zoom to, or look at a place.",
            "parameters": {
                "type": "object",
                "properties": {
                    "longitude": { "type": "number", "description": "Longitude of the target location" },
                    "latitude": { "type": "number", "description": "Latitude of the target location" },
                    "zoom": { "type": "number", "description": "Zoom level, 0-22 (default 14)" },
                    "pitch": { "type": "number", "description": "Camera pitch in degrees, 0-85 (default 45)" },
                    "bearing": { "type": "number", "description": "Camera bearing in degrees, -180 to 180 (default 0)" },
                    "duration": { "type": "number", "description": "Animation duration in milliseconds (default 2000)" }
                },
                "required": ["longitude", "latitude"]
            }
        }),
        serde_json::json!({
            "name": "filter_infrastructure",
            "description": "Choose which infrastructure layers are visible. Optionally restrict airports to certain classes and ports to certain subtypes.",
            "parameters": {
                "type": "object",
                "properties": {
                    "types": {
                        "type": "array",
                        "items": { "type": "string", "enum": ["airports", "ports", "warehouses"] },
                        "description": "Infrastructure layers to show"
                    },
                    "airport_classes": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Airport classes to show (e.g., 'runway', 'terminal', 'apron')"
                    },
                    "port_subtypes": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Port subtypes to show (e.g., 'pier', 'terminal', 'berth')"
                    }
                },
                "required": ["types"]
            }
        }),
        serde_json::json!({
            "name": "highlight_feature",
            "description": "Highlight a specific named airport, port or warehouse on the map.",
            "parameters": {
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Name of the feature to highlight" },
                    "type": {
                        "type": "string",
                        "enum": ["airports", "ports", "warehouses"],
                        "description": "Category of the feature"
                    }
                },
                "required": ["name", "type"]
            }
        }),
        serde_json::json!({
            "name": "calculate_route",
            "description": "Calculate and draw a driving route with live traffic between two points.",
            "parameters": {
                "type": "object",
                "properties": {
                    "start": {
                        "type": "object",
                        "properties": {
                            "lat": { "type": "number" },
                            "lon": { "type": "number" }
                        },
                        "required": ["lat", "lon"],
                        "description": "Route origin"
                    },
                    "end": {
                        "type": "object",
                        "properties": {
                            "lat": { "type": "number" },
                            "lon": { "type": "number" }
                        },
                        "required": ["lat", "lon"],
                        "description": "Route destination"
                    }
                },
                "required": ["start", "end"]
            }
        }),
        serde_json::json!({
            "name": "find_nearest",
            "description": "Find the airport, port or warehouse closest to a location.",
            "parameters": {
                "type": "object",
                "properties": {
                    "location": {
                        "type": "object",
                        "properties": {
                            "lat": { "type": "number" },
                            "lon": { "type": "number" }
                        },
                        "required": ["lat", "lon"],
                        "description": "Reference location"
                    },
                    "infrastructure_type": {
                        "type": "string",
                        "enum": ["airports", "ports", "warehouses"],
                        "description": "Category to search"
                    }
                },
                "required": ["location", "infrastructure_type"]
            }
        }),
    ]
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn catalog_names_match_tool_enum() {
        let names: Vec<String> = tool_definitions()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();

        assert_eq!(names.len(), 5);
        for name in names {
            assert!(ToolName::from_str(&name).is_ok(), "{name} not in ToolName");
        }
    }

    #[test]
    fn decodes_fly_to() {
        let action = MapAction::decode(
            "fly_to_location",
            serde_json::json!({ "longitude": -118.4085, "latitude": 33.9416, "zoom": 13 }),
        )
        .unwrap();

        let MapAction::FlyToLocation(params) = action else {
            panic!("expected fly_to_location");
        };
        assert!((params.longitude - -118.4085).abs() < f64::EPSILON);
        assert_eq!(params.zoom, Some(13.0));
        assert_eq!(params.pitch, None);
    }

    #[test]
    fn decodes_singular_category_names() {
        let action = MapAction::decode(
            "find_nearest",
            serde_json::json!({
                "location": { "lat": 34.05, "lon": -118.25 },
                "infrastructure_type": "port"
            }),
        )
        .unwrap();

        assert_eq!(action.tool_name(), ToolName::FindNearest);
        let MapAction::FindNearest(params) = action else {
            panic!("expected find_nearest");
        };
        assert_eq!(params.infrastructure_type, InfrastructureCategory::Ports);
    }

    #[test]
    fn rejects_unknown_tool() {
        let err = MapAction::decode("delete_map", serde_json::json!({})).unwrap_err();
        assert_eq!(err.tool, "delete_map");
    }

    #[test]
    fn rejects_mismatched_input() {
        assert!(
            MapAction::decode(
                "fly_to_location",
                serde_json::json!({ "longitude": "west" })
            )
            .is_err()
        );
        assert!(
            MapAction::decode(
                "highlight_feature",
                serde_json::json!({ "name": "LAX", "type": "train_stations" })
            )
            .is_err()
        );
    }

    #[test]
    fn tool_call_serializes_flat() {
        let call = ToolCall {
            id: "toolu_01".to_string(),
            action: MapAction::HighlightFeature(HighlightFeatureParams {
                name: "Port of Los Angeles".to_string(),
                feature_type: InfrastructureCategory::Ports,
            }),
        };

        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            serde_json::json!({
                "id": "toolu_01",
                "name": "highlight_feature",
                "input": { "name": "Port of Los Angeles", "type": "ports" }
            })
        );
    }

    #[test]
    fn chat_roles_parse() {
        assert_eq!(ChatRole::from_str("user").unwrap(), ChatRole::User);
        assert_eq!(ChatRole::from_str("assistant").unwrap(), ChatRole::Assistant);
        assert!(ChatRole::from_str("system").is_err());
    }
}
