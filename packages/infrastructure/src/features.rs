//! `GeoJSON` feature collection assembly.
//!
//! Category features carry their stored geometry verbatim. Facilities are
//! rendered as points and connections as two-vertex line strings between
//! their endpoint facilities.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use mirror_database_models::{ConnectionRow, FacilityRow};
use mirror_infrastructure_models::{InfrastructureCategory, InfrastructureFeatureRow};
use mirror_spatial::parse_geojson_geometry;
use switchy_database::Database;

use crate::{InfrastructureError, queries};

/// Loads every feature of a category as a `GeoJSON` feature collection.
///
/// # Errors
///
/// Returns [`InfrastructureError`] if the database operation fails.
pub async fn category_collection(
    db: &dyn Database,
    category: InfrastructureCategory,
) -> Result<FeatureCollection, InfrastructureError> {
    let rows = queries::fetch_features(db, category).await?;
    Ok(category_feature_collection(category, &rows))
}

/// Builds a feature collection from category rows.
///
/// Rows whose stored geometry is not a valid `GeoJSON` geometry are
/// skipped with a warning so one bad row does not hide the whole layer.
#[must_use]
pub fn category_feature_collection(
    category: InfrastructureCategory,
    rows: &[InfrastructureFeatureRow],
) -> FeatureCollection {
    let features = rows
        .iter()
        .filter_map(|row| match parse_geojson_geometry(&row.geometry) {
            Ok(geometry) => Some(category_feature(category, row, geometry)),
            Err(e) => {
                log::warn!("Skipping {} {}: invalid geometry: {e}", category.singular(), row.id);
                None
            }
        })
        .collect();

    collection(features)
}

fn category_feature(
    category: InfrastructureCategory,
    row: &InfrastructureFeatureRow,
    geometry: Geometry,
) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("id".to_string(), JsonValue::from(row.id.clone()));
    properties.insert("name".to_string(), JsonValue::from(row.name.clone()));
    properties.insert("subtype".to_string(), JsonValue::from(row.subtype.clone()));
    properties.insert("class".to_string(), JsonValue::from(row.class.clone()));

    if category.has_building_attributes() {
        properties.insert("height".to_string(), JsonValue::from(row.height));
        properties.insert("num_floors".to_string(), JsonValue::from(row.num_floors));
    }

    feature(geometry, properties)
}

/// Builds a point feature collection from facilities.
///
/// Base properties are `id`, `name`, `type` and `capacity`; the facility's
/// own `properties` object is merged on top and wins on key collisions.
#[must_use]
pub fn facilities_feature_collection(rows: &[FacilityRow]) -> FeatureCollection {
    collection(
        rows.iter()
            .map(|row| {
                let mut properties = JsonObject::new();
                properties.insert("id".to_string(), JsonValue::from(row.id));
                properties.insert("name".to_string(), JsonValue::from(row.name.clone()));
                properties.insert(
                    "type".to_string(),
                    JsonValue::from(row.facility_type.clone()),
                );
                properties.insert("capacity".to_string(), JsonValue::from(row.capacity));
                if let Some(extra) = &row.properties {
                    properties.extend(extra.clone());
                }

                let geometry = Geometry::new(Value::Point(vec![row.longitude, row.latitude]));
                feature(geometry, properties)
            })
            .collect(),
    )
}

/// Builds a line feature collection from supply-chain connections.
#[must_use]
pub fn connections_feature_collection(rows: &[ConnectionRow]) -> FeatureCollection {
    collection(
        rows.iter()
            .map(|row| {
                let mut properties = JsonObject::new();
                properties.insert("id".to_string(), JsonValue::from(row.id));
                properties.insert(
                    "from".to_string(),
                    JsonValue::from(row.from_facility_name.clone()),
                );
                properties.insert(
                    "to".to_string(),
                    JsonValue::from(row.to_facility_name.clone()),
                );
                properties.insert(
                    "type".to_string(),
                    JsonValue::from(row.connection_type.clone()),
                );
                properties.insert("flow_volume".to_string(), JsonValue::from(row.flow_volume));

                let geometry = Geometry::new(Value::LineString(vec![
                    vec![row.from_longitude, row.from_latitude],
                    vec![row.to_longitude, row.to_latitude],
                ]));
                feature(geometry, properties)
            })
            .collect(),
    )
}

const fn feature(geometry: Geometry, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

const fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airport(id: &str, geometry: &str) -> InfrastructureFeatureRow {
        InfrastructureFeatureRow {
            id: id.to_string(),
            name: Some("Los Angeles International".to_string()),
            subtype: Some("airport".to_string()),
            class: Some("international".to_string()),
            geometry: geometry.to_string(),
            height: None,
            num_floors: None,
        }
    }

    #[test]
    fn airport_features_carry_base_properties_only() {
        let rows = [airport(
            "lax",
            r#"{"type":"Point","coordinates":[-118.4085,33.9416]}"#,
        )];
        let fc = category_feature_collection(InfrastructureCategory::Airports, &rows);
        let json = serde_json::to_value(&fc).unwrap();

        assert_eq!(json["type"], "FeatureCollection");
        let props = &json["features"][0]["properties"];
        assert_eq!(props["id"], "lax");
        assert_eq!(props["class"], "international");
        assert!(props.get("height").is_none());
        assert_eq!(json["features"][0]["geometry"]["type"], "Point");
    }

    #[test]
    fn warehouse_features_carry_building_attributes() {
        let rows = [InfrastructureFeatureRow {
            id: "w1".to_string(),
            name: None,
            subtype: None,
            class: None,
            geometry: r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}"#
                .to_string(),
            height: Some(12.5),
            num_floors: None,
        }];
        let fc = category_feature_collection(InfrastructureCategory::Warehouses, &rows);
        let json = serde_json::to_value(&fc).unwrap();
        let props = &json["features"][0]["properties"];

        assert!(props["name"].is_null());
        assert!((props["height"].as_f64().unwrap() - 12.5).abs() < f64::EPSILON);
        assert!(props["num_floors"].is_null());
    }

    #[test]
    fn invalid_geometry_rows_are_skipped() {
        let rows = [
            airport("bad", "not json"),
            airport("good", r#"{"type":"Point","coordinates":[1.0,2.0]}"#),
        ];
        let fc = category_feature_collection(InfrastructureCategory::Airports, &rows);
        assert_eq!(fc.features.len(), 1);
    }

    #[test]
    fn layer_and_nearest_agree_on_feature_wrapped_rows() {
        let rows = vec![
            airport(
                "wrapped",
                r#"{"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[-118.4085,33.9416]}}"#,
            ),
            airport("collection", r#"{"type":"FeatureCollection","features":[]}"#),
        ];

        let fc = category_feature_collection(InfrastructureCategory::Airports, &rows);
        assert_eq!(fc.features.len(), 1);
        let json = serde_json::to_value(&fc).unwrap();
        assert_eq!(json["features"][0]["properties"]["id"], "wrapped");
        assert_eq!(json["features"][0]["geometry"]["type"], "Point");

        let best = crate::nearest::nearest_in(
            InfrastructureCategory::Airports,
            mirror_infrastructure_models::LatLon::new(34.0, -118.3),
            rows,
        )
        .unwrap();
        assert_eq!(best.id, "wrapped");
    }

    #[test]
    fn empty_rows_give_empty_collection() {
        let fc = category_feature_collection(InfrastructureCategory::Ports, &[]);
        let json = serde_json::to_value(&fc).unwrap();
        assert_eq!(json["features"], serde_json::json!([]));
    }

    #[test]
    fn facility_properties_override_base_properties() {
        let mut extra = serde_json::Map::new();
        extra.insert("operator".to_string(), "POLB".into());
        extra.insert("capacity".to_string(), "9M TEU".into());

        let rows = [FacilityRow {
            id: 7,
            name: "Port of Long Beach".to_string(),
            facility_type: "port".to_string(),
            latitude: 33.7542,
            longitude: -118.2165,
            capacity: Some(9_000_000.0),
            properties: Some(extra),
        }];
        let json = serde_json::to_value(facilities_feature_collection(&rows)).unwrap();
        let feature = &json["features"][0];

        assert_eq!(
            feature["geometry"]["coordinates"],
            serde_json::json!([-118.2165, 33.7542])
        );
        assert_eq!(feature["properties"]["type"], "port");
        assert_eq!(feature["properties"]["operator"], "POLB");
        assert_eq!(feature["properties"]["capacity"], "9M TEU");
    }

    #[test]
    fn connections_are_two_vertex_lines() {
        let rows = [ConnectionRow {
            id: 1,
            connection_type: Some("trucking".to_string()),
            flow_volume: None,
            from_facility_name: "Port of Los Angeles".to_string(),
            from_latitude: 33.7395,
            from_longitude: -118.2610,
            to_facility_name: "Ontario DC".to_string(),
            to_latitude: 34.0633,
            to_longitude: -117.6509,
        }];
        let json = serde_json::to_value(connections_feature_collection(&rows)).unwrap();
        let feature = &json["features"][0];

        assert_eq!(feature["geometry"]["type"], "LineString");
        assert_eq!(
            feature["geometry"]["coordinates"],
            serde_json::json!([[-118.2610, 33.7395], [-117.6509, 34.0633]])
        );
        assert_eq!(feature["properties"]["from"], "Port of Los Angeles");
        assert!(feature["properties"]["flow_volume"].is_null());
    }
}
