#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loads infrastructure `GeoJSON` files into the category tables.
//!
//! Each file is a `FeatureCollection`. Every feature with a geometry and an
//! ID becomes one row; rows whose ID already exists are left untouched, so
//! loading the same file twice is harmless.

use std::path::Path;

use geojson::{Feature, GeoJson, JsonValue, feature::Id};
use mirror_infrastructure_models::InfrastructureCategory;
use switchy_database::{Database, DatabaseValue};
use thiserror::Error;

/// Errors that can occur while loading files.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The file is valid `GeoJSON` but not a feature collection.
    #[error("Expected a FeatureCollection, found a {found}")]
    NotAFeatureCollection {
        /// The kind of document that was found instead.
        found: &'static str,
    },
}

/// One feature ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    /// Feature ID.
    pub id: String,
    /// Display name.
    pub name: Option<String>,
    /// Feature subtype.
    pub subtype: Option<String>,
    /// Feature class.
    pub class: Option<String>,
    /// Geometry re-encoded as `GeoJSON` text.
    pub geometry: String,
    /// Building height in meters.
    pub height: Option<f64>,
    /// Number of floors.
    pub num_floors: Option<i32>,
}

/// Result of loading one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Features in the file.
    pub total: usize,
    /// Rows newly inserted.
    pub inserted: u64,
    /// Features skipped for missing geometry or ID.
    pub skipped: usize,
}

/// File name each category is loaded from by `load-all`.
#[must_use]
pub const fn default_file_name(category: InfrastructureCategory) -> &'static str {
    match category {
        InfrastructureCategory::Airports => "la_airport_infrastructure.geojson",
        InfrastructureCategory::Ports => "la_port_infrastructure.geojson",
        InfrastructureCategory::Warehouses => "la_warehouse_infrastructure.geojson",
    }
}

const fn insert_sql(category: InfrastructureCategory) -> &'static str {
    match category {
        InfrastructureCategory::Airports => {
            "INSERT INTO airports (id, name, subtype, class, geometry)
             VALUES ($1, $2, $3, $4, $5::text::jsonb)
             ON CONFLICT (id) DO NOTHING"
        }
        InfrastructureCategory::Ports => {
            "INSERT INTO ports (id, name, subtype, class, geometry)
             VALUES ($1, $2, $3, $4, $5::text::jsonb)
             ON CONFLICT (id) DO NOTHING"
        }
        InfrastructureCategory::Warehouses => {
            "INSERT INTO warehouses (id, name, subtype, class, geometry, height, num_floors)
             VALUES ($1, $2, $3, $4, $5::text::jsonb, $6, $7)
             ON CONFLICT (id) DO NOTHING"
        }
    }
}

/// Parses a `GeoJSON` document and returns its features.
///
/// # Errors
///
/// Returns [`IngestError`] if the text is not `GeoJSON` or not a feature
/// collection.
pub fn parse_features(text: &str) -> Result<Vec<Feature>, IngestError> {
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection.features),
        GeoJson::Feature(_) => Err(IngestError::NotAFeatureCollection { found: "Feature" }),
        GeoJson::Geometry(_) => Err(IngestError::NotAFeatureCollection { found: "Geometry" }),
    }
}

/// Converts a feature into a row, or `None` if it has no geometry or no
/// usable ID.
///
/// The ID is taken from the `id` property, falling back to the feature's
/// own `id` member. The name falls back to `names.primary`.
#[must_use]
pub fn feature_to_record(feature: &Feature) -> Option<FeatureRecord> {
    let geometry = feature.geometry.as_ref()?;
    let id = feature
        .property("id")
        .and_then(json_to_id)
        .or_else(|| match feature.id.as_ref()? {
            Id::String(s) => Some(s.clone()),
            Id::Number(n) => Some(n.to_string()),
        })
        .filter(|id| !id.is_empty())?;

    let name = string_property(feature, "name").or_else(|| {
        feature
            .property("names")
            .and_then(|names| names.get("primary"))
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    });

    Some(FeatureRecord {
        id,
        name,
        subtype: string_property(feature, "subtype"),
        class: string_property(feature, "class"),
        geometry: serde_json::to_string(geometry).ok()?,
        height: feature.property("height").and_then(JsonValue::as_f64),
        num_floors: feature
            .property("num_floors")
            .and_then(JsonValue::as_i64)
            .and_then(|n| i32::try_from(n).ok()),
    })
}

fn json_to_id(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_property(feature: &Feature, key: &str) -> Option<String> {
    feature
        .property(key)
        .and_then(JsonValue::as_str)
        .map(str::to_string)
}

fn opt_string(value: Option<&String>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, |s| DatabaseValue::String(s.clone()))
}

/// Binds a record to the parameters of [`insert_sql`]. The geometry is
/// bound as text and cast to `jsonb` in the statement.
fn record_params(category: InfrastructureCategory, record: &FeatureRecord) -> Vec<DatabaseValue> {
    let mut params = vec![
        DatabaseValue::String(record.id.clone()),
        opt_string(record.name.as_ref()),
        opt_string(record.subtype.as_ref()),
        opt_string(record.class.as_ref()),
        DatabaseValue::String(record.geometry.clone()),
    ];
    if category.has_building_attributes() {
        params.push(record.height.map_or(DatabaseValue::Null, DatabaseValue::Real64));
        params.push(
            record
                .num_floors
                .map_or(DatabaseValue::Null, DatabaseValue::Int32),
        );
    }
    params
}

/// Inserts prepared records into a category table.
///
/// # Errors
///
/// Returns [`IngestError::Database`] if an insert fails.
pub async fn insert_records(
    db: &dyn Database,
    category: InfrastructureCategory,
    records: &[FeatureRecord],
) -> Result<u64, IngestError> {
    let sql = insert_sql(category);
    let mut inserted = 0u64;

    for record in records {
        let params = record_params(category, record);
        inserted += db.exec_raw_params(sql, &params).await?;
    }

    Ok(inserted)
}

/// Loads one `GeoJSON` file into a category table.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be read or parsed, or an
/// insert fails.
pub async fn load_file(
    db: &dyn Database,
    category: InfrastructureCategory,
    path: &Path,
) -> Result<LoadSummary, IngestError> {
    log::info!("Loading {} into {}...", path.display(), category.table_name());

    let text = std::fs::read_to_string(path)?;
    let features = parse_features(&text)?;
    let records: Vec<FeatureRecord> = features.iter().filter_map(feature_to_record).collect();

    let summary = LoadSummary {
        total: features.len(),
        inserted: insert_records(db, category, &records).await?,
        skipped: features.len() - records.len(),
    };

    log::info!(
        "{}: {} features, {} inserted, {} skipped",
        category.table_name(),
        summary.total,
        summary.inserted,
        summary.skipped
    );

    Ok(summary)
}

/// Loads the default file of every category found in `data_dir`.
/// Missing files are skipped with a warning.
///
/// # Errors
///
/// Returns [`IngestError`] if a present file fails to load.
pub async fn load_all(
    db: &dyn Database,
    data_dir: &Path,
) -> Result<Vec<(InfrastructureCategory, LoadSummary)>, IngestError> {
    let mut results = Vec::new();

    for &category in InfrastructureCategory::all() {
        let path = data_dir.join(default_file_name(category));
        if !path.is_file() {
            log::warn!("{} not found, skipping {category}", path.display());
            continue;
        }
        results.push((category, load_file(db, category, &path).await?));
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"id": "lax-rwy-1", "name": "Runway 6L/24R", "subtype": "airport", "class": "runway"},
                "geometry": {"type": "LineString", "coordinates": [[-118.43, 33.95], [-118.38, 33.95]]}
            },
            {
                "type": "Feature",
                "properties": {"id": "no-geometry", "name": "Ghost"},
                "geometry": null
            },
            {
                "type": "Feature",
                "properties": {"name": "Anonymous"},
                "geometry": {"type": "Point", "coordinates": [-118.2, 33.7]}
            },
            {
                "type": "Feature",
                "id": 9001,
                "properties": {"names": {"primary": "Warehouse 9001"}, "height": 12.5, "num_floors": 2},
                "geometry": {"type": "Point", "coordinates": [-118.1, 33.9]}
            }
        ]
    }"#;

    #[test]
    fn skips_features_without_geometry_or_id() {
        let features = parse_features(SAMPLE).unwrap();
        let records: Vec<FeatureRecord> = features.iter().filter_map(feature_to_record).collect();

        assert_eq!(features.len(), 4);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["lax-rwy-1", "9001"]);
    }

    #[test]
    fn reads_properties_and_geometry() {
        let features = parse_features(SAMPLE).unwrap();
        let record = feature_to_record(&features[0]).unwrap();

        assert_eq!(record.name.as_deref(), Some("Runway 6L/24R"));
        assert_eq!(record.class.as_deref(), Some("runway"));
        let geometry: serde_json::Value = serde_json::from_str(&record.geometry).unwrap();
        assert_eq!(geometry["type"], "LineString");
    }

    #[test]
    fn falls_back_to_feature_id_and_primary_name() {
        let features = parse_features(SAMPLE).unwrap();
        let record = feature_to_record(&features[3]).unwrap();

        assert_eq!(record.id, "9001");
        assert_eq!(record.name.as_deref(), Some("Warehouse 9001"));
        assert_eq!(record.height, Some(12.5));
        assert_eq!(record.num_floors, Some(2));
    }

    #[test]
    fn rejects_non_collections() {
        let err = parse_features(r#"{"type":"Point","coordinates":[0.0,0.0]}"#).unwrap_err();
        assert!(matches!(
            err,
            IngestError::NotAFeatureCollection { found: "Geometry" }
        ));
    }

    #[test]
    fn only_warehouses_insert_building_columns() {
        for &category in InfrastructureCategory::all() {
            assert_eq!(
                insert_sql(category).contains("num_floors"),
                category.has_building_attributes()
            );
            assert!(insert_sql(category).contains(category.table_name()));
        }
    }

    #[test]
    fn geometry_is_bound_as_text_and_cast_to_jsonb() {
        for &category in InfrastructureCategory::all() {
            let sql = insert_sql(category);
            assert!(sql.contains("$5::text::jsonb"), "{sql}");
            assert!(!sql.contains("$5::jsonb"), "{sql}");
        }
    }

    #[test]
    fn params_match_statement_placeholders() {
        let features = parse_features(SAMPLE).unwrap();
        let records: Vec<FeatureRecord> = features.iter().filter_map(feature_to_record).collect();

        for &category in InfrastructureCategory::all() {
            let sql = insert_sql(category);
            let params = record_params(category, &records[1]);
            let placeholders = (1..=params.len() + 1)
                .take_while(|n| sql.contains(&format!("${n}")))
                .count();
            assert_eq!(placeholders, params.len(), "{category}");
            assert!(matches!(&params[4], DatabaseValue::String(g) if g == &records[1].geometry));
        }

        let params = record_params(InfrastructureCategory::Warehouses, &records[1]);
        assert!(matches!(params[5], DatabaseValue::Real64(h) if (h - 12.5).abs() < f64::EPSILON));
        assert!(matches!(params[6], DatabaseValue::Int32(2)));

        let params = record_params(InfrastructureCategory::Airports, &records[0]);
        assert!(matches!(&params[2], DatabaseValue::String(s) if s == "airport"));
    }

    #[test]
    fn default_file_names() {
        assert_eq!(
            default_file_name(InfrastructureCategory::Ports),
            "la_port_infrastructure.geojson"
        );
    }
}
