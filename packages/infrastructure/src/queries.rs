//! Database queries for the category tables and the supply-chain tables.
//!
//! Category table names are fixed per [`InfrastructureCategory`] variant;
//! no statement is ever built from request text.

use mirror_database_models::{ConnectionRow, FacilityRow, InfrastructureRow, Properties};
use mirror_infrastructure_models::{
    InfrastructureCategory, InfrastructureCounts, InfrastructureFeatureRow,
};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, Row};

use crate::InfrastructureError;

const fn features_sql(category: InfrastructureCategory) -> &'static str {
    match category {
        InfrastructureCategory::Airports => {
            "SELECT id, name, subtype, class, geometry::text AS geometry,
                    NULL::float8 AS height, NULL::int4 AS num_floors
             FROM airports
             ORDER BY id"
        }
        InfrastructureCategory::Ports => {
            "SELECT id, name, subtype, class, geometry::text AS geometry,
                    NULL::float8 AS height, NULL::int4 AS num_floors
             FROM ports
             ORDER BY id"
        }
        InfrastructureCategory::Warehouses => {
            "SELECT id, name, subtype, class, geometry::text AS geometry,
                    height::float8 AS height, num_floors
             FROM warehouses
             ORDER BY id"
        }
    }
}

const fn count_sql(category: InfrastructureCategory) -> &'static str {
    match category {
        InfrastructureCategory::Airports => "SELECT COUNT(*) AS count FROM airports",
        InfrastructureCategory::Ports => "SELECT COUNT(*) AS count FROM ports",
        InfrastructureCategory::Warehouses => "SELECT COUNT(*) AS count FROM warehouses",
    }
}

/// Returns every stored feature of a category, ordered by ID.
///
/// # Errors
///
/// Returns [`InfrastructureError`] if the database operation fails.
pub async fn fetch_features(
    db: &dyn Database,
    category: InfrastructureCategory,
) -> Result<Vec<InfrastructureFeatureRow>, InfrastructureError> {
    let rows = db.query_raw_params(features_sql(category), &[]).await?;

    log::debug!("Fetched {} {category} rows", rows.len());

    Ok(rows.iter().map(row_to_feature).collect())
}

fn row_to_feature(row: &Row) -> InfrastructureFeatureRow {
    InfrastructureFeatureRow {
        id: row.to_value("id").unwrap_or_default(),
        name: row.to_value("name").unwrap_or(None),
        subtype: row.to_value("subtype").unwrap_or(None),
        class: row.to_value("class").unwrap_or(None),
        geometry: row.to_value("geometry").unwrap_or_default(),
        height: row.to_value("height").unwrap_or(None),
        num_floors: row.to_value("num_floors").unwrap_or(None),
    }
}

/// Counts the features stored for one category.
///
/// # Errors
///
/// Returns [`InfrastructureError`] if the database operation fails.
pub async fn count_features(
    db: &dyn Database,
    category: InfrastructureCategory,
) -> Result<u64, InfrastructureError> {
    let rows = db.query_raw_params(count_sql(category), &[]).await?;

    Ok(rows.first().map_or(0, |row| {
        count_to_u64(row.to_value::<i64>("count").unwrap_or(0))
    }))
}

/// Counts the features stored for every category.
///
/// # Errors
///
/// Returns [`InfrastructureError`] if any count query fails.
pub async fn count_all(db: &dyn Database) -> Result<InfrastructureCounts, InfrastructureError> {
    Ok(InfrastructureCounts {
        airports: count_features(db, InfrastructureCategory::Airports).await?,
        ports: count_features(db, InfrastructureCategory::Ports).await?,
        warehouses: count_features(db, InfrastructureCategory::Warehouses).await?,
    })
}

/// Airport counts grouped by class. `NULL` classes are returned as `None`.
///
/// # Errors
///
/// Returns [`InfrastructureError`] if the database operation fails.
pub async fn airport_class_counts(
    db: &dyn Database,
) -> Result<Vec<(Option<String>, u64)>, InfrastructureError> {
    let rows = db
        .query_raw_params(
            "SELECT class AS key, COUNT(*) AS count
             FROM airports
             GROUP BY class
             ORDER BY count DESC, class ASC",
            &[],
        )
        .await?;

    Ok(rows.iter().map(row_to_group_count).collect())
}

/// Port counts grouped by subtype. `NULL` subtypes are returned as `None`.
///
/// # Errors
///
/// Returns [`InfrastructureError`] if the database operation fails.
pub async fn port_subtype_counts(
    db: &dyn Database,
) -> Result<Vec<(Option<String>, u64)>, InfrastructureError> {
    let rows = db
        .query_raw_params(
            "SELECT subtype AS key, COUNT(*) AS count
             FROM ports
             GROUP BY subtype
             ORDER BY count DESC, subtype ASC",
            &[],
        )
        .await?;

    Ok(rows.iter().map(row_to_group_count).collect())
}

fn row_to_group_count(row: &Row) -> (Option<String>, u64) {
    (
        row.to_value("key").unwrap_or(None),
        count_to_u64(row.to_value::<i64>("count").unwrap_or(0)),
    )
}

/// Warehouse total plus average height and floor count over the rows that
/// have them. Averages are `None` when no row has a value.
///
/// # Errors
///
/// Returns [`InfrastructureError`] if the database operation fails.
pub async fn warehouse_aggregates(
    db: &dyn Database,
) -> Result<(u64, Option<f64>, Option<f64>), InfrastructureError> {
    let rows = db
        .query_raw_params(
            "SELECT COUNT(*) AS count,
                    AVG(height)::float8 AS avg_height,
                    AVG(num_floors)::float8 AS avg_floors
             FROM warehouses",
            &[],
        )
        .await?;

    Ok(rows.first().map_or((0, None, None), |row| {
        (
            count_to_u64(row.to_value::<i64>("count").unwrap_or(0)),
            row.to_value("avg_height").unwrap_or(None),
            row.to_value("avg_floors").unwrap_or(None),
        )
    }))
}

/// Lists all supply-chain facilities, ordered by ID.
///
/// # Errors
///
/// Returns [`InfrastructureError`] if the database operation fails or a
/// stored `properties` document is not a JSON object.
pub async fn list_facilities(db: &dyn Database) -> Result<Vec<FacilityRow>, InfrastructureError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, type, latitude::float8 AS latitude,
                    longitude::float8 AS longitude, capacity::float8 AS capacity,
                    properties::text AS properties
             FROM facilities
             ORDER BY id",
            &[],
        )
        .await?;

    rows.iter()
        .map(|row| {
            Ok(FacilityRow {
                id: row.to_value("id").unwrap_or(0),
                name: row.to_value("name").unwrap_or_default(),
                facility_type: row.to_value("type").unwrap_or_default(),
                latitude: row.to_value("latitude").unwrap_or(0.0),
                longitude: row.to_value("longitude").unwrap_or(0.0),
                capacity: row.to_value("capacity").unwrap_or(None),
                properties: row_properties(row, "properties")?,
            })
        })
        .collect()
}

/// Lists all generic infrastructure assets, ordered by type then ID.
///
/// # Errors
///
/// Returns [`InfrastructureError`] if the database operation fails or a
/// stored JSON column cannot be decoded.
pub async fn list_infrastructure(
    db: &dyn Database,
) -> Result<Vec<InfrastructureRow>, InfrastructureError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, type, latitude::float8 AS latitude,
                    longitude::float8 AS longitude, geojson::text AS geojson,
                    properties::text AS properties
             FROM infrastructure
             ORDER BY type, id",
            &[],
        )
        .await?;

    rows.iter()
        .map(|row| {
            let geojson = row
                .to_value::<Option<String>>("geojson")
                .unwrap_or(None)
                .map(|text| serde_json::from_str(&text))
                .transpose()?;

            Ok(InfrastructureRow {
                id: row.to_value("id").unwrap_or(0),
                name: row.to_value("name").unwrap_or_default(),
                infrastructure_type: row.to_value("type").unwrap_or_default(),
                latitude: row.to_value("latitude").unwrap_or(None),
                longitude: row.to_value("longitude").unwrap_or(None),
                geojson,
                properties: row_properties(row, "properties")?,
            })
        })
        .collect()
}

/// Lists all supply-chain connections with both endpoint facilities
/// resolved, ordered by ID.
///
/// # Errors
///
/// Returns [`InfrastructureError`] if the database operation fails.
pub async fn list_connections(
    db: &dyn Database,
) -> Result<Vec<ConnectionRow>, InfrastructureError> {
    let rows = db
        .query_raw_params(
            "SELECT sc.id, sc.connection_type, sc.flow_volume::float8 AS flow_volume,
                    f1.name AS from_facility_name,
                    f1.latitude::float8 AS from_latitude,
                    f1.longitude::float8 AS from_longitude,
                    f2.name AS to_facility_name,
                    f2.latitude::float8 AS to_latitude,
                    f2.longitude::float8 AS to_longitude
             FROM supply_chain_connections sc
             JOIN facilities f1 ON sc.from_facility_id = f1.id
             JOIN facilities f2 ON sc.to_facility_id = f2.id
             ORDER BY sc.id",
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| ConnectionRow {
            id: row.to_value("id").unwrap_or(0),
            connection_type: row.to_value("connection_type").unwrap_or(None),
            flow_volume: row.to_value("flow_volume").unwrap_or(None),
            from_facility_name: row.to_value("from_facility_name").unwrap_or_default(),
            from_latitude: row.to_value("from_latitude").unwrap_or(0.0),
            from_longitude: row.to_value("from_longitude").unwrap_or(0.0),
            to_facility_name: row.to_value("to_facility_name").unwrap_or_default(),
            to_latitude: row.to_value("to_latitude").unwrap_or(0.0),
            to_longitude: row.to_value("to_longitude").unwrap_or(0.0),
        })
        .collect())
}

/// Decodes a `JSONB` column read as text into a JSON object.
fn row_properties(row: &Row, column: &str) -> Result<Option<Properties>, InfrastructureError> {
    row.to_value::<Option<String>>(column)
        .unwrap_or(None)
        .map(|text| serde_json::from_str::<Properties>(&text))
        .transpose()
        .map_err(InfrastructureError::from)
}

fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}
