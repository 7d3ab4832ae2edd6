//! Nearest-feature lookup over one category.

use geo::Point;
use mirror_infrastructure_models::{
    InfrastructureCategory, InfrastructureFeatureRow, LatLon, NearestFeature,
};
use mirror_spatial::{
    Candidate, KM_TO_MILES, nearest, parse_geometry, representative_point, round_to,
};
use switchy_database::Database;

use crate::{InfrastructureError, queries};

/// Finds the feature of `category` closest to `reference`.
///
/// # Errors
///
/// * [`InfrastructureError::InvalidRequest`] if the reference point is out
///   of range
/// * [`InfrastructureError::NotFound`] if the category has no locatable
///   feature
/// * [`InfrastructureError::Database`] if the query fails
pub async fn find_nearest(
    db: &dyn Database,
    category: InfrastructureCategory,
    reference: LatLon,
) -> Result<NearestFeature, InfrastructureError> {
    reference
        .validate()
        .map_err(|e| InfrastructureError::InvalidRequest { message: e.message })?;

    let rows = queries::fetch_features(db, category).await?;

    nearest_in(category, reference, rows).ok_or_else(|| InfrastructureError::NotFound {
        message: format!("No {} found", category.singular()),
    })
}

/// Ranks already-loaded rows against `reference`.
///
/// Rows whose geometry cannot be decoded or is empty are skipped.
#[must_use]
pub fn nearest_in(
    category: InfrastructureCategory,
    reference: LatLon,
    rows: Vec<InfrastructureFeatureRow>,
) -> Option<NearestFeature> {
    let candidates = rows.into_iter().filter_map(|row| {
        let point = match parse_geometry(&row.geometry) {
            Ok(geometry) => representative_point(&geometry),
            Err(e) => {
                log::warn!("Skipping {} {}: {e}", category.singular(), row.id);
                None
            }
        }?;

        Some(Candidate {
            key: row.id.clone(),
            point,
            item: row,
        })
    });

    let ranked = nearest(Point::new(reference.lon, reference.lat), candidates)?;
    let row = ranked.item;

    Some(NearestFeature {
        category,
        id: row.id,
        name: row.name,
        subtype: row.subtype,
        class: row.class,
        coordinates: [ranked.point.x(), ranked.point.y()],
        distance_km: round_to(ranked.distance_km, 2),
        distance_miles: round_to(ranked.distance_km * KM_TO_MILES, 2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(id: &str, geometry: &str) -> InfrastructureFeatureRow {
        InfrastructureFeatureRow {
            id: id.to_string(),
            name: Some(id.to_uppercase()),
            subtype: Some("terminal".to_string()),
            class: None,
            geometry: geometry.to_string(),
            height: None,
            num_floors: None,
        }
    }

    fn sample_ports() -> Vec<InfrastructureFeatureRow> {
        vec![
            port(
                "polb",
                r#"{"type":"Polygon","coordinates":[[[-118.2165,33.7542],[-118.20,33.7542],[-118.20,33.76],[-118.2165,33.7542]]]}"#,
            ),
            port(
                "pola",
                r#"{"type":"Point","coordinates":[-118.2610,33.7395]}"#,
            ),
            port("broken", "{}"),
            port("empty", r#"{"type":"MultiPoint","coordinates":[]}"#),
        ]
    }

    #[test]
    fn query_at_feature_coordinate_returns_it_at_zero() {
        let result = nearest_in(
            InfrastructureCategory::Ports,
            LatLon::new(33.7395, -118.2610),
            sample_ports(),
        )
        .unwrap();

        assert_eq!(result.id, "pola");
        assert!(result.distance_km.abs() < f64::EPSILON);
        assert!(result.distance_miles.abs() < f64::EPSILON);
        assert_eq!(result.coordinates, [-118.2610, 33.7395]);
    }

    #[test]
    fn polygon_uses_first_exterior_vertex() {
        let result = nearest_in(
            InfrastructureCategory::Ports,
            LatLon::new(33.76, -118.19),
            sample_ports(),
        )
        .unwrap();

        assert_eq!(result.id, "polb");
        assert_eq!(result.coordinates, [-118.2165, 33.7542]);
        assert_eq!(result.category, InfrastructureCategory::Ports);
    }

    #[test]
    fn miles_are_derived_from_unrounded_km() {
        let result = nearest_in(
            InfrastructureCategory::Ports,
            LatLon::new(33.9416, -118.4085),
            sample_ports(),
        )
        .unwrap();

        let d_km = mirror_spatial::great_circle_distance_km(
            Point::new(-118.4085, 33.9416),
            Point::new(result.coordinates[0], result.coordinates[1]),
        );
        assert!((result.distance_km - round_to(d_km, 2)).abs() < f64::EPSILON);
        assert!((result.distance_miles - round_to(d_km * KM_TO_MILES, 2)).abs() < f64::EPSILON);
    }

    #[test]
    fn no_locatable_rows_is_none() {
        let rows = vec![port("broken", "{}")];
        assert!(
            nearest_in(InfrastructureCategory::Ports, LatLon::new(0.0, 0.0), rows).is_none()
        );
        assert!(
            nearest_in(InfrastructureCategory::Ports, LatLon::new(0.0, 0.0), Vec::new()).is_none()
        );
    }
}
