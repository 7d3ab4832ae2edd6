//! Typed decoding of stored `GeoJSON` geometries.

use geo::{Coord, Geometry, Point};
use geojson::GeoJson;

use crate::SpatialError;

/// Parses a stored `GeoJSON` document into a `GeoJSON` geometry.
///
/// Accepts a bare geometry or a feature wrapping one. Map layers and the
/// nearest search both decode stored rows through this function, so a row
/// is either served by both or skipped by both.
///
/// # Errors
///
/// Returns [`SpatialError`] if the text is not `GeoJSON`, is a feature
/// collection, or is a feature without geometry.
pub fn parse_geojson_geometry(text: &str) -> Result<geojson::Geometry, SpatialError> {
    match text.parse::<GeoJson>()? {
        GeoJson::Geometry(geometry) => Ok(geometry),
        GeoJson::Feature(feature) => feature.geometry.ok_or(SpatialError::NotAGeometry {
            found: "Feature without geometry",
        }),
        GeoJson::FeatureCollection(_) => Err(SpatialError::NotAGeometry {
            found: "FeatureCollection",
        }),
    }
}

/// Parses a stored `GeoJSON` document into a `geo` geometry.
///
/// # Errors
///
/// Returns [`SpatialError`] if [`parse_geojson_geometry`] fails or the
/// coordinates cannot be represented as `geo` types.
pub fn parse_geometry(text: &str) -> Result<Geometry<f64>, SpatialError> {
    Ok(parse_geojson_geometry(text)?.try_into()?)
}

/// Picks the coordinate that stands in for a geometry in distance queries.
///
/// Uses the first vertex for line and polygon types (the exterior ring for
/// polygons) and recurses into collections. Returns `None` for empty
/// geometries.
#[must_use]
pub fn representative_point(geometry: &Geometry<f64>) -> Option<Point<f64>> {
    let coord: Coord<f64> = match geometry {
        Geometry::Point(point) => return Some(*point),
        Geometry::Line(line) => line.start,
        Geometry::LineString(line) => *line.0.first()?,
        Geometry::Polygon(polygon) => *polygon.exterior().0.first()?,
        Geometry::MultiPoint(points) => return points.0.first().copied(),
        Geometry::MultiLineString(lines) => *lines.0.first()?.0.first()?,
        Geometry::MultiPolygon(polygons) => *polygons.0.first()?.exterior().0.first()?,
        Geometry::GeometryCollection(collection) => {
            return collection.0.iter().find_map(representative_point);
        }
        Geometry::Rect(rect) => rect.min(),
        Geometry::Triangle(triangle) => triangle.to_array()[0],
    };

    Some(coord.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_of(text: &str) -> Option<Point<f64>> {
        representative_point(&parse_geometry(text).unwrap())
    }

    #[test]
    fn point_is_its_own_representative() {
        let p = point_of(r#"{"type":"Point","coordinates":[-118.4085,33.9416]}"#).unwrap();
        assert!((p.x() - -118.4085).abs() < 1e-12);
        assert!((p.y() - 33.9416).abs() < 1e-12);
    }

    #[test]
    fn line_string_uses_first_vertex() {
        let p = point_of(
            r#"{"type":"LineString","coordinates":[[-118.41,33.95],[-118.39,33.94]]}"#,
        )
        .unwrap();
        assert_eq!(p, Point::new(-118.41, 33.95));
    }

    #[test]
    fn polygon_uses_first_exterior_vertex() {
        let p = point_of(
            r#"{"type":"Polygon","coordinates":[
                [[-118.27,33.74],[-118.25,33.74],[-118.25,33.76],[-118.27,33.74]],
                [[-118.26,33.745],[-118.255,33.745],[-118.255,33.75],[-118.26,33.745]]
            ]}"#,
        )
        .unwrap();
        assert_eq!(p, Point::new(-118.27, 33.74));
    }

    #[test]
    fn multi_polygon_uses_first_polygon() {
        let p = point_of(
            r#"{"type":"MultiPolygon","coordinates":[
                [[[-118.20,33.75],[-118.19,33.75],[-118.19,33.76],[-118.20,33.75]]],
                [[[-118.10,33.70],[-118.09,33.70],[-118.09,33.71],[-118.10,33.70]]]
            ]}"#,
        )
        .unwrap();
        assert_eq!(p, Point::new(-118.20, 33.75));
    }

    #[test]
    fn collection_skips_empty_members() {
        let p = point_of(
            r#"{"type":"GeometryCollection","geometries":[
                {"type":"MultiPoint","coordinates":[]},
                {"type":"Point","coordinates":[-118.0,34.0]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(p, Point::new(-118.0, 34.0));
    }

    #[test]
    fn empty_line_string_has_no_representative() {
        assert!(point_of(r#"{"type":"LineString","coordinates":[]}"#).is_none());
    }

    #[test]
    fn feature_wrapper_is_unwrapped() {
        let p = point_of(
            r#"{"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[1.0,2.0]}}"#,
        )
        .unwrap();
        assert_eq!(p, Point::new(1.0, 2.0));
    }

    #[test]
    fn rejects_non_geometry_documents() {
        assert!(parse_geometry(r#"{"type":"FeatureCollection","features":[]}"#).is_err());
        assert!(parse_geometry("not json").is_err());
        assert!(parse_geometry(r#"{"type":"Point","coordinates":"oops"}"#).is_err());
    }

    #[test]
    fn feature_wrapper_keeps_geojson_geometry() {
        let geometry = parse_geojson_geometry(
            r#"{"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[1.0,2.0]}}"#,
        )
        .unwrap();
        assert_eq!(geometry.value, geojson::Value::Point(vec![1.0, 2.0]));
    }
}
