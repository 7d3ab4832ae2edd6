//! Great-circle distance on a spherical Earth.

use geo::Point;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers to statute miles.
pub const KM_TO_MILES: f64 = 0.621_371;

/// Returns the spherical law of cosines term for two points, clamped to
/// `[-1, 1]`.
///
/// Rounding can push the raw sum slightly past 1 for (nearly) identical
/// points or past -1 for antipodal ones, where `acos` would return NaN.
#[must_use]
pub fn clamped_cosine_argument(a: Point<f64>, b: Point<f64>) -> f64 {
    let lat_a = a.y().to_radians();
    let lat_b = b.y().to_radians();
    let delta_lon = b.x().to_radians() - a.x().to_radians();

    let raw = lat_a.cos() * lat_b.cos() * delta_lon.cos() + lat_a.sin() * lat_b.sin();
    raw.clamp(-1.0, 1.0)
}

/// Great-circle distance in kilometers between two `(lon, lat)` points.
///
/// Identical points are exactly `0.0`.
#[must_use]
pub fn great_circle_distance_km(a: Point<f64>, b: Point<f64>) -> f64 {
    if a == b {
        return 0.0;
    }
    EARTH_RADIUS_KM * clamped_cosine_argument(a, b).acos()
}

/// Rounds half away from zero to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
