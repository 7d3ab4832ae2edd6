//! TomTom `calculateRoute` response types and normalization.

use mirror_spatial::{KM_TO_MILES, round_to};
use serde::Deserialize;

use crate::{RouteError, RouteResult};

/// Top-level `calculateRoute` response. Only the fields used are decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculateRouteResponse {
    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// One route.
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    /// Totals for the whole route.
    pub summary: Summary,
    /// Legs between consecutive waypoints.
    #[serde(default)]
    pub legs: Vec<Leg>,
}

/// Route totals.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Length in meters.
    pub length_in_meters: f64,
    /// Travel time in seconds, including traffic delay.
    pub travel_time_in_seconds: f64,
    /// Delay caused by traffic in seconds.
    #[serde(default)]
    pub traffic_delay_in_seconds: Option<f64>,
}

/// One leg of a route.
#[derive(Debug, Clone, Deserialize)]
pub struct Leg {
    /// Leg geometry.
    #[serde(default)]
    pub points: Vec<RoutePoint>,
}

/// A route vertex.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RoutePoint {
    /// Latitude.
    #[serde(alias = "lat")]
    pub latitude: f64,
    /// Longitude.
    #[serde(alias = "lon")]
    pub longitude: f64,
}

/// Normalizes the first route of a provider response.
///
/// # Errors
///
/// Returns [`RouteError::NotFound`] if the response has no routes.
pub fn normalize_route(response: CalculateRouteResponse) -> Result<RouteResult, RouteError> {
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(RouteError::NotFound)?;

    let coordinates = route
        .legs
        .iter()
        .flat_map(|leg| leg.points.iter())
        .map(|point| [point.longitude, point.latitude])
        .collect();

    let meters = route.summary.length_in_meters;
    let seconds = route.summary.travel_time_in_seconds;
    let km = meters / 1000.0;

    Ok(RouteResult {
        coordinates,
        distance: meters,
        distance_km: round_to(km, 2),
        distance_miles: round_to(km * KM_TO_MILES, 2),
        duration: seconds,
        duration_minutes: round_to(seconds / 60.0, 1),
        traffic_delay: route.summary.traffic_delay_in_seconds.unwrap_or(0.0),
    })
}
