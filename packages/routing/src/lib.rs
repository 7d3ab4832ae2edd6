#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Route proxy.
//!
//! Forwards a start/end pair to the TomTom `calculateRoute` endpoint and
//! flattens the returned legs into a single `[lon, lat]` sequence with
//! distance and duration republished in several units.
//!
//! See <https://developer.tomtom.com/routing-api/documentation/routing/calculate-route>

pub mod tomtom;

use std::time::Duration;

use mirror_infrastructure_models::LatLon;
use thiserror::Error;

pub use mirror_routing_models::RouteResult;
pub use tomtom::normalize_route;

/// Public TomTom API host.
pub const DEFAULT_BASE_URL: &str = "https://api.tomtom.com";

/// Upper bound on a single routing request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur while calculating a route.
#[derive(Debug, Error)]
pub enum RouteError {
    /// No routing API key is configured.
    #[error("Routing is not configured: TOMTOM_API_KEY is not set")]
    NotConfigured,

    /// The start or end point is missing or out of range.
    #[error("Invalid route request: {message}")]
    InvalidRequest {
        /// Description of what was wrong.
        message: String,
    },

    /// The provider answered but found no route.
    #[error("No route found between the given points")]
    NotFound,

    /// Network failure or timeout talking to the provider. The request URL
    /// carries the API key, so it is stripped before wrapping.
    #[error("Routing request failed: {0}")]
    Http(reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Routing provider returned HTTP {status}: {body}")]
    UpstreamStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The provider's response body could not be decoded.
    #[error("Failed to parse routing response: {message}")]
    Parse {
        /// Description of what went wrong.
        message: String,
    },
}

/// Client for the routing provider.
///
/// Holds a pooled HTTP client; cheap to share behind an `Arc` or
/// `web::Data`.
#[derive(Debug, Clone)]
pub struct RouteClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl RouteClient {
    /// Creates a client. A `None` or blank key leaves routing disabled;
    /// every request then fails with [`RouteError::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Result<Self, RouteError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(RouteError::Http)?;

        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Whether an API key is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Calculates a car route with live traffic between two points.
    ///
    /// # Errors
    ///
    /// * [`RouteError::InvalidRequest`] if either endpoint is missing or
    ///   out of range
    /// * [`RouteError::NotConfigured`] if no API key is set; no request is
    ///   made in that case
    /// * [`RouteError::NotFound`] if the provider returns no route
    /// * [`RouteError::Http`], [`RouteError::UpstreamStatus`] or
    ///   [`RouteError::Parse`] if the provider call fails
    pub async fn calculate_route(
        &self,
        start: Option<LatLon>,
        end: Option<LatLon>,
    ) -> Result<RouteResult, RouteError> {
        let (start, end) = validate_endpoints(start, end)?;

        let Some(api_key) = &self.api_key else {
            return Err(RouteError::NotConfigured);
        };

        let url = format!("{}{}", self.base_url, route_path(start, end));
        log::debug!("Requesting route {start:?} -> {end:?}");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("key", api_key.as_str()),
                ("traffic", "true"),
                ("travelMode", "car"),
            ])
            .send()
            .await
            .map_err(|e| RouteError::Http(e.without_url()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            log::warn!("Routing provider returned {status}");
            return Err(RouteError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp
            .text()
            .await
            .map_err(|e| RouteError::Http(e.without_url()))?;
        let parsed: tomtom::CalculateRouteResponse =
            serde_json::from_str(&text).map_err(|e| RouteError::Parse {
                message: e.to_string(),
            })?;

        normalize_route(parsed)
    }
}

fn validate_endpoints(
    start: Option<LatLon>,
    end: Option<LatLon>,
) -> Result<(LatLon, LatLon), RouteError> {
    let (Some(start), Some(end)) = (start, end) else {
        return Err(RouteError::InvalidRequest {
            message: "Both start and end points are required".to_string(),
        });
    };

    for (label, point) in [("start", start), ("end", end)] {
        point.validate().map_err(|e| RouteError::InvalidRequest {
            message: format!("{label}: {}", e.message),
        })?;
    }

    Ok((start, end))
}

/// Path of the `calculateRoute` request, `lat,lon` ordered.
fn route_path(start: LatLon, end: LatLon) -> String {
    format!(
        "/routing/1/calculateRoute/{},{}:{},{}/json",
        start.lat, start.lon, end.lat, end.lon
    )
}
