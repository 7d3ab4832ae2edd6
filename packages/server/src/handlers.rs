//! HTTP handler functions for the mirror API.

use std::collections::BTreeMap;

use actix_web::{HttpRequest, HttpResponse, error::JsonPayloadError, error::PathError, web};
use mirror_infrastructure::{features, nearest, queries};
use mirror_infrastructure_models::{InfrastructureCategory, LatLon};
use mirror_routing::RouteClient;
use mirror_server_models::{
    ApiHealth, ApiIndex, ChatRequest, ChatResponse, ConnectionsResponse, FacilitiesResponse,
    InfrastructureResponse, NearestRequest, NearestResponse, RouteRequest, RouteResponse,
    SimulationsResponse, TimelineResponse,
};

use crate::AppState;
use crate::error::{ApiError, ErrorKind};

/// `GET /`
pub async fn index() -> HttpResponse {
    let endpoints: BTreeMap<String, String> = [
        ("airports", "/api/airports"),
        ("ports", "/api/ports"),
        ("warehouses", "/api/warehouses"),
        ("stats", "/api/stats"),
        ("chat", "/api/chat"),
        ("route", "/api/route"),
        ("find_nearest", "/api/find-nearest"),
        ("facilities", "/api/facilities"),
        ("infrastructure", "/api/infrastructure"),
        ("connections", "/api/infrastructure/connections"),
        ("simulations", "/api/simulations"),
        ("health", "/api/health"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    HttpResponse::Ok().json(ApiIndex {
        message: "LA infrastructure map API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}

/// `GET /health` and `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn category_features(
    state: &AppState,
    category: InfrastructureCategory,
) -> Result<HttpResponse, ApiError> {
    let collection = features::category_collection(state.db.as_ref(), category).await?;
    log::debug!("Serving {} {category}", collection.features.len());
    Ok(HttpResponse::Ok().json(collection))
}

/// `GET /api/airports`
///
/// # Errors
///
/// Returns [`ApiError`] if the database query fails.
pub async fn airports(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    category_features(&state, InfrastructureCategory::Airports).await
}

/// `GET /api/ports`
///
/// # Errors
///
/// Returns [`ApiError`] if the database query fails.
pub async fn ports(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    category_features(&state, InfrastructureCategory::Ports).await
}

/// `GET /api/warehouses`
///
/// # Errors
///
/// Returns [`ApiError`] if the database query fails.
pub async fn warehouses(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    category_features(&state, InfrastructureCategory::Warehouses).await
}

/// `GET /api/stats`
///
/// # Errors
///
/// Returns [`ApiError`] if a database query fails.
pub async fn stats(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let stats = mirror_infrastructure::stats::get_stats(state.db.as_ref()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// `POST /api/chat`
///
/// Returns the model's text and any map actions for the client to run.
///
/// # Errors
///
/// * 503 if no AI provider is configured
/// * 400 if the message is empty or the history is malformed
/// * 502 if the provider fails or proposes an unknown tool
pub async fn chat(
    state: web::Data<AppState>,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let Some(provider) = state.ai_provider.as_deref() else {
        return Err(ApiError::new(
            ErrorKind::NotConfigured,
            "AI provider is not configured: ANTHROPIC_API_KEY is not set",
        ));
    };

    let ChatRequest { message, history } = body.into_inner();
    let reply = mirror_ai::handle_chat(state.db.as_ref(), provider, &message, &history).await?;

    let requires_action = reply.requires_action();
    Ok(HttpResponse::Ok().json(ChatResponse {
        text: reply.text,
        actions: reply.actions,
        tool_calls: reply.tool_calls,
        requires_action,
    }))
}

/// `POST /api/route`
///
/// # Errors
///
/// * 400 if an endpoint is missing or out of range
/// * 503 if no routing key is configured
/// * 404 if the provider finds no route
/// * 502 if the provider call fails
pub async fn route(
    client: web::Data<RouteClient>,
    body: web::Json<RouteRequest>,
) -> Result<HttpResponse, ApiError> {
    let RouteRequest { start, end } = body.into_inner();
    let route = client.calculate_route(start, end).await?;

    Ok(HttpResponse::Ok().json(RouteResponse {
        success: true,
        route,
    }))
}

/// Extracts the category and reference point of a nearest-feature request.
///
/// # Errors
///
/// Returns an invalid-request [`ApiError`] if either field is missing or
/// the category is unknown.
pub fn parse_nearest_request(
    request: NearestRequest,
) -> Result<(InfrastructureCategory, LatLon), ApiError> {
    let location = request
        .location
        .ok_or_else(|| ApiError::invalid_request("location is required"))?;

    let name = request
        .infrastructure_type
        .ok_or_else(|| ApiError::invalid_request("infrastructure_type is required"))?;

    let category = name.trim().parse::<InfrastructureCategory>().map_err(|_| {
        ApiError::invalid_request(format!(
            "Unknown infrastructure_type '{name}'; expected airports, ports or warehouses"
        ))
    })?;

    Ok((category, location))
}

/// `POST /api/find-nearest`
///
/// # Errors
///
/// * 400 if the location or category is missing or invalid
/// * 404 if the category has no locatable feature
/// * 500 if the database query fails
pub async fn find_nearest(
    state: web::Data<AppState>,
    body: web::Json<NearestRequest>,
) -> Result<HttpResponse, ApiError> {
    let (category, location) = parse_nearest_request(body.into_inner())?;
    let feature = nearest::find_nearest(state.db.as_ref(), category, location).await?;

    Ok(HttpResponse::Ok().json(NearestResponse {
        success: true,
        feature,
    }))
}

/// `GET /api/facilities`
///
/// # Errors
///
/// Returns [`ApiError`] if the database query fails.
pub async fn facilities(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let facilities = queries::list_facilities(state.db.as_ref()).await?;
    Ok(HttpResponse::Ok().json(FacilitiesResponse { facilities }))
}

/// `GET /api/facilities/geojson`
///
/// # Errors
///
/// Returns [`ApiError`] if the database query fails.
pub async fn facilities_geojson(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let facilities = queries::list_facilities(state.db.as_ref()).await?;
    Ok(HttpResponse::Ok().json(features::facilities_feature_collection(&facilities)))
}

/// `GET /api/infrastructure`
///
/// # Errors
///
/// Returns [`ApiError`] if the database query fails.
pub async fn infrastructure(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let infrastructure = queries::list_infrastructure(state.db.as_ref()).await?;
    Ok(HttpResponse::Ok().json(InfrastructureResponse { infrastructure }))
}

/// `GET /api/infrastructure/connections`
///
/// # Errors
///
/// Returns [`ApiError`] if the database query fails.
pub async fn connections(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let connections = queries::list_connections(state.db.as_ref()).await?;
    Ok(HttpResponse::Ok().json(ConnectionsResponse { connections }))
}

/// `GET /api/infrastructure/connections/geojson`
///
/// # Errors
///
/// Returns [`ApiError`] if the database query fails.
pub async fn connections_geojson(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let connections = queries::list_connections(state.db.as_ref()).await?;
    Ok(HttpResponse::Ok().json(features::connections_feature_collection(&connections)))
}

/// `GET /api/simulations`
///
/// # Errors
///
/// Returns [`ApiError`] if the database query fails.
pub async fn simulations(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let simulations = mirror_simulation::list_simulations(state.db.as_ref()).await?;
    Ok(HttpResponse::Ok().json(SimulationsResponse { simulations }))
}

/// `GET /api/simulations/{id}`
///
/// # Errors
///
/// * 404 if no simulation has this ID
/// * 500 if the database query fails
pub async fn simulation(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let simulation = mirror_simulation::get_simulation(state.db.as_ref(), *path).await?;
    Ok(HttpResponse::Ok().json(simulation))
}

/// `GET /api/simulations/{id}/timeline`
///
/// # Errors
///
/// * 404 if no simulation has this ID
/// * 500 if a database query fails
pub async fn timeline(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let simulation_id = path.into_inner();
    let timeline = mirror_simulation::get_timeline(state.db.as_ref(), simulation_id).await?;

    Ok(HttpResponse::Ok().json(TimelineResponse {
        simulation_id,
        timeline,
    }))
}

/// Maps malformed JSON bodies to `invalid_request`.
#[allow(clippy::needless_pass_by_value)]
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::invalid_request(format!("Invalid JSON body: {err}")).into()
}

/// Maps unparsable path segments (e.g. a non-numeric ID) to
/// `invalid_request`.
#[allow(clippy::needless_pass_by_value)]
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::invalid_request(format!("Invalid path: {err}")).into()
}
