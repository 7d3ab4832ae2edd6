//! Conversion of domain errors into HTTP responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use mirror_ai::AiError;
use mirror_infrastructure::InfrastructureError;
use mirror_routing::RouteError;
use mirror_server_models::ApiErrorBody;
use mirror_simulation::SimulationError;

/// Message returned in place of internal error details.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Error class, each with a fixed status and wire `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input.
    InvalidRequest,
    /// No matching record, route or feature.
    NotFound,
    /// A third-party provider failed or could not be reached.
    UpstreamUnavailable,
    /// A required credential is missing.
    NotConfigured,
    /// Store or unexpected failure.
    Internal,
}

impl ErrorKind {
    /// The `kind` field of the error body.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::NotFound => "not_found",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::NotConfigured => "not_configured",
            Self::Internal => "internal",
        }
    }

    /// HTTP status for this kind.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            Self::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error returned by every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Error class.
    pub kind: ErrorKind,
    /// Human-readable message. Not sent to clients for
    /// [`ErrorKind::Internal`].
    pub message: String,
}

impl ApiError {
    /// Creates an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for [`ErrorKind::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    /// Shorthand for [`ErrorKind::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.kind.status()
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self.kind {
            ErrorKind::Internal => {
                log::error!("{}", self.message);
                INTERNAL_MESSAGE.to_string()
            }
            ErrorKind::UpstreamUnavailable => {
                log::warn!("{}", self.message);
                self.message.clone()
            }
            _ => self.message.clone(),
        };

        HttpResponse::build(self.status_code()).json(ApiErrorBody {
            error,
            kind: self.kind.as_str().to_string(),
        })
    }
}

impl From<InfrastructureError> for ApiError {
    fn from(e: InfrastructureError) -> Self {
        match e {
            InfrastructureError::InvalidRequest { message } => Self::invalid_request(message),
            InfrastructureError::NotFound { message } => Self::new(ErrorKind::NotFound, message),
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<SimulationError> for ApiError {
    fn from(e: SimulationError) -> Self {
        match e {
            SimulationError::NotFound { .. } => Self::new(ErrorKind::NotFound, e.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<RouteError> for ApiError {
    fn from(e: RouteError) -> Self {
        let kind = match &e {
            RouteError::NotConfigured => ErrorKind::NotConfigured,
            RouteError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            RouteError::NotFound => ErrorKind::NotFound,
            RouteError::Http(_) | RouteError::UpstreamStatus { .. } | RouteError::Parse { .. } => {
                ErrorKind::UpstreamUnavailable
            }
        };
        Self::new(kind, e.to_string())
    }
}

impl From<AiError> for ApiError {
    fn from(e: AiError) -> Self {
        match e {
            AiError::Infrastructure(inner) => inner.into(),
            AiError::InvalidRequest { message } => Self::invalid_request(message),
            AiError::NotConfigured { .. } => Self::new(ErrorKind::NotConfigured, e.to_string()),
            AiError::Http(_) | AiError::Json(_) | AiError::Provider { .. } => {
                Self::new(ErrorKind::UpstreamUnavailable, e.to_string())
            }
            AiError::Config { .. } => Self::internal(e.to_string()),
        }
    }
}
