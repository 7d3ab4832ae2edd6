#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read paths over the infrastructure and supply-chain tables.
//!
//! Turns category rows into `GeoJSON` feature collections, aggregates
//! per-category statistics, locates the nearest feature of a category to a
//! point, and lists facilities and supply-chain connections. Every query
//! is a single parameterized statement against `PostgreSQL`; table names
//! come from [`InfrastructureCategory`](mirror_infrastructure_models::InfrastructureCategory)
//! and never from caller input.

pub mod features;
pub mod nearest;
pub mod queries;
pub mod stats;

use thiserror::Error;

/// Errors that can occur while reading infrastructure data.
#[derive(Debug, Error)]
pub enum InfrastructureError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// A stored JSON column could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The request itself was malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what was wrong.
        message: String,
    },

    /// Nothing matched the request.
    #[error("Not found: {message}")]
    NotFound {
        /// Description of what was missing.
        message: String,
    },
}
