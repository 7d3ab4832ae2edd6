#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Simulation reader.
//!
//! Lists simulation runs, looks one up by ID, and assembles its playback
//! timeline: one entry per recorded day, each carrying the facility states
//! recorded for that day.

pub mod queries;
pub mod timeline;

pub use timeline::{TimelineEntry, merge_timeline};

use mirror_database_models::{SimulationRow, SimulationSummaryRow};
use switchy_database::Database;
use thiserror::Error;

/// Errors that can occur while reading simulations.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// A stored JSON column could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No simulation has the requested ID.
    #[error("Simulation {id} not found")]
    NotFound {
        /// The requested simulation ID.
        id: i32,
    },

    /// Data conversion error.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Lists all simulations, newest first.
///
/// # Errors
///
/// Returns [`SimulationError`] if the database operation fails.
pub async fn list_simulations(
    db: &dyn Database,
) -> Result<Vec<SimulationSummaryRow>, SimulationError> {
    queries::list_simulations(db).await
}

/// Looks up one simulation.
///
/// # Errors
///
/// * [`SimulationError::NotFound`] if no simulation has this ID
/// * [`SimulationError::Database`] if the query fails
pub async fn get_simulation(db: &dyn Database, id: i32) -> Result<SimulationRow, SimulationError> {
    queries::get_simulation(db, id)
        .await?
        .ok_or(SimulationError::NotFound { id })
}

/// Builds the playback timeline of a simulation.
///
/// # Errors
///
/// * [`SimulationError::NotFound`] if no simulation has this ID
/// * [`SimulationError::Database`] if a query fails
pub async fn get_timeline(
    db: &dyn Database,
    id: i32,
) -> Result<Vec<TimelineEntry>, SimulationError> {
    if !queries::simulation_exists(db, id).await? {
        return Err(SimulationError::NotFound { id });
    }

    let events = queries::timeline_events(db, id).await?;
    let states = queries::facility_states(db, id).await?;

    log::debug!(
        "Simulation {id}: {} timeline days, {} facility states",
        events.len(),
        states.len()
    );

    Ok(merge_timeline(events, states))
}
