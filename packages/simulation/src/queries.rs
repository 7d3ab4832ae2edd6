//! Database queries for simulations, timelines and facility states.

use chrono::NaiveDate;
use mirror_database_models::{
    FacilityStateRow, SimulationRow, SimulationSummaryRow, TimelineEventRow,
};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::SimulationError;

/// Lists all simulations ordered by creation time, newest first.
///
/// # Errors
///
/// Returns [`SimulationError`] if the database operation fails.
pub async fn list_simulations(
    db: &dyn Database,
) -> Result<Vec<SimulationSummaryRow>, SimulationError> {
    let rows = db
        .query_raw_params(
            "SELECT id, scenario_name, description, duration_days,
                    total_impact::float8 AS total_impact, status, created_at
             FROM simulations
             ORDER BY created_at DESC NULLS LAST, id DESC",
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| SimulationSummaryRow {
            id: row.to_value("id").unwrap_or(0),
            scenario_name: row.to_value("scenario_name").unwrap_or_default(),
            description: row.to_value("description").unwrap_or(None),
            duration_days: row.to_value("duration_days").unwrap_or(None),
            total_impact: row.to_value("total_impact").unwrap_or(None),
            status: row.to_value("status").unwrap_or(None),
            created_at: row.to_value("created_at").unwrap_or(None),
        })
        .collect())
}

/// Fetches a single simulation by ID.
///
/// # Errors
///
/// Returns [`SimulationError`] if the database operation fails or the
/// stored start date is malformed.
pub async fn get_simulation(
    db: &dyn Database,
    id: i32,
) -> Result<Option<SimulationRow>, SimulationError> {
    let rows = db
        .query_raw_params(
            "SELECT id, scenario_name, description, start_date::text AS start_date,
                    duration_days, total_impact::float8 AS total_impact, status,
                    created_at, completed_at
             FROM simulations
             WHERE id = $1",
            &[DatabaseValue::Int32(id)],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let start_date = row
        .to_value::<Option<String>>("start_date")
        .unwrap_or(None)
        .map(|text| parse_date(&text))
        .transpose()?;

    Ok(Some(SimulationRow {
        id: row.to_value("id").unwrap_or(id),
        scenario_name: row.to_value("scenario_name").unwrap_or_default(),
        description: row.to_value("description").unwrap_or(None),
        start_date,
        duration_days: row.to_value("duration_days").unwrap_or(None),
        total_impact: row.to_value("total_impact").unwrap_or(None),
        status: row.to_value("status").unwrap_or(None),
        created_at: row.to_value("created_at").unwrap_or(None),
        completed_at: row.to_value("completed_at").unwrap_or(None),
    }))
}

/// Returns whether a simulation with this ID exists.
///
/// # Errors
///
/// Returns [`SimulationError`] if the database operation fails.
pub async fn simulation_exists(db: &dyn Database, id: i32) -> Result<bool, SimulationError> {
    let rows = db
        .query_raw_params(
            "SELECT 1 AS found FROM simulations WHERE id = $1",
            &[DatabaseValue::Int32(id)],
        )
        .await?;

    Ok(!rows.is_empty())
}

/// Returns the recorded timeline days of a simulation in day order.
///
/// # Errors
///
/// Returns [`SimulationError`] if the database operation fails or an
/// `events` document is not valid JSON.
pub async fn timeline_events(
    db: &dyn Database,
    simulation_id: i32,
) -> Result<Vec<TimelineEventRow>, SimulationError> {
    let rows = db
        .query_raw_params(
            "SELECT day, timestamp, events::text AS events
             FROM simulation_timeline
             WHERE simulation_id = $1
             ORDER BY day",
            &[DatabaseValue::Int32(simulation_id)],
        )
        .await?;

    rows.iter()
        .map(|row| {
            let events = row
                .to_value::<Option<String>>("events")
                .unwrap_or(None)
                .map(|text| serde_json::from_str(&text))
                .transpose()?;

            Ok(TimelineEventRow {
                day: row.to_value("day").unwrap_or(0),
                timestamp: row.to_value("timestamp").unwrap_or(None),
                events,
            })
        })
        .collect()
}

/// Returns the facility states of a simulation, ordered by day then
/// facility ID, joined with facility name, location and type.
///
/// # Errors
///
/// Returns [`SimulationError`] if the database operation fails.
pub async fn facility_states(
    db: &dyn Database,
    simulation_id: i32,
) -> Result<Vec<FacilityStateRow>, SimulationError> {
    let rows = db
        .query_raw_params(
            "SELECT fs.day, fs.status, fs.impact_cost::float8 AS impact_cost,
                    f.id AS facility_id, f.name AS facility_name,
                    f.latitude::float8 AS latitude, f.longitude::float8 AS longitude,
                    f.type AS facility_type
             FROM facility_states fs
             JOIN facilities f ON fs.facility_id = f.id
             WHERE fs.simulation_id = $1
             ORDER BY fs.day, f.id",
            &[DatabaseValue::Int32(simulation_id)],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| FacilityStateRow {
            day: row.to_value("day").unwrap_or(0),
            status: row.to_value("status").unwrap_or(None),
            impact_cost: row.to_value("impact_cost").unwrap_or(None),
            facility_id: row.to_value("facility_id").unwrap_or(0),
            facility_name: row.to_value("facility_name").unwrap_or_default(),
            latitude: row.to_value("latitude").unwrap_or(0.0),
            longitude: row.to_value("longitude").unwrap_or(0.0),
            facility_type: row.to_value("facility_type").unwrap_or_default(),
        })
        .collect())
}

fn parse_date(text: &str) -> Result<NaiveDate, SimulationError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| SimulationError::Conversion {
        message: format!("invalid start_date {text:?}: {e}"),
    })
}
