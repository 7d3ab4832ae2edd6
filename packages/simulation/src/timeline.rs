//! Timeline assembly.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use mirror_database_models::{FacilityStateRow, TimelineEventRow};
use serde::Serialize;

/// One playback day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    /// Day index.
    pub day: i32,
    /// Simulated time of the day, serialized as ISO-8601 text.
    pub timestamp: Option<NaiveDateTime>,
    /// Opaque event payload.
    pub events: Option<serde_json::Value>,
    /// Facility states recorded for this day, in facility ID order.
    pub facility_states: Vec<FacilityStateRow>,
}

/// Attaches facility states to the timeline days they belong to.
///
/// The timeline side drives the result: every event row yields one entry
/// (in ascending day order), days with no states get an empty list, and
/// states for days without an event row are dropped.
#[must_use]
pub fn merge_timeline(
    mut events: Vec<TimelineEventRow>,
    states: Vec<FacilityStateRow>,
) -> Vec<TimelineEntry> {
    let mut by_day: BTreeMap<i32, Vec<FacilityStateRow>> = BTreeMap::new();
    for state in states {
        by_day.entry(state.day).or_default().push(state);
    }

    events.sort_by_key(|event| event.day);

    events
        .into_iter()
        .map(|event| {
            let mut facility_states = by_day.remove(&event.day).unwrap_or_default();
            facility_states.sort_by_key(|state| state.facility_id);

            TimelineEntry {
                day: event.day,
                timestamp: event.timestamp,
                events: event.events,
                facility_states,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(day: i32) -> TimelineEventRow {
        TimelineEventRow {
            day,
            timestamp: chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|t| t + chrono::Duration::days(i64::from(day))),
            events: Some(serde_json::json!([{ "kind": "day", "day": day }])),
        }
    }

    fn state(day: i32, facility_id: i32) -> FacilityStateRow {
        FacilityStateRow {
            day,
            status: Some("disrupted".to_string()),
            impact_cost: Some(1_000.0),
            facility_id,
            facility_name: format!("Facility {facility_id}"),
            latitude: 33.75,
            longitude: -118.2,
            facility_type: "port".to_string(),
        }
    }

    #[test]
    fn days_without_states_are_kept_empty() {
        let merged = merge_timeline(
            vec![event(1), event(2), event(3)],
            vec![state(1, 10), state(3, 10)],
        );

        let days: Vec<i32> = merged.iter().map(|e| e.day).collect();
        assert_eq!(days, [1, 2, 3]);
        assert_eq!(merged[0].facility_states.len(), 1);
        assert!(merged[1].facility_states.is_empty());
        assert_eq!(merged[2].facility_states.len(), 1);
    }

    #[test]
    fn states_without_a_timeline_day_are_dropped() {
        let merged = merge_timeline(vec![event(0)], vec![state(0, 1), state(5, 1)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].facility_states.len(), 1);
    }

    #[test]
    fn output_is_ordered_by_day_then_facility() {
        let merged = merge_timeline(
            vec![event(2), event(0)],
            vec![state(2, 9), state(2, 3), state(0, 4)],
        );

        assert_eq!(merged[0].day, 0);
        let ids: Vec<i32> = merged[1].facility_states.iter().map(|s| s.facility_id).collect();
        assert_eq!(ids, [3, 9]);
    }

    #[test]
    fn timestamp_serializes_as_iso_text() {
        let json = serde_json::to_value(merge_timeline(vec![event(1)], Vec::new())).unwrap();
        assert_eq!(json[0]["timestamp"], "2025-01-02T00:00:00");
        assert_eq!(json[0]["facility_states"], serde_json::json!([]));
    }
}
