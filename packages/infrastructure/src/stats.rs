//! Per-category statistics.

use mirror_infrastructure_models::{
    AirportStats, ClassCount, InfrastructureCategory, InfrastructureStats, PortStats,
    SubtypeCount, WarehouseStats,
};
use mirror_spatial::round_to;
use switchy_database::Database;

use crate::{InfrastructureError, queries};

/// Label used for rows whose grouping column is `NULL`.
pub const UNKNOWN_KEY: &str = "unknown";

/// Computes totals and breakdowns for all three categories.
///
/// # Errors
///
/// Returns [`InfrastructureError`] if any database operation fails.
pub async fn get_stats(db: &dyn Database) -> Result<InfrastructureStats, InfrastructureError> {
    let airport_total = queries::count_features(db, InfrastructureCategory::Airports).await?;
    let port_total = queries::count_features(db, InfrastructureCategory::Ports).await?;
    let by_class = queries::airport_class_counts(db).await?;
    let by_subtype = queries::port_subtype_counts(db).await?;
    let (warehouse_total, avg_height, avg_floors) = queries::warehouse_aggregates(db).await?;

    Ok(InfrastructureStats {
        airports: AirportStats {
            total: airport_total,
            by_class: group_counts(by_class)
                .into_iter()
                .map(|(class, count)| ClassCount { class, count })
                .collect(),
        },
        ports: PortStats {
            total: port_total,
            by_subtype: group_counts(by_subtype)
                .into_iter()
                .map(|(subtype, count)| SubtypeCount { subtype, count })
                .collect(),
        },
        warehouses: WarehouseStats {
            total: warehouse_total,
            avg_height: avg_height.map(|v| round_to(v, 2)),
            avg_floors: avg_floors.map(|v| round_to(v, 2)),
        },
    })
}

/// Labels `NULL` keys as [`UNKNOWN_KEY`] and orders by count descending,
/// then key ascending.
///
/// Labelling can merge with a literal `"unknown"` group, so counts for
/// equal labels are summed before sorting.
#[must_use]
pub fn group_counts(groups: Vec<(Option<String>, u64)>) -> Vec<(String, u64)> {
    let mut labelled: Vec<(String, u64)> = Vec::with_capacity(groups.len());

    for (key, count) in groups {
        let key = key.unwrap_or_else(|| UNKNOWN_KEY.to_string());
        if let Some(existing) = labelled.iter_mut().find(|(k, _)| *k == key) {
            existing.1 += count;
        } else {
            labelled.push((key, count));
        }
    }

    labelled.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
    labelled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_keys_become_unknown() {
        let groups = vec![
            (Some("international".to_string()), 3),
            (None, 5),
            (Some("regional".to_string()), 1),
        ];
        assert_eq!(
            group_counts(groups),
            vec![
                ("unknown".to_string(), 5),
                ("international".to_string(), 3),
                ("regional".to_string(), 1),
            ]
        );
    }

    #[test]
    fn equal_counts_sort_by_key() {
        let groups = vec![
            (Some("terminal".to_string()), 2),
            (Some("berth".to_string()), 2),
            (Some("crane".to_string()), 4),
        ];
        let keys: Vec<String> = group_counts(groups).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["crane", "berth", "terminal"]);
    }

    #[test]
    fn null_and_literal_unknown_merge() {
        let groups = vec![(Some("unknown".to_string()), 2), (None, 1)];
        assert_eq!(group_counts(groups), vec![("unknown".to_string(), 3)]);
    }

    #[test]
    fn empty_groups() {
        assert!(group_counts(Vec::new()).is_empty());
    }
}
