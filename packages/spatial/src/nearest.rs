//! Linear nearest-candidate search.
//!
//! Category tables hold at most a few thousand features, so every query
//! scans all candidates instead of maintaining an index.

use std::cmp::Ordering;

use geo::Point;

use crate::great_circle_distance_km;

/// A located item competing in a nearest search.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<K, T> {
    /// Tie-break key; the smallest key wins among equally distant items.
    pub key: K,
    /// Representative location of the item.
    pub point: Point<f64>,
    /// The item itself.
    pub item: T,
}

/// The winning candidate and its distance to the reference point.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    /// The nearest item.
    pub item: T,
    /// Its representative location.
    pub point: Point<f64>,
    /// Unrounded great-circle distance in kilometers.
    pub distance_km: f64,
}

/// Returns the candidate closest to `reference`, or `None` when there are
/// no candidates.
///
/// Ties on distance go to the smallest key, so the result does not depend
/// on the order the store returned rows in.
pub fn nearest<K, T, I>(reference: Point<f64>, candidates: I) -> Option<Ranked<T>>
where
    K: Ord,
    I: IntoIterator<Item = Candidate<K, T>>,
{
    candidates
        .into_iter()
        .map(|candidate| {
            let distance = great_circle_distance_km(reference, candidate.point);
            (distance, candidate)
        })
        .min_by(|(da, a), (db, b)| match da.total_cmp(db) {
            Ordering::Equal => a.key.cmp(&b.key),
            other => other,
        })
        .map(|(distance_km, candidate)| Ranked {
            item: candidate.item,
            point: candidate.point,
            distance_km,
        })
}
