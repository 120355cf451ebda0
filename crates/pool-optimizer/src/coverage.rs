//! Timestamp coverage index
//!
//! Maps every sampled instant to the set of candidate ids connectable
//! at that instant. Pure data transformation ahead of selection: no
//! filtering and no optimization logic lives here.

use crate::{CandidateSatellite, TimestampCoverageMap};

/// Build the timestamp -> connectable-ids index over all candidates.
///
/// Every timestamp appearing in any candidate's series becomes a key,
/// even when no candidate is connectable there; those empty slots are
/// exactly what the continuity analyzer later reports as coverage
/// gaps, so they are never dropped.
pub fn build_coverage_index(candidates: &[CandidateSatellite]) -> TimestampCoverageMap {
    let mut index = TimestampCoverageMap::new();

    for candidate in candidates {
        for sample in &candidate.visibility {
            let ids = index.entry(sample.timestamp).or_default();
            if sample.connectable {
                ids.insert(candidate.id.clone());
            }
        }
    }

    index
}
