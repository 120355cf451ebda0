//! Coverage continuity analysis
//!
//! Characterizes the schedule produced by the selector: per-timestamp
//! visible counts restricted to the pool members, a status per
//! instant, and the gap / under-coverage subsets the validator and
//! downstream reporting consume.
//!
//! Purely derived from its inputs; re-running on the same pool yields
//! an identical report.

use crate::{build_coverage_index, CandidateSatellite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Classification of one timestamp's visible count against the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    ZeroCoverage,
    BelowTarget,
    Optimal,
    AboveTarget,
}

impl CoverageStatus {
    pub fn classify(visible_count: usize, target_min: usize, target_max: usize) -> Self {
        if visible_count == 0 {
            CoverageStatus::ZeroCoverage
        } else if visible_count < target_min {
            CoverageStatus::BelowTarget
        } else if visible_count <= target_max {
            CoverageStatus::Optimal
        } else {
            CoverageStatus::AboveTarget
        }
    }
}

/// One timestamp of the analyzed schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalEntry {
    pub timestamp: DateTime<Utc>,
    pub visible_count: usize,
    pub target_met: bool,
    pub status: CoverageStatus,
}

/// A timestamp with some coverage but fewer visible members than the
/// band requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BelowTargetPeriod {
    pub timestamp: DateTime<Utc>,
    pub visible_count: usize,
    /// `target_min - visible_count`.
    pub deficit: usize,
}

/// Full continuity report for a selected pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub temporal_entries: Vec<TemporalEntry>,
    /// Entries with `visible_count == 0`.
    pub gaps: Vec<TemporalEntry>,
    /// Entries with `0 < visible_count < target_min`.
    pub below_target_periods: Vec<BelowTargetPeriod>,
    pub total_time_points: usize,
    pub target_met_count: usize,
    pub target_met_rate: f64,
    pub avg_visible: f64,
    pub min_visible: usize,
    pub max_visible: usize,
}

/// Analyze per-timestamp coverage restricted to the selected pool.
///
/// Rebuilds the visible counts from the pool members only (not the
/// full candidate universe). Empty input produces all-zero
/// statistics, not an error.
pub fn analyze_continuity(
    candidates: &[CandidateSatellite],
    pool: &[String],
    target_min: usize,
    target_max: usize,
) -> CoverageReport {
    let pool_ids: BTreeSet<&str> = pool.iter().map(String::as_str).collect();
    let pool_members: Vec<CandidateSatellite> = candidates
        .iter()
        .filter(|c| pool_ids.contains(c.id.as_str()))
        .cloned()
        .collect();

    // All candidates share the sampling grid, so indexing the full
    // universe and the pool yields the same key set; the pool index
    // alone would drop grid slots if the pool were empty.
    let full_grid = build_coverage_index(candidates);
    let pool_index = build_coverage_index(&pool_members);

    let temporal_entries: Vec<TemporalEntry> = full_grid
        .keys()
        .map(|&timestamp| {
            let visible_count = pool_index.get(&timestamp).map_or(0, |ids| ids.len());
            let status = CoverageStatus::classify(visible_count, target_min, target_max);
            TemporalEntry {
                timestamp,
                visible_count,
                target_met: status == CoverageStatus::Optimal,
                status,
            }
        })
        .collect();

    let gaps: Vec<TemporalEntry> = temporal_entries
        .iter()
        .filter(|e| e.status == CoverageStatus::ZeroCoverage)
        .cloned()
        .collect();

    let below_target_periods: Vec<BelowTargetPeriod> = temporal_entries
        .iter()
        .filter(|e| e.status == CoverageStatus::BelowTarget)
        .map(|e| BelowTargetPeriod {
            timestamp: e.timestamp,
            visible_count: e.visible_count,
            deficit: target_min - e.visible_count,
        })
        .collect();

    let total_time_points = temporal_entries.len();
    let target_met_count = temporal_entries.iter().filter(|e| e.target_met).count();
    let counts: Vec<usize> = temporal_entries.iter().map(|e| e.visible_count).collect();

    CoverageReport {
        target_met_rate: if total_time_points == 0 {
            0.0
        } else {
            target_met_count as f64 / total_time_points as f64
        },
        avg_visible: if total_time_points == 0 {
            0.0
        } else {
            counts.iter().sum::<usize>() as f64 / total_time_points as f64
        },
        min_visible: counts.iter().copied().min().unwrap_or(0),
        max_visible: counts.iter().copied().max().unwrap_or(0),
        temporal_entries,
        gaps,
        below_target_periods,
        total_time_points,
        target_met_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{candidate, grid};

    #[test]
    fn test_status_classification_boundaries() {
        assert_eq!(
            CoverageStatus::classify(0, 3, 6),
            CoverageStatus::ZeroCoverage
        );
        assert_eq!(
            CoverageStatus::classify(2, 3, 6),
            CoverageStatus::BelowTarget
        );
        assert_eq!(CoverageStatus::classify(3, 3, 6), CoverageStatus::Optimal);
        assert_eq!(CoverageStatus::classify(6, 3, 6), CoverageStatus::Optimal);
        assert_eq!(
            CoverageStatus::classify(7, 3, 6),
            CoverageStatus::AboveTarget
        );
    }

    #[test]
    fn test_report_restricted_to_pool() {
        let timestamps = grid(3);
        let candidates = vec![
            candidate("in-pool", &timestamps, &[true, true, false]),
            candidate("excluded", &timestamps, &[true, true, true]),
        ];
        let pool = vec!["in-pool".to_string()];

        let report = analyze_continuity(&candidates, &pool, 1, 2);

        // "excluded" is connectable everywhere but must not count.
        assert_eq!(report.total_time_points, 3);
        assert_eq!(report.max_visible, 1);
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(report.gaps[0].timestamp, timestamps[2]);
        assert_eq!(report.target_met_count, 2);
        assert!((report.target_met_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_below_target_deficits() {
        let timestamps = grid(2);
        let candidates = vec![
            candidate("a", &timestamps, &[true, true]),
            candidate("b", &timestamps, &[true, false]),
        ];
        let pool = vec!["a".to_string(), "b".to_string()];

        let report = analyze_continuity(&candidates, &pool, 2, 3);

        assert_eq!(report.below_target_periods.len(), 1);
        let short = &report.below_target_periods[0];
        assert_eq!(short.timestamp, timestamps[1]);
        assert_eq!(short.visible_count, 1);
        assert_eq!(short.deficit, 1);
        assert!(report.gaps.is_empty());
    }

    #[test]
    fn test_empty_pool_reports_all_gaps() {
        let timestamps = grid(3);
        let candidates = vec![candidate("a", &timestamps, &[true, true, true])];

        let report = analyze_continuity(&candidates, &[], 1, 2);

        assert_eq!(report.total_time_points, 3);
        assert_eq!(report.gaps.len(), 3);
        assert_eq!(report.target_met_count, 0);
        assert_eq!(report.avg_visible, 0.0);
    }

    #[test]
    fn test_empty_input_yields_zero_statistics() {
        let report = analyze_continuity(&[], &[], 1, 2);

        assert_eq!(report.total_time_points, 0);
        assert_eq!(report.target_met_rate, 0.0);
        assert_eq!(report.avg_visible, 0.0);
        assert!(report.temporal_entries.is_empty());
        assert!(report.gaps.is_empty());
    }

    #[test]
    fn test_reanalysis_is_idempotent() {
        let timestamps = grid(4);
        let candidates = vec![
            candidate("a", &timestamps, &[true, false, true, false]),
            candidate("b", &timestamps, &[false, true, true, true]),
        ];
        let pool = vec!["a".to_string(), "b".to_string()];

        let first = analyze_continuity(&candidates, &pool, 1, 2);
        let second = analyze_continuity(&candidates, &pool, 1, 2);

        assert_eq!(first, second);
    }
}
