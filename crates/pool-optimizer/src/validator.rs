//! Optimization result validation
//!
//! Fixed battery of quantitative checks over the selector metrics and
//! the continuity report. This is a diagnostic layer, not a gate: it
//! never raises, every check is always fully computed, and the caller
//! decides whether a WARNING verdict blocks the run.

use crate::{
    ConstellationTarget, CoverageReport, SelectionMetrics, POOL_RATIO_MAX, POOL_RATIO_MIN,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Verdict over the whole check battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverallStatus {
    /// Every check passed.
    Pass,
    /// At least one check failed; never silently upgraded.
    Warning,
}

/// One check with its human-readable evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub passed: bool,
    pub message: String,
}

impl CheckOutcome {
    fn new(passed: bool, message: String) -> Self {
        Self { passed, message }
    }
}

/// Structured validation verdict, one outcome per check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub overall_status: OverallStatus,
    pub coverage_rate_check: CheckOutcome,
    pub avg_visible_check: CheckOutcome,
    pub coverage_gaps_check: CheckOutcome,
    pub pool_size_check: CheckOutcome,
}

impl ValidationResult {
    pub fn passed(&self) -> bool {
        self.overall_status == OverallStatus::Pass
    }
}

/// Run the four-check battery against a finished optimization.
///
/// - coverage rate against the configured target rate;
/// - mean visible count inside the target band;
/// - zero coverage gaps;
/// - selection ratio inside the greedy set-cover sanity band
///   (Chvátal 1979; Johnson 1974).
pub fn validate_optimization(
    metrics: &SelectionMetrics,
    report: &CoverageReport,
    target: &ConstellationTarget,
) -> ValidationResult {
    let coverage_rate_check = CheckOutcome::new(
        metrics.coverage_rate >= target.target_coverage_rate,
        format!(
            "coverage rate {:.4} vs required {:.4}",
            metrics.coverage_rate, target.target_coverage_rate
        ),
    );

    let avg_in_band = metrics.avg_visible >= target.target_min as f64
        && metrics.avg_visible <= target.target_max as f64;
    let avg_visible_check = CheckOutcome::new(
        avg_in_band,
        format!(
            "average visible {:.2} vs band {}..={}",
            metrics.avg_visible, target.target_min, target.target_max
        ),
    );

    let coverage_gaps_check = CheckOutcome::new(
        report.gaps.is_empty(),
        format!(
            "{} zero-coverage timestamps of {}",
            report.gaps.len(),
            report.total_time_points
        ),
    );

    let ratio_in_band =
        metrics.selection_ratio >= POOL_RATIO_MIN && metrics.selection_ratio <= POOL_RATIO_MAX;
    let pool_size_check = CheckOutcome::new(
        ratio_in_band,
        format!(
            "selection ratio {:.3} ({}/{}) vs sanity band {:.1}..={:.1}",
            metrics.selection_ratio,
            metrics.selected_count,
            metrics.candidate_count,
            POOL_RATIO_MIN,
            POOL_RATIO_MAX
        ),
    );

    let all_passed = coverage_rate_check.passed
        && avg_visible_check.passed
        && coverage_gaps_check.passed
        && pool_size_check.passed;

    let result = ValidationResult {
        overall_status: if all_passed {
            OverallStatus::Pass
        } else {
            OverallStatus::Warning
        },
        coverage_rate_check,
        avg_visible_check,
        coverage_gaps_check,
        pool_size_check,
    };

    match result.overall_status {
        OverallStatus::Pass => info!("Optimization validation: PASS"),
        OverallStatus::Warning => {
            for (name, check) in result.checks() {
                if !check.passed {
                    warn!("Validation check failed: {}: {}", name, check.message);
                }
            }
        }
    }

    result
}

impl ValidationResult {
    /// Named view over the battery, in fixed order.
    pub fn checks(&self) -> [(&'static str, &CheckOutcome); 4] {
        [
            ("coverage_rate", &self.coverage_rate_check),
            ("avg_visible", &self.avg_visible_check),
            ("coverage_gaps", &self.coverage_gaps_check),
            ("pool_size", &self.pool_size_check),
        ]
    }
}
