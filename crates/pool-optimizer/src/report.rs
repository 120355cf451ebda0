//! Run report assembly
//!
//! One flat JSON-serializable document per optimization run, bundling
//! the pool, its metrics, the continuity report, the validation
//! verdict, and the observation-window check for downstream
//! reporting and certification layers.

use crate::{CoverageReport, SelectionMetrics, ValidationResult};
use orbital_mechanics::OrbitalPeriodCheck;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRun {
    pub constellation: String,
    pub selected_pool: Vec<String>,
    pub selection_metrics: SelectionMetrics,
    pub coverage_report: CoverageReport,
    pub validation_result: ValidationResult,
    pub orbital_period_check: OrbitalPeriodCheck,
    pub generated_at: String,
}

impl OptimizationRun {
    pub fn new(
        constellation: impl Into<String>,
        selected_pool: Vec<String>,
        selection_metrics: SelectionMetrics,
        coverage_report: CoverageReport,
        validation_result: ValidationResult,
        orbital_period_check: OrbitalPeriodCheck,
    ) -> Self {
        Self {
            constellation: constellation.into(),
            selected_pool,
            selection_metrics,
            coverage_report,
            validation_result,
            orbital_period_check,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
