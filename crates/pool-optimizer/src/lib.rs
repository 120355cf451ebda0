//! Visibility Pool Optimizer
//!
//! Selects a minimal subset ("pool") of candidate satellites per
//! constellation such that, at every sampled instant across the
//! observation window, the number of pool members simultaneously
//! connectable from the ground site stays inside a configured target
//! band (e.g. 10-15 for Starlink, 3-6 for OneWeb) without coverage
//! gaps.
//!
//! # Pipeline
//!
//! ```text
//! candidates ─► coverage index ─► greedy selector ─► continuity analyzer ─► validator
//! timestamps ──────────────────► orbital-mechanics window check (independent)
//! ```
//!
//! The selector is a greedy marginal-contribution set cover
//! (Chvátal 1979; Johnson 1974): each iteration picks the remaining
//! candidate that lifts the most still-under-target timestamps,
//! breaking ties toward the fewest already-saturated timestamps.
//!
//! The core is constellation-agnostic: all constellation-specific
//! numbers arrive in a [`ConstellationTarget`] resolved by the caller
//! from configuration. No threshold is ever defaulted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

pub mod continuity;
pub mod coverage;
pub mod loader;
pub mod report;
pub mod selector;
pub mod validator;

pub use continuity::{analyze_continuity, CoverageReport, CoverageStatus};
pub use coverage::build_coverage_index;
pub use report::OptimizationRun;
pub use selector::{select_pool, PoolSelection, SelectionMetrics};
pub use validator::{validate_optimization, CheckOutcome, OverallStatus, ValidationResult};

/// Selection-ratio sanity band for the pool-size check.
///
/// Below 10% the pool is implausibly thin for holding a visibility
/// band over a full window; above 80% the optimization did little
/// work versus selecting everything. Typical greedy set-cover
/// solution sizes land well inside this band (Chvátal 1979;
/// Johnson 1974).
pub const POOL_RATIO_MIN: f64 = 0.1;
pub const POOL_RATIO_MAX: f64 = 0.8;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No target configuration for constellation '{0}'")]
    MissingConstellation(String),
    #[error("Invalid target configuration for '{constellation}': {reason}")]
    InvalidTarget {
        constellation: String,
        reason: String,
    },
    #[error("Candidate record {index} is malformed: missing {field}")]
    MalformedCandidate { index: usize, field: &'static str },
    #[error("Candidate '{candidate}' sample {index} is malformed: {reason}")]
    MalformedSample {
        candidate: String,
        index: usize,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, PoolError>;

/// One point of a candidate's visibility series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilitySample {
    pub timestamp: DateTime<Utc>,
    /// Whether the candidate satisfies the upstream link-feasibility
    /// criteria (elevation, distance) at this instant.
    pub connectable: bool,
}

/// A candidate satellite with its precomputed visibility series.
///
/// Read-only input: produced entirely by the upstream visibility
/// computation, never mutated here. Timestamps are assumed
/// time-aligned across candidates of one constellation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSatellite {
    pub id: String,
    pub visibility: Vec<VisibilitySample>,
}

/// Per-constellation optimization targets.
///
/// Every field is required in configuration. The acceptable coverage
/// rate is a research-quality parameter (ITU-T E.800 availability
/// tiers), so absence is a fatal configuration error, never a
/// defaulted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstellationTarget {
    /// Inclusive lower bound on simultaneously visible pool members.
    pub target_min: usize,
    /// Inclusive upper bound on simultaneously visible pool members.
    pub target_max: usize,
    /// Minimum fraction of timestamps that must sit inside the band.
    pub target_coverage_rate: f64,
    /// Nominal orbital altitude for the observation-window check.
    pub altitude_km: f64,
}

impl ConstellationTarget {
    /// Semantic validation beyond field presence.
    pub fn validate(&self, constellation: &str) -> Result<()> {
        let fail = |reason: String| PoolError::InvalidTarget {
            constellation: constellation.to_string(),
            reason,
        };

        if self.target_min < 1 {
            return Err(fail(format!(
                "target_min must be >= 1, got {}",
                self.target_min
            )));
        }
        if self.target_min > self.target_max {
            return Err(fail(format!(
                "target_min {} exceeds target_max {}",
                self.target_min, self.target_max
            )));
        }
        if !self.target_coverage_rate.is_finite()
            || self.target_coverage_rate <= 0.0
            || self.target_coverage_rate > 1.0
        {
            return Err(fail(format!(
                "target_coverage_rate must be in (0, 1], got {}",
                self.target_coverage_rate
            )));
        }
        if !self.altitude_km.is_finite() || self.altitude_km <= 0.0 {
            return Err(fail(format!(
                "altitude_km must be positive, got {}",
                self.altitude_km
            )));
        }
        Ok(())
    }

    /// Whether a visible count sits inside the target band.
    pub fn in_band(&self, visible_count: usize) -> bool {
        visible_count >= self.target_min && visible_count <= self.target_max
    }
}

/// Timestamp -> connectable candidate ids.
///
/// Every sampled timestamp appears as a key, empty sets included, so
/// gap analysis always sees the full sampling grid. BTree containers
/// keep iteration order (and therefore logs and reports)
/// deterministic.
pub type TimestampCoverageMap = BTreeMap<DateTime<Utc>, BTreeSet<String>>;

/// Mutable state of one greedy selection run.
///
/// Created fresh per run, mutated only inside the selector, discarded
/// after the pool and metrics are produced. The per-timestamp sets
/// only ever grow; there is no removal step.
#[derive(Debug, Clone)]
pub struct SelectionState {
    /// Insertion order = selection order (kept for audit output).
    pub selected: Vec<String>,
    pub current_coverage: TimestampCoverageMap,
}

impl SelectionState {
    /// Seed the state with every timestamp of the sampling grid and
    /// no selected candidates.
    pub fn new(timestamps: impl IntoIterator<Item = DateTime<Utc>>) -> Self {
        Self {
            selected: Vec::new(),
            current_coverage: timestamps
                .into_iter()
                .map(|t| (t, BTreeSet::new()))
                .collect(),
        }
    }

    /// Record a winning candidate and mark every timestamp it covers.
    pub fn add(&mut self, candidate: &CandidateSatellite) {
        for sample in &candidate.visibility {
            if sample.connectable {
                self.current_coverage
                    .entry(sample.timestamp)
                    .or_default()
                    .insert(candidate.id.clone());
            }
        }
        self.selected.push(candidate.id.clone());
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use chrono::TimeZone;

    /// Sampling grid: `count` timestamps, one minute apart.
    pub fn grid(count: usize) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        (0..count)
            .map(|i| start + chrono::Duration::minutes(i as i64))
            .collect()
    }

    /// Candidate connectable exactly at the flagged grid slots.
    pub fn candidate(id: &str, timestamps: &[DateTime<Utc>], connectable: &[bool]) -> CandidateSatellite {
        assert_eq!(timestamps.len(), connectable.len());
        CandidateSatellite {
            id: id.to_string(),
            visibility: timestamps
                .iter()
                .zip(connectable)
                .map(|(&timestamp, &connectable)| VisibilitySample {
                    timestamp,
                    connectable,
                })
                .collect(),
        }
    }

    pub fn target(min: usize, max: usize, rate: f64) -> ConstellationTarget {
        ConstellationTarget {
            target_min: min,
            target_max: max,
            target_coverage_rate: rate,
            altitude_km: 550.0,
        }
    }
}
