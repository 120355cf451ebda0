//! Greedy pool selection
//!
//! Marginal-contribution set cover over the sampling grid. Each
//! iteration scores every remaining candidate by how many
//! under-target timestamps it would lift (`contribution`) against how
//! many already-saturated timestamps it would overfill (`penalty`),
//! then adds the best scorer to the pool.
//!
//! The iterations are inherently sequential: every score depends on
//! the cumulative coverage of all prior selections, so there is no
//! data-parallel decomposition of the loop itself.

use crate::{
    build_coverage_index, CandidateSatellite, ConstellationTarget, SelectionState,
    TimestampCoverageMap,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Aggregate metrics of one selection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionMetrics {
    pub selected_count: usize,
    pub candidate_count: usize,
    /// `selected_count / candidate_count` (0.0 for an empty universe).
    pub selection_ratio: f64,
    pub iterations: usize,
    /// Fraction of timestamps whose visible count sits in the band.
    pub coverage_rate: f64,
    pub avg_visible: f64,
    pub min_visible: usize,
    pub max_visible: usize,
    /// Whether `coverage_rate` reached the configured target rate.
    pub target_met: bool,
}

/// Final pool plus its metrics, in selection order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSelection {
    pub selected: Vec<String>,
    pub metrics: SelectionMetrics,
}

/// Marginal value of one candidate against the current state.
#[derive(Debug, Clone, Copy)]
struct MarginalScore {
    /// Connectable timestamps still below `target_min`.
    contribution: usize,
    /// Connectable timestamps already at or above `target_max`.
    penalty: usize,
}

impl MarginalScore {
    /// Maximize contribution; break ties toward the smaller penalty.
    /// Equal scores keep the earlier candidate (input order), which
    /// makes the selection deterministic.
    fn beats(&self, other: &MarginalScore) -> bool {
        self.contribution > other.contribution
            || (self.contribution == other.contribution && self.penalty < other.penalty)
    }
}

fn score_candidate(
    candidate: &CandidateSatellite,
    coverage: &TimestampCoverageMap,
    target: &ConstellationTarget,
) -> MarginalScore {
    let mut contribution = 0;
    let mut penalty = 0;

    for sample in &candidate.visibility {
        if !sample.connectable {
            continue;
        }
        let visible_count = coverage.get(&sample.timestamp).map_or(0, |ids| ids.len());
        if visible_count < target.target_min {
            contribution += 1;
        } else if visible_count >= target.target_max {
            penalty += 1;
        }
    }

    MarginalScore {
        contribution,
        penalty,
    }
}

/// Fraction of timestamps whose visible count sits inside the band.
/// An empty grid has nothing in band, so the rate is 0.0.
fn coverage_rate(coverage: &TimestampCoverageMap, target: &ConstellationTarget) -> f64 {
    if coverage.is_empty() {
        return 0.0;
    }
    let in_band = coverage
        .values()
        .filter(|ids| target.in_band(ids.len()))
        .count();
    in_band as f64 / coverage.len() as f64
}

/// Select a visibility pool via greedy marginal-contribution set cover.
///
/// Terminates after at most `candidates.len()` iterations: either the
/// configured coverage rate is reached, or no remaining candidate
/// improves coverage (exhausted: partial success, reported in the
/// metrics rather than raised).
pub fn select_pool(
    candidates: &[CandidateSatellite],
    target: &ConstellationTarget,
) -> PoolSelection {
    let grid = build_coverage_index(candidates);
    info!(
        "Selecting pool from {} candidates over {} timestamps (band {}..={}, target rate {:.3})",
        candidates.len(),
        grid.len(),
        target.target_min,
        target.target_max,
        target.target_coverage_rate
    );

    let mut state = SelectionState::new(grid.keys().copied());
    let mut remaining: Vec<&CandidateSatellite> = candidates.iter().collect();
    let mut iterations = 0;

    for _ in 0..candidates.len() {
        iterations += 1;

        let rate = coverage_rate(&state.current_coverage, target);
        if rate >= target.target_coverage_rate {
            info!(
                "Coverage rate {:.3} reached target after {} selections",
                rate,
                state.selected.len()
            );
            break;
        }

        let mut best: Option<(usize, MarginalScore)> = None;
        for (idx, candidate) in remaining.iter().enumerate() {
            let score = score_candidate(candidate, &state.current_coverage, target);
            if best.map_or(true, |(_, b)| score.beats(&b)) {
                best = Some((idx, score));
            }
        }

        match best {
            Some((idx, score)) if score.contribution > 0 => {
                let winner = remaining.remove(idx);
                debug!(
                    "Selected {} (contribution={}, penalty={})",
                    winner.id, score.contribution, score.penalty
                );
                state.add(winner);
            }
            _ => {
                info!(
                    "No remaining candidate improves coverage; stopping with {} selected",
                    state.selected.len()
                );
                break;
            }
        }
    }

    let metrics = compute_metrics(&state, candidates.len(), iterations, target);
    info!(
        "Pool selection done: {}/{} selected, coverage rate {:.3}, target met: {}",
        metrics.selected_count, metrics.candidate_count, metrics.coverage_rate, metrics.target_met
    );

    PoolSelection {
        selected: state.selected,
        metrics,
    }
}

fn compute_metrics(
    state: &SelectionState,
    candidate_count: usize,
    iterations: usize,
    target: &ConstellationTarget,
) -> SelectionMetrics {
    let counts: Vec<usize> = state.current_coverage.values().map(|ids| ids.len()).collect();
    let total = counts.len();

    let rate = coverage_rate(&state.current_coverage, target);
    let avg_visible = if total == 0 {
        0.0
    } else {
        counts.iter().sum::<usize>() as f64 / total as f64
    };

    SelectionMetrics {
        selected_count: state.selected.len(),
        candidate_count,
        selection_ratio: if candidate_count == 0 {
            0.0
        } else {
            state.selected.len() as f64 / candidate_count as f64
        },
        iterations,
        coverage_rate: rate,
        avg_visible,
        min_visible: counts.iter().copied().min().unwrap_or(0),
        max_visible: counts.iter().copied().max().unwrap_or(0),
        target_met: rate >= target.target_coverage_rate,
    }
}
