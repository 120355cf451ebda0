//! Visibility Pool Optimization CLI
//!
//! Selects a per-constellation satellite pool from precomputed
//! visibility data and writes the full run report.
//!
//! Usage:
//!   optimize-pool --candidates data/starlink_visibility.json \
//!                 --config data/constellations.json \
//!                 --constellation starlink \
//!                 --output data/starlink_pool.json

use anyhow::Result;
use clap::Parser;
use pool_optimizer::{
    analyze_continuity, loader, select_pool, validate_optimization, OptimizationRun,
};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "optimize-pool",
    about = "Select a visibility pool holding the target band across the observation window"
)]
struct Args {
    /// Path to candidate visibility JSON file
    #[arg(short = 'i', long)]
    candidates: PathBuf,

    /// Path to constellation configuration JSON file
    #[arg(short = 'c', long)]
    config: PathBuf,

    /// Constellation name to resolve in the configuration
    #[arg(short = 'n', long)]
    constellation: String,

    /// Output JSON report file
    #[arg(short, long, default_value = "pool_report.json")]
    output: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{}", "=".repeat(60));
    info!("Visibility Pool Optimizer");
    info!("{}", "=".repeat(60));

    // Fail-fast boundary: configuration and candidate shape errors
    // abort here before any optimization runs.
    let target = loader::load_constellation_target(&args.config, &args.constellation)?;
    let candidates = loader::load_candidates(&args.candidates)?;

    // Window adequacy is independent of which candidates get picked.
    let timestamps: Vec<_> = candidates
        .iter()
        .flat_map(|c| c.visibility.iter().map(|s| s.timestamp))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let window_check =
        orbital_mechanics::check_observation_window(&timestamps, target.altitude_km)?;
    if !window_check.is_complete_period {
        info!(
            "Observation window spans {:.1} of {:.1} expected minutes (ratio {:.2}); \
             coverage claims are limited to the sampled portion of the orbit",
            window_check.time_span_minutes,
            window_check.expected_period_minutes,
            window_check.coverage_ratio
        );
    }

    let selection = select_pool(&candidates, &target);
    let report = analyze_continuity(
        &candidates,
        &selection.selected,
        target.target_min,
        target.target_max,
    );
    let validation = validate_optimization(&selection.metrics, &report, &target);

    // Summary
    info!("\n{}", "=".repeat(60));
    info!("SUMMARY: {}", args.constellation);
    info!("{}", "=".repeat(60));
    info!(
        "Selected {}/{} candidates (ratio {:.3})",
        selection.metrics.selected_count,
        selection.metrics.candidate_count,
        selection.metrics.selection_ratio
    );
    info!(
        "Coverage rate {:.4} (target {:.4}), visible avg {:.2} min {} max {}",
        selection.metrics.coverage_rate,
        target.target_coverage_rate,
        selection.metrics.avg_visible,
        selection.metrics.min_visible,
        selection.metrics.max_visible
    );
    info!(
        "Gaps: {}, below-target periods: {}",
        report.gaps.len(),
        report.below_target_periods.len()
    );
    for (name, check) in validation.checks() {
        info!(
            "  [{}] {}: {}",
            if check.passed { "PASS" } else { "FAIL" },
            name,
            check.message
        );
    }
    info!("Overall: {:?}", validation.overall_status);

    let run = OptimizationRun::new(
        args.constellation,
        selection.selected,
        selection.metrics,
        report,
        validation,
        window_check,
    );

    info!("Writing report to {:?}", args.output);
    let file = File::create(&args.output)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &run)?;

    Ok(())
}
