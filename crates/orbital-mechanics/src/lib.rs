//! Orbital Mechanics Library
//!
//! Kepler period arithmetic and observation-window validation for the
//! visibility pool optimizer.
//!
//! A coverage rate measured over less than one orbital period is not
//! representative of steady-state visibility: a 40-minute sample of a
//! 95-minute LEO orbit can look fully covered and still hide a gap on
//! the unsampled side of the revolution. [`check_observation_window`]
//! compares the sampled wall-clock span against the constellation's
//! theoretical period and reports whether a complete revolution was
//! observed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

/// WGS-84 mean equatorial Earth radius in km.
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Earth standard gravitational parameter in km^3/s^2 (WGS-84).
pub const MU_EARTH_KM3_S2: f64 = 398_600.4418;

/// Minimum span/period ratio accepted as a complete orbital period
/// (10% tolerance for edge-of-window sampling).
pub const COMPLETE_PERIOD_RATIO: f64 = 0.9;

#[derive(Error, Debug)]
pub enum OrbitalError {
    #[error("Non-physical orbital altitude: {0} km")]
    InvalidAltitude(f64),
}

pub type Result<T> = std::result::Result<T, OrbitalError>;

/// Result of comparing a sampled observation window against the
/// constellation's theoretical orbital period.
///
/// `is_complete_period == false` is a legitimate, reportable outcome,
/// not an error: the caller decides whether to widen the window or to
/// qualify the coverage claims it makes downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitalPeriodCheck {
    /// Wall-clock span between earliest and latest sampled timestamp.
    pub time_span_minutes: f64,
    /// Theoretical period from Kepler's third law at the nominal altitude.
    pub expected_period_minutes: f64,
    /// `time_span_minutes / expected_period_minutes`.
    pub coverage_ratio: f64,
    /// `coverage_ratio >= COMPLETE_PERIOD_RATIO`.
    pub is_complete_period: bool,
}

/// Keplerian orbital period in minutes for a circular orbit at the
/// given altitude: `T = 2π√(a³/μ)` with `a = R_earth + altitude`.
pub fn orbital_period_minutes(altitude_km: f64) -> Result<f64> {
    if !altitude_km.is_finite() || altitude_km <= 0.0 {
        return Err(OrbitalError::InvalidAltitude(altitude_km));
    }
    let semi_major_axis_km = EARTH_RADIUS_KM + altitude_km;
    let period_s = 2.0 * PI * (semi_major_axis_km.powi(3) / MU_EARTH_KM3_S2).sqrt();
    Ok(period_s / 60.0)
}

/// Check that the sampled timestamps span at least one orbital period
/// at the constellation's nominal altitude.
///
/// An empty or single-timestamp input yields a zero span (and thus an
/// incomplete period); the only error is a non-physical altitude.
pub fn check_observation_window(
    timestamps: &[DateTime<Utc>],
    altitude_km: f64,
) -> Result<OrbitalPeriodCheck> {
    let expected_period_minutes = orbital_period_minutes(altitude_km)?;

    let time_span_minutes = match (timestamps.iter().min(), timestamps.iter().max()) {
        (Some(first), Some(last)) => (*last - *first).num_seconds() as f64 / 60.0,
        _ => 0.0,
    };

    let coverage_ratio = time_span_minutes / expected_period_minutes;

    Ok(OrbitalPeriodCheck {
        time_span_minutes,
        expected_period_minutes,
        coverage_ratio,
        is_complete_period: coverage_ratio >= COMPLETE_PERIOD_RATIO,
    })
}
