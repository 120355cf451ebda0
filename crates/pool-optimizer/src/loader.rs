//! Data and configuration loading from JSON files
//!
//! The upstream visibility computation hands over candidate records;
//! constellation targets come from configuration. Both load fail-fast:
//! a malformed candidate sample or a missing configuration field
//! aborts the run with the offending field named, never a silent skip
//! or a defaulted threshold.

use crate::{CandidateSatellite, ConstellationTarget, PoolError, Result, VisibilitySample};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Raw candidate record as found on disk. Fields are optional only so
/// that absence can be reported precisely instead of as a generic
/// serde error.
#[derive(Debug, Deserialize)]
struct RawCandidate {
    id: Option<String>,
    visibility: Option<Vec<RawSample>>,
}

#[derive(Debug, Deserialize)]
struct RawSample {
    timestamp: Option<String>,
    connectable: Option<bool>,
}

/// Constellation configuration document:
/// `{"constellations": {"<name>": {target_min, target_max,
/// target_coverage_rate, altitude_km}}}`.
#[derive(Debug, Deserialize)]
struct ConstellationConfigFile {
    constellations: BTreeMap<String, ConstellationTarget>,
}

/// Load candidate visibility series from a JSON file.
///
/// Every record must carry an id and a complete visibility series;
/// a missing timestamp or connectability flag is a data-shape error.
pub fn load_candidates(path: impl AsRef<Path>) -> Result<Vec<CandidateSatellite>> {
    let path = path.as_ref();
    info!("Loading candidates from {:?}", path);

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let raw: Vec<RawCandidate> = serde_json::from_reader(reader)?;

    let mut candidates = Vec::with_capacity(raw.len());
    for (index, record) in raw.into_iter().enumerate() {
        let id = record.id.ok_or(PoolError::MalformedCandidate {
            index,
            field: "id",
        })?;
        let samples = record.visibility.ok_or(PoolError::MalformedCandidate {
            index,
            field: "visibility",
        })?;

        let mut visibility = Vec::with_capacity(samples.len());
        for (sample_index, sample) in samples.into_iter().enumerate() {
            visibility.push(parse_sample(&id, sample_index, sample)?);
        }

        candidates.push(CandidateSatellite { id, visibility });
    }

    info!("Loaded {} candidates", candidates.len());
    Ok(candidates)
}

fn parse_sample(candidate: &str, index: usize, sample: RawSample) -> Result<VisibilitySample> {
    let malformed = |reason: String| PoolError::MalformedSample {
        candidate: candidate.to_string(),
        index,
        reason,
    };

    let raw_timestamp = sample
        .timestamp
        .ok_or_else(|| malformed("missing timestamp".to_string()))?;
    let timestamp: DateTime<Utc> = raw_timestamp
        .parse::<DateTime<Utc>>()
        .map_err(|e| malformed(format!("unparseable timestamp '{raw_timestamp}': {e}")))?;
    let connectable = sample
        .connectable
        .ok_or_else(|| malformed("missing connectable flag".to_string()))?;

    Ok(VisibilitySample {
        timestamp,
        connectable,
    })
}

/// Resolve the target configuration for one constellation.
///
/// An unrecognized constellation name is an error, not a passthrough:
/// optimizing against guessed thresholds is worse than refusing to
/// run. Missing fields surface as JSON parse errors naming the field;
/// semantic bounds are checked afterwards.
pub fn load_constellation_target(
    path: impl AsRef<Path>,
    constellation: &str,
) -> Result<ConstellationTarget> {
    let path = path.as_ref();
    info!(
        "Loading target configuration for '{}' from {:?}",
        constellation, path
    );

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config: ConstellationConfigFile = serde_json::from_reader(reader)?;

    let target = config
        .constellations
        .get(constellation)
        .cloned()
        .ok_or_else(|| PoolError::MissingConstellation(constellation.to_string()))?;

    target.validate(constellation)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_candidates() {
        let file = write_temp(
            r#"[
                {"id": "sat-1", "visibility": [
                    {"timestamp": "2025-06-01T00:00:00Z", "connectable": true},
                    {"timestamp": "2025-06-01T00:01:00Z", "connectable": false}
                ]},
                {"id": "sat-2", "visibility": []}
            ]"#,
        );

        let candidates = load_candidates(file.path()).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, "sat-1");
        assert_eq!(candidates[0].visibility.len(), 2);
        assert!(candidates[0].visibility[0].connectable);
    }

    #[test]
    fn test_missing_id_is_fatal() {
        let file = write_temp(r#"[{"visibility": []}]"#);

        let err = load_candidates(file.path()).unwrap_err();
        assert!(matches!(
            err,
            PoolError::MalformedCandidate { index: 0, field: "id" }
        ));
    }

    #[test]
    fn test_missing_timestamp_is_fatal_not_skipped() {
        let file = write_temp(
            r#"[{"id": "sat-1", "visibility": [{"connectable": true}]}]"#,
        );

        let err = load_candidates(file.path()).unwrap_err();
        match err {
            PoolError::MalformedSample {
                candidate, reason, ..
            } => {
                assert_eq!(candidate, "sat-1");
                assert!(reason.contains("timestamp"));
            }
            other => panic!("expected MalformedSample, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_connectable_flag_is_fatal() {
        let file = write_temp(
            r#"[{"id": "sat-1", "visibility": [{"timestamp": "2025-06-01T00:00:00Z"}]}]"#,
        );

        let err = load_candidates(file.path()).unwrap_err();
        assert!(matches!(err, PoolError::MalformedSample { .. }));
    }

    #[test]
    fn test_unparseable_timestamp_is_fatal() {
        let file = write_temp(
            r#"[{"id": "sat-1", "visibility": [{"timestamp": "yesterday", "connectable": true}]}]"#,
        );

        let err = load_candidates(file.path()).unwrap_err();
        match err {
            PoolError::MalformedSample { reason, .. } => {
                assert!(reason.contains("yesterday"));
            }
            other => panic!("expected MalformedSample, got {other:?}"),
        }
    }

    #[test]
    fn test_load_constellation_target() {
        let file = write_temp(
            r#"{"constellations": {
                "starlink": {"target_min": 10, "target_max": 15,
                             "target_coverage_rate": 0.95, "altitude_km": 550.0},
                "oneweb": {"target_min": 3, "target_max": 6,
                           "target_coverage_rate": 0.95, "altitude_km": 1200.0}
            }}"#,
        );

        let target = load_constellation_target(file.path(), "oneweb").unwrap();
        assert_eq!(target.target_min, 3);
        assert_eq!(target.target_max, 6);
        assert_eq!(target.altitude_km, 1200.0);
    }

    #[test]
    fn test_unknown_constellation_is_fatal() {
        let file = write_temp(r#"{"constellations": {}}"#);

        let err = load_constellation_target(file.path(), "iridium").unwrap_err();
        assert!(matches!(err, PoolError::MissingConstellation(name) if name == "iridium"));
    }

    #[test]
    fn test_missing_threshold_field_is_fatal() {
        // target_coverage_rate absent: no implicit default permitted.
        let file = write_temp(
            r#"{"constellations": {
                "starlink": {"target_min": 10, "target_max": 15, "altitude_km": 550.0}
            }}"#,
        );

        let err = load_constellation_target(file.path(), "starlink").unwrap_err();
        match err {
            PoolError::Json(e) => assert!(e.to_string().contains("target_coverage_rate")),
            other => panic!("expected Json error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_band_is_fatal() {
        let file = write_temp(
            r#"{"constellations": {
                "starlink": {"target_min": 15, "target_max": 10,
                             "target_coverage_rate": 0.95, "altitude_km": 550.0}
            }}"#,
        );

        let err = load_constellation_target(file.path(), "starlink").unwrap_err();
        assert!(matches!(err, PoolError::InvalidTarget { .. }));
    }
}
