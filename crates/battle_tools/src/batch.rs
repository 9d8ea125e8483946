//! Batch battle runner.
//!
//! Resolves many scenarios in parallel using rayon. Battles are independent
//! pure computations, so the only shared state is the result list. Also
//! used to check determinism by resolving one scenario many times at once.

use std::path::{Path, PathBuf};
use std::time::Instant;

use battle_core::fleet::PlayerId;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::scenario::Scenario;

/// Summary of one resolved scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    /// Scenario file.
    pub path: PathBuf,
    /// Scenario name.
    pub name: String,
    /// Hash of the full battle record.
    pub record_hash: u64,
    /// Rounds fought.
    pub rounds: u32,
    /// Actions recorded across all players.
    pub actions: usize,
    /// Players with ships left.
    pub surviving_players: Vec<PlayerId>,
}

/// A scenario that failed to load or resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Scenario file.
    pub path: PathBuf,
    /// Error message.
    pub message: String,
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Resolved scenarios, in input order.
    pub entries: Vec<BatchEntry>,
    /// Failures, in input order.
    pub errors: Vec<BatchError>,
    /// Wall-clock runtime.
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Whether every scenario resolved.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

fn run_one(path: &Path) -> Result<BatchEntry, BatchError> {
    let fail = |message: String| BatchError {
        path: path.to_path_buf(),
        message,
    };
    let scenario = Scenario::load(path).map_err(|e| fail(e.to_string()))?;
    let outcome = scenario.resolve().map_err(|e| fail(e.to_string()))?;
    debug!(path = %path.display(), rounds = outcome.record.stats.rounds_fought, "Batch entry done");
    Ok(BatchEntry {
        path: path.to_path_buf(),
        name: scenario.name,
        record_hash: outcome.record.record_hash(),
        rounds: outcome.record.stats.rounds_fought,
        actions: outcome.record.action_count(),
        surviving_players: outcome.surviving_players(),
    })
}

/// Resolve every scenario file in parallel.
pub fn run_batch(paths: &[PathBuf]) -> BatchResults {
    let start = Instant::now();
    info!(scenarios = paths.len(), "Starting batch");

    let results: Vec<Result<BatchEntry, BatchError>> =
        paths.par_iter().map(|path| run_one(path)).collect();

    let mut entries = Vec::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(entry) => entries.push(entry),
            Err(error) => {
                warn!(path = %error.path.display(), "{}", error.message);
                errors.push(error);
            }
        }
    }

    let duration_seconds = start.elapsed().as_secs_f64();
    info!(
        resolved = entries.len(),
        failed = errors.len(),
        duration_seconds,
        "Batch complete"
    );
    BatchResults {
        entries,
        errors,
        duration_seconds,
    }
}

/// Outcome of a parallel determinism check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Scenario name.
    pub scenario: String,
    /// Record hash of every run.
    pub hashes: Vec<u64>,
}

impl VerifyReport {
    /// Whether every run produced the same record.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Resolve the same scenario `runs` times in parallel and collect hashes.
pub fn verify_scenario(
    scenario: &Scenario,
    runs: usize,
) -> Result<VerifyReport, crate::scenario::ScenarioError> {
    let hashes = (0..runs)
        .into_par_iter()
        .map(|_| scenario.resolve().map(|o| o.record.record_hash()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(VerifyReport {
        scenario: scenario.name.clone(),
        hashes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_scenario(dir: &Path, name: &str, scenario: &Scenario) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, scenario.to_ron_string().unwrap()).unwrap();
        path
    }

    #[test]
    fn test_batch_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut second = Scenario::skirmish();
        second.name = "Second".to_string();
        let paths = vec![
            write_scenario(dir.path(), "a.ron", &Scenario::skirmish()),
            write_scenario(dir.path(), "b.ron", &second),
        ];

        let results = run_batch(&paths);
        assert!(results.is_success());
        let names: Vec<_> = results.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Standard Skirmish", "Second"]);
        assert_eq!(results.entries[0].record_hash, results.entries[1].record_hash);
    }

    #[test]
    fn test_batch_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.ron");
        std::fs::write(&broken, "Scenario(name: ").unwrap();
        let paths = vec![
            write_scenario(dir.path(), "ok.ron", &Scenario::skirmish()),
            broken.clone(),
            dir.path().join("missing.ron"),
        ];

        let results = run_batch(&paths);
        assert_eq!(results.entries.len(), 1);
        assert_eq!(results.errors.len(), 2);
        assert_eq!(results.errors[0].path, broken);
        assert!(!results.is_success());
    }

    #[test]
    fn test_results_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![write_scenario(dir.path(), "a.ron", &Scenario::skirmish())];
        let results = run_batch(&paths);

        let out = dir.path().join("out").join("batch.json");
        results.save(&out).unwrap();
        let loaded = BatchResults::load(&out).unwrap();
        assert_eq!(loaded.entries, results.entries);
    }

    #[test]
    fn test_verify_scenario_is_deterministic() {
        let report = verify_scenario(&Scenario::skirmish(), 8).unwrap();
        assert_eq!(report.hashes.len(), 8);
        assert!(report.is_deterministic());
    }
}
