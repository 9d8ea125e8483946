//! Data validation utilities.
//!
//! Checks every RON file under a directory. Files whose name starts with
//! `rules` are parsed as [`BattleRules`]; everything else must be a
//! [`Scenario`].

use std::path::{Path, PathBuf};

use battle_core::rules::BattleRules;
use serde::Serialize;

use crate::scenario::{Scenario, ScenarioError};

/// A file that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// Offending file.
    pub path: PathBuf,
    /// What was wrong with it.
    pub message: String,
}

/// Result of validating a data directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Files checked, sorted.
    pub checked: Vec<PathBuf>,
    /// Files that failed.
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    /// Whether every file passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

fn is_rules_file(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.starts_with("rules"))
}

/// Validate a single data file.
///
/// # Errors
///
/// Returns the parse or consistency error for the file.
pub fn validate_file(path: &Path) -> Result<(), ScenarioError> {
    if is_rules_file(path) {
        BattleRules::load(path)?;
    } else {
        Scenario::load(path)?;
    }
    Ok(())
}

fn collect_ron_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_ron_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "ron") {
            out.push(path);
        }
    }
    Ok(())
}

/// Validate all RON data files in a directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be read. Individual file
/// failures are collected in the report.
pub fn validate_data_directory(path: &Path) -> Result<ValidationReport, ScenarioError> {
    if !path.is_dir() {
        return Err(ScenarioError::FileNotFound(path.display().to_string()));
    }
    let mut checked = Vec::new();
    collect_ron_files(path, &mut checked)?;
    checked.sort();

    let failures = checked
        .iter()
        .filter_map(|file| {
            validate_file(file).err().map(|e| {
                tracing::warn!(path = %file.display(), "{e}");
                ValidationFailure {
                    path: file.clone(),
                    message: e.to_string(),
                }
            })
        })
        .collect();

    tracing::debug!(files = checked.len(), "Validated data directory");
    Ok(ValidationReport { checked, failures })
}
