//! Validation report types.

use std::path::PathBuf;

use serde::Serialize;

use crate::validator::Verdict;

/// Overall result of a run, with its process exit code.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every declaration passed.
    AllValid,
    /// At least one declaration failed.
    Failures,
    /// Discovery matched nothing; validation never started.
    NoFiles,
}

impl RunStatus {
    /// Exit code: 0, 1 or 2.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::AllValid => 0,
            Self::Failures => 1,
            Self::NoFiles => 2,
        }
    }
}

/// Result of a validation run.
///
/// `ok_files` is sorted. `failures` keeps the order in which verdicts
/// arrived and lists every failure message.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct ValidationReport {
    /// Number of declaration files discovered.
    pub discovered_files: usize,
    /// Files whose revision is valid, sorted lexicographically.
    pub ok_files: Vec<PathBuf>,
    /// Every failure message.
    pub failures: Vec<String>,
    /// All verdicts, sorted by path.
    pub verdicts: Vec<Verdict>,
}

impl ValidationReport {
    /// Build a report from verdicts in arrival order.
    #[must_use]
    pub fn from_verdicts(discovered_files: usize, mut verdicts: Vec<Verdict>) -> Self {
        let failures = verdicts
            .iter()
            .flat_map(|v| v.messages.iter().cloned())
            .collect();

        verdicts.sort_by(|a, b| a.source_path.cmp(&b.source_path));
        let ok_files = verdicts
            .iter()
            .filter(|v| v.is_ok())
            .map(|v| v.source_path.clone())
            .collect();

        Self {
            discovered_files,
            ok_files,
            failures,
            verdicts,
        }
    }

    /// Report for a run that discovered nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_verdicts(0, Vec::new())
    }

    /// The run status this report maps to.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        if self.discovered_files == 0 {
            RunStatus::NoFiles
        } else if self.failures.is_empty() {
            RunStatus::AllValid
        } else {
            RunStatus::Failures
        }
    }

    /// Number of failing declarations.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.verdicts.iter().filter(|v| !v.is_ok()).count()
    }
}
