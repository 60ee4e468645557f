//! Declaration file discovery.
//!
//! Matches `<root>/<subprojects_dir>/<pattern>` with the `glob` crate. Only
//! regular files are returned for validation. Directories are skipped; any
//! other match (broken symlink, socket, unreadable entry) is reported as a
//! failure, never silently discarded.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use glob::{MatchOptions, Pattern};

use crate::config::ValidatorConfig;
use crate::error::ValidationFailure;
use crate::validator::Verdict;

/// Outcome of discovery.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Declaration files to validate, sorted and deduplicated.
    pub files: Vec<PathBuf>,
    /// Failing verdicts for matches that could not be inspected.
    pub unreadable: Vec<Verdict>,
}

impl Discovery {
    /// Whether nothing at all matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.unreadable.is_empty()
    }

    /// Total number of matched paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len() + self.unreadable.len()
    }
}

/// Find all declaration files described by `config`.
///
/// # Errors
///
/// Returns an error if the directory is not valid UTF-8 or the configured
/// file pattern is not a valid glob.
pub fn find_declarations(config: &ValidatorConfig) -> anyhow::Result<Discovery> {
    let dir = config.root.join(&config.subprojects_dir);
    let dir = dir
        .to_str()
        .with_context(|| format!("Path is not valid UTF-8: {}", dir.display()))?;
    Pattern::new(&config.pattern)
        .with_context(|| format!("Invalid declaration pattern '{}'", config.pattern))?;

    // The directory part is literal; only the file pattern is a glob.
    let full = format!("{}/{}", Pattern::escape(dir), config.pattern);
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut discovery = Discovery::default();
    for entry in glob::glob_with(&full, options)
        .with_context(|| format!("Invalid discovery glob '{full}'"))?
    {
        match entry {
            Ok(path) if path.is_file() => discovery.files.push(path),
            Ok(path) if path.is_dir() => {}
            Ok(path) => {
                let reason = match fs::metadata(&path) {
                    Err(e) => format!("could not be inspected: {e}"),
                    Ok(_) => "not a regular file".to_owned(),
                };
                discovery.unreadable.push(Verdict::failed(
                    path,
                    &ValidationFailure::UnexpectedFault(reason),
                ));
            }
            Err(err) => {
                let failure = ValidationFailure::UnexpectedFault(format!(
                    "could not be inspected: {}",
                    err.error()
                ));
                discovery
                    .unreadable
                    .push(Verdict::failed(err.path(), &failure));
            }
        }
    }

    discovery.files.sort();
    discovery.files.dedup();
    Ok(discovery)
}
