//! Configuration types for revision validation.
//!
//! Split into the run config (where declarations live and how many are
//! validated at once) and the remote config (how tags are queried). The
//! run config does not know how the remote is reached.

use std::path::PathBuf;
use std::time::Duration;

/// Directory, relative to the project root, holding the declaration files.
pub const DEFAULT_SUBPROJECTS_DIR: &str = "subprojects";

/// Glob matched against file names inside the subprojects directory.
pub const DEFAULT_PATTERN: &str = "*.wrap";

/// Number of declarations validated concurrently.
pub const DEFAULT_JOBS: usize = 8;

/// Number of available tags listed when a revision is not found.
pub const DEFAULT_TAG_PREVIEW: usize = 10;

/// Per-query budget for listing a remote's tags.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Run-level options.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ValidatorConfig {
    /// Project root. Discovery looks in `root/subprojects_dir/pattern`.
    pub root: PathBuf,
    /// Subdirectory of `root` containing declaration files (default: `subprojects`).
    pub subprojects_dir: PathBuf,
    /// File name glob (default: `*.wrap`).
    pub pattern: String,
    /// Maximum number of declarations validated at the same time (default: 8).
    /// Values below 1 are treated as 1.
    pub jobs: usize,
    /// How many sorted tag names to show when a revision is missing (default: 10).
    pub tag_preview: usize,
    /// Maximum declaration file size in bytes (default: 1 MiB).
    pub max_file_size: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            subprojects_dir: PathBuf::from(DEFAULT_SUBPROJECTS_DIR),
            pattern: DEFAULT_PATTERN.to_owned(),
            jobs: DEFAULT_JOBS,
            tag_preview: DEFAULT_TAG_PREVIEW,
            max_file_size: 1_048_576,
        }
    }
}

impl ValidatorConfig {
    /// Config rooted at `root` with every other option at its default.
    #[must_use]
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// The full glob used for discovery.
    #[must_use]
    pub fn discovery_glob(&self) -> PathBuf {
        self.root.join(&self.subprojects_dir).join(&self.pattern)
    }

    /// Effective worker count, never zero.
    #[must_use]
    pub fn effective_jobs(&self) -> usize {
        self.jobs.max(1)
    }
}

/// How the remote tag query is executed.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct RemoteConfig {
    /// The `git` executable (default: `git`, resolved through `PATH`).
    pub program: PathBuf,
    /// Budget for one `ls-remote` call; the child is killed when it elapses.
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}
