//! Single-declaration validation.
//!
//! [`validate_declaration`] runs the checks in order (url present, revision
//! present, revision shape, remote tag lookup) and always returns a
//! [`Verdict`]. Failures never escape as errors.

use std::any::Any;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::declaration::Declaration;
use crate::error::{Field, FailureKind, TagPreview, ValidationFailure};
use crate::tags::TagLister;

/// Whether a declaration passed.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// The revision is a hash or a tag on the remote.
    Ok,
    /// The declaration failed for the given reason.
    Failed {
        /// Failure classification.
        kind: FailureKind,
    },
}

/// Result of validating one declaration file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct Verdict {
    /// The declaration file.
    pub source_path: PathBuf,
    /// Pass or fail.
    pub outcome: Outcome,
    /// Failure messages, each prefixed with the path. Empty on success.
    pub messages: Vec<String>,
}

impl Verdict {
    /// A passing verdict.
    #[must_use]
    pub fn ok(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            outcome: Outcome::Ok,
            messages: Vec::new(),
        }
    }

    /// A failing verdict carrying `failure` as its message.
    #[must_use]
    pub fn failed(source_path: impl Into<PathBuf>, failure: &ValidationFailure) -> Self {
        let source_path = source_path.into();
        let message = format!("{}: {failure}", source_path.display());
        Self {
            source_path,
            outcome: Outcome::Failed {
                kind: failure.kind(),
            },
            messages: vec![message],
        }
    }

    /// Convert a panic payload from a worker into a failing verdict.
    #[must_use]
    pub fn fault(source_path: impl Into<PathBuf>, payload: &(dyn Any + Send)) -> Self {
        let description = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "worker panicked".to_owned());
        Self::failed(
            source_path,
            &ValidationFailure::UnexpectedFault(description),
        )
    }

    /// Whether this verdict passed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.outcome == Outcome::Ok
    }
}

/// Validate one parsed declaration.
///
/// Hash-shaped revisions pass without contacting the remote. Symbolic
/// revisions cost exactly one [`TagLister::list_tags`] call.
pub async fn validate_declaration<L: TagLister>(
    decl: &Declaration,
    lister: &L,
    tag_preview: usize,
) -> Verdict {
    match check(decl, lister, tag_preview).await {
        Ok(()) => Verdict::ok(&decl.source_path),
        Err(failure) => {
            debug!(path = %decl.source_path.display(), %failure, "declaration failed");
            Verdict::failed(&decl.source_path, &failure)
        }
    }
}

/// Read the declaration at `path` and validate it. Read and parse problems
/// become failing verdicts for that file.
pub async fn validate_path<L: TagLister>(
    path: &Path,
    lister: &L,
    max_file_size: u64,
    tag_preview: usize,
) -> Verdict {
    match Declaration::read(path, max_file_size) {
        Ok(decl) => validate_declaration(&decl, lister, tag_preview).await,
        Err(err) => Verdict::failed(path, &ValidationFailure::from(err)),
    }
}

async fn check<L: TagLister>(
    decl: &Declaration,
    lister: &L,
    tag_preview: usize,
) -> Result<(), ValidationFailure> {
    let url = decl
        .url
        .as_deref()
        .ok_or(ValidationFailure::MissingField(Field::Url))?;
    let revision = decl
        .revision
        .as_deref()
        .ok_or(ValidationFailure::MissingField(Field::Revision))?;

    if !classify(revision).needs_remote_check() {
        return Ok(());
    }

    let tags = lister.list_tags(url).await.inspect_err(|err| {
        warn!(path = %decl.source_path.display(), %err, "remote query failed");
    })?;

    if tags.contains(revision) {
        return Ok(());
    }

    Err(ValidationFailure::RevisionNotFound {
        revision: revision.to_owned(),
        url: url.to_owned(),
        available: TagPreview {
            shown: tags.iter().take(tag_preview).cloned().collect(),
            total: tags.len(),
        },
    })
}
