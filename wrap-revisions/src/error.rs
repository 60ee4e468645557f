//! Error types for revision validation.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// The kind of failure that prevented a remote's tags from being listed.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum RemoteQueryErrorKind {
    /// The query program could not be started.
    Spawn,
    /// The query did not finish within its budget and was killed.
    Timeout,
    /// The query program exited unsuccessfully.
    NonZeroExit,
    /// Waiting on the child or collecting its output failed.
    Io,
    /// The URL was refused before anything was spawned.
    InvalidUrl,
}

/// Listing the tags of one remote failed.
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[error("failed to query remote {url}: {message}")]
#[non_exhaustive]
pub struct RemoteQueryError {
    /// The remote that was queried.
    pub url: String,
    /// The kind of failure.
    pub kind: RemoteQueryErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl RemoteQueryError {
    /// Build an error for `url`.
    #[must_use]
    pub fn new(url: &str, kind: RemoteQueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            url: url.to_owned(),
            kind,
            message: message.into(),
        }
    }
}

/// A declaration file could not be turned into a [`crate::Declaration`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeclarationError {
    /// The file could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The declaration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file exceeded the configured size limit.
    #[error("{} exceeds maximum size of {limit} bytes", path.display())]
    TooLarge {
        /// The declaration file.
        path: PathBuf,
        /// Configured limit in bytes.
        limit: u64,
    },
    /// The file is not valid UTF-8.
    #[error("{} is not valid UTF-8", path.display())]
    InvalidEncoding {
        /// The declaration file.
        path: PathBuf,
    },
    /// The key/value format could not be parsed.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// The declaration file.
        path: PathBuf,
        /// Parser error with line number.
        source: wrap_ini::IniError,
    },
    /// The file parsed but has no `[wrap-git]` section.
    #[error("not a wrap-git file")]
    NotWrapGit,
}

/// Which required declaration field is absent.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    /// The remote repository URL.
    Url,
    /// The pinned revision.
    Revision,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url => f.write_str("url"),
            Self::Revision => f.write_str("revision"),
        }
    }
}

/// A bounded, sorted preview of the tags a remote exposes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TagPreview {
    /// The first tags in lexicographic order.
    pub shown: Vec<String>,
    /// Total number of tags on the remote.
    pub total: usize,
}

impl fmt::Display for TagPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shown.is_empty() {
            return f.write_str("none");
        }
        f.write_str(&self.shown.join(", "))?;
        if self.total > self.shown.len() {
            write!(f, ", ... {} more", self.total - self.shown.len())?;
        }
        Ok(())
    }
}

/// Why a single declaration failed validation.
///
/// Display renders the message body; [`crate::Verdict`] prefixes it with the path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationFailure {
    /// The file has no `[wrap-git]` section.
    #[error("not a wrap-git file")]
    NotWrapGit,
    /// `url` or `revision` is absent or empty.
    #[error("missing {0}")]
    MissingField(Field),
    /// Listing the remote's tags failed.
    #[error("failed to query remote {} ({})", .0.url, .0.message)]
    RemoteQuery(RemoteQueryError),
    /// The symbolic revision is not one of the remote's tags.
    #[error(
        "revision \"{revision}\" not found among tags in remote {url} \
         (available tags: {available}). Note: branch names are not accepted."
    )]
    RevisionNotFound {
        /// Declared revision.
        revision: String,
        /// Remote that was queried.
        url: String,
        /// Sorted preview of what the remote does expose.
        available: TagPreview,
    },
    /// Anything else that went wrong while validating this one declaration.
    #[error("exception during validation: {0}")]
    UnexpectedFault(String),
}

/// Stable classification of a [`ValidationFailure`], used in JSON output.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum FailureKind {
    /// See [`ValidationFailure::NotWrapGit`].
    NotWrapGit,
    /// See [`ValidationFailure::MissingField`].
    MissingField,
    /// See [`ValidationFailure::RemoteQuery`].
    RemoteQueryError,
    /// See [`ValidationFailure::RevisionNotFound`].
    RevisionNotFound,
    /// See [`ValidationFailure::UnexpectedFault`].
    UnexpectedFault,
}

impl ValidationFailure {
    /// The stable kind of this failure.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotWrapGit => FailureKind::NotWrapGit,
            Self::MissingField(_) => FailureKind::MissingField,
            Self::RemoteQuery(_) => FailureKind::RemoteQueryError,
            Self::RevisionNotFound { .. } => FailureKind::RevisionNotFound,
            Self::UnexpectedFault(_) => FailureKind::UnexpectedFault,
        }
    }
}

impl From<RemoteQueryError> for ValidationFailure {
    fn from(err: RemoteQueryError) -> Self {
        Self::RemoteQuery(err)
    }
}

impl From<DeclarationError> for ValidationFailure {
    fn from(err: DeclarationError) -> Self {
        match err {
            DeclarationError::NotWrapGit => Self::NotWrapGit,
            other => Self::UnexpectedFault(other.to_string()),
        }
    }
}
