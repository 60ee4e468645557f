//! # wrap-revisions
//!
//! Validates the pinned revisions of `[wrap-git]` subproject declarations.
//!
//! Each declaration names a remote repository and a revision. A revision
//! shaped like a commit hash (7 to 40 hex digits) is accepted as-is. Anything
//! else must be a tag the remote currently exposes; branch names are rejected.
//! Declarations are validated concurrently and every one of them ends up in
//! the report.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wrap_revisions::{GitLsRemote, RemoteConfig, ValidatorConfig, validate_subprojects};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = ValidatorConfig::for_root(".");
//! let lister = Arc::new(GitLsRemote::new(&RemoteConfig::default()));
//!
//! let report = validate_subprojects(&config, &lister).await?;
//! println!("OK: {}", report.ok_files.len());
//! println!("Failures: {}", report.failures.len());
//! println!("Exit code: {}", report.status().exit_code());
//! # Ok(())
//! # }
//! ```

mod classify;
mod config;
mod declaration;
mod discovery;
mod error;
pub mod output;
mod report;
mod run;
mod tags;
mod validator;

pub use classify::{MAX_HASH_LEN, MIN_HASH_LEN, RevisionKind, classify};
pub use config::{
    DEFAULT_JOBS, DEFAULT_PATTERN, DEFAULT_QUERY_TIMEOUT, DEFAULT_SUBPROJECTS_DIR,
    DEFAULT_TAG_PREVIEW, RemoteConfig, ValidatorConfig,
};
pub use declaration::{Declaration, WRAP_GIT_SECTION};
pub use discovery::{Discovery, find_declarations};
pub use error::{
    DeclarationError, FailureKind, Field, RemoteQueryError, RemoteQueryErrorKind, TagPreview,
    ValidationFailure,
};
pub use report::{RunStatus, ValidationReport};
pub use run::{validate_files, validate_subprojects};
pub use tags::{GitLsRemote, PEELED_SUFFIX, TAG_REF_PREFIX, TagLister, TagSet, parse_ls_remote};
pub use validator::{Outcome, Verdict, validate_declaration, validate_path};
