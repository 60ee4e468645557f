//! Remote tag listing.
//!
//! [`TagLister`] is the seam between validation and the network. The
//! production implementation, [`GitLsRemote`], shells out to
//! `git ls-remote --tags` under a timeout; tests substitute in-process fakes.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::config::RemoteConfig;
use crate::error::{RemoteQueryError, RemoteQueryErrorKind};

/// Namespace prefix of tag references.
pub const TAG_REF_PREFIX: &str = "refs/tags/";

/// Suffix marking the peeled commit of an annotated tag.
pub const PEELED_SUFFIX: &str = "^{}";

/// Tag names exposed by one remote, kept sorted.
pub type TagSet = BTreeSet<String>;

/// Lists the tags a remote repository currently exposes.
///
/// Implementations must be shareable across worker tasks.
pub trait TagLister: Send + Sync {
    /// Return the bare tag names of `url`, with annotated and lightweight
    /// forms of the same tag collapsed into one entry.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteQueryError`] carrying `url` if the remote could not
    /// be queried.
    fn list_tags(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<TagSet, RemoteQueryError>> + Send;
}

/// Parse `git ls-remote` output (`<hash>\t<ref>` per line) into tag names.
///
/// Lines without a tab and refs outside `refs/tags/` are skipped. A peeled
/// `refs/tags/v1^{}` entry yields `v1`, the same name as its unpeeled form.
#[must_use]
pub fn parse_ls_remote(output: &str) -> TagSet {
    output
        .lines()
        .filter_map(|line| {
            let (_, reference) = line.split_once('\t')?;
            let name = reference.trim_end().strip_prefix(TAG_REF_PREFIX)?;
            let name = name.strip_suffix(PEELED_SUFFIX).unwrap_or(name);
            (!name.is_empty()).then(|| name.to_owned())
        })
        .collect()
}

/// [`TagLister`] backed by `git ls-remote --tags <url>`.
#[derive(Debug, Clone)]
pub struct GitLsRemote {
    program: PathBuf,
    timeout: Duration,
}

impl Default for GitLsRemote {
    fn default() -> Self {
        Self::new(&RemoteConfig::default())
    }
}

impl GitLsRemote {
    /// Create a lister from remote config.
    #[must_use]
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            program: config.program.clone(),
            timeout: config.timeout,
        }
    }

    async fn ls_remote(&self, url: &str) -> Result<Vec<u8>, RemoteQueryError> {
        let program = self.program.display().to_string();

        // Never let a URL be read as a git option.
        if url.starts_with('-') {
            return Err(RemoteQueryError::new(
                url,
                RemoteQueryErrorKind::InvalidUrl,
                "URL must not start with '-'",
            ));
        }

        let child = Command::new(&self.program)
            .args(["ls-remote", "--tags"])
            .arg(url)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RemoteQueryError::new(
                    url,
                    RemoteQueryErrorKind::Spawn,
                    format!("failed to spawn {program}: {e}"),
                )
            })?;

        // On timeout the wait future is dropped, which kills the child.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(RemoteQueryError::new(
                    url,
                    RemoteQueryErrorKind::Io,
                    format!("failed to wait for {program}: {e}"),
                ));
            }
            Err(_) => {
                return Err(RemoteQueryError::new(
                    url,
                    RemoteQueryErrorKind::Timeout,
                    format!("timed out after {}ms", self.timeout.as_millis()),
                ));
            }
        };

        if !output.status.success() {
            return Err(RemoteQueryError::new(
                url,
                RemoteQueryErrorKind::NonZeroExit,
                format!("{program} ls-remote exited with {}", output.status),
            ));
        }

        Ok(output.stdout)
    }
}

impl TagLister for GitLsRemote {
    async fn list_tags(&self, url: &str) -> Result<TagSet, RemoteQueryError> {
        debug!(url, "listing remote tags");
        let stdout = self.ls_remote(url).await?;
        let tags = parse_ls_remote(&String::from_utf8_lossy(&stdout));
        debug!(url, count = tags.len(), "listed remote tags");
        Ok(tags)
    }
}
