//! Concurrent validation of all discovered declarations.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::ValidatorConfig;
use crate::discovery::find_declarations;
use crate::error::ValidationFailure;
use crate::report::ValidationReport;
use crate::tags::TagLister;
use crate::validator::{Verdict, validate_path};

/// Discover and validate every declaration under `config.root`.
///
/// A report with `discovered_files == 0` means nothing matched; its
/// [`ValidationReport::status`] is [`crate::RunStatus::NoFiles`].
///
/// # Errors
///
/// Returns an error only if discovery itself cannot run (invalid pattern,
/// non-UTF-8 directory). Per-file problems are failures in the report.
pub async fn validate_subprojects<L>(
    config: &ValidatorConfig,
    lister: &Arc<L>,
) -> anyhow::Result<ValidationReport>
where
    L: TagLister + 'static,
{
    let discovery = find_declarations(config)?;
    if discovery.is_empty() {
        info!(glob = %config.discovery_glob().display(), "no declaration files found");
        return Ok(ValidationReport::empty());
    }

    let discovered = discovery.len();
    info!(files = discovered, jobs = config.effective_jobs(), "validating declarations");

    let mut verdicts = discovery.unreadable;
    verdicts.extend(validate_files(discovery.files, config, lister).await);
    Ok(ValidationReport::from_verdicts(discovered, verdicts))
}

/// Validate `files` with at most `config.jobs` in flight.
///
/// Returns exactly one verdict per file, in completion order. A worker that
/// panics yields an unexpected-fault verdict for its file; its siblings keep
/// running.
pub async fn validate_files<L>(
    files: Vec<PathBuf>,
    config: &ValidatorConfig,
    lister: &Arc<L>,
) -> Vec<Verdict>
where
    L: TagLister + 'static,
{
    let semaphore = Arc::new(Semaphore::new(config.effective_jobs()));
    let mut tasks = JoinSet::new();
    let mut in_flight = HashMap::with_capacity(files.len());
    let max_file_size = config.max_file_size;
    let tag_preview = config.tag_preview;

    for path in files {
        let semaphore = Arc::clone(&semaphore);
        let lister = Arc::clone(lister);
        let task_path = path.clone();
        let handle = tasks.spawn(async move {
            // The semaphore is never closed, so acquiring only waits for a slot.
            let _permit = semaphore.acquire_owned().await;
            debug!(path = %task_path.display(), "validating");
            validate_path(&task_path, lister.as_ref(), max_file_size, tag_preview).await
        });
        in_flight.insert(handle.id(), path);
    }

    let mut verdicts = Vec::with_capacity(in_flight.len());
    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((id, verdict)) => {
                in_flight.remove(&id);
                verdicts.push(verdict);
            }
            Err(err) => {
                let path = in_flight.remove(&err.id()).unwrap_or_default();
                warn!(path = %path.display(), %err, "validation task failed");
                let verdict = if err.is_panic() {
                    Verdict::fault(path, err.into_panic().as_ref())
                } else {
                    Verdict::failed(
                        path,
                        &ValidationFailure::UnexpectedFault(err.to_string()),
                    )
                };
                verdicts.push(verdict);
            }
        }
    }

    verdicts
}
