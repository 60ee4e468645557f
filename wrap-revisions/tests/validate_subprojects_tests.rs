#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for `wrap_revisions::validate_subprojects`.
//!
//! Remotes are in-process fakes keyed by URL, so no test touches the network.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::TempDir;
use wrap_revisions::output::write_human;
use wrap_revisions::{
    FailureKind, Outcome, RemoteQueryError, RemoteQueryErrorKind, RunStatus, TagLister, TagSet,
    ValidatorConfig, parse_ls_remote, validate_subprojects,
};

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

const LIB_URL: &str = "https://example.org/lib.git";
const TOOL_URL: &str = "https://example.org/tool.git";
const DOWN_URL: &str = "https://unreachable.example.org/down.git";

const LIB_TAGS: &str = "\
aaaa\trefs/tags/v1.0
bbbb\trefs/tags/v2.0
cccc\trefs/tags/v3.0^{}
";

/// Fake remotes keyed by URL. Unknown URLs fail like an unreachable host.
#[derive(Default)]
struct FakeRemotes {
    listings: HashMap<&'static str, &'static str>,
    panic_on: Option<&'static str>,
    delay: Duration,
    calls: AtomicUsize,
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeRemotes {
    fn new() -> Self {
        let mut remotes = Self::default();
        remotes.listings.insert(LIB_URL, LIB_TAGS);
        remotes.listings.insert(TOOL_URL, "dddd\trefs/tags/1.2.3\n");
        remotes
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TagLister for FakeRemotes {
    async fn list_tags(&self, url: &str) -> Result<TagSet, RemoteQueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.running.fetch_sub(1, Ordering::SeqCst);

        assert!(self.panic_on != Some(url), "boom");

        self.listings.get(url).map(|l| parse_ls_remote(l)).ok_or_else(|| {
            RemoteQueryError::new(
                url,
                RemoteQueryErrorKind::NonZeroExit,
                "git ls-remote exited with exit status: 128",
            )
        })
    }
}

fn project() -> (TempDir, ValidatorConfig) {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("subprojects")).unwrap();
    let config = ValidatorConfig::for_root(tmp.path());
    (tmp, config)
}

fn wrap(root: &Path, name: &str, url: Option<&str>, revision: Option<&str>) -> PathBuf {
    let mut content = String::from("[wrap-git]\n");
    if let Some(url) = url {
        writeln!(content, "url = {url}").unwrap();
    }
    if let Some(revision) = revision {
        writeln!(content, "revision = {revision}").unwrap();
    }
    content.push_str("depth = 1\n");
    let path = root.join("subprojects").join(name);
    fs::write(&path, content).unwrap();
    path
}

fn render(report: &wrap_revisions::ValidationReport) -> String {
    let mut buf = Vec::new();
    write_human(report, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_no_declarations_is_no_files() {
    let (tmp, config) = project();
    fs::write(tmp.path().join("subprojects/notes.txt"), "").unwrap();
    let remotes = Arc::new(FakeRemotes::new());

    let report = validate_subprojects(&config, &remotes)
        .await
        .unwrap();

    assert_eq!(report.status(), RunStatus::NoFiles);
    assert_eq!(report.status().exit_code(), 2);
    assert!(report.ok_files.is_empty());
    assert!(report.failures.is_empty());
    assert_eq!(remotes.calls(), 0);
}

#[tokio::test]
async fn test_missing_subprojects_directory_is_no_files() {
    let tmp = TempDir::new().unwrap();
    let config = ValidatorConfig::for_root(tmp.path());
    let report = validate_subprojects(&config, &Arc::new(FakeRemotes::new()))
        .await
        .unwrap();
    assert_eq!(report.status(), RunStatus::NoFiles);
}

#[tokio::test]
async fn test_all_valid() {
    let (tmp, config) = project();
    let root = tmp.path();
    let hash = wrap(
        root,
        "hash.wrap",
        Some(LIB_URL),
        Some("3f786850e387550fdab836ed7e6dc881de23001b"),
    );
    let tag = wrap(root, "tag.wrap", Some(LIB_URL), Some("v2.0"));
    let annotated = wrap(root, "annotated.wrap", Some(LIB_URL), Some("v3.0"));
    let remotes = Arc::new(FakeRemotes::new());

    let report = validate_subprojects(&config, &remotes)
        .await
        .unwrap();

    assert_eq!(report.status(), RunStatus::AllValid);
    assert_eq!(
        report.ok_files,
        vec![annotated.clone(), hash.clone(), tag.clone()]
    );
    // Only the two symbolic revisions hit the remote.
    assert_eq!(remotes.calls(), 2);

    let expected = format!(
        "OK: {}\nOK: {}\nOK: {}\n\nAll revisions valid\n",
        annotated.display(),
        hash.display(),
        tag.display()
    );
    assert_eq!(render(&report), expected);
}

#[tokio::test]
async fn test_mixed_results_are_fully_reported() {
    let (tmp, config) = project();
    let root = tmp.path();
    wrap(root, "a-hash.wrap", Some(LIB_URL), Some("DEADBEEF"));
    wrap(root, "b-tag.wrap", Some(TOOL_URL), Some("1.2.3"));
    wrap(root, "c-branch.wrap", Some(LIB_URL), Some("main"));
    wrap(root, "d-norev.wrap", Some(LIB_URL), None);
    wrap(root, "e-nourl.wrap", None, Some("v1.0"));
    wrap(root, "f-tag.wrap", Some(LIB_URL), Some("v1.0"));

    let report = validate_subprojects(&config, &Arc::new(FakeRemotes::new()))
        .await
        .unwrap();

    assert_eq!(report.discovered_files, 6);
    assert_eq!(report.status(), RunStatus::Failures);
    assert_eq!(report.status().exit_code(), 1);

    let ok_names: Vec<String> = report
        .ok_files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(ok_names, vec!["a-hash.wrap", "b-tag.wrap", "f-tag.wrap"]);

    assert_eq!(report.failures.len(), 3);
    assert_eq!(report.failed_count(), 3);
    let branch = report
        .failures
        .iter()
        .find(|f| f.contains("c-branch.wrap"))
        .unwrap();
    assert!(branch.contains("revision \"main\" not found"), "{branch}");
    assert!(branch.contains("available tags: v1.0, v2.0, v3.0"), "{branch}");
    assert!(branch.contains("branch names are not accepted"), "{branch}");
    assert!(
        report
            .failures
            .iter()
            .any(|f| f.ends_with("d-norev.wrap: missing revision"))
    );
    assert!(
        report
            .failures
            .iter()
            .any(|f| f.ends_with("e-nourl.wrap: missing url"))
    );

    let text = render(&report);
    assert!(text.contains("\n\nFailures:\n"), "{text}");
    assert_eq!(text.lines().filter(|l| l.starts_with(" - ")).count(), 3);
    assert_eq!(text.lines().filter(|l| l.starts_with("OK: ")).count(), 3);
}

#[tokio::test]
async fn test_remote_failure_does_not_affect_siblings() {
    let (tmp, config) = project();
    let root = tmp.path();
    wrap(root, "down.wrap", Some(DOWN_URL), Some("v1.0"));
    wrap(root, "lib.wrap", Some(LIB_URL), Some("v1.0"));
    wrap(root, "tool.wrap", Some(TOOL_URL), Some("1.2.3"));

    let report = validate_subprojects(&config, &Arc::new(FakeRemotes::new()))
        .await
        .unwrap();

    assert_eq!(report.ok_files.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert!(
        report.failures[0].contains(&format!("failed to query remote {DOWN_URL}")),
        "{}",
        report.failures[0]
    );
    let verdict = report
        .verdicts
        .iter()
        .find(|v| v.source_path.ends_with("down.wrap"))
        .unwrap();
    assert_eq!(
        verdict.outcome,
        Outcome::Failed {
            kind: FailureKind::RemoteQueryError
        }
    );
}

#[tokio::test]
async fn test_worker_panic_becomes_fault_verdict() {
    let (tmp, config) = project();
    let root = tmp.path();
    let bad = wrap(root, "bad.wrap", Some(TOOL_URL), Some("1.2.3"));
    wrap(root, "good.wrap", Some(LIB_URL), Some("v1.0"));
    wrap(root, "hash.wrap", Some(TOOL_URL), Some("abcdef0"));

    let mut remotes = FakeRemotes::new();
    remotes.panic_on = Some(TOOL_URL);
    let report = validate_subprojects(&config, &Arc::new(remotes))
        .await
        .unwrap();

    assert_eq!(report.ok_files.len(), 2);
    assert_eq!(
        report.failures,
        vec![format!(
            "{}: exception during validation: boom",
            bad.display()
        )]
    );
    assert_eq!(report.status(), RunStatus::Failures);
}

#[tokio::test]
async fn test_malformed_and_foreign_files_fail_individually() {
    let (tmp, config) = project();
    let root = tmp.path();
    let sub = root.join("subprojects");
    fs::write(
        sub.join("archive.wrap"),
        "[wrap-file]\nsource_url = https://example.org/a.tar.gz\n",
    )
    .unwrap();
    fs::write(sub.join("broken.wrap"), "[wrap-git\nurl = x\n").unwrap();
    wrap(root, "ok.wrap", Some(LIB_URL), Some("v1.0"));

    let report = validate_subprojects(&config, &Arc::new(FakeRemotes::new()))
        .await
        .unwrap();

    assert_eq!(report.ok_files.len(), 1);
    assert_eq!(report.failures.len(), 2);
    assert!(
        report
            .failures
            .iter()
            .any(|f| f.ends_with("archive.wrap: not a wrap-git file"))
    );
    assert!(
        report
            .failures
            .iter()
            .any(|f| f.contains("broken.wrap: exception during validation:"))
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_dangling_symlink_alone_is_a_failure_not_no_files() {
    let (tmp, config) = project();
    let link = tmp.path().join("subprojects/dangling.wrap");
    std::os::unix::fs::symlink(tmp.path().join("gone.wrap"), &link).unwrap();
    let remotes = Arc::new(FakeRemotes::new());

    let report = validate_subprojects(&config, &remotes).await.unwrap();

    assert_eq!(report.discovered_files, 1);
    assert_eq!(report.status(), RunStatus::Failures);
    assert_eq!(report.status().exit_code(), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(
        report.failures[0]
            .starts_with(&format!("{}: exception during validation:", link.display()))
    );
    assert_eq!(remotes.calls(), 0);
}

#[tokio::test]
async fn test_concurrency_is_bounded_and_urls_are_not_cached() {
    let (tmp, mut config) = project();
    config.jobs = 2;
    for i in 0..6 {
        wrap(tmp.path(), &format!("dep{i}.wrap"), Some(LIB_URL), Some("v1.0"));
    }

    let mut remotes = FakeRemotes::new();
    remotes.delay = Duration::from_millis(20);
    let remotes = Arc::new(remotes);

    let report = validate_subprojects(&config, &remotes)
        .await
        .unwrap();

    assert_eq!(report.status(), RunStatus::AllValid);
    assert_eq!(report.ok_files.len(), 6);
    // Same URL six times: six queries.
    assert_eq!(remotes.calls(), 6);
    let peak = remotes.peak.load(Ordering::SeqCst);
    assert!((1..=2).contains(&peak), "peak concurrency {peak}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_multi_thread_runtime_collects_every_verdict() {
    let (tmp, config) = project();
    for i in 0..20 {
        let rev = if i % 4 == 0 { "main" } else { "v2.0" };
        wrap(tmp.path(), &format!("dep{i:02}.wrap"), Some(LIB_URL), Some(rev));
    }

    let report = validate_subprojects(&config, &Arc::new(FakeRemotes::new()))
        .await
        .unwrap();

    assert_eq!(report.discovered_files, 20);
    assert_eq!(report.verdicts.len(), 20);
    assert_eq!(report.ok_files.len(), 15);
    assert_eq!(report.failures.len(), 5);
    let mut sorted = report.ok_files.clone();
    sorted.sort();
    assert_eq!(report.ok_files, sorted);
}
