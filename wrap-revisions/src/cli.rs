use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use wrap_revisions::output::{write_human, write_json};
use wrap_revisions::{
    DEFAULT_JOBS, DEFAULT_PATTERN, DEFAULT_QUERY_TIMEOUT, DEFAULT_SUBPROJECTS_DIR,
    DEFAULT_TAG_PREVIEW, GitLsRemote, RemoteConfig, RunStatus, ValidatorConfig,
    validate_subprojects,
};

/// Check that every wrap-git subproject pins a commit hash or an existing tag.
#[derive(Parser, Debug)]
#[command(name = "validate-wrap-revisions", version, about)]
struct Cli {
    /// Project root containing the subprojects directory
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Directory of declaration files, relative to the root
    #[arg(long, default_value = DEFAULT_SUBPROJECTS_DIR)]
    subprojects_dir: PathBuf,

    /// File name glob for declaration files
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pattern: String,

    /// Number of declarations validated concurrently
    #[arg(short, long, default_value_t = DEFAULT_JOBS)]
    jobs: usize,

    /// Timeout in seconds for each remote tag query (at least 1)
    #[arg(
        long,
        default_value_t = DEFAULT_QUERY_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,

    /// Number of available tags shown when a revision is not found
    #[arg(long, default_value_t = DEFAULT_TAG_PREVIEW)]
    tag_preview: usize,

    /// Path to the git executable
    #[arg(long, default_value = "git")]
    git: PathBuf,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Human)]
    format: Format,

    /// Verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Human,
    Json,
}

impl Cli {
    fn validator_config(&self) -> ValidatorConfig {
        let mut config = ValidatorConfig::for_root(&self.root);
        config.subprojects_dir.clone_from(&self.subprojects_dir);
        config.pattern.clone_from(&self.pattern);
        config.jobs = self.jobs;
        config.tag_preview = self.tag_preview;
        config
    }

    fn remote_config(&self) -> RemoteConfig {
        let mut config = RemoteConfig::default();
        config.program.clone_from(&self.git);
        config.timeout = Duration::from_secs(self.timeout);
        config
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub async fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.validator_config();
    let lister = Arc::new(GitLsRemote::new(&cli.remote_config()));
    let report = validate_subprojects(&config, &lister).await?;

    let status = report.status();
    if status == RunStatus::NoFiles {
        eprintln!(
            "No .wrap files found (looked for {})",
            config.discovery_glob().display()
        );
        return Ok(ExitCode::from(status.exit_code()));
    }

    let mut stdout = std::io::stdout().lock();
    match cli.format {
        Format::Human => write_human(&report, &mut stdout)?,
        Format::Json => write_json(&report, &mut stdout)?,
    }

    Ok(ExitCode::from(status.exit_code()))
}
