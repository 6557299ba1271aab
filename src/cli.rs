//! Plumbing shared by the command line tools.

use std::{future::Future, path::PathBuf, process::ExitCode};

use chrono::{DateTime, Utc};
use clap::Args;
use tracing_subscriber::EnvFilter;

use crate::{
    config::Configuration,
    error::{Result, format_error},
    retention::Cutoff,
};

/// Exit status after Ctrl+C, as a shell reports SIGINT.
pub const EXIT_INTERRUPTED: u8 = 128 + 2;

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Do not actually delete anything, just list it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Delete entries older than DAYS days
    #[arg(long, value_name = "DAYS", value_parser = parse_prune_age)]
    pub prune_age: f64,

    /// Owner is another user/organization
    #[arg(short, long, value_name = "USER")]
    pub user: Option<String>,

    /// Extra configuration file, may be repeated
    #[arg(short, long, value_name = "FILE")]
    pub config: Vec<PathBuf>,
}

impl CommonArgs {
    pub fn configuration(&self) -> Result<Configuration> {
        Configuration::config(Configuration::figment(self.config.clone()))
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> Result<Cutoff> {
        Cutoff::from_age(now, self.prune_age)
    }
}

fn parse_prune_age(value: &str) -> Result<f64, String> {
    let days: f64 = value
        .parse()
        .map_err(|_| format!("invalid float value: '{value}'"))?;

    if !days.is_finite() || days < 0.0 {
        return Err(format!("must be a non-negative number of days: '{value}'"));
    }

    Ok(days)
}

pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}

pub fn program_name() -> String {
    std::env::args()
        .next()
        .as_deref()
        .map(std::path::Path::new)
        .and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

/// Prints `err` as a single `prog: message` line.
pub fn report_error(prog: &str, err: &(dyn std::error::Error + 'static)) {
    eprintln!("{prog}: {}", format_error(err));
}

/// Like [`report_error`], naming the package that failed.
pub fn report_package_error(prog: &str, package: &str, err: &(dyn std::error::Error + 'static)) {
    eprintln!("{prog}: {package}: {}", format_error(err));
}

/// Runs `task` until it finishes or Ctrl+C arrives.
pub async fn interruptible<F>(task: F) -> ExitCode
where
    F: Future<Output = ExitCode>,
{
    tokio::select! {
        code = task => code,
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                tracing::warn!("Unable to listen for shutdown signal: {err}");
            }
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser, Debug)]
    struct Opt {
        #[command(flatten)]
        common: CommonArgs,
        names: Vec<String>,
    }

    #[test]
    fn parses_flags() {
        let opt = Opt::try_parse_from([
            "prog", "-n", "--prune-age", "1.5", "-u", "acme", "app", "tools",
        ])
        .unwrap();

        assert!(opt.common.dry_run);
        assert_eq!(opt.common.prune_age, 1.5);
        assert_eq!(opt.common.user.as_deref(), Some("acme"));
        assert_eq!(opt.names, vec!["app", "tools"]);
    }

    #[test]
    fn prune_age_is_required() {
        assert!(Opt::try_parse_from(["prog", "app"]).is_err());
    }

    #[test]
    fn prune_age_must_be_sane() {
        assert!(Opt::try_parse_from(["prog", "--prune-age", "-1", "app"]).is_err());
        assert!(Opt::try_parse_from(["prog", "--prune-age", "NaN", "app"]).is_err());
        assert!(Opt::try_parse_from(["prog", "--prune-age", "week", "app"]).is_err());
    }
}
