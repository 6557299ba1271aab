use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use ghcr_prune::{
    actions::WorkflowRunPruner,
    cli::{self, CommonArgs},
    github::PackageClient,
};

/// Prune old logs from GitHub Actions.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Opt {
    #[command(flatten)]
    pub common: CommonArgs,

    /// GitHub repository
    pub repository: String,
}

async fn run(options: Opt) -> anyhow::Result<()> {
    let config = options.common.configuration()?;
    let cutoff = options.common.cutoff(Utc::now())?;

    let client = PackageClient::new(&config)?;
    WorkflowRunPruner::new(&client, options.common.dry_run)
        .run(
            &mut std::io::stdout().lock(),
            options.common.user.as_deref(),
            &options.repository,
            cutoff,
        )
        .await?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    cli::init_logging();

    let options = Opt::parse();
    let prog = cli::program_name();

    cli::interruptible(async {
        match run(options).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                cli::report_error(&prog, &*err);
                ExitCode::FAILURE
            }
        }
    })
    .await
}
