use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use ghcr_prune::{
    cli::{self, CommonArgs},
    github::PackageClient,
    prune::PruneOrchestrator,
    registry::RegistryClient,
};

/// Prune old untagged versions of GHCR containers.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Opt {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Images to prune, or `all`
    #[arg(required = true, value_name = "CONTAINER")]
    pub container: Vec<String>,
}

async fn run(options: Opt, prog: &str) -> anyhow::Result<bool> {
    let config = options.common.configuration()?;
    let cutoff = options.common.cutoff(Utc::now())?;

    let packages = PackageClient::new(&config)?;
    let registry = RegistryClient::new(&config)?;
    let orchestrator = PruneOrchestrator::new(&packages, &registry, options.common.dry_run);

    let summary = orchestrator
        .run(
            &mut std::io::stdout().lock(),
            options.common.user.as_deref(),
            &options.container,
            cutoff,
            |package, err| cli::report_package_error(prog, package, err),
        )
        .await?;

    Ok(summary.is_success())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    cli::init_logging();

    let options = Opt::parse();
    let prog = cli::program_name();

    cli::interruptible(async {
        match run(options, &prog).await {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(err) => {
                cli::report_error(&prog, &*err);
                ExitCode::FAILURE
            }
        }
    })
    .await
}
