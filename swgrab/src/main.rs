//! swgrab binary.
//!
//! Parses the startup parameters, runs one collection against the switch and
//! exits with a code naming the phase that failed.

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use swgrab::cli::Cli;
use swgrab::exit::{codes, exit_code};
use swgrab::{CliConnector, JsonLinesFile, LogReporter, Orchestrator, ParamsBuilder};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let params = match ParamsBuilder::defaults().overlay(cli.overrides()).build() {
        Ok(params) => params,
        Err(e) => {
            let err = swgrab::Error::from(e);
            error!("{}", err);
            error!("The program ends its work");
            return ExitCode::from(exit_code(&err));
        }
    };

    let mut orchestrator = Orchestrator::new(
        params,
        CliConnector,
        LogReporter,
        JsonLinesFile::new(&cli.output),
    );

    match orchestrator.run().await {
        Ok(_) => {
            info!("Record appended to {}", cli.output.display());
            info!("The program worked successfully!");
            ExitCode::from(codes::SUCCESS)
        }
        Err(e) => {
            let phase = orchestrator
                .failed_phase()
                .map(|phase| phase.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            error!("Failed while {}: {}", phase, e);
            error!("The program ends its work");
            ExitCode::from(exit_code(&e))
        }
    }
}
