mod change_log;
mod cli_args;
mod config;
mod error;
mod generator;
mod github;
mod llm;
mod logging;
mod pipeline;
mod setup;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::Parser;
use cli_args::{Cli, Command};
use config::Config;
use pipeline::Artifacts;
use std::process::ExitCode;

fn run(cli: &Cli) -> Result<()> {
    let cfg = Config::from_sources(cli)?;
    let artifacts = Artifacts {
        changes_file: cfg.changes_file.clone(),
        output_file: cfg.output_file.clone(),
    };

    match cli.command {
        Some(Command::Fetch) => {
            let github = cfg.github()?;
            let source = setup::build_compare_source(&github)?;
            let count = pipeline::fetch_changes(
                source.as_ref(),
                &github.compare_request(),
                &artifacts.changes_file,
            )?;
            log::info!("Serialized {count} changed file(s)");
        }
        Some(Command::Describe) => {
            let openai = cfg.openai()?;
            let llm = setup::build_llm_client(&openai)?;
            pipeline::describe_changes(llm.as_ref(), &artifacts)?;
        }
        None => {
            // Both halves must be configured before anything touches the network.
            let github = cfg.github()?;
            let openai = cfg.openai()?;
            let source = setup::build_compare_source(&github)?;
            let llm = setup::build_llm_client(&openai)?;
            let stage = pipeline::run(
                source.as_ref(),
                llm.as_ref(),
                &github.compare_request(),
                &artifacts,
            )?;
            log::info!("Pipeline finished: {stage}");
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    // Values already in the environment win over `.env`.
    let dotenv = dotenvy::from_path(".env");
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    match dotenv {
        Ok(()) => log::debug!("Loaded settings from .env"),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Ignoring unreadable .env: {e}"),
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
