//! CLI entrypoint for collective-brain
//!
//! Loads configuration, wires all layers together and dispatches the
//! subcommand.

mod commands;
mod output;
mod progress;
mod wiring;

use anyhow::{Context, Result, bail};
use brain_application::{ConsensusEngine, ProcessObjectiveInput};
use brain_domain::{DecisionId, VoteChoice, VoterId, min_required_voters};
use brain_infrastructure::{ConfigLoader, FileConfig};
use clap::Parser;
use std::process::ExitCode;
use commands::{Cli, Command};
use output::ConsoleFormatter;
use progress::SimpleProgress;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};
use wiring::Brain;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };

    let _guard = init_tracing(cli.verbose, &file_config);
    info!("Starting collective-brain");

    match cli.command {
        Command::Orchestrate {
            objective,
            no_consensus,
            voters,
            json,
        } => {
            let brain = Brain::build(&file_config)?;
            let mut input = ProcessObjectiveInput::new(objective);
            if no_consensus {
                input = input.with_consensus(false);
            }
            if !voters.is_empty() {
                input = input.with_voters(voters.into_iter().map(VoterId::from).collect());
            }

            let report = if cli.quiet || json {
                brain.pipeline.execute(input).await?
            } else {
                brain
                    .pipeline
                    .execute_with_progress(input, &SimpleProgress)
                    .await?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", ConsoleFormatter::format_report(&report));
            }
            if !report.status.is_success() {
                return Ok(ExitCode::from(2));
            }
        }
        Command::Consensus {
            description,
            voters,
            votes,
            faulty,
            json,
        } => {
            let mut settings = file_config.to_brain_config()?.consensus;
            if let Some(f) = faulty {
                settings.max_faulty_voters = f;
            }
            let voters: Vec<VoterId> = if voters.is_empty() {
                (1..=min_required_voters(settings.max_faulty_voters))
                    .map(|i| VoterId::new(format!("voter-{}", i)))
                    .collect()
            } else {
                voters.into_iter().map(VoterId::from).collect()
            };
            if votes.len() > voters.len() {
                bail!("{} votes given for {} voters", votes.len(), voters.len());
            }

            let engine = ConsensusEngine::new(&settings);
            let decision_id = DecisionId::generate();
            engine.initiate_vote(decision_id.clone(), description, voters.clone())?;
            for (i, voter) in voters.into_iter().enumerate() {
                let choice = match votes.get(i) {
                    Some(raw) => raw.parse::<VoteChoice>().map_err(anyhow::Error::msg)?,
                    None => VoteChoice::Approve,
                };
                engine.cast_vote(&decision_id, voter, choice, "cast from the command line")?;
            }
            let tally = engine.tally_votes(&decision_id)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&tally)?);
            } else {
                print!("{}", ConsoleFormatter::format_tally(&tally));
            }
            if !tally.is_reached() {
                return Ok(ExitCode::from(2));
            }
        }
        Command::Status { json } => {
            let brain = Brain::build(&file_config)?;
            let status = brain.pipeline.status();
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print!(
                    "{}",
                    ConsoleFormatter::format_status(&status, &brain.config, &brain.provider_name)
                );
            }
        }
        Command::Config => {
            if cli.no_config {
                println!("Configuration files disabled (--no-config)");
            } else {
                ConfigLoader::print_config_sources(cli.config.as_ref());
            }
            file_config.validate()?;
            println!();
            print!("{}", toml::to_string_pretty(&file_config)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Console logging on stderr plus an optional daily-rolling file log.
///
/// `RUST_LOG` wins over `-v`. The returned guard flushes the file writer on drop.
fn init_tracing(verbose: u8, config: &FileConfig) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter());

    let (file_layer, guard) = match &config.logging.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "collective-brain.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();
    guard
}
