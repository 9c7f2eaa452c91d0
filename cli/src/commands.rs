//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for collective-brain
#[derive(Parser, Debug)]
#[command(name = "collective-brain")]
#[command(author, version, about = "Multi-agent collective brain with quorum-gated finalization")]
#[command(long_about = r#"
Collective Brain decomposes an objective into sub-goals, runs them on a pool
of role-specialized worker agents, merges the results and finalizes the
synthesis through a Byzantine fault-tolerant vote (N = 3f + 1).

Configuration files are loaded from (in priority order):
1. BRAIN_* environment variables (e.g. BRAIN_MEMORY__WORKING_BUDGET=100)
2. --config <path>     Explicit config file
3. ./brain.toml        Project-level config
4. ~/.config/collective-brain/config.toml   Global config

Example:
  collective-brain orchestrate "Evaluate vector databases for our search service"
  collective-brain consensus "Adopt Qdrant" --voters a,b,c,d --votes approve,approve,approve,reject
  collective-brain status
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run an objective through the full pipeline
    Orchestrate {
        /// The objective to work on
        objective: String,

        /// Finish without a finalization vote
        #[arg(long)]
        no_consensus: bool,

        /// Voters for the finalization vote (default: every worker agent)
        #[arg(long, value_delimiter = ',', value_name = "ID")]
        voters: Vec<String>,

        /// Print the pipeline report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a standalone vote and print the tally
    Consensus {
        /// What is being decided
        description: String,

        /// Voter ids (default: the minimum number of voters for the configured f)
        #[arg(long, value_delimiter = ',', value_name = "ID")]
        voters: Vec<String>,

        /// Ballots in voter order: approve, reject or abstain (default: approve)
        #[arg(long, value_delimiter = ',', value_name = "CHOICE")]
        votes: Vec<String>,

        /// Override the tolerated number of faulty voters
        #[arg(long, value_name = "F")]
        faulty: Option<usize>,

        /// Print the tally report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the configured services and their counters
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show configuration file locations and the effective configuration
    Config,
}
