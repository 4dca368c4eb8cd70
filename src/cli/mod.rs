//! Command-line interface.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use console::style;

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Vigil - dynamic analysis review orchestrator", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to the .vigil/ hierarchy)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Review a previously submitted dynamic analysis
    Review(ReviewArgs),

    /// Print the stored scan record of a build
    Record(RecordArgs),

    /// List stored scan records
    History,
}

#[derive(Args)]
pub struct ReviewArgs {
    /// Current build number in the pipeline
    #[arg(short, long)]
    pub build_number: u64,

    /// Analysis name; read from the review ticket when omitted
    #[arg(long)]
    pub analysis_name: Option<String>,

    /// Occurrence id that predates the submission; read from the ticket
    /// when omitted
    #[arg(long)]
    pub previous_occurrence: Option<String>,

    /// Review ticket written by the submit step
    #[arg(long, default_value = ".vigil/ticket.json")]
    pub ticket: PathBuf,

    /// Wall-clock wait budget in hours
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..=72))]
    pub budget_hours: u32,

    /// Do not fail the review on a policy violation alone
    #[arg(long)]
    pub no_fail_on_violation: bool,
}

#[derive(Args)]
pub struct RecordArgs {
    /// Build number to print
    pub build_number: u64,
}

/// Print an error and exit non-zero.
pub fn handle_error(err: &anyhow::Error, json: bool) -> ! {
    if json {
        let payload = serde_json::json!({ "error": format!("{err:#}") });
        println!("{payload}");
    } else {
        eprintln!("{} {err:#}", style("error:").red().bold());
    }
    std::process::exit(1);
}
