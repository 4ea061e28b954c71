//! Command-line interface for the healthroute trip planner.
#![forbid(unsafe_code)]

use std::io;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod error;
mod fs;
mod plan;

pub use error::CliError;
use plan::PlanArgs;

const ARG_PLAN_REQUEST: &str = "request";
const ARG_ROUTING_BASE_URL: &str = "routing-base-url";
const ARG_MOBILITY_BASE_URL: &str = "mobility-base-url";
const ARG_PLANNER_CONFIG: &str = "planner-config";
const ARG_HTTP_TIMEOUT_MS: &str = "http-timeout-ms";
const ARG_REQUEST_ID: &str = "request-id";
const ENV_PLAN_REQUEST: &str = "HEALTHROUTE_CMDS_PLAN_REQUEST_PATH";

/// Run the healthroute CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] when arguments, configuration or inputs are
/// invalid, or when planning fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.verbose);
    match cli.command {
        Command::Plan(args) => plan::run_plan(args),
    }
}

/// Install the stderr subscriber; `RUST_LOG` overrides the default level.
///
/// `log` records from the library crates are captured as well.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
    {
        log::debug!("keeping the installed logger: {err}");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "healthroute",
    about = "Plan trips that fold walking and cycling into the journey",
    version
)]
struct Cli {
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan an activity-enriched trip from a JSON request.
    Plan(PlanArgs),
}

#[cfg(test)]
mod tests;
