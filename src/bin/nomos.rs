//! CLI entrypoint: runs one of the registered experiments against the
//! scheme.
//!
//! # Example
//!
//! ```bash
//! nomos nomos-simplified
//! nomos --verbose benchmark
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use nomos::experiments::{by_name, EXPERIMENT_NAMES};

/// Run a scripted experiment against the searchable encryption scheme.
#[derive(Parser, Debug)]
#[command(name = "nomos", version, about)]
struct Cli {
    /// Which experiment to run.
    #[arg(default_value = "nomos-simplified")]
    experiment: String,

    /// Raise the log level from info to debug.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    if !EXPERIMENT_NAMES.contains(&cli.experiment.as_str()) {
        error!(
            experiment = %cli.experiment,
            available = ?EXPERIMENT_NAMES,
            "unknown experiment"
        );
        return ExitCode::FAILURE;
    }

    let mut experiment = match by_name(&cli.experiment) {
        Ok(e) => e,
        Err(e) => {
            error!(error = %e, "failed to construct experiment");
            return ExitCode::FAILURE;
        }
    };

    let outcome = experiment.setup().and_then(|()| experiment.run());
    experiment.teardown();

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, experiment = experiment.name(), "experiment failed");
            ExitCode::FAILURE
        }
    }
}
