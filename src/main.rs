//! depcost - estimates the binary-size cost of adding a dependency.
//!
//! Clones a minimal reference application, builds a release archive twice
//! (without and with the requested dependency) and reports the size
//! difference between the two artifacts.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use depcost::cancel;
use depcost::commands::{cmd_measure, MeasureOpts};
use depcost::config::Config;
use depcost::preflight;
use depcost::request::{LinkingMode, MeasurementRequest};

#[derive(Parser)]
#[command(name = "depcost", version)]
#[command(about = "Estimate the binary-size cost of adding a dependency")]
#[command(
    after_help = "EXAMPLES:\n  depcost --package serde --package-version 1.0.219\n  depcost --package https://github.com/dtolnay/anyhow --package-version 1.0.98 --linking dynamic --json"
)]
struct Cli {
    /// Git URL or crates.io name of the dependency to measure
    #[arg(short, long, visible_alias = "for")]
    package: String,

    /// Version (registry) or tag (git) to pin the dependency to
    #[arg(long)]
    package_version: String,

    /// Library product to declare (defaults to a name derived from --package)
    #[arg(long)]
    product: Option<String>,

    /// How the dependency is linked into the reference app
    #[arg(long, value_enum, default_value = "static")]
    linking: LinkingMode,

    /// Abort either build after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Emit the result as JSON instead of a console summary
    #[arg(long)]
    json: bool,

    /// Print the underlying tool invocations
    #[arg(long)]
    verbose: bool,

    /// Skip host tool checks
    #[arg(long)]
    skip_preflight: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();
    let config = Config::load();

    if !cli.skip_preflight {
        if let Err(e) = preflight::ensure_host_tools() {
            eprintln!("Error: {e:#}");
            return ExitCode::from(2);
        }
    }

    let request = MeasurementRequest::new(
        &cli.package,
        &cli.package_version,
        cli.product,
        cli.linking,
        cli.verbose,
    );

    let (handle, token) = cancel::cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupt received, stopping the build and cleaning up...");
            handle.cancel();
        }
    });

    let opts = MeasureOpts {
        timeout: cli.timeout.map(Duration::from_secs),
        json: cli.json,
    };

    match cmd_measure(&request, &config, token, opts).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}
