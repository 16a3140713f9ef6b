//! Treehash CLI Binary
//!
//! Command-line interface for computing deterministic directory tree digests.

use clap::Parser;
use std::process;
use tracing::{error, info};
use treehash::agent::ScanAgent;
use treehash::cli::Cli;
use treehash::config::ConfigLoader;
use treehash::logging::init_logging;
use treehash::scan::scan;

fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    // Initialize logging early
    let logging_config = cli.logging_config(&config.logging);
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("treehash starting");

    let options = cli.scan_options(&config.scan);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            eprintln!("Failed to start async runtime: {}", e);
            process::exit(1);
        }
    };

    if cli.agent {
        let agent = ScanAgent::new(
            options,
            cli.agent_interval(&config.agent),
            cli.agent_delay(&config.agent),
        );
        // Runs until the process is terminated.
        runtime.block_on(agent.run());
        return;
    }

    match runtime.block_on(scan(&options)) {
        Ok(report) => {
            match cli.render_report(&report) {
                Ok(output) => println!("{}", output),
                Err(e) => {
                    eprintln!("{}", e);
                    process::exit(1);
                }
            }
            if report.is_partial() {
                error!(
                    failure_count = report.failures.len(),
                    "scan completed with per-item failures"
                );
                process::exit(2);
            }
        }
        Err(e) => {
            error!("Scan failed: {}", e);
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}
