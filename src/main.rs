// src/main.rs
// =============================================================================
// Entry point of the friend link checker.
//
// What happens here:
// 1. Set up logging and parse command-line arguments
// 2. Build the checker (HTTP prober, retry policy, skip list) once
// 3. Run the batch over the friend-link document
// 4. Report and exit (0 = all healthy, 1 = unhealthy links, 2 = error)
// =============================================================================

mod checker;
mod cli;
mod config;
mod links;
mod logging;
mod report;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use checker::{AdmissionLimiter, HttpProber, LinkChecker, RandomJitter, TokioSleeper};
use cli::Cli;
use config::CheckerConfig;

#[tokio::main]
async fn main() {
    if !logging::init() {
        eprintln!("warning: a tracing subscriber was already installed");
    }

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            error!(target: "check_links", "{e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let env_skip = std::env::var(config::SKIP_NAMES_ENV).ok();
    let config = CheckerConfig::from_cli(&cli, env_skip.as_deref());

    if !config.skip.is_empty() {
        info!(target: "check_links", "{} link name(s) on the skip list", config.skip.len());
    }

    let prober = HttpProber::new(config.timeout, &config.user_agent)
        .context("failed to build HTTP client")?;
    let link_checker = Arc::new(LinkChecker::new(
        Box::new(prober),
        Box::new(TokioSleeper),
        Box::new(RandomJitter),
        config.retry,
        config.skip.clone(),
    ));
    let limiter = AdmissionLimiter::new(config.concurrency);

    let summary = checker::run(&config.data_path, link_checker, &limiter, config.dry_run).await?;

    if cli.json {
        report::print_json(&summary)?;
    }
    report::log_summary(&summary);

    Ok(summary.exit_code())
}
