// src/cli.rs
// =============================================================================
// Command-line interface, parsed with clap's derive API.
//
// Every flag has a default matching the constants in config.rs, so running
// the binary with no arguments from the site root checks
// public/data/friends.json with the standard settings.
// =============================================================================

use std::path::PathBuf;

use clap::Parser;

use crate::config;

#[derive(Parser, Debug)]
#[command(
    name = "friend-link-checker",
    version,
    about = "Health-check the friend links of the blog and record their response times",
    long_about = "friend-link-checker probes every active link in the friend-link document, \
                  retries transient failures with exponential backoff, writes the measured \
                  response times back into the document and exits with code 1 if any link \
                  is unhealthy. Intended to run from CI or cron."
)]
pub struct Cli {
    /// Path of the friend-link JSON document (read and rewritten in place)
    #[arg(long, default_value = config::DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Maximum number of links checked at the same time
    #[arg(long, default_value_t = config::CONCURRENCY, value_parser = parse_at_least_one)]
    pub concurrency: usize,

    /// Hard timeout for a single probe, in milliseconds
    #[arg(long, default_value_t = config::CHECK_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Attempts per link, including the first one
    #[arg(long, default_value_t = config::MAX_RETRIES, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_retries: u32,

    /// Base delay of the exponential backoff, in milliseconds
    #[arg(long, default_value_t = config::RETRY_DELAY_MS)]
    pub retry_delay_ms: u64,

    /// Comma-separated display names to report as healthy without probing
    ///
    /// Merged with the built-in skip list and with SKIP_CHECK_NAMES.
    /// Blank entries are ignored.
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// User-Agent header sent with every probe
    #[arg(long, default_value = config::DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Also print every check result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Check and report, but leave the document untouched
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_at_least_one(raw: &str) -> Result<usize, String> {
    let n: usize = raw.parse().map_err(|e| format!("{e}"))?;
    if n == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["friend-link-checker"]).unwrap();
        assert_eq!(cli.data, PathBuf::from("public/data/friends.json"));
        assert_eq!(cli.concurrency, 5);
        assert_eq!(cli.timeout_ms, 15_000);
        assert_eq!(cli.max_retries, 3);
        assert_eq!(cli.retry_delay_ms, 1_000);
        assert!(!cli.json);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_skip_is_comma_separated() {
        let cli = Cli::try_parse_from(["friend-link-checker", "--skip", "Alice, Bob"]).unwrap();
        assert_eq!(cli.skip, vec!["Alice".to_string(), " Bob".to_string()]);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(Cli::try_parse_from(["friend-link-checker", "--concurrency", "0"]).is_err());
    }

    #[test]
    fn test_zero_retries_rejected() {
        assert!(Cli::try_parse_from(["friend-link-checker", "--max-retries", "0"]).is_err());
    }
}
