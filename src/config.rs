// src/config.rs
// =============================================================================
// Runtime configuration for a check run.
//
// Everything here is computed once in main() from the parsed CLI and then
// handed down by value/reference. Nothing in the checker reads globals or
// environment variables on its own, which keeps the tests free to build
// whatever configuration they need.
// =============================================================================

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;

/// Hard timeout for a single probe.
pub const CHECK_TIMEOUT_MS: u64 = 15_000;
/// Number of link checks allowed in flight at once.
pub const CONCURRENCY: usize = 5;
/// Attempts per link, including the first one.
pub const MAX_RETRIES: u32 = 3;
/// Base delay of the exponential backoff.
pub const RETRY_DELAY_MS: u64 = 1_000;
/// Upper bound (exclusive) of the random jitter added to each backoff delay.
pub const MAX_JITTER_MS: u64 = 100;

pub const DEFAULT_DATA_PATH: &str = "public/data/friends.json";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 FriendLinkChecker/1.0";

/// Environment variable holding extra comma-separated names to skip.
pub const SKIP_NAMES_ENV: &str = "SKIP_CHECK_NAMES";

// Names that are never probed, regardless of SKIP_CHECK_NAMES.
// Blank entries are filtered out when the SkipList is built.
pub const STATIC_SKIP_NAMES: &[&str] = &[""];

// How a single link is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl RetryPolicy {
    /// Delay before the retry that follows attempt `attempt` (0-indexed):
    /// `base_delay * 2^attempt + jitter`.
    pub fn delay_for(&self, attempt: u32, jitter: Duration) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).saturating_add(jitter)
    }

    pub fn has_attempts_after(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            base_delay: Duration::from_millis(RETRY_DELAY_MS),
            max_jitter: Duration::from_millis(MAX_JITTER_MS),
        }
    }
}

// Everything the checker needs to know, resolved from the CLI.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub data_path: PathBuf,
    pub timeout: Duration,
    pub concurrency: usize,
    pub retry: RetryPolicy,
    pub user_agent: String,
    pub skip: SkipList,
    pub dry_run: bool,
}

impl CheckerConfig {
    // `env_skip` is the raw value of SKIP_CHECK_NAMES, read once by the
    // caller. Its names are added to the ones given with --skip.
    pub fn from_cli(cli: &Cli, env_skip: Option<&str>) -> Self {
        let mut skip_names: Vec<&str> = cli.skip.iter().map(String::as_str).collect();
        if let Some(raw) = env_skip {
            skip_names.extend(raw.split(','));
        }

        Self {
            data_path: cli.data.clone(),
            timeout: Duration::from_millis(cli.timeout_ms),
            concurrency: cli.concurrency,
            retry: RetryPolicy {
                max_attempts: cli.max_retries,
                base_delay: Duration::from_millis(cli.retry_delay_ms),
                max_jitter: Duration::from_millis(MAX_JITTER_MS),
            },
            user_agent: cli.user_agent.clone(),
            skip: SkipList::new(STATIC_SKIP_NAMES.iter().copied(), &skip_names),
            dry_run: cli.dry_run,
        }
    }
}

/// Display names of links that are reported healthy without being probed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipList {
    names: HashSet<String>,
}

impl SkipList {
    // Merges the static list with the user-supplied one.
    // Entries are trimmed and blanks are dropped; the set removes duplicates.
    pub fn new<'a, S>(static_names: impl IntoIterator<Item = &'a str>, extra: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        let extra = extra.iter().map(|s| s.as_ref().trim().to_string());
        let names = static_names
            .into_iter()
            .map(|s| s.trim().to_string())
            .chain(extra)
            .filter(|s| !s.is_empty())
            .collect();

        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
