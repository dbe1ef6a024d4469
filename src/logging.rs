// src/logging.rs
// =============================================================================
// tracing subscriber setup.
//
// Logs go to stderr so that `--json` output on stdout stays parseable.
// The level defaults to `info` and can be changed with RUST_LOG, e.g.
//   RUST_LOG=check_links=debug friend-link-checker
// =============================================================================

use tracing_subscriber::EnvFilter;

// Returns false when a global subscriber was already installed, in which
// case the existing one keeps receiving events.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
