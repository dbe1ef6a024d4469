// src/checker/mod.rs
// =============================================================================
// All link checking logic.
//
// Submodules:
// - probe: one HEAD request against one URL, with a hard timeout
// - retry: per-link check with skip list and exponential backoff
// - limiter: caps the number of checks in flight
// - batch: runs a whole document and writes the results back
// =============================================================================

mod batch;
mod limiter;
mod probe;
mod retry;

pub use batch::run;
pub use limiter::AdmissionLimiter;
pub use probe::HttpProber;
pub use retry::{CheckOutcome, CheckResult, LinkChecker, RandomJitter, TokioSleeper, SKIP_REASON};
