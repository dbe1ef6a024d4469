// src/checker/retry.rs
// =============================================================================
// Turns one unreliable probe into a resilient per-link check.
//
// Flow for one link:
//   skip-listed?  -> report ok / skip_check without touching the network
//   otherwise     -> up to `max_attempts` sequential probes; after a failed
//                    attempt (transport error, timeout, or non-2xx status)
//                    sleep base * 2^i + jitter and try again
//
// Only the last error decides between `timeout` and `error` once attempts
// are exhausted; earlier failures are not remembered.
//
// Sleeping and jitter go through small traits so tests can replace wall
// clock delays and randomness with deterministic stand-ins.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::probe::{ProbeError, Prober};
use crate::config::{RetryPolicy, SkipList};
use crate::links::LinkRecord;

/// Reason recorded for links on the skip list.
pub const SKIP_REASON: &str = "skip_check";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    Ok,
    Timeout,
    Error,
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CheckOutcome::Ok => "ok",
            CheckOutcome::Timeout => "timeout",
            CheckOutcome::Error => "error",
        };
        f.write_str(s)
    }
}

/// The result of checking one link. Lives only for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub url: String,
    pub outcome: CheckOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        self.outcome == CheckOutcome::Ok
    }

    fn skipped(link: &LinkRecord) -> Self {
        Self {
            name: link.name.clone(),
            url: link.url.clone(),
            outcome: CheckOutcome::Ok,
            http_status: None,
            response_time: Some(0),
            reason: Some(SKIP_REASON.to_string()),
        }
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub trait Jitter: Send + Sync {
    /// A duration in `[0, upper)`; zero when `upper` is zero.
    fn sample(&self, upper: Duration) -> Duration;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl Jitter for RandomJitter {
    fn sample(&self, upper: Duration) -> Duration {
        let upper_ms = upper.as_millis() as u64;
        if upper_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..upper_ms))
    }
}

// Checks single links with retries. Shared across all tasks of a batch.
pub struct LinkChecker {
    prober: Box<dyn Prober>,
    sleeper: Box<dyn Sleeper>,
    jitter: Box<dyn Jitter>,
    policy: RetryPolicy,
    skip: SkipList,
}

impl LinkChecker {
    pub fn new(
        prober: Box<dyn Prober>,
        sleeper: Box<dyn Sleeper>,
        jitter: Box<dyn Jitter>,
        policy: RetryPolicy,
        skip: SkipList,
    ) -> Self {
        Self {
            prober,
            sleeper,
            jitter,
            policy,
            skip,
        }
    }

    /// Checks one link. Never fails: every problem ends up in the result.
    pub async fn check(&self, link: &LinkRecord) -> CheckResult {
        if self.skip.contains(&link.name) {
            info!(target: "check_links", name = %link.name, url = %link.url, "skipped");
            return CheckResult::skipped(link);
        }

        let mut last_error: Option<ProbeError> = None;

        for attempt in 0..self.policy.max_attempts {
            let error = match self.prober.probe(&link.url).await {
                Ok(res) => {
                    info!(
                        target: "check_links",
                        name = %link.name,
                        status = res.status,
                        "responded in {}ms", res.time_ms
                    );

                    if res.ok {
                        return CheckResult {
                            name: link.name.clone(),
                            url: link.url.clone(),
                            outcome: CheckOutcome::Ok,
                            http_status: Some(res.status),
                            response_time: Some(res.time_ms),
                            reason: None,
                        };
                    }
                    ProbeError::HttpStatus(res.status)
                }
                Err(e) => e,
            };

            if self.policy.has_attempts_after(attempt) {
                let jitter = self.jitter.sample(self.policy.max_jitter);
                let delay = self.policy.delay_for(attempt, jitter);
                warn!(
                    target: "check_links",
                    name = %link.name,
                    "retry attempt ({}/{}) after {}ms due to: {}",
                    attempt + 1,
                    self.policy.max_attempts,
                    delay.as_millis(),
                    error
                );
                last_error = Some(error);
                self.sleeper.sleep(delay).await;
                continue;
            }
            last_error = Some(error);
        }

        let outcome = match &last_error {
            Some(e) if e.is_timeout() => CheckOutcome::Timeout,
            _ => CheckOutcome::Error,
        };

        CheckResult {
            name: link.name.clone(),
            url: link.url.clone(),
            outcome,
            http_status: None,
            response_time: Some(0),
            reason: last_error.map(|e| e.to_string()),
        }
    }
}
