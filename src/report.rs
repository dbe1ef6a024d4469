// src/report.rs
// =============================================================================
// End-of-run reporting: healthy vs unhealthy, log lines and exit code.
//
// Exit codes:
//   0 = every checked link is healthy (skipped links count as healthy)
//   1 = at least one link ended in `timeout` or `error`
// (2, for unexpected errors, is decided in main.rs)
// =============================================================================

use anyhow::Result;
use tracing::{error, info};

use crate::checker::CheckResult;

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    checked: usize,
    results: Vec<CheckResult>,
}

impl RunSummary {
    pub fn new(checked: usize, results: Vec<CheckResult>) -> Self {
        Self { checked, results }
    }

    /// Number of checks that ran, including ones that produced no result.
    pub fn checked(&self) -> usize {
        self.checked
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn healthy(&self) -> Vec<&CheckResult> {
        self.results.iter().filter(|r| r.is_ok()).collect()
    }

    pub fn unhealthy(&self) -> Vec<&CheckResult> {
        self.results.iter().filter(|r| !r.is_ok()).collect()
    }

    pub fn exit_code(&self) -> i32 {
        if self.results.iter().any(|r| !r.is_ok()) {
            1
        } else {
            0
        }
    }
}

// Logs the outcome of the run: one line per failed link, or a one-line
// summary when everything is healthy.
pub fn log_summary(summary: &RunSummary) {
    let failed = summary.unhealthy();

    if !failed.is_empty() {
        error!(
            target: "check_links",
            "Friend link check failed ({} unhealthy of {} checked):",
            failed.len(),
            summary.checked()
        );
        for f in failed {
            error!(
                target: "check_links",
                "- {} ({}) => {}{}",
                f.name,
                f.url,
                f.outcome,
                f.reason.as_deref().map(|r| format!(" | {r}")).unwrap_or_default()
            );
        }
        return;
    }

    info!(
        target: "check_links",
        healthy = summary.healthy().len(),
        "All links are healthy and responseTime updated ({} links checked)",
        summary.checked()
    );
}

// Prints every result as a pretty JSON array on stdout (for --json).
pub fn print_json(summary: &RunSummary) -> Result<()> {
    let json_output = serde_json::to_string_pretty(summary.results())?;
    println!("{}", json_output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{CheckOutcome, SKIP_REASON};

    fn result(name: &str, outcome: CheckOutcome, reason: Option<&str>) -> CheckResult {
        CheckResult {
            name: name.to_string(),
            url: format!("https://{}.example", name.to_lowercase()),
            outcome,
            http_status: None,
            response_time: Some(0),
            reason: reason.map(str::to_string),
        }
    }

    #[test]
    fn test_all_healthy_exits_zero() {
        let summary = RunSummary::new(
            2,
            vec![
                result("Alice", CheckOutcome::Ok, None),
                result("Bob", CheckOutcome::Ok, Some(SKIP_REASON)),
            ],
        );
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.healthy().len(), 2);
        assert!(summary.unhealthy().is_empty());
    }

    #[test]
    fn test_any_failure_exits_one() {
        for bad in [CheckOutcome::Timeout, CheckOutcome::Error] {
            let summary = RunSummary::new(
                2,
                vec![
                    result("Alice", CheckOutcome::Ok, None),
                    result("Bob", bad, Some("HTTP 500")),
                ],
            );
            assert_eq!(summary.exit_code(), 1);
            assert_eq!(summary.unhealthy().len(), 1);
        }
    }

    #[test]
    fn test_empty_run_exits_zero() {
        assert_eq!(RunSummary::new(0, Vec::new()).exit_code(), 0);
    }
}
