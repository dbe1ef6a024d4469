// src/checker/batch.rs
// =============================================================================
// Runs the checks of a whole document and folds the results back in.
//
// Steps:
// 1. Load the document
// 2. Schedule every `active` link, in document order, through the admission
//    limiter; each check runs as its own task
// 3. Wait for every task, whatever its outcome (no fail-fast)
// 4. Write the updated response times back to the same file
// 5. Hand the results to the report
//
// A task that dies (panic, cancellation) is logged and simply contributes no
// result: its link keeps its previous responseTime.
// =============================================================================

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, error, info};

use super::limiter::AdmissionLimiter;
use super::retry::{CheckResult, LinkChecker};
use crate::links::{self, LinkRecord};
use crate::report::RunSummary;

#[derive(Debug, Default)]
pub struct BatchResults {
    /// Number of checks that were scheduled (one per active link).
    pub scheduled: usize,
    /// Completed results keyed by URL.
    pub by_url: HashMap<String, CheckResult>,
}

// Checks every active link with bounded concurrency.
pub async fn check_all(
    checker: Arc<LinkChecker>,
    limiter: &AdmissionLimiter,
    links: &[LinkRecord],
) -> Result<BatchResults> {
    let mut tasks = FuturesUnordered::new();
    let mut scheduled = 0;

    for link in links.iter().filter(|l| l.is_active()) {
        // Acquiring here, before spawning, keeps admission in document order.
        let permit = limiter
            .acquire()
            .await
            .context("admission limiter was closed")?;

        let checker = checker.clone();
        let link = link.clone();
        tasks.push(tokio::spawn(async move {
            let _permit = permit;
            checker.check(&link).await
        }));
        scheduled += 1;
    }

    debug!(target: "check_links", scheduled, "all checks scheduled");

    let mut by_url = HashMap::with_capacity(scheduled);
    while let Some(joined) = tasks.next().await {
        match joined {
            Ok(result) => {
                by_url.insert(result.url.clone(), result);
            }
            Err(e) => {
                error!(target: "check_links", "Unexpected error ({e})");
            }
        }
    }

    Ok(BatchResults { scheduled, by_url })
}

/// Full run over the document at `path`: check, persist, summarize.
///
/// The document is written back even when some links failed; only read and
/// write failures make this return an error.
pub async fn run(
    path: &Path,
    checker: Arc<LinkChecker>,
    limiter: &AdmissionLimiter,
    dry_run: bool,
) -> Result<RunSummary> {
    let mut doc = links::load(path)?;
    let records = doc.links();
    let active = records.iter().filter(|l| l.is_active()).count();
    info!(
        target: "check_links",
        total = records.len(),
        active,
        concurrency = limiter.capacity(),
        "Start checking friend links..."
    );

    let batch = check_all(checker, limiter, &records).await?;
    let updated = links::apply_results(&mut doc, &batch.by_url);

    if dry_run {
        info!(target: "check_links", updated, "dry run, leaving {} untouched", path.display());
    } else {
        links::save(path, &doc)?;
        debug!(target: "check_links", updated, "wrote {}", path.display());
    }

    // One result per distinct URL, in document order.
    let mut by_url = batch.by_url;
    let results = records
        .iter()
        .filter_map(|link| by_url.remove(&link.url))
        .collect();

    Ok(RunSummary::new(batch.scheduled, results))
}
