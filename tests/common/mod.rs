//! Common test utilities

use cerberus_scan::function::probe::{FailureKind, ProbeOutcome, ProbeRequest, Prober};
use cerberus_scan::function::{ScanOptions, ScanStrategy};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn options(concurrency: usize, strategy: ScanStrategy) -> ScanOptions {
    ScanOptions {
        concurrency,
        timeout: Duration::from_secs(1),
        user_agent: "Cerberus-Test/0.1.0".to_string(),
        strategy,
    }
}

/// Paths whose name prefix decides the scripted outcome.
pub fn scripted_paths(count: usize) -> Vec<String> {
    const KINDS: &[&str] = &["ok", "missing", "denied", "down", "boom", "moved", "auth"];
    (0..count)
        .map(|i| format!("/{}-{}", KINDS[i % KINDS.len()], i))
        .collect()
}

/// Number of findings `scripted_paths(count)` must produce.
pub fn expected_findings(paths: &[String]) -> usize {
    paths
        .iter()
        .filter(|p| !p.starts_with("/missing") && !p.starts_with("/moved"))
        .count()
}

/// Prober that answers from the path name and records concurrency.
#[derive(Default)]
pub struct InstrumentedProber {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: AtomicUsize,
    launches: Mutex<Vec<usize>>,
}

impl InstrumentedProber {
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn total_launched(&self) -> usize {
        self.launches.lock().unwrap().len()
    }

    /// Groups launches by how many probes had completed when they started.
    /// Under batched scheduling each group is one batch.
    pub fn batch_sizes(&self) -> Vec<usize> {
        let mut groups: BTreeMap<usize, usize> = BTreeMap::new();
        for completed in self.launches.lock().unwrap().iter() {
            *groups.entry(*completed).or_default() += 1;
        }
        groups.into_values().collect()
    }
}

#[async_trait]
impl Prober for InstrumentedProber {
    async fn probe(&self, request: &ProbeRequest) -> ProbeOutcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.launches
            .lock()
            .unwrap()
            .push(self.completed.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(10)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);

        let url = request.full_url().unwrap().to_string();
        let kind = request.path.trim_start_matches('/').split('-').next().unwrap_or_default();
        match kind {
            "ok" => ProbeOutcome::from_response(url, 200, "text/html", "<title>Index of /ok</title>".into()),
            "missing" => ProbeOutcome::from_response(url, 404, "text/html", String::new()),
            "denied" => ProbeOutcome::from_response(url, 403, "text/html", String::new()),
            "boom" => ProbeOutcome::from_response(url, 502, "application/json", String::new()),
            "moved" => ProbeOutcome::from_response(url, 301, "", String::new()),
            "auth" => ProbeOutcome::from_response(url, 401, "", String::new()),
            _ => ProbeOutcome::Failure { url, reason: FailureKind::Timeout },
        }
    }
}
