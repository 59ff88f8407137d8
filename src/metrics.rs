//! Observability metrics for the HTTP surface: request counts and ranking latency.

use std::collections::VecDeque;
use std::time::Duration;

/// Latency samples kept for averages and percentiles. Older samples are
/// dropped once the window is full; the counters keep growing.
pub const LATENCY_WINDOW: usize = 10_000;

/// Collects runtime metrics for the demo server.
#[derive(Debug)]
pub struct MetricsCollector {
    ranking_latencies_us: VecDeque<f64>,
    total_rankings: u64,
    total_similarity_tests: u64,
    total_prompts: u64,
    total_fallbacks: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            ranking_latencies_us: VecDeque::with_capacity(LATENCY_WINDOW),
            total_rankings: 0,
            total_similarity_tests: 0,
            total_prompts: 0,
            total_fallbacks: 0,
        }
    }

    /// Record a ranking (search or method comparison) with its duration.
    pub fn record_ranking(&mut self, duration: Duration) {
        self.total_rankings += 1;
        if self.ranking_latencies_us.len() == LATENCY_WINDOW {
            self.ranking_latencies_us.pop_front();
        }
        self.ranking_latencies_us.push_back(duration.as_micros() as f64);
    }

    /// Record a pairwise similarity test.
    pub fn record_similarity_test(&mut self) {
        self.total_similarity_tests += 1;
    }

    /// Record a generated prompt; `fallback` marks the minimal fallback template.
    pub fn record_prompt(&mut self, fallback: bool) {
        self.total_prompts += 1;
        if fallback {
            self.total_fallbacks += 1;
        }
    }

    pub fn total_rankings(&self) -> u64 {
        self.total_rankings
    }

    pub fn total_similarity_tests(&self) -> u64 {
        self.total_similarity_tests
    }

    pub fn total_prompts(&self) -> u64 {
        self.total_prompts
    }

    pub fn total_fallbacks(&self) -> u64 {
        self.total_fallbacks
    }

    /// Number of latency samples currently held, at most [`LATENCY_WINDOW`].
    pub fn ranking_latency_samples(&self) -> usize {
        self.ranking_latencies_us.len()
    }

    /// Average ranking latency over the sample window, in microseconds.
    pub fn avg_ranking_latency_us(&self) -> f64 {
        if self.ranking_latencies_us.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.ranking_latencies_us.iter().sum();
        sum / self.ranking_latencies_us.len() as f64
    }

    /// Get a percentile of ranking latency (e.g., 50.0, 95.0, 99.0).
    pub fn percentile_ranking_latency_us(&self, percentile: f64) -> f64 {
        if self.ranking_latencies_us.is_empty() {
            return 0.0;
        }

        let mut sorted: Vec<f64> = self.ranking_latencies_us.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let index = ((percentile / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[index.min(sorted.len() - 1)]
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
