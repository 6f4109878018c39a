use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tokens per second for `tokens` processed in `elapsed_seconds`.
///
/// Returns 0 when no measurable time elapsed, so the result is always finite and
/// non-negative.
pub fn throughput(tokens: usize, elapsed_seconds: f64) -> f64 {
    if elapsed_seconds > 0.0 {
        tokens as f64 / elapsed_seconds
    } else {
        0.0
    }
}

/// One timed trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRun {
    pub prompt_tokens: usize,
    pub elapsed_seconds: f64,
    pub tokens_per_second: f64,
}

impl BenchmarkRun {
    pub fn new(prompt_tokens: usize, elapsed_seconds: f64) -> Self {
        let elapsed_seconds = elapsed_seconds.max(0.0);
        Self {
            prompt_tokens,
            elapsed_seconds,
            tokens_per_second: throughput(prompt_tokens, elapsed_seconds),
        }
    }

    pub fn from_duration(prompt_tokens: usize, elapsed: Duration) -> Self {
        Self::new(prompt_tokens, elapsed.as_secs_f64())
    }
}

/// Aggregate over a sequence of runs.
///
/// `variance` is the spread between the slowest and fastest run (`max_time - min_time`),
/// not a statistical variance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub avg_time: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub variance: f64,
    pub avg_speed: f64,
}

impl BenchmarkSummary {
    /// Summarize `runs`, or `None` when there is nothing to summarize
    pub fn from_runs(runs: &[BenchmarkRun]) -> Option<Self> {
        if runs.is_empty() {
            return None;
        }

        let count = runs.len() as f64;
        let times = runs.iter().map(|r| r.elapsed_seconds);

        let avg_time = times.clone().sum::<f64>() / count;
        let min_time = times.clone().fold(f64::INFINITY, f64::min);
        let max_time = times.fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            avg_time,
            min_time,
            max_time,
            variance: max_time - min_time,
            avg_speed: average_speed(runs),
        })
    }
}

/// Mean of the per-run throughputs, 0 for an empty slice
pub fn average_speed(runs: &[BenchmarkRun]) -> f64 {
    if runs.is_empty() {
        return 0.0;
    }
    runs.iter().map(|r| r.tokens_per_second).sum::<f64>() / runs.len() as f64
}
