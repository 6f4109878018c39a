use crate::stats::{BenchmarkRun, BenchmarkSummary};
use serde::{Deserialize, Serialize};

/// Everything one in-process benchmark produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub model: String,
    pub prompt_tokens: usize,
    pub runs: Vec<BenchmarkRun>,
    pub summary: BenchmarkSummary,
}
