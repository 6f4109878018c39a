pub mod backend;
pub mod configuration;
pub mod errors;
pub mod prompt;
pub mod reporting;
pub mod runners;
pub mod stats;

// Re-export main components for easier use
pub use backend::{InferenceBackend, MockBackend, PromptTokenizer};
pub use configuration::{ApiSettings, Settings};
pub use errors::{BenchError, BenchResult};
pub use reporting::{BenchmarkResult, ReportFormat};
pub use runners::api_runner::ApiBenchmarkRunner;
pub use runners::prefill_runner::PrefillRunner;
pub use stats::{BenchmarkRun, BenchmarkSummary};
