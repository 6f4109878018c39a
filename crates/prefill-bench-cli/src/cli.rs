use clap::{Parser, ValueEnum};
use prefill_bench::prompt::DEFAULT_PROMPT_FILE;
use prefill_bench::ReportFormat;
use std::path::PathBuf;

/// Measure prompt-processing speed of an OpenAI-compatible chat-completions server
#[derive(Parser, Debug)]
#[command(name = "bench-api", author, version, about, long_about = None)]
pub struct ApiArgs {
    /// Prompt file sent on every run
    #[arg(default_value = DEFAULT_PROMPT_FILE)]
    pub prompt_file: PathBuf,

    /// Model name passed to the server
    #[arg(
        long_help = "Model name passed to the server. Defaults to PREFILL_BENCH__API__MODEL or glm-4.7-v4-fast."
    )]
    pub model: Option<String>,

    /// Number of timed requests
    #[arg(default_value_t = 1)]
    pub runs: usize,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Csv => ReportFormat::Csv,
        }
    }
}

/// Measure prefill time of an in-process model by generating a single token
#[derive(Parser, Debug)]
#[command(name = "bench-prefill", author, version, about, long_about = None)]
pub struct PrefillArgs {
    /// Path to the model (GGUF file or a directory holding one plus tokenizer.json)
    #[arg(long, value_name = "PATH")]
    pub model: PathBuf,

    /// Prompt file, resolved relative to the directory of this executable
    #[arg(long, value_name = "FILE", default_value = DEFAULT_PROMPT_FILE)]
    pub prompt: PathBuf,

    /// Number of runs
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u64).range(1..))]
    pub runs: u64,

    /// Output file for results
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Format of the output file
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Tokens generated per run; 1 measures prefill only
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_tokens: u64,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}
