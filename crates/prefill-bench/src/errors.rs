use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while running a prefill benchmark
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Prompt file not found: {}", .0.display())]
    PromptNotFound(PathBuf),

    #[error("Failed to parse configuration: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Unexpected response shape: {0}")]
    ResponseShapeError(String),

    #[error("Failed to load model: {0}")]
    ModelLoadError(String),

    #[error("Tokenizer error: {0}")]
    TokenizerError(String),

    #[error("Generation failed: {0}")]
    GenerationError(String),

    #[error("Failed to write report: {0}")]
    ReportError(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("No benchmark runs were recorded")]
    NoRuns,
}

/// Result type for benchmark operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Utility functions for working with BenchError
pub mod util {
    use super::*;
    use std::path::Path;

    /// Check if a prompt file exists, returning a PromptNotFound error if it doesn't
    pub fn ensure_prompt_exists<P: AsRef<Path>>(path: P) -> BenchResult<()> {
        let path_ref = path.as_ref();
        if !path_ref.is_file() {
            return Err(BenchError::PromptNotFound(path_ref.to_path_buf()));
        }
        Ok(())
    }

    /// Wrap a backend failure that only carries a displayable message
    pub fn to_generation_error<E: fmt::Display>(e: E, context: &str) -> BenchError {
        BenchError::GenerationError(format!("{}: {}", context, e))
    }
}

impl From<csv::Error> for BenchError {
    fn from(err: csv::Error) -> Self {
        BenchError::ReportError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::util::*;
    use super::*;

    #[test]
    fn test_missing_prompt_is_reported_with_path() {
        let err = ensure_prompt_exists("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, BenchError::PromptNotFound(_)));
        assert_eq!(
            err.to_string(),
            "Prompt file not found: /definitely/not/here.txt"
        );
    }

    #[test]
    fn test_directory_is_not_a_prompt() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_prompt_exists(dir.path()).is_err());
    }

    #[test]
    fn test_generation_error_keeps_context() {
        let err = to_generation_error("out of memory", "forward pass");
        assert_eq!(err.to_string(), "Generation failed: forward pass: out of memory");
    }
}
