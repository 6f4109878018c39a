use crate::backend::{InferenceBackend, PromptTokenizer};
use crate::errors::{BenchError, BenchResult};
use crate::prompt::load_prompt;
use crate::reporting::BenchmarkResult;
use crate::stats::{BenchmarkRun, BenchmarkSummary};
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Measures prefill by timing single-token generations on an in-process model
pub struct PrefillRunner<B: InferenceBackend> {
    backend: B,
    max_tokens: usize,
}

impl<B: InferenceBackend> PrefillRunner<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            max_tokens: 1,
        }
    }

    /// Tokens requested per trial. One token forces a full prefill and little else.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens.max(1);
        self
    }

    pub fn run<W: Write>(
        &self,
        model_path: &Path,
        prompt_file: &Path,
        runs: usize,
        out: &mut W,
    ) -> BenchResult<BenchmarkResult> {
        let banner = "=".repeat(60);
        writeln!(out, "\n{}", banner)?;
        writeln!(out, "Loading model: {}", model_path.display())?;
        writeln!(out, "{}", banner)?;

        let (mut model, tokenizer) = self.backend.load(model_path)?;
        tracing::info!(backend = self.backend.name(), "model loaded");

        let prompt = load_prompt(prompt_file)?;
        let token_count = tokenizer.count_tokens(&prompt)?;

        writeln!(out, "Prompt tokens: {}", group_thousands(token_count))?;
        writeln!(out, "Running {} iterations...", runs)?;
        writeln!(out)?;

        let mut results = Vec::with_capacity(runs);
        for i in 0..runs {
            write!(out, "  Run {}/{}...", i + 1, runs)?;
            out.flush()?;

            let run = self.time_prefill(&mut model, &tokenizer, &prompt)?;
            writeln!(
                out,
                " Time: {:.2}s, Speed: {:.0} tok/s",
                run.elapsed_seconds, run.tokens_per_second
            )?;
            results.push(run);
        }

        let summary = BenchmarkSummary::from_runs(&results).ok_or(BenchError::NoRuns)?;
        write_summary(out, &summary)?;

        Ok(BenchmarkResult {
            model: model_path.display().to_string(),
            prompt_tokens: token_count,
            runs: results,
            summary,
        })
    }

    /// One trial. Only the generation call is inside the timed region.
    fn time_prefill(
        &self,
        model: &mut B::Model,
        tokenizer: &B::Tokenizer,
        prompt: &str,
    ) -> BenchResult<BenchmarkRun> {
        self.backend.materialize(model)?;
        let prompt_tokens = tokenizer.count_tokens(prompt)?;

        let start = Instant::now();
        let output = self
            .backend
            .generate(model, tokenizer, prompt, self.max_tokens)?;
        let elapsed = start.elapsed();

        tracing::debug!(prompt_tokens, ?elapsed, output = %output, "prefill trial finished");
        Ok(BenchmarkRun::from_duration(prompt_tokens, elapsed))
    }
}

fn write_summary<W: Write>(out: &mut W, summary: &BenchmarkSummary) -> BenchResult<()> {
    writeln!(out)?;
    writeln!(out, "  Summary:")?;
    writeln!(out, "    Avg time:  {:.2}s", summary.avg_time)?;
    writeln!(out, "    Min time:  {:.2}s", summary.min_time)?;
    writeln!(out, "    Max time:  {:.2}s", summary.max_time)?;
    writeln!(out, "    Variance:  {:.2}s", summary.variance)?;
    writeln!(out, "    Avg speed: {:.0} tok/s", summary.avg_speed)?;
    Ok(())
}

/// `40960` -> `40,960`
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use std::time::Duration;
    use test_case::test_case;

    #[test_case(0, "0")]
    #[test_case(999, "999")]
    #[test_case(1000, "1,000")]
    #[test_case(40960, "40,960")]
    #[test_case(1234567, "1,234,567")]
    fn test_group_thousands(n: usize, expected: &str) {
        assert_eq!(group_thousands(n), expected);
    }

    fn prompt_file(words: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", vec!["tok"; words].join(" ")).unwrap();
        file
    }

    #[test]
    fn test_run_collects_every_trial() {
        let backend = MockBackend::new(vec![Duration::from_millis(20); 3]);
        let observer = backend.clone();
        let prompt = prompt_file(1000);
        let mut out = Vec::new();

        let result = PrefillRunner::new(backend)
            .run(Path::new("/models/mock"), prompt.path(), 3, &mut out)
            .unwrap();

        assert_eq!(result.model, "/models/mock");
        assert_eq!(result.prompt_tokens, 1000);
        assert_eq!(result.runs.len(), 3);
        for run in &result.runs {
            assert_eq!(run.prompt_tokens, 1000);
            assert!(run.elapsed_seconds >= 0.02);
            assert!(run.tokens_per_second > 0.0);
        }
        assert_eq!(
            result.summary.variance,
            result.summary.max_time - result.summary.min_time
        );
        assert!(result.summary.min_time <= result.summary.avg_time);
        assert!(result.summary.avg_time <= result.summary.max_time);

        let calls = observer.calls();
        assert_eq!(calls.loads.len(), 1);
        assert_eq!(calls.materialized, 3);
        assert_eq!(calls.generations, vec![(1000, 1); 3]);

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Loading model: /models/mock"));
        assert!(out.contains("Prompt tokens: 1,000"));
        assert!(out.contains("Running 3 iterations..."));
        assert!(out.contains("  Run 3/3... Time: "));
        assert!(out.contains("  Summary:"));
        assert!(out.contains("    Variance:  "));
    }

    #[test]
    fn test_max_tokens_is_forwarded() {
        let backend = MockBackend::new(vec![]);
        let observer = backend.clone();
        let prompt = prompt_file(5);

        PrefillRunner::new(backend)
            .with_max_tokens(4)
            .run(Path::new("m"), prompt.path(), 1, &mut std::io::sink())
            .unwrap();

        assert_eq!(observer.calls().generations, vec![(5, 4)]);
    }

    #[test]
    fn test_zero_runs_has_no_summary() {
        let prompt = prompt_file(5);
        let err = PrefillRunner::new(MockBackend::new(vec![]))
            .run(Path::new("m"), prompt.path(), 0, &mut std::io::sink())
            .unwrap_err();
        assert!(matches!(err, BenchError::NoRuns));
    }

    #[test]
    fn test_load_failure_propagates() {
        let prompt = prompt_file(5);
        let err = PrefillRunner::new(MockBackend::failing_load())
            .run(Path::new("broken"), prompt.path(), 3, &mut std::io::sink())
            .unwrap_err();
        assert!(matches!(err, BenchError::ModelLoadError(_)));
    }
}
