use crate::errors::BenchResult;
use crate::reporting::types::BenchmarkResult;
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;

/// Trait for writers of the results file
pub trait ReportGenerator {
    fn generate(&self, result: &BenchmarkResult, output: &Path) -> BenchResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

impl ReportFormat {
    pub fn generator(self) -> Box<dyn ReportGenerator> {
        match self {
            ReportFormat::Json => Box::new(JsonReportGenerator),
            ReportFormat::Csv => Box::new(CsvReportGenerator),
        }
    }
}

/// Full result record as indented JSON
pub struct JsonReportGenerator;

impl ReportGenerator for JsonReportGenerator {
    fn generate(&self, result: &BenchmarkResult, output: &Path) -> BenchResult<()> {
        let output_str = serde_json::to_string_pretty(result)?;
        fs::write(output, output_str)?;
        Ok(())
    }
}

/// One CSV row per trial
pub struct CsvReportGenerator;

#[derive(Serialize)]
struct CsvRow {
    run: usize,
    prompt_tokens: usize,
    elapsed_seconds: f64,
    tokens_per_second: f64,
}

impl ReportGenerator for CsvReportGenerator {
    fn generate(&self, result: &BenchmarkResult, output: &Path) -> BenchResult<()> {
        let mut writer = csv::Writer::from_writer(File::create(output)?);
        for (i, run) in result.runs.iter().enumerate() {
            writer.serialize(CsvRow {
                run: i + 1,
                prompt_tokens: run.prompt_tokens,
                elapsed_seconds: run.elapsed_seconds,
                tokens_per_second: run.tokens_per_second,
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}
