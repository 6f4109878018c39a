pub mod report_generators;
pub mod types;

pub use report_generators::{
    CsvReportGenerator, JsonReportGenerator, ReportFormat, ReportGenerator,
};
pub use types::BenchmarkResult;
