use crate::cli::PrefillArgs;
use anyhow::{Context, Result};
use prefill_bench::{InferenceBackend, PrefillRunner, ReportFormat};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Directory the default prompt file is resolved against: the one holding this executable
pub fn prompt_base_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to get current executable path")?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Run the in-process prefill benchmark and return the process exit status.
///
/// A missing prompt file is reported and yields status 1 without touching the model.
/// Every other failure is returned as an error.
pub fn handle_prefill<B: InferenceBackend, W: Write>(
    args: &PrefillArgs,
    backend: B,
    base_dir: &Path,
    out: &mut W,
) -> Result<u8> {
    let prompt_file = base_dir.join(&args.prompt);
    if !prompt_file.is_file() {
        eprintln!("Error: Prompt file not found: {}", prompt_file.display());
        return Ok(1);
    }

    let result = PrefillRunner::new(backend)
        .with_max_tokens(args.max_tokens as usize)
        .run(&args.model, &prompt_file, args.runs as usize, out)?;

    if let Some(output) = &args.output {
        ReportFormat::from(args.format)
            .generator()
            .generate(&result, output)
            .with_context(|| format!("Failed to write results to {}", output.display()))?;
        writeln!(out, "\nResults saved to: {}", output.display())?;
    }

    Ok(0)
}
