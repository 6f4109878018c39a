use crate::cli::ApiArgs;
use anyhow::Result;
use prefill_bench::{ApiBenchmarkRunner, ApiSettings, BenchmarkRun};
use std::io::Write;

/// Print the run header and benchmark the configured chat-completions endpoint
pub async fn handle_api<W: Write>(
    args: &ApiArgs,
    settings: ApiSettings,
    out: &mut W,
) -> Result<Vec<BenchmarkRun>> {
    let model = args
        .model
        .clone()
        .unwrap_or_else(|| settings.model.clone());

    writeln!(out, "Model: {}", model)?;
    writeln!(out, "Prompt: {}", args.prompt_file.display())?;
    writeln!(out, "Runs: {}", args.runs)?;
    writeln!(out)?;

    tracing::info!(endpoint = %settings.endpoint, %model, runs = args.runs, "starting api benchmark");

    let runner = ApiBenchmarkRunner::new(settings)?;
    let runs = runner
        .run(&args.prompt_file, &model, args.runs, out)
        .await?;
    Ok(runs)
}
