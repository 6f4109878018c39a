use anyhow::Result;
use clap::Parser;
use prefill_bench::backend::CandleBackend;
use prefill_bench_cli::cli::PrefillArgs;
use prefill_bench_cli::commands::prefill::{handle_prefill, prompt_base_dir};
use prefill_bench_cli::logging::setup_logging;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = PrefillArgs::parse();
    let _guard = setup_logging(args.log_file.as_deref())?;

    let status = handle_prefill(
        &args,
        CandleBackend::default(),
        &prompt_base_dir()?,
        &mut std::io::stdout(),
    )?;
    Ok(ExitCode::from(status))
}
