use anyhow::Result;
use clap::Parser;
use prefill_bench::Settings;
use prefill_bench_cli::cli::ApiArgs;
use prefill_bench_cli::commands::api::handle_api;
use prefill_bench_cli::logging::setup_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = ApiArgs::parse();
    let _guard = setup_logging(args.log_file.as_deref())?;

    let settings = Settings::new()?;
    handle_api(&args, settings.api, &mut std::io::stdout()).await?;
    Ok(())
}
