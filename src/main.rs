use anyhow::Result;
use clap::Parser;
use tracing::info;

use progress_watch::{Args, RuntimeConfig, logging, runtime};

fn main() -> Result<()> {
    let args = Args::parse();

    // Guard must outlive the runtime so debug.log is flushed
    let (_guard, log_buffer) = logging::init_logging(args.no_tui);

    let (mut config, _source) = runtime::load_and_log_config(&args.config)?;
    args.apply_to(&mut config);
    config.validate()?;

    let rt = RuntimeConfig::from_args(args.threads).build_runtime()?;
    rt.block_on(runtime::run(config, args.no_tui, log_buffer))?;

    info!("Exiting");
    Ok(())
}
