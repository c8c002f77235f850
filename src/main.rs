use anyhow::Result;
use clap::Parser;
use img_shrink::cli::Args;
use img_shrink::constants::ERROR_PREFIX;
use img_shrink::logger::{self, Verbosity};
use img_shrink::utils::{completion_message, create_progress_spinner, print_batch_summary};
use img_shrink::{process_images_with_progress, Config, NativeCodec};
use tracing::debug;

fn main() {
    let args = Args::parse();
    logger::init(Verbosity::from_flags(args.quiet, args.verbose));

    if let Err(e) = run(&args) {
        eprintln!("{} Error: {}", ERROR_PREFIX, e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = Config::load(&args.config)?;
    debug!("Effective configuration: {:?}", config);

    let spinner = create_progress_spinner("Processing images...");
    let report = match process_images_with_progress(&config, &NativeCodec::new(), &spinner) {
        Ok(report) => report,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };
    spinner.finish_with_message(completion_message(&report));

    print_batch_summary(&report);
    Ok(())
}
