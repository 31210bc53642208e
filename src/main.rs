mod cli;
mod error;
mod logging;
mod output;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use delve_config::Config;
use delve_inventory::{CancelHandle, Inspector, Investigation, TreeScanner};
use exn::ResultExt;
use tracing::{debug, info, warn};

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use crate::output::Progress;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    cli.apply(&mut config);
    let level = config.log.level().or_raise(|| ErrorKind::Config)?;
    logging::init(logging::adjust(level, cli.verbose, cli.quiet));
    debug!(?config, "Configuration loaded");

    let root = cli.root.display().to_string();
    let investigation =
        Investigation::start(&cli.root, TreeScanner::new(&config.scan), Inspector::new(&config.inspect))
            .or_raise(|| ErrorKind::Scan(root))?;
    if let Err(err) = ctrlc::set_handler(on_interrupt(investigation.cancel_handle())) {
        warn!(error = %err, "Unable to install the Ctrl-C handler");
    }
    let progress = Progress::new(config.output.progress);
    let summary = output::write_results(investigation, config.output.format, cli.sort, &progress, io::stdout().lock())?;
    if let Err(err) = output::print_summary(&summary) {
        warn!(error = %err, "Unable to print summary");
    }
    Ok(())
}

/// Ctrl-C stops the scan after the current file. Results gathered so far are
/// still written.
fn on_interrupt(cancel: CancelHandle) -> impl Fn() + Send + 'static {
    move || {
        info!("Interrupted; stopping after the current file");
        cancel.cancel();
    }
}
