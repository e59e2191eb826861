use logrelay_core::logging;

mod cli;
mod config;
mod transport;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; fall back to stderr-only if
    // the log file can't be created (e.g. unwritable state dir).
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("logrelay error: {:#}", err);
        std::process::exit(1);
    }
}
