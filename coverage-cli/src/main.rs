//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use coverage_cli::CliError;
use env_logger::{Builder, Env};

fn main() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    match coverage_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("mobile-coverage: {err}");
            std::process::exit(1);
        }
    }
}
