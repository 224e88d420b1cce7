//! Entry point for the coverage HTTP server.
#![forbid(unsafe_code)]

use clap::Parser;
use coverage_server::ServerArgs;
use env_logger::{Builder, Env};

fn main() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    let args = ServerArgs::parse();
    if let Err(err) = coverage_server::run(args) {
        eprintln!("mobile-coverage-server: {err}");
        std::process::exit(1);
    }
}
