//! # chimeo
//!
//! Command line tool that keeps the stored positions of
//! organizations in sync with their postal addresses.

use std::process::ExitCode;

mod cli;
mod config;
mod gateways;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    match cli::run().await {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
