use crate::{config::Config, gateways};
use anyhow::Result;
use chimeo_application::prelude::*;
use chimeo_core::{entities::Id, usecases::LocationOutcome};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::ExitCode, sync::Arc};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Correct the positions of all stored organizations
    Reconcile {
        /// Also check organizations that already have a position
        #[arg(long)]
        all: bool,
        /// Number of organizations that are processed at the same time
        #[arg(long, value_name = "N")]
        concurrency: Option<usize>,
    },
    /// Correct the position of a single organization on behalf of one of its admins
    ReconcileOne {
        /// ID of the acting user
        #[arg(long, value_name = "USER_ID")]
        user: String,
        #[arg(value_name = "ORG_ID")]
        org_id: String,
    },
}

/// The returned guard cancels the token once the command is done,
/// which also ends the Ctrl-C listener.
fn cancel_on_ctrl_c() -> (CancellationToken, DropGuard) {
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                res = tokio::signal::ctrl_c() => {
                    if res.is_ok() {
                        log::warn!("Interrupted: finishing organizations in progress without writing");
                        cancel.cancel();
                    }
                }
            }
        }
    });
    let guard = cancel.clone().drop_guard();
    (cancel, guard)
}

fn print_report(report: &ReconciliationReport) {
    println!(
        "{} organizations: {} updated, {} unchanged, {} skipped, {} failed",
        report.entries.len(),
        report.updated(),
        report.unchanged(),
        report.skipped(),
        report.failed()
    );
    for (id, err) in report.errors() {
        println!("  {id}: {err}");
    }
    if report.cancelled {
        println!("The pass has been cancelled");
    }
}

pub async fn run() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    let cfg = Config::try_load_from_file_or_default(args.config.as_ref())?;
    log::debug!("{cfg:?}");

    let store = Arc::new(gateways::organization_store(&cfg.store)?);
    let geocoder = Arc::new(gateways::geocoding_gateway(&cfg.geocoding)?);
    let mut reconciler_config = cfg.reconciliation;

    match args.command {
        Command::Reconcile { all, concurrency } => {
            if let Some(n) = concurrency {
                reconciler_config.max_concurrency = n.max(1);
            }
            let selection = if all {
                Selection::All
            } else {
                Selection::MissingPosition
            };
            let reconciler = Reconciler::new(store, geocoder, reconciler_config);
            let (cancel, _guard) = cancel_on_ctrl_c();
            let (_, report) = reconciler.reconcile_stored(selection, &cancel).await?;
            print_report(&report);
            if report.cancelled || report.retryable_failures() > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::ReconcileOne { user, org_id } => {
            let reconciler = Reconciler::new(store, geocoder, reconciler_config);
            let (cancel, _guard) = cancel_on_ctrl_c();
            let id = Id::from(org_id);
            match reconciler
                .reconcile_organization_as(&user, &id, &cancel)
                .await?
            {
                LocationOutcome::Updated(update) => {
                    println!("{id}: moved to {}", update.pos);
                }
                LocationOutcome::Unchanged { drift } => {
                    println!("{id}: unchanged (drift: {drift})");
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
