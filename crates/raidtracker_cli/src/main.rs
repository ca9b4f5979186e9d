//! Command-line front end for the raid tracker.
//!
//! Every invocation opens the store, runs the weekly reset check, then
//! applies at most one command.

mod config;
mod render;

use anyhow::{bail, Context};
use chrono::{Local, TimeZone};
use clap::Parser;
use config::{Cli, Command};
use log::{info, warn};
use raidtracker_core::db::open_db;
use raidtracker_core::{
    init_logging, resolve_activity, KeyValueStore, RecordStore, ResetDecision, ResetSchedule,
    SqliteKvStore, StartupReport, CATALOG,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings();

    if let Err(err) = init_logging(&settings.log_level, &settings.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }
    info!(
        "event=cli_start module=cli status=ok core_version={}",
        raidtracker_core::core_version()
    );

    if let Some(parent) = settings.db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }
    let conn = open_db(&settings.db_path)
        .with_context(|| format!("failed to open `{}`", settings.db_path.display()))?;
    let mut store = RecordStore::load(SqliteKvStore::new(&conn))?;

    let report = store.run_startup_check(&ResetSchedule::default(), &Local::now())?;
    print_startup(&report);

    run_command(&mut store, cli.command.unwrap_or(Command::List))
}

fn run_command<S: KeyValueStore>(
    store: &mut RecordStore<S>,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::List => {}
        Command::Catalog => {
            for activity in CATALOG {
                println!("{:<8} {}", activity.id, activity.label);
            }
            return Ok(());
        }
        Command::Add { name } => {
            store.add(&name)?;
        }
        Command::Rename { row, name } => store.update_name(row_index(row)?, name)?,
        Command::Score { row, value } => store.update_score(row_index(row)?, value)?,
        Command::Toggle {
            row,
            activity,
            tier,
        } => {
            let activity = resolve_activity(&activity)?;
            store.toggle_completion(row_index(row)?, activity.id, tier)?;
        }
        Command::Reset => {
            let cleared = store.reset_all()?;
            println!("Cleared {cleared} completion mark(s).");
        }
    }

    println!("{}", render::render_table(store.records()));
    Ok(())
}

/// Converts a 1-based row number from the table into a store index.
fn row_index(row: usize) -> anyhow::Result<usize> {
    match row.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("row numbers start at 1"),
    }
}

fn print_startup(report: &StartupReport) {
    let boundary = match Local.timestamp_millis_opt(report.boundary_epoch_ms).single() {
        Some(instant) => instant.format("%a %Y-%m-%d %H:%M").to_string(),
        None => {
            warn!(
                "event=cli_start module=cli status=warn reason=boundary_out_of_range boundary_ms={}",
                report.boundary_epoch_ms
            );
            report.boundary_epoch_ms.to_string()
        }
    };

    match report.decision {
        ResetDecision::Due => println!(
            "Weekly reset since last visit ({boundary}): cleared {} mark(s).",
            report.cleared_marks
        ),
        ResetDecision::UnparsableTimestamp => {
            eprintln!("warning: stored last-visit time was unreadable; skipped weekly reset.")
        }
        ResetDecision::FirstVisit | ResetDecision::NotDue => {}
    }
}
