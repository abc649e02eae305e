//! Operator CLI over `roundtable_core`.
//!
//! # Responsibility
//! - Run administrative steps (schema, slots, candidates, sweeps) against a
//!   database file.
//! - Print results as JSON on stdout.

mod settings;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use roundtable_core::{
    init_logging, open_db, parse_entity_id, AssignmentService, ClaimableFilter,
    EliminationService, EliminationSweep, LogNotifier, ScheduleService, SessionManager,
    SqliteAdminRepository, SqliteCandidateRepository, SqliteSlotRepository,
};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;
use settings::Settings;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "roundtable", version, about = "Interview round coordination")]
struct Cli {
    /// Overrides ROUNDTABLE_DATABASE_PATH.
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core version.
    Version,
    /// Create or upgrade the database schema.
    Migrate,
    /// Create a slot for a round at a date-time (IST when no offset given).
    CreateSlot {
        #[arg(long)]
        round: u8,
        #[arg(long)]
        time: String,
    },
    RegisterCandidate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        fresher: bool,
    },
    /// Attach a candidate to a slot.
    Attach {
        #[arg(long)]
        slot: String,
        #[arg(long)]
        candidate: String,
    },
    /// Open a slot for claiming.
    Ready {
        #[arg(long)]
        slot: String,
    },
    /// List claimable slots (`pending` or `ongoing`).
    ListSlots {
        #[arg(long, default_value = "pending")]
        status: String,
    },
    Eliminate {
        #[arg(value_enum)]
        sweep: SweepArg,
    },
    /// Delete expired reviewer sessions.
    PruneSessions,
}

#[derive(Clone, Copy, ValueEnum)]
enum SweepArg {
    NonFresher,
    Round1,
    Round2,
}

impl From<SweepArg> for EliminationSweep {
    fn from(value: SweepArg) -> Self {
        match value {
            SweepArg::NonFresher => EliminationSweep::NonFresher,
            SweepArg::Round1 => EliminationSweep::RoundOneTaskMissing,
            SweepArg::Round2 => EliminationSweep::RoundTwoTaskMissing,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    if let Some(log_dir) = settings.log_dir.as_deref() {
        init_logging(&settings.log_level, log_dir)
            .map_err(anyhow::Error::msg)
            .context("failed to start logging")?;
    }

    let database = cli
        .database
        .clone()
        .unwrap_or_else(|| settings.database_path.clone());
    run(cli.command, &settings, database)
}

fn run(command: Command, settings: &Settings, database: PathBuf) -> Result<()> {
    match command {
        Command::Version => print_json(&json!({ "version": roundtable_core::core_version() })),
        Command::Migrate => {
            open(&database)?;
            info!("event=cli_migrate module=cli status=ok");
            print_json(&json!({ "database": database, "migrated": true }))
        }
        Command::CreateSlot { round, time } => {
            let conn = open(&database)?;
            let slot = schedule(&conn)
                .create_slot(round, &time)
                .context("create-slot failed")?;
            print_json(&slot)
        }
        Command::RegisterCandidate {
            name,
            email,
            fresher,
        } => {
            let conn = open(&database)?;
            let candidate = schedule(&conn)
                .register_candidate(&name, &email, fresher)
                .context("register-candidate failed")?;
            print_json(&candidate)
        }
        Command::Attach { slot, candidate } => {
            let slot_id = parse_entity_id("slot", &slot)?;
            let candidate_id = parse_entity_id("candidate", &candidate)?;
            let conn = open(&database)?;
            let attached = schedule(&conn)
                .attach_candidate(slot_id, candidate_id)
                .context("attach failed")?;
            print_json(&json!({ "slot": slot_id, "candidate": candidate_id, "attached": attached }))
        }
        Command::Ready { slot } => {
            let slot_id = parse_entity_id("slot", &slot)?;
            let conn = open(&database)?;
            let slot = schedule(&conn)
                .set_slot_ready(slot_id, true)
                .context("ready failed")?;
            print_json(&slot)
        }
        Command::ListSlots { status } => {
            let filter = ClaimableFilter::parse(&status)?;
            let conn = open(&database)?;
            let assignment = AssignmentService::new(
                SqliteSlotRepository::new(&conn),
                SqliteAdminRepository::new(&conn),
                LogNotifier,
            );
            let slots = assignment
                .list_claimable_slots(filter)
                .context("list-slots failed")?;
            print_json(&slots)
        }
        Command::Eliminate { sweep } => {
            let sweep = EliminationSweep::from(sweep);
            let conn = open(&database)?;
            let eliminated = EliminationService::new(SqliteCandidateRepository::new(&conn))
                .run(sweep)
                .context("elimination sweep failed")?;
            print_json(&json!({ "sweep": sweep.as_str(), "eliminated": eliminated }))
        }
        Command::PruneSessions => {
            let session_config = settings.session_config()?;
            let conn = open(&database)?;
            let removed = SessionManager::new(SqliteAdminRepository::new(&conn), &session_config)
                .prune_expired_sessions(Utc::now())
                .context("prune-sessions failed")?;
            print_json(&json!({ "removed": removed }))
        }
    }
}

fn open(database: &Path) -> Result<Connection> {
    open_db(database).with_context(|| format!("failed to open database `{}`", database.display()))
}

fn schedule(conn: &Connection) -> ScheduleService<SqliteSlotRepository<'_>, SqliteCandidateRepository<'_>> {
    ScheduleService::new(
        SqliteSlotRepository::new(conn),
        SqliteCandidateRepository::new(conn),
    )
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}
