mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use crate::commands::{
    cmd_delete, cmd_export_csv, cmd_export_json, cmd_history, cmd_import_csv, cmd_import_json,
    cmd_log, cmd_show, cmd_stats,
};
use crate::config::Config;
use bodylog_core::db::Database;

#[derive(Parser)]
#[command(
    name = "bodylog",
    version,
    about = "A simple body metrics tracker CLI",
    long_about = "Track daily body measurements (weight, BMI, body fat, muscle mass, \
visceral fat, BMR, body age) in a local database, with CSV import/export and \
conflict-aware reconciliation of scale exports."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record measurements for a date (creates or replaces that date's entry)
    Log {
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,
        /// Body mass index
        #[arg(long)]
        bmi: Option<f64>,
        /// Body fat percentage
        #[arg(long)]
        fat: Option<f64>,
        /// Muscle mass in kg
        #[arg(long)]
        muscle: Option<f64>,
        /// Visceral fat rating
        #[arg(long)]
        visceral: Option<f64>,
        /// Basal metabolic rate in kcal
        #[arg(long)]
        bmr: Option<f64>,
        /// Body age in years
        #[arg(long)]
        body_age: Option<f64>,
        /// Free-text memo
        #[arg(long)]
        memo: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the record for a date (default: today)
    Show {
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List records as a table
    History {
        /// Only the last N days, counted back from the newest record
        #[arg(short, long)]
        days: Option<i64>,
        /// Only records whose memo contains this text
        #[arg(long)]
        search: Option<String>,
        /// Oldest first (default: newest first)
        #[arg(long)]
        asc: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show trend statistics over recent records
    Stats {
        /// Only the last N days, counted back from the newest record
        #[arg(short, long)]
        days: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete the record for a date
    Delete {
        /// Date (YYYY-MM-DD or today/yesterday)
        date: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export records
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Import records
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
}

#[derive(Subcommand)]
enum ExportCommands {
    /// Export all records as CSV (dates ascending)
    Csv {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export all records as a JSON backup
    Json {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Import a scale CSV export, reconciling per-date conflicts
    Csv {
        /// Path to the CSV file
        file: PathBuf,
        /// Resolve every conflict as overwrite without prompting
        #[arg(long, conflicts_with = "skip_all")]
        overwrite_all: bool,
        /// Resolve every conflict as skip without prompting
        #[arg(long)]
        skip_all: bool,
        /// Show what would happen without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON (conflicts then require a bulk flag)
        #[arg(long)]
        json: bool,
    },
    /// Restore records from a JSON backup
    Json {
        /// Path to the backup file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&config.db_path)?;

    match cli.command {
        Commands::Log {
            date,
            weight,
            bmi,
            fat,
            muscle,
            visceral,
            bmr,
            body_age,
            memo,
            json,
        } => cmd_log(
            &db, date, weight, bmi, fat, muscle, visceral, bmr, body_age, memo, json,
        ),
        Commands::Show { date, json } => cmd_show(&db, date, json),
        Commands::History {
            days,
            search,
            asc,
            json,
        } => cmd_history(&db, days, search.as_deref(), asc, json),
        Commands::Stats { days, json } => cmd_stats(&db, days, json),
        Commands::Delete { date, json } => cmd_delete(&db, &date, json),
        Commands::Export { command } => match command {
            ExportCommands::Csv { output } => cmd_export_csv(&db, output.as_deref()),
            ExportCommands::Json { output } => cmd_export_json(&db, output.as_deref()),
        },
        Commands::Import { command } => match command {
            ImportCommands::Csv {
                file,
                overwrite_all,
                skip_all,
                dry_run,
                json,
            } => cmd_import_csv(&db, &file, overwrite_all, skip_all, dry_run, json),
            ImportCommands::Json { file, json } => cmd_import_json(&db, &file, json),
        },
    }
}
