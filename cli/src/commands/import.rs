use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use tabled::{
    Table, Tabled,
    settings::{Modify, Style, Width, object::Columns},
};

use bodylog_core::db::Database;
use bodylog_core::import::{commit_import, prepare_import};
use bodylog_core::models::{ImportPlan, ImportSummary, NewRecord, Resolution};

use super::helpers::{measurement_line, record_line};

pub(crate) fn cmd_import_csv(
    db: &Database,
    path: &Path,
    overwrite_all: bool,
    skip_all: bool,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let mut plan = prepare_import(db, &text)?;

    if overwrite_all {
        plan.resolve_all(Resolution::Overwrite);
    } else if skip_all {
        plan.resolve_all(Resolution::Skip);
    }

    if dry_run {
        print_plan(&plan, json)?;
        return Ok(());
    }

    if plan.has_conflicts() && !overwrite_all && !skip_all {
        if json {
            bail!(
                "{} date conflict(s); use --overwrite-all or --skip-all with --json",
                plan.conflicts.len()
            );
        }
        print_conflicts(&plan);
        if !prompt_resolutions(&mut plan)? {
            println!("Import cancelled. Nothing was written.");
            return Ok(());
        }
    }

    let summary = commit_import(db, &plan)?;
    print_summary(&summary, &plan, json)
}

fn print_plan(plan: &ImportPlan, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(plan)?);
        return Ok(());
    }

    println!("Dry run — no changes made.\n");
    println!("  New records: {}", plan.new_records.len());
    println!("  Conflicts:   {}", plan.conflicts.len());
    println!("  Errors:      {}", plan.parse_errors.len());
    println!("  Duplicates:  {}", plan.duplicate_dates.len());
    if plan.has_conflicts() {
        println!();
        print_conflicts(plan);
    }
    print_parse_errors(plan);
    Ok(())
}

fn print_conflicts(plan: &ImportPlan) {
    #[derive(Tabled)]
    struct ConflictRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Existing")]
        existing: String,
        #[tabled(rename = "Incoming")]
        incoming: String,
    }

    let rows: Vec<ConflictRow> = plan
        .conflicts
        .iter()
        .map(|c| ConflictRow {
            date: c.date.clone(),
            existing: record_line(&c.existing),
            incoming: incoming_line(&c.incoming),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Width::wrap(60)))
        .to_string();
    println!("{table}");
}

fn incoming_line(r: &NewRecord) -> String {
    measurement_line(
        r.weight_kg,
        r.bmi,
        r.body_fat_pct,
        r.muscle_kg,
        r.visceral_fat,
        r.bmr_kcal,
        r.body_age,
    )
}

/// Walk the user through each conflict. Returns false when they cancel.
fn prompt_resolutions(plan: &mut ImportPlan) -> Result<bool> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let total = plan.conflicts.len();

    let mut i = 0;
    while i < plan.conflicts.len() {
        let date = plan.conflicts[i].date.clone();
        eprint!(
            "[{}/{total}] {date} — [o]verwrite / [s]kip / [O]verwrite all / [S]kip all / [q]uit: ",
            i + 1
        );
        io::stderr().flush()?;

        let line = lines.next().context("No input")??;
        match line.trim() {
            "o" | "" => {
                plan.conflicts[i].resolution = Resolution::Overwrite;
                i += 1;
            }
            "s" => {
                plan.conflicts[i].resolution = Resolution::Skip;
                i += 1;
            }
            "O" => {
                for c in &mut plan.conflicts[i..] {
                    c.resolution = Resolution::Overwrite;
                }
                break;
            }
            "S" => {
                for c in &mut plan.conflicts[i..] {
                    c.resolution = Resolution::Skip;
                }
                break;
            }
            "q" => return Ok(false),
            _ => eprintln!("Please answer o, s, O, S, or q."),
        }
    }

    Ok(true)
}

fn print_summary(summary: &ImportSummary, plan: &ImportPlan, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "added": summary.added,
                "updated": summary.updated,
                "skipped": summary.skipped,
                "errors": summary.errors,
                "duplicates": summary.duplicates,
                "parse_errors": plan.parse_errors,
            }))?
        );
        return Ok(());
    }

    println!("Import complete.\n");
    println!("  Added:      {}", summary.added);
    println!("  Updated:    {}", summary.updated);
    println!("  Skipped:    {}", summary.skipped);
    println!("  Errors:     {}", summary.errors);
    println!("  Duplicates: {}", summary.duplicates);
    print_parse_errors(plan);

    Ok(())
}

fn print_parse_errors(plan: &ImportPlan) {
    if plan.parse_errors.is_empty() {
        return;
    }
    println!("\n  Rows that could not be read:");
    for e in plan.parse_errors.iter().take(20) {
        println!("    L{}: {}", e.line, e.reason);
    }
    if plan.parse_errors.len() > 20 {
        println!("    … and {} more", plan.parse_errors.len() - 20);
    }
}
