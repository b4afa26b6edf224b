use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use bodylog_core::db::Database;
use bodylog_core::stats;

use super::helpers::{fmt0, fmt1, truncate};

pub(crate) fn cmd_history(
    db: &Database,
    days: Option<i64>,
    search: Option<&str>,
    asc: bool,
    json: bool,
) -> Result<()> {
    let mut records = db.get_all()?;

    if let Some(days) = days {
        if let Some(newest) = records.last().map(|r| r.date.clone()) {
            records = stats::clip_to_recent(&records, days, &newest);
        }
    }
    if let Some(q) = search {
        records = stats::search_memo(&records, q);
    }
    if !asc {
        records.reverse();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        eprintln!("No records found. Use `bodylog log` to record measurements.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct RecordRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Weight (kg)")]
        weight: String,
        #[tabled(rename = "BMI")]
        bmi: String,
        #[tabled(rename = "Fat (%)")]
        fat: String,
        #[tabled(rename = "Muscle (kg)")]
        muscle: String,
        #[tabled(rename = "Visceral")]
        visceral: String,
        #[tabled(rename = "BMR")]
        bmr: String,
        #[tabled(rename = "Age")]
        age: String,
        #[tabled(rename = "Memo")]
        memo: String,
    }

    let rows: Vec<RecordRow> = records
        .iter()
        .map(|r| RecordRow {
            date: r.date.clone(),
            weight: fmt1(r.weight_kg),
            bmi: fmt1(r.bmi),
            fat: fmt1(r.body_fat_pct),
            muscle: fmt1(r.muscle_kg),
            visceral: fmt1(r.visceral_fat),
            bmr: fmt0(r.bmr_kcal),
            age: fmt0(r.body_age),
            memo: truncate(&r.memo, 24),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..8)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
