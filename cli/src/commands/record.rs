use anyhow::Result;

use bodylog_core::db::Database;
use bodylog_core::models::NewRecord;

use super::helpers::{canonical, fmt1, parse_date, record_line};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_log(
    db: &Database,
    date: Option<String>,
    weight: Option<f64>,
    bmi: Option<f64>,
    fat: Option<f64>,
    muscle: Option<f64>,
    visceral: Option<f64>,
    bmr: Option<f64>,
    body_age: Option<f64>,
    memo: Option<String>,
    json: bool,
) -> Result<()> {
    let date = canonical(parse_date(date)?);

    // The entry form's "previous value" hint.
    if !json {
        if let Some(prev) = db.get_all()?.last() {
            eprintln!(
                "Last entry ({}): weight {} / fat {} / muscle {}",
                prev.date,
                fmt1(prev.weight_kg),
                fmt1(prev.body_fat_pct),
                fmt1(prev.muscle_kg)
            );
        }
    }

    let existed = db.get_record(&date)?.is_some();
    let saved = db.upsert_record(&NewRecord {
        date,
        weight_kg: weight,
        bmi,
        body_fat_pct: fat,
        muscle_kg: muscle,
        visceral_fat: visceral,
        bmr_kcal: bmr,
        body_age,
        memo: memo.unwrap_or_default(),
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        let verb = if existed { "Updated" } else { "Logged" };
        println!("{verb} {}: {}", saved.date, record_line(&saved));
        if !saved.memo.is_empty() {
            println!("  Memo: {}", saved.memo);
        }
    }

    Ok(())
}

pub(crate) fn cmd_show(db: &Database, date: Option<String>, json: bool) -> Result<()> {
    let date = canonical(parse_date(date)?);
    let record = db.get_record(&date)?;

    if let Some(r) = record {
        if json {
            println!("{}", serde_json::to_string_pretty(&r)?);
        } else {
            println!("{}: {}", r.date, record_line(&r));
            if !r.memo.is_empty() {
                println!("  Memo: {}", r.memo);
            }
        }
    } else if json {
        println!(
            "{}",
            serde_json::json!({ "error": format!("No record for {date}") })
        );
    } else {
        eprintln!("No record for {date}");
    }

    Ok(())
}

pub(crate) fn cmd_delete(db: &Database, date: &str, json: bool) -> Result<()> {
    let date = canonical(parse_date(Some(date.to_string()))?);
    db.delete_record(&date)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": date }));
    } else {
        println!("Deleted record for {date}");
    }

    Ok(())
}
