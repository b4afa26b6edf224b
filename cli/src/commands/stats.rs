use anyhow::Result;
use serde::Serialize;

use bodylog_core::db::Database;
use bodylog_core::stats::{self, TrendSummary};

use super::helpers::{fmt1, no_neg_zero};

pub(crate) fn cmd_stats(db: &Database, days: Option<i64>, json: bool) -> Result<()> {
    let mut records = db.get_all()?;

    if let Some(days) = days {
        if let Some(newest) = records.last().map(|r| r.date.clone()) {
            records = stats::clip_to_recent(&records, days, &newest);
        }
    }

    if records.is_empty() {
        if json {
            println!("{}", serde_json::json!({ "error": "No records found" }));
        } else {
            eprintln!("No records found. Use `bodylog log` to record measurements.");
        }
        return Ok(());
    }

    // Trailing 7-day moving average of weight over the dated series.
    let weights: Vec<Option<f64>> = records.iter().map(|r| r.weight_kg).collect();
    let weight_ma7 = stats::moving_average(&weights, 7).last().copied().flatten();

    let mut desc = records;
    desc.reverse();
    let Some(summary) = stats::trend_summary(&desc) else {
        return Ok(());
    };

    if json {
        #[derive(Serialize)]
        struct StatsReport {
            #[serde(flatten)]
            summary: TrendSummary,
            weight_ma7: Option<f64>,
        }

        let report = StatsReport {
            summary,
            weight_ma7,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let latest = &summary.latest;
    println!(
        "Latest ({}): weight {} kg | fat {} % | muscle {} kg",
        latest.date,
        fmt1(latest.weight_kg),
        fmt1(latest.body_fat_pct),
        fmt1(latest.muscle_kg)
    );

    if let Some(avg) = summary.avg_weight_7 {
        let span = summary.weight_span_7.unwrap_or(0.0);
        println!("  Last 7 entries: avg weight {avg:.1} kg (span {span:.1} kg)");
    }
    if let Some(avg) = summary.avg_fat_7 {
        let span = summary.fat_span_7.unwrap_or(0.0);
        println!("  Last 7 entries: avg fat {avg:.1} % (span {span:.1} %)");
    }
    if let Some(delta) = summary.weight_delta_7 {
        let delta = no_neg_zero(delta);
        println!("  vs previous 7 entries: {delta:+.1} kg");
    }
    if let Some(ma) = weight_ma7 {
        println!("  7-day moving average: {ma:.1} kg");
    }

    Ok(())
}
