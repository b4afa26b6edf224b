use anyhow::{Context, Result};
use chrono::Local;

use crate::db::Database;
use crate::models::{BackupData, NewRecord};
use crate::normalize::normalize_date;

pub const BACKUP_APP: &str = "bodylog";
pub const BACKUP_VERSION: i64 = 1;

/// Snapshot the whole store as a JSON-serializable backup, records
/// ascending by date.
pub fn export_backup(db: &Database) -> Result<BackupData> {
    Ok(BackupData {
        app: BACKUP_APP.to_string(),
        version: BACKUP_VERSION,
        exported_at: Local::now().to_rfc3339(),
        records: db.get_all()?,
    })
}

/// Restore records from backup JSON.
///
/// Malformed JSON fails the whole file, like a missing-column CSV header.
/// Records whose date cannot be normalized are skipped; the rest are
/// bulk-upserted directly — a restore does not go through conflict
/// resolution. Returns the number of records applied.
pub fn import_backup(db: &Database, json: &str) -> Result<usize> {
    let data: BackupData = serde_json::from_str(json).context("Invalid backup JSON")?;

    let mut records = Vec::new();
    for r in data.records {
        let Some(date) = normalize_date(&r.date) else {
            continue;
        };
        records.push(NewRecord {
            date,
            weight_kg: r.weight_kg,
            bmi: r.bmi,
            body_fat_pct: r.body_fat_pct,
            muscle_kg: r.muscle_kg,
            visceral_fat: r.visceral_fat,
            bmr_kcal: r.bmr_kcal,
            body_age: r.body_age,
            memo: r.memo,
        });
    }

    db.upsert_many(&records)?;
    Ok(records.len())
}
