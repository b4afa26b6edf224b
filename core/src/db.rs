use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{Connection, params};

use crate::models::{NewRecord, Record};

const UPSERT_SQL: &str = "INSERT INTO records (date, weight_kg, bmi, body_fat_pct, muscle_kg,
        visceral_fat, bmr_kcal, body_age, memo, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
     ON CONFLICT(date) DO UPDATE SET
        weight_kg = excluded.weight_kg,
        bmi = excluded.bmi,
        body_fat_pct = excluded.body_fat_pct,
        muscle_kg = excluded.muscle_kg,
        visceral_fat = excluded.visceral_fat,
        bmr_kcal = excluded.bmr_kcal,
        body_age = excluded.body_age,
        memo = excluded.memo,
        updated_at = excluded.updated_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS records (
                    date TEXT PRIMARY KEY,
                    weight_kg REAL,
                    bmi REAL,
                    body_fat_pct REAL,
                    muscle_kg REAL,
                    visceral_fat REAL,
                    bmr_kcal REAL,
                    body_age REAL,
                    memo TEXT NOT NULL DEFAULT '',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    fn record_from_row(row: &rusqlite::Row) -> rusqlite::Result<Record> {
        Ok(Record {
            date: row.get(0)?,
            weight_kg: row.get(1)?,
            bmi: row.get(2)?,
            body_fat_pct: row.get(3)?,
            muscle_kg: row.get(4)?,
            visceral_fat: row.get(5)?,
            bmr_kcal: row.get(6)?,
            body_age: row.get(7)?,
            memo: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    /// All records, ascending by date.
    pub fn get_all(&self) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, weight_kg, bmi, body_fat_pct, muscle_kg, visceral_fat,
                    bmr_kcal, body_age, memo, created_at, updated_at
             FROM records ORDER BY date ASC",
        )?;
        let records = stmt
            .query_map([], Self::record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub fn get_record(&self, date: &str) -> Result<Option<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, weight_kg, bmi, body_fat_pct, muscle_kg, visceral_fat,
                    bmr_kcal, body_age, memo, created_at, updated_at
             FROM records WHERE date = ?1",
        )?;
        let mut rows = stmt.query(params![date])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::record_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Insert-or-replace one record's payload. On conflict `created_at` is
    /// left alone and `updated_at` is refreshed.
    pub fn upsert_record(&self, record: &NewRecord) -> Result<Record> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            UPSERT_SQL,
            params![
                record.date,
                record.weight_kg,
                record.bmi,
                record.body_fat_pct,
                record.muscle_kg,
                record.visceral_fat,
                record.bmr_kcal,
                record.body_age,
                record.memo,
                now,
                now
            ],
        )?;
        self.get_record(&record.date)?
            .context("Record not found after upsert")
    }

    /// Bulk upsert in a single transaction — all records land or none do.
    pub fn upsert_many(&self, records: &[NewRecord]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let now = Local::now().to_rfc3339();
        {
            let mut stmt = tx.prepare(UPSERT_SQL)?;
            for record in records {
                stmt.execute(params![
                    record.date,
                    record.weight_kg,
                    record.bmi,
                    record.body_fat_pct,
                    record.muscle_kg,
                    record.visceral_fat,
                    record.bmr_kcal,
                    record.body_age,
                    record.memo,
                    now,
                    now
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    pub fn delete_record(&self, date: &str) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM records WHERE date = ?1", params![date])?;
        if rows == 0 {
            anyhow::bail!("No record for {date}");
        }
        Ok(())
    }
}
