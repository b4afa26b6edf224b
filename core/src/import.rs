use std::collections::{BTreeMap, HashMap};

use anyhow::{Result, bail};

use crate::csv_codec::{self, Decoded};
use crate::db::Database;
use crate::models::{
    Conflict, ImportOutcome, ImportPlan, ImportSummary, NewRecord, ParseError, Resolution,
};
use crate::normalize::{normalize_date, parse_number};

/// Map decoded rows to record candidates.
///
/// Header names are resolved to column indexes; any expected column missing
/// from the header fails the whole batch before a single row is read. Row
/// failures (short rows, unparseable dates) drop only that row, with a
/// line-numbered reason.
pub fn map_rows(decoded: &Decoded) -> Result<(Vec<NewRecord>, Vec<ParseError>)> {
    if decoded.header.is_empty() {
        bail!("CSV file is empty");
    }

    let mut idx = [0usize; 8];
    let mut missing: Vec<&str> = Vec::new();
    for (slot, name) in idx.iter_mut().zip(csv_codec::HEADERS) {
        match decoded.header.iter().position(|h| h == name) {
            Some(i) => *slot = i,
            None => missing.push(name),
        }
    }
    if !missing.is_empty() {
        bail!("Missing required columns: {}", missing.join(", "));
    }

    let [date_col, weight_col, bmi_col, fat_col, muscle_col, visceral_col, bmr_col, age_col] = idx;
    let needed = idx.iter().max().copied().unwrap_or(0) + 1;

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for (i, cols) in decoded.rows.iter().enumerate() {
        // Header is line 1 of the blank-stripped input.
        let line = i + 2;

        if cols.len() < needed {
            errors.push(ParseError {
                line,
                reason: format!("row has {} fields, expected at least {needed}", cols.len()),
            });
            continue;
        }

        let raw_date = &cols[date_col];
        let Some(date) = normalize_date(raw_date) else {
            errors.push(ParseError {
                line,
                reason: format!("invalid date '{raw_date}'"),
            });
            continue;
        };

        records.push(NewRecord {
            date,
            weight_kg: parse_number(&cols[weight_col]),
            bmi: parse_number(&cols[bmi_col]),
            body_fat_pct: parse_number(&cols[fat_col]),
            muscle_kg: parse_number(&cols[muscle_col]),
            visceral_fat: parse_number(&cols[visceral_col]),
            bmr_kcal: parse_number(&cols[bmr_col]),
            body_age: parse_number(&cols[age_col]),
            // The format has no memo column.
            memo: String::new(),
        });
    }

    Ok((records, errors))
}

/// Parse import text and classify it against the current store contents.
///
/// Same-date repeats within the batch are collapsed (last occurrence in
/// file order wins) and reported in `duplicate_dates`. The store snapshot
/// is taken once, here; a manual save landing between this call and the
/// eventual commit is an accepted race, not something the plan re-checks.
pub fn prepare_import(db: &Database, text: &str) -> Result<ImportPlan> {
    let decoded = csv_codec::decode(text);
    let (records, parse_errors) = map_rows(&decoded)?;

    let mut occurrences: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_date: BTreeMap<String, NewRecord> = BTreeMap::new();
    for rec in records {
        *occurrences.entry(rec.date.clone()).or_insert(0) += 1;
        by_date.insert(rec.date.clone(), rec);
    }
    let duplicate_dates: BTreeMap<String, usize> =
        occurrences.into_iter().filter(|&(_, n)| n > 1).collect();

    let existing: HashMap<String, _> = db
        .get_all()?
        .into_iter()
        .map(|r| (r.date.clone(), r))
        .collect();

    let mut new_records = Vec::new();
    let mut conflicts = Vec::new();
    for (date, incoming) in by_date {
        match existing.get(&date) {
            None => new_records.push(incoming),
            Some(current) => conflicts.push(Conflict {
                date,
                existing: current.clone(),
                incoming,
                resolution: Resolution::Overwrite,
            }),
        }
    }

    Ok(ImportPlan {
        new_records,
        conflicts,
        duplicate_dates,
        parse_errors,
    })
}

/// Commit a fully resolved plan in one all-or-nothing bulk upsert.
///
/// Refuses while any conflict is still `Undecided`. An `Overwrite` writes
/// the incoming record as a full payload replacement — absent values
/// overwrite present ones — with `created_at` kept from the stored record
/// and `updated_at` refreshed by the store. A `Skip` leaves the stored
/// record untouched.
pub fn commit_import(db: &Database, plan: &ImportPlan) -> Result<ImportSummary> {
    let undecided = plan.unresolved();
    if undecided > 0 {
        bail!("{undecided} conflict(s) still undecided; set each to overwrite or skip first");
    }

    let mut to_write = plan.new_records.clone();
    let mut updated = 0usize;
    let mut skipped = 0usize;
    for c in &plan.conflicts {
        match c.resolution {
            Resolution::Overwrite => {
                to_write.push(c.incoming.clone());
                updated += 1;
            }
            Resolution::Skip => skipped += 1,
            Resolution::Undecided => bail!("conflict for {} is undecided", c.date),
        }
    }

    db.upsert_many(&to_write)?;

    Ok(ImportSummary {
        added: plan.new_records.len(),
        updated,
        skipped,
        errors: plan.parse_errors.len(),
        duplicates: plan.duplicate_dates.len(),
    })
}

/// Run one import: parse, then either auto-commit (no conflicts) or hand
/// the open plan back for resolution. Cancelling is dropping the plan — by
/// construction nothing has been written yet.
pub fn import_csv(db: &Database, text: &str) -> Result<ImportOutcome> {
    let plan = prepare_import(db, text)?;
    if plan.has_conflicts() {
        Ok(ImportOutcome::NeedsResolution(plan))
    } else {
        let summary = commit_import(db, &plan)?;
        Ok(ImportOutcome::Committed(summary))
    }
}
