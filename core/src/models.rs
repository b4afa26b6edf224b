use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One measurement entry per calendar date.
///
/// The `date` (canonical `YYYY-MM-DD`) is the record's whole identity;
/// everything else is mutable payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: String,
    pub weight_kg: Option<f64>,
    pub bmi: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub muscle_kg: Option<f64>,
    pub visceral_fat: Option<f64>,
    pub bmr_kcal: Option<f64>,
    pub body_age: Option<f64>,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// A record payload without store timestamps — what the CSV mapper and the
/// `log` command produce, and what the store stamps on write.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewRecord {
    pub date: String,
    pub weight_kg: Option<f64>,
    pub bmi: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub muscle_kg: Option<f64>,
    pub visceral_fat: Option<f64>,
    pub bmr_kcal: Option<f64>,
    pub body_age: Option<f64>,
    pub memo: String,
}

// --- Import reconciliation types ---

/// Decision applied to one conflicting date before commit.
///
/// `Undecided` blocks commit until it is explicitly changed; it is never
/// treated as either of the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Overwrite,
    Skip,
    Undecided,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite => write!(f, "overwrite"),
            Self::Skip => write!(f, "skip"),
            Self::Undecided => write!(f, "undecided"),
        }
    }
}

/// An incoming record whose date already has a stored record.
#[derive(Debug, Clone, Serialize)]
pub struct Conflict {
    pub date: String,
    pub existing: Record,
    pub incoming: NewRecord,
    pub resolution: Resolution,
}

/// A data row that could not be decoded into a record. `line` is 1-based
/// over the blank-stripped input, with the header as line 1.
#[derive(Debug, Clone, Serialize)]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
}

/// The outcome of parsing one import file against a store snapshot.
///
/// A plan is a plain value: the caller threads it through resolution edits
/// into the final commit, or simply drops it to cancel. It is created fresh
/// per import and never merged with a prior one.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportPlan {
    pub new_records: Vec<NewRecord>,
    pub conflicts: Vec<Conflict>,
    /// Dates that appeared more than once in the batch, with their total
    /// occurrence counts. Diagnostic only — the last row already won.
    pub duplicate_dates: BTreeMap<String, usize>,
    pub parse_errors: Vec<ParseError>,
}

impl ImportPlan {
    #[must_use]
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Number of conflicts still `Undecided`.
    #[must_use]
    pub fn unresolved(&self) -> usize {
        self.conflicts
            .iter()
            .filter(|c| c.resolution == Resolution::Undecided)
            .count()
    }

    /// Set the resolution for one conflicting date. Returns false when the
    /// date is not among the plan's conflicts.
    pub fn set_resolution(&mut self, date: &str, resolution: Resolution) -> bool {
        match self.conflicts.iter_mut().find(|c| c.date == date) {
            Some(c) => {
                c.resolution = resolution;
                true
            }
            None => false,
        }
    }

    /// Apply one resolution to every conflict in the plan.
    pub fn resolve_all(&mut self, resolution: Resolution) {
        for c in &mut self.conflicts {
            c.resolution = resolution;
        }
    }
}

/// Final counts reported after a committed import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
    pub duplicates: usize,
}

/// What `import_csv` hands back: either the batch committed on its own
/// (no conflicts), or an open plan awaiting resolutions.
#[derive(Debug)]
pub enum ImportOutcome {
    Committed(ImportSummary),
    NeedsResolution(ImportPlan),
}

// --- Backup types ---

/// JSON backup envelope. `records` is required; the metadata fields are
/// tolerated missing so older backups restore cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupData {
    #[serde(default)]
    pub app: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub exported_at: String,
    pub records: Vec<Record>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict(date: &str) -> Conflict {
        Conflict {
            date: date.to_string(),
            existing: Record {
                date: date.to_string(),
                weight_kg: Some(70.0),
                bmi: None,
                body_fat_pct: None,
                muscle_kg: None,
                visceral_fat: None,
                bmr_kcal: None,
                body_age: None,
                memo: String::new(),
                created_at: String::new(),
                updated_at: String::new(),
            },
            incoming: NewRecord {
                date: date.to_string(),
                weight_kg: Some(71.0),
                ..NewRecord::default()
            },
            resolution: Resolution::Overwrite,
        }
    }

    #[test]
    fn test_set_resolution_known_date() {
        let mut plan = ImportPlan {
            conflicts: vec![conflict("2024-01-01"), conflict("2024-01-02")],
            ..ImportPlan::default()
        };
        assert!(plan.set_resolution("2024-01-02", Resolution::Skip));
        assert_eq!(plan.conflicts[0].resolution, Resolution::Overwrite);
        assert_eq!(plan.conflicts[1].resolution, Resolution::Skip);
    }

    #[test]
    fn test_set_resolution_unknown_date() {
        let mut plan = ImportPlan {
            conflicts: vec![conflict("2024-01-01")],
            ..ImportPlan::default()
        };
        assert!(!plan.set_resolution("1999-12-31", Resolution::Skip));
    }

    #[test]
    fn test_resolve_all_and_unresolved() {
        let mut plan = ImportPlan {
            conflicts: vec![conflict("2024-01-01"), conflict("2024-01-02")],
            ..ImportPlan::default()
        };
        assert_eq!(plan.unresolved(), 0);

        plan.resolve_all(Resolution::Undecided);
        assert_eq!(plan.unresolved(), 2);

        plan.resolve_all(Resolution::Skip);
        assert_eq!(plan.unresolved(), 0);
        assert!(
            plan.conflicts
                .iter()
                .all(|c| c.resolution == Resolution::Skip)
        );
    }

    #[test]
    fn test_resolution_display() {
        assert_eq!(Resolution::Overwrite.to_string(), "overwrite");
        assert_eq!(Resolution::Skip.to_string(), "skip");
        assert_eq!(Resolution::Undecided.to_string(), "undecided");
    }
}
