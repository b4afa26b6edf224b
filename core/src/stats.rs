use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::Record;

/// Trailing moving average over an optional series. Gaps are skipped; a
/// window with no values yields `None` at that position.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn moving_average(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        let mut sum = 0.0;
        let mut count = 0usize;
        for v in values[start..=i].iter().flatten() {
            sum += v;
            count += 1;
        }
        out.push(if count > 0 {
            Some(sum / count as f64)
        } else {
            None
        });
    }
    out
}

/// Keep records within `days` days counting back from `reference`
/// (inclusive). The reference date is a parameter, not a wall-clock read,
/// so callers decide whether "recent" means relative to today or to the
/// newest record.
#[must_use]
pub fn clip_to_recent(records: &[Record], days: i64, reference: &str) -> Vec<Record> {
    let Ok(end) = NaiveDate::parse_from_str(reference, "%Y-%m-%d") else {
        return records.to_vec();
    };
    let cutoff = end - Duration::days(days - 1);
    records
        .iter()
        .filter(|r| {
            NaiveDate::parse_from_str(&r.date, "%Y-%m-%d").is_ok_and(|d| d >= cutoff)
        })
        .cloned()
        .collect()
}

/// Case-insensitive memo substring filter. An empty query keeps everything.
#[must_use]
pub fn search_memo(records: &[Record], query: &str) -> Vec<Record> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| r.memo.to_lowercase().contains(&q))
        .cloned()
        .collect()
}

/// Headline numbers over the most recent entries: averages and min-max
/// spans over the last 7 records, and the weight delta against the 7
/// before those.
#[derive(Debug, Clone, Serialize)]
pub struct TrendSummary {
    pub latest: Record,
    pub avg_weight_7: Option<f64>,
    pub weight_delta_7: Option<f64>,
    pub weight_span_7: Option<f64>,
    pub avg_fat_7: Option<f64>,
    pub fat_span_7: Option<f64>,
}

/// `records` must be newest-first. Returns `None` when there is nothing to
/// summarize.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn trend_summary(records_desc: &[Record]) -> Option<TrendSummary> {
    let latest = records_desc.first()?.clone();

    let weights: Vec<f64> = records_desc
        .iter()
        .take(7)
        .filter_map(|r| r.weight_kg)
        .collect();
    let prev_weights: Vec<f64> = records_desc
        .iter()
        .skip(7)
        .take(7)
        .filter_map(|r| r.weight_kg)
        .collect();
    let fats: Vec<f64> = records_desc
        .iter()
        .take(7)
        .filter_map(|r| r.body_fat_pct)
        .collect();

    let avg = |xs: &[f64]| {
        if xs.is_empty() {
            None
        } else {
            Some(xs.iter().sum::<f64>() / xs.len() as f64)
        }
    };
    let span = |xs: &[f64]| {
        if xs.is_empty() {
            None
        } else {
            let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
            let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some(max - min)
        }
    };

    let avg_weight_7 = avg(&weights);
    let weight_delta_7 = match (avg_weight_7, avg(&prev_weights)) {
        (Some(a), Some(b)) => Some(a - b),
        _ => None,
    };

    Some(TrendSummary {
        latest,
        avg_weight_7,
        weight_delta_7,
        weight_span_7: span(&weights),
        avg_fat_7: avg(&fats),
        fat_span_7: span(&fats),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, weight: Option<f64>, fat: Option<f64>, memo: &str) -> Record {
        Record {
            date: date.to_string(),
            weight_kg: weight,
            bmi: None,
            body_fat_pct: fat,
            muscle_kg: None,
            visceral_fat: None,
            bmr_kcal: None,
            body_age: None,
            memo: memo.to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_moving_average_full_windows() {
        let values = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let ma = moving_average(&values, 2);
        assert_eq!(ma, vec![Some(1.0), Some(1.5), Some(2.5), Some(3.5)]);
    }

    #[test]
    fn test_moving_average_skips_gaps() {
        let values = vec![Some(1.0), None, Some(3.0)];
        let ma = moving_average(&values, 3);
        assert_eq!(ma[0], Some(1.0));
        assert_eq!(ma[1], Some(1.0));
        assert_eq!(ma[2], Some(2.0));
    }

    #[test]
    fn test_moving_average_all_gaps_is_none() {
        let values = vec![None, None];
        assert_eq!(moving_average(&values, 7), vec![None, None]);
    }

    #[test]
    fn test_clip_to_recent_inclusive_window() {
        let records = vec![
            record("2024-01-01", Some(70.0), None, ""),
            record("2024-01-05", Some(70.0), None, ""),
            record("2024-01-10", Some(70.0), None, ""),
        ];
        // 7 days back from 2024-01-10 keeps 01-04 and later.
        let clipped = clip_to_recent(&records, 7, "2024-01-10");
        let dates: Vec<&str> = clipped.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-05", "2024-01-10"]);
    }

    #[test]
    fn test_clip_to_recent_fixed_reference() {
        let records = vec![
            record("2024-01-01", Some(70.0), None, ""),
            record("2024-01-05", Some(70.0), None, ""),
        ];
        let clipped = clip_to_recent(&records, 3, "2024-01-03");
        let dates: Vec<&str> = clipped.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-05"]);
    }

    #[test]
    fn test_search_memo() {
        let records = vec![
            record("2024-01-01", None, None, "Morning Run"),
            record("2024-01-02", None, None, "rest day"),
        ];
        let hits = search_memo(&records, "run");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].date, "2024-01-01");

        assert_eq!(search_memo(&records, "").len(), 2);
        assert_eq!(search_memo(&records, "  ").len(), 2);
    }

    #[test]
    fn test_trend_summary_empty() {
        assert!(trend_summary(&[]).is_none());
    }

    #[test]
    fn test_trend_summary_averages_and_delta() {
        // 14 daily records, newest first: last 7 at 70 kg, previous 7 at 72 kg.
        let mut records = Vec::new();
        for day in (1..=14).rev() {
            let weight = if day > 7 { 70.0 } else { 72.0 };
            records.push(record(
                &format!("2024-01-{day:02}"),
                Some(weight),
                Some(18.0),
                "",
            ));
        }

        let summary = trend_summary(&records).unwrap();
        assert_eq!(summary.latest.date, "2024-01-14");
        assert!((summary.avg_weight_7.unwrap() - 70.0).abs() < 1e-9);
        assert!((summary.weight_delta_7.unwrap() - (-2.0)).abs() < 1e-9);
        assert!((summary.weight_span_7.unwrap() - 0.0).abs() < 1e-9);
        assert!((summary.avg_fat_7.unwrap() - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_summary_short_history_has_no_delta() {
        let records = vec![
            record("2024-01-02", Some(70.0), None, ""),
            record("2024-01-01", Some(71.0), None, ""),
        ];
        let summary = trend_summary(&records).unwrap();
        assert!((summary.avg_weight_7.unwrap() - 70.5).abs() < 1e-9);
        assert!(summary.weight_delta_7.is_none());
        assert!(summary.avg_fat_7.is_none());
    }

    #[test]
    fn test_trend_summary_latest_with_gaps() {
        let records = vec![
            record("2024-01-03", None, None, "forgot the scale"),
            record("2024-01-02", Some(70.0), None, ""),
        ];
        let summary = trend_summary(&records).unwrap();
        assert_eq!(summary.latest.date, "2024-01-03");
        assert!((summary.avg_weight_7.unwrap() - 70.0).abs() < 1e-9);
    }
}
