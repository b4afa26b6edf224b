use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use bodylog_core::models::Record;

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday")),
        },
    }
}

pub(crate) fn canonical(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// One decimal place, "-" for absent.
pub(crate) fn fmt1(v: Option<f64>) -> String {
    v.map_or("-".into(), |n| format!("{n:.1}"))
}

/// Whole number, "-" for absent.
pub(crate) fn fmt0(v: Option<f64>) -> String {
    v.map_or("-".into(), |n| format!("{n:.0}"))
}

/// Compact one-line rendering of a record's measurements, used in the
/// conflict listing and after saves.
pub(crate) fn measurement_line(
    weight: Option<f64>,
    bmi: Option<f64>,
    fat: Option<f64>,
    muscle: Option<f64>,
    visceral: Option<f64>,
    bmr: Option<f64>,
    age: Option<f64>,
) -> String {
    format!(
        "weight {} | BMI {} | fat {} | muscle {} | visceral {} | BMR {} | age {}",
        fmt1(weight),
        fmt1(bmi),
        fmt1(fat),
        fmt1(muscle),
        fmt1(visceral),
        fmt0(bmr),
        fmt0(age)
    )
}

pub(crate) fn record_line(r: &Record) -> String {
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

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_none() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2024-01-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(canonical(date), "2024-01-15");
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
        assert!(parse_date(Some("2024/01/15".to_string())).is_err());
    }

    #[test]
    fn test_fmt_absent() {
        assert_eq!(fmt1(None), "-");
        assert_eq!(fmt0(None), "-");
        assert_eq!(fmt1(Some(70.25)), "70.2");
        assert_eq!(fmt0(Some(1550.4)), "1550");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        // Should not panic on multi-byte characters
        assert_eq!(truncate("朝ランのあとに計測した", 8), "朝ランのあ...");
        assert_eq!(truncate("Müsli", 10), "Müsli");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
        assert_eq!(no_neg_zero(-3.0), -3.0);
    }
}
