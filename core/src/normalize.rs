use chrono::NaiveDate;

/// Formats tried after the two fast paths, in order. Covers the date styles
/// seen in scale exports and hand-edited files.
const DATE_FORMATS: [&str; 3] = ["%Y年%m月%d日", "%Y.%m.%d", "%m/%d/%Y"];

/// Canonicalize heterogeneous date text to `YYYY-MM-DD`.
///
/// Pure and total: every input maps to either a well-formed canonical date
/// string or `None`, and canonical output passes through unchanged, so the
/// function is idempotent on its own output.
#[must_use]
pub fn normalize_date(input: &str) -> Option<String> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    // Already canonical, possibly with a time suffix (old backups carry
    // ISO datetimes). Digit-shape check only.
    if let Some(iso) = iso_date_prefix(s) {
        return Some(iso.to_string());
    }

    // YYYY/M/D with 1-2 digit month/day, slash or hyphen separated.
    if let Some(padded) = pad_ymd(s) {
        return Some(padded);
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }
    None
}

fn iso_date_prefix(s: &str) -> Option<&str> {
    let b = s.as_bytes();
    if b.len() < 10 {
        return None;
    }
    let shape_ok = b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[7] == b'-'
        && b[8..10].iter().all(u8::is_ascii_digit);
    if shape_ok { s.get(..10) } else { None }
}

fn pad_ymd(s: &str) -> Option<String> {
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());

    let parts: Vec<&str> = s.split(['/', '-']).collect();
    if parts.len() != 3 {
        return None;
    }
    if parts[0].len() != 4 || parts[1].len() > 2 || parts[2].len() > 2 {
        return None;
    }
    if !parts.iter().all(|p| all_digits(p)) {
        return None;
    }

    let y: i32 = parts[0].parse().ok()?;
    let m: u32 = parts[1].parse().ok()?;
    let d: u32 = parts[2].parse().ok()?;
    if !(1900..=2100).contains(&y) || !(1..=12).contains(&m) || !(1..=31).contains(&d) {
        return None;
    }
    Some(format!("{y:04}-{m:02}-{d:02}"))
}

/// Parse optional numeric text. Empty or whitespace-only input is absent
/// (not zero, not an error); anything that does not parse to a finite
/// number is likewise absent.
#[must_use]
pub fn parse_number(input: &str) -> Option<f64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    match s.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => None,
    }
}
