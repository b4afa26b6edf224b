use anyhow::Result;

use crate::models::Record;

/// The import/export column vocabulary, verbatim from the scale export
/// format. Header cells must match these tokens exactly; order in the file
/// does not matter for import.
pub const HEADERS: [&str; 8] = [
    "日付",
    "体重",
    "BMI",
    "体脂肪率",
    "筋肉量",
    "内臓脂肪",
    "基礎代謝量",
    "体内年齢",
];

/// Raw delimited text split into a header row and data rows.
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Decode raw CSV text.
///
/// Line endings are normalized first, blank lines (trailing ones included)
/// are dropped, and the first remaining line becomes the header. Fields are
/// trimmed after splitting. Never fails: malformed quoting degrades (an
/// unterminated quote consumes to end of line) and empty input yields an
/// empty header and no rows.
#[must_use]
pub fn decode(text: &str) -> Decoded {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = normalized.split('\n').filter(|l| !l.trim().is_empty());

    let Some(first) = lines.next() else {
        return Decoded::default();
    };
    Decoded {
        header: split_line(first),
        rows: lines.map(split_line).collect(),
    }
}

/// Split one line into trimmed fields. A quoted field may contain the
/// delimiter; `""` inside quotes is one literal quote.
#[must_use]
pub fn split_line(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;

    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    cur.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => out.push(std::mem::take(&mut cur)),
            _ => cur.push(ch),
        }
    }
    out.push(cur);

    out.into_iter().map(|f| f.trim().to_string()).collect()
}

/// Encode records as CSV, ascending by date, dates in the cosmetic
/// `YYYY/MM/DD` form and empty cells for absent values. The format has no
/// memo column.
pub fn encode(records: &[Record]) -> Result<String> {
    let mut sorted: Vec<&Record> = records.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));

    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(HEADERS)?;
    for r in sorted {
        wtr.write_record(&[
            r.date.replace('-', "/"),
            cell(r.weight_kg),
            cell(r.bmi),
            cell(r.body_fat_pct),
            cell(r.muscle_kg),
            cell(r.visceral_fat),
            cell(r.bmr_kcal),
            cell(r.body_age),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}

fn cell(v: Option<f64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_line_plain() {
        assert_eq!(split_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_line_trims_fields() {
        assert_eq!(split_line(" a , b ,c "), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_line_quoted_delimiter() {
        assert_eq!(split_line("\"a,b\",c"), vec!["a,b", "c"]);
    }

    #[test]
    fn test_split_line_escaped_quote() {
        assert_eq!(split_line("\"he said \"\"hi\"\"\",x"), vec![
            "he said \"hi\"",
            "x"
        ]);
    }

    #[test]
    fn test_split_line_unterminated_quote_consumes_to_eol() {
        assert_eq!(split_line("\"a,b"), vec!["a,b"]);
    }

    #[test]
    fn test_split_line_empty_fields() {
        assert_eq!(split_line("a,,c,"), vec!["a", "", "c", ""]);
    }

    #[test]
    fn test_decode_line_endings() {
        for text in ["h1,h2\r\n1,2\r\n", "h1,h2\r1,2\r", "h1,h2\n1,2\n"] {
            let d = decode(text);
            assert_eq!(d.header, vec!["h1", "h2"]);
            assert_eq!(d.rows, vec![vec!["1", "2"]]);
        }
    }

    #[test]
    fn test_decode_drops_blank_lines() {
        let d = decode("h1,h2\n\n1,2\n   \n3,4\n\n\n");
        assert_eq!(d.header, vec!["h1", "h2"]);
        assert_eq!(d.rows, vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn test_decode_empty_input() {
        let d = decode("");
        assert!(d.header.is_empty());
        assert!(d.rows.is_empty());

        let d = decode("\n\n  \n");
        assert!(d.header.is_empty());
        assert!(d.rows.is_empty());
    }

    fn sample_record(date: &str, weight: Option<f64>) -> Record {
        Record {
            date: date.to_string(),
            weight_kg: weight,
            bmi: Some(22.1),
            body_fat_pct: None,
            muscle_kg: Some(52.3),
            visceral_fat: Some(7.0),
            bmr_kcal: Some(1550.0),
            body_age: Some(29.0),
            memo: "never exported".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_encode_ascending_slash_dates() {
        let records = vec![
            sample_record("2024-01-16", Some(70.2)),
            sample_record("2024-01-15", Some(70.5)),
        ];
        let text = encode(&records).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], HEADERS.join(","));
        assert!(lines[1].starts_with("2024/01/15,70.5,"));
        assert!(lines[2].starts_with("2024/01/16,70.2,"));
    }

    #[test]
    fn test_encode_absent_as_empty_cell() {
        let text = encode(&[sample_record("2024-01-15", None)]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "2024/01/15,,22.1,,52.3,7,1550,29");
    }

    #[test]
    fn test_encode_decode_field_round_trip() {
        let text = encode(&[sample_record("2024-01-15", Some(70.5))]).unwrap();
        let d = decode(&text);
        assert_eq!(d.header, HEADERS);
        assert_eq!(d.rows.len(), 1);
        assert_eq!(d.rows[0][0], "2024/01/15");
        assert_eq!(d.rows[0][1], "70.5");
        assert_eq!(d.rows[0][3], "");
    }
}
