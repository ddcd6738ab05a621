//! Cell-level parsing shared by the loader and the enrichment step.

use chrono::{NaiveDate, NaiveDateTime};

/// Cell spellings treated as null when reading flat extracts.
pub const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#NA", "<NA>", "N/A", "NA", "n/a", "NULL", "null", "NaN", "nan", "-NaN", "-nan",
    "None",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Trim a raw cell and map null markers to `None`.
pub fn clean_cell(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if NULL_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed)
    }
}

/// Parse a calendar date. Unparseable input yields `None`, never an error.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = clean_cell(raw)?;

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Parse a finite decimal number.
pub fn parse_number(raw: &str) -> Option<f64> {
    clean_cell(raw)?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Canonical text form of a join key.
///
/// Integral numbers lose their fractional part so that `"12"` and `"12.0"`
/// (a float-typed extract of the same key) compare equal.
pub fn normalize_key(raw: &str) -> Option<String> {
    let raw = clean_cell(raw)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
            Some(format!("{}", v as i64))
        }
        _ => Some(raw.to_string()),
    }
}

/// Zero-padded `YYYY-MM` period of a date.
pub fn year_month(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Text form of a number as used for grouping and display keys.
pub fn number_text(v: f64) -> String {
    format!("{}", v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2013, 1, 29).unwrap();
        assert_eq!(parse_date("2013-01-29"), Some(expected));
        assert_eq!(parse_date("2013/01/29"), Some(expected));
        assert_eq!(parse_date("01/29/2013"), Some(expected));
        assert_eq!(parse_date("2013-01-29 00:00:00"), Some(expected));
        assert_eq!(parse_date(" 2013-01-29T10:15:00 "), Some(expected));
    }

    #[test]
    fn test_parse_date_invalid_is_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2013-13-40"), None);
        assert_eq!(parse_date("NaN"), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("12.5"), Some(12.5));
        assert_eq!(parse_number(" -3 "), Some(-3.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("nan"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("12"), Some("12".to_string()));
        assert_eq!(normalize_key("12.0"), Some("12".to_string()));
        assert_eq!(normalize_key(" AW00011000 "), Some("AW00011000".to_string()));
        assert_eq!(normalize_key("1.5"), Some("1.5".to_string()));
        assert_eq!(normalize_key(""), None);
        assert_eq!(normalize_key("NA"), None);
    }

    #[test]
    fn test_year_month_is_zero_padded() {
        let d = NaiveDate::from_ymd_opt(2012, 3, 7).unwrap();
        assert_eq!(year_month(d), "2012-03");
    }
}
