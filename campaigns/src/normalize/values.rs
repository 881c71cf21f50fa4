// campaigns/src/normalize/values.rs
//
// Cell coercion. Nothing here fails: a cell that cannot be read becomes
// absent and the engine decides what absence means for each field.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Layouts tried, in order, when no explicit time format is configured.
const INFER_FORMATS: &[&str] = &[
    "%m.%d.%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d-%b-%Y %H:%M:%S",
];

const INFER_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m.%d.%Y"];

/// Cell texts spreadsheet exports use for "no value". Matched exactly.
const MISSING_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Trimmed cell text, or `None` when blank or a missing-value token.
pub fn clean(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim)
        .filter(|s| !s.is_empty() && !MISSING_TOKENS.contains(s))
}

pub fn parse_timestamp(cell: &str, format: Option<&str>) -> Option<NaiveDateTime> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    match format {
        Some(fmt) => NaiveDateTime::parse_from_str(cell, fmt).ok(),
        None => infer_timestamp(cell),
    }
}

fn infer_timestamp(cell: &str) -> Option<NaiveDateTime> {
    // Offsets are dropped: windows are compared in the wall-clock time the
    // appliance exported.
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.naive_local());
    }
    INFER_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(cell, fmt).ok())
        .or_else(|| {
            INFER_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Non-negative finite number. Thousands separators are accepted.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn explicit_format() {
        let ts = parse_timestamp("03.15.2024 13:45:10", Some("%m.%d.%Y %H:%M:%S")).unwrap();
        assert_eq!((ts.month(), ts.day(), ts.hour(), ts.second()), (3, 15, 13, 10));
        assert!(parse_timestamp("2024-03-15 13:45:10", Some("%m.%d.%Y %H:%M:%S")).is_none());
        assert!(parse_timestamp("   ", Some("%m.%d.%Y %H:%M:%S")).is_none());
    }

    #[test]
    fn inferred_formats() {
        assert!(parse_timestamp("2024-03-15 13:45:10", None).is_some());
        assert!(parse_timestamp("2024-03-15T13:45:10Z", None).is_some());
        assert!(parse_timestamp("03/15/2024 13:45", None).is_some());
        let midnight = parse_timestamp("2024-03-15", None).unwrap();
        assert_eq!(midnight.hour(), 0);
        assert!(parse_timestamp("yesterday", None).is_none());
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_number("1,250"), Some(1250.0));
        assert_eq!(parse_number(" 3.5 "), Some(3.5));
        assert_eq!(parse_number("-1"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("n/a"), None);
    }

    #[test]
    fn clean_cells() {
        assert_eq!(clean(Some("  x ")), Some("x"));
        assert_eq!(clean(Some("   ")), None);
        assert_eq!(clean(None), None);
        for token in ["N/A", " NULL ", "null", "NaN", "None", "#N/A", "<NA>", "NA"] {
            assert_eq!(clean(Some(token)), None, "token={:?}", token);
        }
        // Case matters: only the exact spellings are missing markers.
        assert_eq!(clean(Some("none")), Some("none"));
        assert_eq!(clean(Some("Null")), Some("Null"));
    }
}
