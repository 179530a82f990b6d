// Utility helpers for parsing cells, basic statistics and KPI formatting.
//
// This module centralizes the "dirty" CSV/number/date handling so the rest
// of the code can assume clean, typed values.
use crate::types::{KpiValue, Style};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Cell spellings read as missing values, the same set spreadsheet and
/// dataframe exports commonly produce.
const NULL_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-nan", "NULL", "null", "None", "#N/A", "<NA>",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Trim a raw CSV cell and map the usual null spellings to `None`.
pub fn clean_cell(s: &str) -> Option<&str> {
    let s = s.trim();
    if NULL_TOKENS.contains(&s) {
        None
    } else {
        Some(s)
    }
}

/// Parse a non-null cell as a number.
///
/// - Boolean spellings (`True`/`False`, any case) become `1.0`/`0.0` so flag
///   columns can be averaged into rates.
/// - Values with thousands separators are *not* numbers; a column holding
///   them is read as text, the same way a dataframe reader would.
/// - Spelled-out infinities are rejected; anything else `f64` accepts is kept.
pub fn parse_number(s: &str) -> Option<f64> {
    if s.eq_ignore_ascii_case("true") {
        return Some(1.0);
    }
    if s.eq_ignore_ascii_case("false") {
        return Some(0.0);
    }
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Parse a non-null cell as a timestamp. Date-only values land on midnight,
/// offsets are normalised to UTC.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Arithmetic mean; NaN for an empty slice, like a dataframe mean over an
/// empty column.
pub fn average(v: &[f64]) -> f64 {
    if v.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Quantile with linear interpolation between closest ranks. `sorted` must be
/// ascending; NaN for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn non_finite(n: f64) -> Option<&'static str> {
    if n.is_nan() {
        Some("nan")
    } else if n == f64::INFINITY {
        Some("inf")
    } else if n == f64::NEG_INFINITY {
        Some("-inf")
    } else {
        None
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    if let Some(s) = non_finite(n) {
        return s.to_string();
    }
    let neg = n.is_sign_negative();
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        // Past `u128::MAX` (about 3.4e38) group the printed digits directly.
        Err(_) => group_digits(int_part),
    };
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Fixed decimals without separators.
pub fn format_fixed(n: f64, decimals: usize) -> String {
    match non_finite(n) {
        Some(s) => s.to_string(),
        None => format!("{:.*}", decimals, n),
    }
}

/// A ratio rendered as percentage points with two decimals (`0.1234` → `12.34%`).
pub fn format_percent(ratio: f64) -> String {
    format!("{}%", format_fixed(ratio * 100.0, 2))
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Render a computed KPI value in its display style.
pub fn format_kpi(value: &KpiValue, style: &Style) -> String {
    match (value, style) {
        (KpiValue::Label(s), _) => s.clone(),
        (KpiValue::Number(n), Style::Label) => format_fixed(*n, 0),
        (KpiValue::Number(n), Style::Integer) => match non_finite(*n) {
            Some(s) => s.to_string(),
            None => format!("{}", n.trunc() as i64),
        },
        (KpiValue::Number(n), Style::Percent) => format_percent(*n),
        (
            KpiValue::Number(n),
            Style::Number {
                decimals,
                grouped,
                prefix,
                suffix,
            },
        ) => {
            let body = if *grouped {
                format_number(*n, *decimals)
            } else {
                format_fixed(*n, *decimals)
            };
            format!("{prefix}{body}{suffix}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_tokens_are_missing() {
        assert_eq!(clean_cell("  "), None);
        assert_eq!(clean_cell("NaN"), None);
        assert_eq!(clean_cell(" 12 "), Some("12"));
    }

    #[test]
    fn numbers_accept_flags_and_exponents() {
        assert_eq!(parse_number("True"), Some(1.0));
        assert_eq!(parse_number("false"), Some(0.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("-2.5"), Some(-2.5));
        assert_eq!(parse_number("1,200"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("north"), None);
    }

    #[test]
    fn timestamps_in_common_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|d| d.and_hms_opt(14, 30, 0))
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-05 14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05 14:30"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T16:30:00+02:00"), Some(expected));
        assert_eq!(
            parse_timestamp("03/05/2024"),
            NaiveDate::from_ymd_opt(2024, 3, 5).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-45"), None);
    }

    #[test]
    fn grouped_numbers() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(1234.4, 0), "1,234");
        assert_eq!(format_number(-9876.54, 1), "-9,876.5");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(f64::NAN, 0), "nan");
    }

    #[test]
    fn grouped_numbers_beyond_u128() {
        assert_eq!(
            format_number(2f64.powi(130), 2),
            "1,361,129,467,683,753,853,853,498,429,727,072,845,824.00"
        );
        assert_eq!(
            format_number(-5e40, 0),
            "-50,000,000,000,000,000,310,004,322,520,389,159,747,584"
        );
    }

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(format_percent(0.25), "25.00%");
        assert_eq!(format_percent(0.1236), "12.36%");
        assert_eq!(format_percent(1.0), "100.00%");
        assert_eq!(format_percent(f64::NAN), "nan%");
    }

    #[test]
    fn quantiles_interpolate() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), 1.0);
        assert_eq!(quantile(&v, 0.25), 1.75);
        assert_eq!(quantile(&v, 1.0), 4.0);
        assert_eq!(quantile(&[1.0, 2.0, 3.0], 0.5), 2.0);
        assert!(average(&[]).is_nan());
    }

    #[test]
    fn kpi_styles() {
        let currency = Style::Number {
            decimals: 0,
            grouped: true,
            prefix: "$",
            suffix: "",
        };
        assert_eq!(format_kpi(&KpiValue::Number(12345.6), &currency), "$12,346");
        assert_eq!(format_kpi(&KpiValue::Number(-1234.0), &currency), "$-1,234");
        let fee = Style::Number {
            decimals: 1,
            grouped: false,
            prefix: "$",
            suffix: "",
        };
        assert_eq!(format_kpi(&KpiValue::Number(1234.56), &fee), "$1234.6");
        assert_eq!(format_kpi(&KpiValue::Number(7.9), &Style::Integer), "7");
        assert_eq!(
            format_kpi(&KpiValue::Label("Instagram".into()), &Style::Label),
            "Instagram"
        );
    }
}
