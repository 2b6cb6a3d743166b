//! tr-TR display formatting and markup escaping
//!
//! Locale is fixed: `.` groups thousands, `,` separates decimals.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Number, Value};

/// Escapes text for use inside element content
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Formats a number with tr-TR separators.
/// Fraction digits are trimmed down to `min_frac` after rounding to `max_frac`.
pub fn format_number_tr(value: f64, min_frac: usize, max_frac: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = format!("{:.*}", max_frac, value.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (rounded.clone(), String::new()),
    };

    let mut frac = frac_part;
    while frac.len() > min_frac && frac.ends_with('0') {
        frac.pop();
    }

    let grouped = group_thousands(&int_part);
    let is_zero = int_part.chars().all(|c| c == '0') && frac.chars().all(|c| c == '0');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{},{}", sign, grouped, frac)
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Default number style (up to 3 fraction digits)
pub fn format_number(value: f64) -> String {
    format_number_tr(value, 0, 3)
}

/// Turkish lira currency style: `₺1.234,50`
pub fn format_try_currency(value: f64) -> String {
    let body = format_number_tr(value.abs(), 2, 2);
    if value < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-₺{}", body)
    } else {
        format!("₺{}", body)
    }
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    for pattern in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// `15.03.2024`; None when the input is not a recognisable date
pub fn format_date_tr(value: &str) -> Option<String> {
    parse_datetime(value).map(|dt| dt.format("%d.%m.%Y").to_string())
}

/// `15.03.2024 14:30:00`
pub fn format_datetime_tr(value: &str) -> Option<String> {
    parse_datetime(value).map(|dt| dt.format("%d.%m.%Y %H:%M:%S").to_string())
}

/// `14:30:00`
pub fn format_time_tr(value: &str) -> Option<String> {
    if let Some(dt) = parse_datetime(value) {
        return Some(dt.format("%H:%M:%S").to_string());
    }
    // bare "HH:MM" / "HH:MM:SS" values from time inputs
    NaiveTime::parse_from_str(value.trim(), "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value.trim(), "%H:%M"))
        .ok()
        .map(|t| t.format("%H:%M:%S").to_string())
}

/// Integers print without a fraction, the way JS stringifies numbers
pub fn number_text(n: &Number) -> String {
    match n.as_i64() {
        Some(i) => i.to_string(),
        None => n.as_f64().map(|f| f.to_string()).unwrap_or_default(),
    }
}

/// Plain text of a JSON value as it would appear in an input; null is empty
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_grouping() {
        assert_eq!(format_number(1234567.0), "1.234.567");
        assert_eq!(format_number(1234.5), "1.234,5");
        assert_eq!(format_number(0.1234), "0,123");
        assert_eq!(format_number(-42.0), "-42");
        assert_eq!(format_number(999.0), "999");
    }

    #[test]
    fn test_currency() {
        assert_eq!(format_try_currency(1234.5), "₺1.234,50");
        assert_eq!(format_try_currency(0.0), "₺0,00");
        assert_eq!(format_try_currency(-10.0), "-₺10,00");
        assert_eq!(format_number_tr(2.0, 2, 2), "2,00");
    }

    #[test]
    fn test_dates() {
        assert_eq!(format_date_tr("2024-03-15").as_deref(), Some("15.03.2024"));
        assert_eq!(
            format_datetime_tr("2024-03-15T14:30:00").as_deref(),
            Some("15.03.2024 14:30:00")
        );
        assert_eq!(format_time_tr("09:05").as_deref(), Some("09:05:00"));
        assert_eq!(format_date_tr("not a date"), None);
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_value_text() {
        use serde_json::json;
        assert_eq!(value_text(&json!(40)), "40");
        assert_eq!(value_text(&json!(12.5)), "12.5");
        assert_eq!(value_text(&json!(null)), "");
        assert_eq!(value_text(&json!(true)), "true");
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!([])));
    }
}
