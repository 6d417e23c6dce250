//! Brazilian-locale formatting for amounts, counts and period labels.

use chrono::NaiveDate;

/// Parses `YYYYMM`, `YYYY/MM` or `YYYY-MM` into the first day of that month.
pub fn parse_period(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    let (year, month) = match label.split_once(['/', '-']) {
        Some((year, month)) => (year, month),
        None if label.len() == 6 && label.is_char_boundary(4) => label.split_at(4),
        None => return None,
    };
    if year.len() != 4 || month.is_empty() || month.len() > 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// `202503`, `2025/03` and `2025-03` all become `03/2025`. Unrecognized
/// labels are returned unchanged.
pub fn period_label(label: &str) -> String {
    match parse_period(label) {
        Some(date) => date.format("%m/%Y").to_string(),
        None => label.to_string(),
    }
}

fn group_thousands(mut value: u64) -> String {
    let mut groups = Vec::new();
    loop {
        groups.push(value % 1000);
        value /= 1000;
        if value == 0 {
            break;
        }
    }
    let mut out = groups.pop().map(|g| g.to_string()).unwrap_or_default();
    for group in groups.iter().rev() {
        out.push_str(&format!(".{group:03}"));
    }
    out
}

/// `1234.5` -> `1.234,50`.
fn decimal(value: f64) -> String {
    if !value.is_finite() {
        return "0,00".to_string();
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{},{:02}", group_thousands(cents / 100), cents % 100)
}

/// `R$ 1.234,56`
pub fn currency(value: f64) -> String {
    format!("R$ {}", decimal(value))
}

/// Always signed: `+1.234,56`, `-50,00`, `+0,00`.
pub fn signed_amount(value: f64) -> String {
    let body = decimal(value);
    if body.starts_with('-') {
        body
    } else {
        format!("+{body}")
    }
}

/// Dashboard style: `R$ 45Mil`, `R$ 1,2Mi`, or the full amount below a
/// thousand. With `show_sign`, positive values get a `+`.
pub fn compact_currency(value: f64, show_sign: bool) -> String {
    if value == 0.0 || !value.is_finite() {
        return "R$ 0,00".to_string();
    }
    let sign = if show_sign && value > 0.0 { "+" } else { "" };
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        let millions = format!("{:.1}", value / 1_000_000.0).replace('.', ",");
        format!("R$ {sign}{millions}Mi")
    } else if magnitude >= 1_000.0 {
        format!("R$ {sign}{:.0}Mil", value / 1_000.0)
    } else {
        format!("R$ {sign}{}", decimal(value))
    }
}

/// `+2`, `-1`, and plain `0`.
pub fn signed_count(value: i64) -> String {
    if value == 0 {
        "0".to_string()
    } else {
        format!("{value:+}")
    }
}
