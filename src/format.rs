//! Currency formatting for chart axes.

/// Format `value` as currency: two decimals, comma-grouped thousands, and a
/// leading `-` ahead of the symbol for negative amounts.
///
/// ```rust
/// use kiosk_metrics::format::format_currency;
/// assert_eq!(format_currency(1234.5, "$"), "$1,234.50");
/// assert_eq!(format_currency(-42.0, "€"), "-€42.00");
/// ```
pub fn format_currency(value: f64, symbol: &str) -> String {
    if !value.is_finite() {
        return String::new();
    }

    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{symbol}{grouped}.{cents}")
}

/// Plain axis text for values without a formatter: integers print without a
/// fractional part, everything else as-is.
pub fn format_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
