//! Italian-locale number, currency and date formatting
//!
//! `.` groups thousands and `,` separates decimals: `12.000,50`.

use crate::FormatError;
use chrono::NaiveDateTime;

/// Prefix of every formatted amount
pub const CURRENCY_PREFIX: &str = "€ ";

const THOUSANDS_SEPARATOR: char = '.';
const DECIMAL_SEPARATOR: char = ',';

/// Parse a number written with Italian separators
///
/// Whitespace is ignored anywhere, every `.` is a thousands separator and a
/// single `,` marks the decimals. An optional leading sign is accepted.
///
/// ```ignore
/// assert_eq!(parse_locale_number("12.000,50")?, 12000.5);
/// assert_eq!(parse_locale_number(" 6,45 ")?, 6.45);
/// ```
pub fn parse_locale_number(text: &str) -> Result<f64, FormatError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(FormatError::Empty);
    }

    let normalized: String = compact
        .chars()
        .filter(|&c| c != THOUSANDS_SEPARATOR)
        .map(|c| if c == DECIMAL_SEPARATOR { '.' } else { c })
        .collect();

    let digits = normalized
        .strip_prefix(['-', '+'])
        .unwrap_or(&normalized);
    let well_formed = digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if !well_formed {
        return Err(FormatError::InvalidNumber(text.trim().to_string()));
    }

    normalized
        .parse::<f64>()
        .map_err(|_| FormatError::InvalidNumber(text.trim().to_string()))
}

/// Format with a fixed number of decimals and Italian separators
///
/// Negative values that round to zero print without a sign.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((&rendered, ""));

    let is_zero = rendered.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    let grouped = group_thousands(int_part);
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}{DECIMAL_SEPARATOR}{frac_part}")
    }
}

/// Format an amount as `€ 12.000,00`
pub fn format_currency(value: f64) -> String {
    format!("{CURRENCY_PREFIX}{}", format_grouped(value, 2))
}

/// Format a rate as `6.45 %`
///
/// Rates keep the `.` decimal point, the way offers print them.
pub fn format_percent(value: f64) -> String {
    format!("{value:.2} %")
}

/// Format a term as `48 mesi`
pub fn format_months(months: u32) -> String {
    format!("{months} mesi")
}

/// Format a timestamp as `dd/mm/yy HH:MM`
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%d/%m/%y %H:%M").to_string()
}

/// Insert the thousands separator into a string of digits
fn group_thousands(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(THOUSANDS_SEPARATOR);
        }
        result.push(c);
    }

    result
}
