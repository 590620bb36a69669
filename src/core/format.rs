//! Text formatting for prices, changes and timestamps

use crate::core::units::currency_symbol;
use chrono::{DateTime, TimeZone};

/// Formats `amount` with the symbol of `currency`, abbreviating large values
/// and widening precision for sub-cent values.
pub fn format_currency(amount: f64, currency: &str) -> String {
    let symbol = currency_symbol(currency);
    if amount >= 1e12 {
        format!("{symbol}{:.2}T", amount / 1e12)
    } else if amount >= 1e9 {
        format!("{symbol}{:.2}B", amount / 1e9)
    } else if amount >= 1e6 {
        format!("{symbol}{:.2}M", amount / 1e6)
    } else if amount >= 1000.0 {
        format!("{symbol}{}", format_grouped(amount, 2))
    } else if amount < 0.01 {
        format!("{symbol}{amount:.8}")
    } else {
        format!("{symbol}{amount:.2}")
    }
}

pub fn format_change(change: f64) -> String {
    let prefix = if change >= 0.0 { "+" } else { "" };
    format!("{prefix}{change:.2}%")
}

/// Fixed `decimals` with comma separated thousands, e.g. `1,234,567.89`.
pub fn format_grouped(amount: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, amount.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    // Rounding can turn a tiny negative value into zero; keep the sign off it.
    if amount < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        grouped.push('-');
    }
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}

/// Last-updated text, e.g. `12/02/2025, 03:45 PM`.
pub fn format_timestamp<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    timestamp.format("%m/%d/%Y, %I:%M %p").to_string()
}
