//! Display formatting shared by the step views (en-US conventions)

use chrono::{DateTime, FixedOffset};
use skybook_gateway::Money;

/// Longest formatted card number: 16 digits in four groups
pub const CARD_NUMBER_MAX_LEN: usize = 19;
/// Longest expiry input (`MM/YY`)
pub const EXPIRY_MAX_LEN: usize = 5;
/// Longest CVV input
pub const CVV_MAX_LEN: usize = 4;

/// Format an amount the way `Intl.NumberFormat('en-US', { style: 'currency' })` would
///
/// Known symbols are prefixed directly (`$1,234.50`); yen has no minor unit and is
/// rounded to whole units. Any other code is written out (`CHF 1,234.50`).
#[must_use]
pub fn price(amount: Money, currency: &str) -> String {
    let code = currency.trim().to_ascii_uppercase();
    match code.as_str() {
        "USD" => format!("${}", decimal(amount)),
        "EUR" => format!("€{}", decimal(amount)),
        "GBP" => format!("£{}", decimal(amount)),
        "JPY" => {
            let rounded = amount.whole() + u64::from(amount.fraction() >= 50);
            format!("¥{}", group_thousands(rounded))
        }
        _ => format!("{code} {}", decimal(amount)),
    }
}

fn decimal(amount: Money) -> String {
    format!("{}.{:02}", group_thousands(amount.whole()), amount.fraction())
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `390` → `6h 30m`
#[must_use]
pub fn duration(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Local wall-clock time at the airport, `08:05 AM`
#[must_use]
pub fn time(at: &DateTime<FixedOffset>) -> String {
    at.format("%I:%M %p").to_string()
}

/// `Non-stop`, `1 stop`, `2 stops`
#[must_use]
pub fn stops(count: u32) -> String {
    match count {
        0 => "Non-stop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{n} stops"),
    }
}

/// Placeholder badge for airlines without a logo: first two letters, upper-cased
#[must_use]
pub fn airline_badge(airline: &str) -> String {
    airline.chars().take(2).flat_map(char::to_uppercase).collect()
}

/// `42 seats left`
#[must_use]
pub fn seats_left(count: u32) -> String {
    if count == 1 {
        "1 seat left".to_string()
    } else {
        format!("{count} seats left")
    }
}

/// Group card number input into blocks of four, capped at [`CARD_NUMBER_MAX_LEN`]
///
/// Whitespace in the input is discarded before grouping, so re-formatting an already
/// formatted number is a no-op.
#[must_use]
pub fn card_number(input: &str) -> String {
    let cleaned: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    let grouped = cleaned
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");
    cap(&grouped, CARD_NUMBER_MAX_LEN)
}

/// Truncate to at most `max` characters
#[must_use]
pub fn cap(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}
