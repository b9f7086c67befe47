//! Price normalization into DZD.
//!
//! Listings quote prices in mixed currencies and formats ("45000 DA",
//! "45,000 DZD", "$340", "320€"). Everything is converted into whole
//! Algerian dinars using configured rates.

use std::sync::LazyLock;

use regex::Regex;
use rigmate_shared::{RatesConfig, Result, RigmateError};

/// Numeric amount with optional thousands separators and decimal part.
static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| {
        Regex::new(r"(\d{1,3}(?:[,.\s]\d{3})+(?:[.,]\d{1,2})?|\d+(?:[.,]\d{1,2})?)").unwrap()
    });

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Currency {
    Dzd,
    Usd,
    Eur,
}

fn detect_currency(text: &str) -> Currency {
    let lower = text.to_lowercase();
    if lower.contains('$') || lower.contains("usd") {
        Currency::Usd
    } else if lower.contains('€') || lower.contains("eur") {
        Currency::Eur
    } else {
        // "DA", "DZD", or no marker at all; local listings rarely label DZD.
        Currency::Dzd
    }
}

/// Parse a raw price string and convert it to whole DZD.
pub fn normalize_price(raw: &str, rates: &RatesConfig) -> Result<u64> {
    let captured = AMOUNT_RE
        .find(raw)
        .ok_or_else(|| RigmateError::parse(format!("no numeric amount in price {raw:?}")))?;

    let amount = parse_amount(captured.as_str())
        .ok_or_else(|| RigmateError::parse(format!("unreadable amount in price {raw:?}")))?;
    if amount <= 0.0 {
        return Err(RigmateError::parse(format!("non-positive price {raw:?}")));
    }

    let dzd = match detect_currency(raw) {
        Currency::Dzd => amount,
        Currency::Usd => amount * rates.usd_to_dzd,
        Currency::Eur => amount * rates.eur_to_dzd,
    };
    Ok(dzd.round() as u64)
}

/// Parse an amount that may use `,`, `.`, or spaces as thousands separators.
/// A trailing group of 1-2 digits after `.` or `,` is a decimal part; a
/// group of exactly 3 digits is a thousands group.
fn parse_amount(s: &str) -> Option<f64> {
    let mut digits = String::with_capacity(s.len());
    let groups: Vec<&str> = s.split(['.', ',', ' ']).collect();

    for (i, group) in groups.iter().enumerate() {
        let is_last = i == groups.len() - 1;
        if is_last && i > 0 && group.len() < 3 {
            digits.push('.');
        }
        digits.push_str(group);
    }
    digits.parse().ok()
}
