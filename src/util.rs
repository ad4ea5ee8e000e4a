// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use std::time::Duration;

use crate::constants::{AMOUNT_PRECISION, FIAT_PRECISION, NATIVE_DECIMALS, NATIVE_SYMBOL};

const TIMESPAN_UNITS: &[(u64, &str)] = &[
    (604_800, "week"),
    (86_400, "day"),
    (3_600, "hour"),
    (60, "minute"),
    (1, "second"),
];

const TIMESPAN_MAX_UNITS: usize = 3;

/// Exchange rate of the native asset against a fiat currency
#[derive(Debug, Clone, PartialEq)]
pub struct Fiat {
    pub rate: f64,
    pub currency: String,
}

impl Fiat {
    pub fn new<S>(rate: f64, currency: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            rate,
            currency: currency.into(),
        }
    }

    pub fn convert(&self, weis: u128) -> String {
        convert_fiat(weis, self.rate, &self.currency)
    }
}

fn round(value: f64, precision: i32) -> f64 {
    let factor: f64 = 10f64.powi(precision);
    (value * factor).round() / factor
}

/// Smallest-unit amount to native units, rounded to 5 decimals
pub fn convert_weis(weis: u128) -> f64 {
    round(
        weis as f64 / 10f64.powi(NATIVE_DECIMALS as i32),
        AMOUNT_PRECISION,
    )
}

pub fn format_weis(weis: u128) -> String {
    format!("{} {}", convert_weis(weis), NATIVE_SYMBOL)
}

pub fn convert_fiat(weis: u128, rate: f64, currency: &str) -> String {
    let converted: f64 = round(convert_weis(weis) * rate, FIAT_PRECISION);
    format!("{} {}", converted, currency)
}

/// Share of the payout threshold already reached. `None` when the pool
/// reports no threshold.
pub fn format_percentage(balance: u128, threshold: u128) -> Option<String> {
    if threshold == 0 {
        return None;
    }

    let percentage: f64 = balance as f64 * 100.0 / threshold as f64;
    Some(format!("{}%", round(percentage, 2)))
}

pub fn format_luck(luck: f64) -> String {
    format!("{}%", (luck * 100.0) as i64)
}

fn pluralize(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Human readable timespan, e.g. `1 hour, 2 minutes and 3 seconds`
pub fn format_timespan(duration: Duration) -> String {
    let mut remaining: u64 = duration.as_secs();

    if remaining == 0 {
        return pluralize(0, "second");
    }

    let mut parts: Vec<String> = Vec::new();
    for (size, unit) in TIMESPAN_UNITS.iter() {
        if remaining >= *size {
            let count: u64 = remaining / size;
            remaining %= size;
            parts.push(pluralize(count, unit));
        }
    }

    // Keep the most significant units only
    parts.truncate(TIMESPAN_MAX_UNITS);

    match parts.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} and {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}
