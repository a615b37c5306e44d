//! Poll interval parsing.
//!
//! Intervals are configured as duration strings: one or more
//! `<decimal><unit>` groups with an optional sign, e.g. `300ms`, `1.5h`,
//! `2h45m`. Units are `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_POLL_INTERVAL: &str = "5m";

/// A validated, strictly positive poll interval.
///
/// Keeps the raw string so log lines show what the operator typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollInterval {
    raw: String,
    duration: Duration,
}

impl PollInterval {
    /// Intervals shorter than this burn through API rate limits quickly.
    pub const AGGRESSIVE_BELOW: Duration = Duration::from_secs(60);

    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let raw = input.trim();
        let (negative, duration) =
            parse_duration(raw).map_err(|reason| ConfigError::InvalidDuration {
                input: raw.to_string(),
                reason,
            })?;
        if negative || duration.is_zero() {
            return Err(ConfigError::NonPositiveInterval {
                input: raw.to_string(),
            });
        }
        Ok(Self {
            raw: raw.to_string(),
            duration,
        })
    }

    pub fn as_duration(&self) -> Duration {
        self.duration
    }

    pub fn is_aggressive(&self) -> bool {
        self.duration < Self::AGGRESSIVE_BELOW
    }
}

impl FromStr for PollInterval {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PollInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.fmt(f)
    }
}

/// Parse a duration string into its sign and magnitude.
pub fn parse_duration(input: &str) -> Result<(bool, Duration), String> {
    let mut s = input;
    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    if s == "0" {
        return Ok((negative, Duration::ZERO));
    }
    if s.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut total: u128 = 0;
    while !s.is_empty() {
        let int_len = s.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, rest) = s.split_at(int_len);
        s = rest;

        let mut frac_digits = "";
        if let Some(rest) = s.strip_prefix('.') {
            let frac_len = rest.bytes().take_while(u8::is_ascii_digit).count();
            frac_digits = &rest[..frac_len];
            s = &rest[frac_len..];
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(format!("expected a number in '{input}'"));
        }

        let unit_len = s
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(s.len());
        let (unit, rest) = s.split_at(unit_len);
        s = rest;
        if unit.is_empty() {
            return Err(format!("missing unit in '{input}'"));
        }
        let scale = unit_nanos(unit).ok_or_else(|| format!("unknown unit '{unit}'"))?;

        let whole: u128 = if int_digits.is_empty() {
            0
        } else {
            int_digits
                .parse()
                .map_err(|_| format!("number too large in '{input}'"))?
        };
        let mut value = whole
            .checked_mul(scale)
            .ok_or_else(|| format!("duration overflows in '{input}'"))?;

        if !frac_digits.is_empty() {
            // Digits past nanosecond precision of the largest unit are noise.
            let digits = &frac_digits[..frac_digits.len().min(18)];
            let numerator: u128 = digits
                .parse()
                .map_err(|_| format!("invalid fraction in '{input}'"))?;
            let denominator = 10u128.pow(digits.len() as u32);
            value += numerator * scale / denominator;
        }

        total = total
            .checked_add(value)
            .ok_or_else(|| format!("duration overflows in '{input}'"))?;
    }

    let nanos = u64::try_from(total).map_err(|_| format!("duration overflows in '{input}'"))?;
    Ok((negative, Duration::from_nanos(nanos)))
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 60 * 60 * 1_000_000_000,
        _ => return None,
    };
    Some(nanos)
}
