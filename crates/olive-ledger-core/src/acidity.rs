//! # Acidity
//!
//! Fixed-point acidity percentages.
//!
//! Acidity is stored as an integer count of millionths of a percent so that
//! ordering and threshold checks stay exact and no floating point arithmetic
//! is needed. Values parse from and display as plain decimal text
//! (`"0.5"`, `"1.25"`, `"10"`). Human-readable inputs such as JSON may also
//! carry the value as a bare number; it is read back through its decimal text.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional decimal digits kept.
pub const ACIDITY_DECIMALS: usize = 6;

/// Scale factor between whole percent and stored units.
pub const ACIDITY_SCALE: i64 = 1_000_000;

/// Errors produced when parsing acidity text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcidityParseError {
    #[error("acidity value is empty")]
    Empty,

    #[error("acidity value '{0}' is not a decimal number")]
    Invalid(String),

    #[error("acidity value '{0}' has more than six fractional digits")]
    TooPrecise(String),

    #[error("acidity value '{0}' is out of range")]
    OutOfRange(String),
}

/// An acidity reading in percent, with six fractional digits of precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct Acidity(i64);

impl Acidity {
    /// Build from a raw count of millionths of a percent.
    #[must_use]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Build from a whole percentage.
    #[must_use]
    pub const fn from_percent(percent: i64) -> Self {
        Self(percent.saturating_mul(ACIDITY_SCALE))
    }
}

impl FromStr for Acidity {
    type Err = AcidityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(AcidityParseError::Empty);
        }

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(AcidityParseError::Invalid(text.to_string()));
        }
        if fraction.len() > ACIDITY_DECIMALS {
            return Err(AcidityParseError::TooPrecise(text.to_string()));
        }

        let out_of_range = || AcidityParseError::OutOfRange(text.to_string());

        let whole_units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| out_of_range())?
        };

        let mut fraction_units: i64 = 0;
        for position in 0..ACIDITY_DECIMALS {
            let digit = fraction
                .as_bytes()
                .get(position)
                .map(|b| i64::from(b - b'0'))
                .unwrap_or(0);
            fraction_units = fraction_units
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(out_of_range)?;
        }

        let magnitude = whole_units
            .checked_mul(ACIDITY_SCALE)
            .and_then(|v| v.checked_add(fraction_units))
            .ok_or_else(out_of_range)?;

        Ok(Self(if negative { -magnitude } else { magnitude }))
    }
}

impl fmt::Display for Acidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let scale = ACIDITY_SCALE.unsigned_abs();
        let whole = magnitude / scale;
        let fraction = magnitude % scale;

        if fraction == 0 {
            return write!(f, "{sign}{whole}");
        }

        let digits = format!("{fraction:0width$}", width = ACIDITY_DECIMALS);
        write!(f, "{sign}{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl From<Acidity> for String {
    fn from(value: Acidity) -> Self {
        value.to_string()
    }
}

/// Accepted wire shapes for self-describing formats.
#[derive(Deserialize)]
#[serde(untagged)]
enum AcidityWire {
    Text(String),
    Integer(i64),
    Number(f64),
}

impl<'de> Deserialize<'de> for Acidity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Binary formats cannot drive an untagged enum; they always carry text.
        if !deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            return text.parse().map_err(serde::de::Error::custom);
        }

        let text = match AcidityWire::deserialize(deserializer)? {
            AcidityWire::Text(text) => text,
            AcidityWire::Integer(value) => value.to_string(),
            // f64 Display is the shortest text that reads back to the same value.
            AcidityWire::Number(value) => value.to_string(),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// TESTS
// =============================================================================
