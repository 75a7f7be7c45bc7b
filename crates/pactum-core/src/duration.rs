//! Duration literals such as `5s`, `1h30m` or `1.5ms`.
//!
//! A literal is a sequence of decimal numbers, each with an optional
//! fraction and a mandatory unit suffix. Valid units are `ns`, `us`
//! (`µs`/`μs`), `ms`, `s`, `m` and `h`. The bare literal `0` is accepted
//! without a unit. Negative literals are rejected since
//! [`std::time::Duration`] is unsigned.

use std::time::Duration;

use thiserror::Error;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const MAX_FRACTION_DIGITS: usize = 18;

/// Errors produced by [`parse_duration`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    /// The literal is malformed.
    #[error("invalid duration \"{0}\"")]
    Invalid(String),

    /// The literal is negative.
    #[error("negative duration \"{0}\"")]
    Negative(String),

    /// A number is not followed by a unit.
    #[error("missing unit in duration \"{0}\"")]
    MissingUnit(String),

    /// A unit suffix is not recognized.
    #[error("unknown unit \"{unit}\" in duration \"{input}\"")]
    UnknownUnit {
        /// The unrecognized unit.
        unit: String,
        /// The full literal.
        input: String,
    },

    /// The literal does not fit in 2^63 - 1 nanoseconds.
    #[error("duration \"{0}\" out of range")]
    Overflow(String),
}

/// Parses a duration literal.
///
/// ```
/// use std::time::Duration;
/// use pactum_core::parse_duration;
///
/// assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
/// assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
/// assert_eq!(parse_duration("1.5ms").unwrap(), Duration::from_micros(1500));
/// assert!(parse_duration("5").is_err());
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let invalid = || DurationParseError::Invalid(input.to_string());

    let mut rest = input;
    if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    } else if rest.starts_with('-') {
        return Err(DurationParseError::Negative(input.to_string()));
    }

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (whole, after_whole) = rest.split_at(int_len);
        rest = after_whole;

        let mut fraction = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            fraction = &after_dot[..frac_len];
            rest = &after_dot[frac_len..];
        }
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (unit, after_unit) = rest.split_at(unit_len);
        rest = after_unit;

        let scale = unit_scale(unit).ok_or_else(|| {
            if unit.is_empty() {
                DurationParseError::MissingUnit(input.to_string())
            } else {
                DurationParseError::UnknownUnit {
                    unit: unit.to_string(),
                    input: input.to_string(),
                }
            }
        })?;

        let overflow = || DurationParseError::Overflow(input.to_string());
        let whole_value: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let mut nanos = whole_value.checked_mul(scale).ok_or_else(overflow)?;

        if !fraction.is_empty() {
            let digits = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
            let numerator: u128 = digits.parse().map_err(|_| invalid())?;
            let denominator = 10u128.pow(u32::try_from(digits.len()).map_err(|_| invalid())?);
            nanos = nanos
                .checked_add(numerator * scale / denominator)
                .ok_or_else(overflow)?;
        }

        total = total.checked_add(nanos).ok_or_else(overflow)?;
        if total > i64::MAX as u128 {
            return Err(overflow());
        }
    }

    u64::try_from(total)
        .map(Duration::from_nanos)
        .map_err(|_| DurationParseError::Overflow(input.to_string()))
}

fn unit_scale(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "\u{b5}s" | "\u{3bc}s" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SECOND),
        "m" => Some(60 * NANOS_PER_SECOND),
        "h" => Some(3600 * NANOS_PER_SECOND),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_simple_units() {
        assert_eq!(parse_duration("300ms").unwrap(), Duration::from_millis(300));
        assert_eq!(parse_duration("10us").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("10µs").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("42ns").unwrap(), Duration::from_nanos(42));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
    }

    #[test]
    fn test_compound_and_fractional() {
        assert_eq!(
            parse_duration("2h45m30.5s").unwrap(),
            Duration::from_millis((2 * 3600 + 45 * 60 + 30) * 1000 + 500)
        );
        assert_eq!(parse_duration(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("+1m").unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn test_zero() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("0s").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse_duration(""),
            Err(DurationParseError::Invalid(String::new()))
        );
        assert!(matches!(
            parse_duration("-5s"),
            Err(DurationParseError::Negative(_))
        ));
        assert!(matches!(
            parse_duration("5"),
            Err(DurationParseError::MissingUnit(_))
        ));
        assert!(matches!(
            parse_duration("5d"),
            Err(DurationParseError::UnknownUnit { ref unit, .. }) if unit == "d"
        ));
        assert!(matches!(
            parse_duration("s"),
            Err(DurationParseError::Invalid(_))
        ));
        assert!(matches!(
            parse_duration("9999999999999h"),
            Err(DurationParseError::Overflow(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_whole_seconds(secs in 0u64..1_000_000_000) {
            prop_assert_eq!(parse_duration(&format!("{secs}s")).unwrap(), Duration::from_secs(secs));
        }

        #[test]
        fn prop_hours_minutes_seconds(h in 0u64..1000, m in 0u64..60, s in 0u64..60) {
            let literal = format!("{h}h{m}m{s}s");
            prop_assert_eq!(
                parse_duration(&literal).unwrap(),
                Duration::from_secs(h * 3600 + m * 60 + s)
            );
        }
    }
}
