//! Display-unit / base-unit conversion
//!
//! Amounts cross the facade boundary as decimal strings in ether and are
//! carried everywhere else as `U256` wei. Conversion is exact integer math;
//! fractional digits past the base-unit exponent are truncated, never rounded.

use crate::error::{Result, SyncError};
use alloy_primitives::U256;

/// Decimal exponent of the chain's native currency (1 ether = 10^18 wei)
pub const BASE_UNIT_EXPONENT: usize = 18;

fn unit_scale() -> U256 {
    U256::from(10u64).pow(U256::from(BASE_UNIT_EXPONENT))
}

/// Split a numeral into its integer and fractional digit runs.
///
/// Accepts `"12"`, `"12.5"`, `".5"` and `"12."`. Anything else (signs,
/// exponents, whitespace, separators, a lone `"."`) is rejected.
fn split_numeral(input: &str) -> Result<(&str, &str)> {
    let (int_part, frac_part) = match input.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (input, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(SyncError::InvalidAmount(format!("{:?} is not a number", input)));
    }
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(SyncError::InvalidAmount(format!(
            "{:?} is not a non-negative decimal numeral",
            input
        )));
    }

    Ok((int_part, frac_part))
}

fn parse_digits(digits: &str, input: &str) -> Result<U256> {
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10)
        .map_err(|_| SyncError::InvalidAmount(format!("{:?} is out of range", input)))
}

/// Convert a display amount (e.g. `"1.5"`) into base units.
pub fn to_base_units(display: &str) -> Result<U256> {
    let (int_part, frac_part) = split_numeral(display)?;

    // Truncate excess precision
    let frac_part = &frac_part[..frac_part.len().min(BASE_UNIT_EXPONENT)];
    let padded = format!("{:0<width$}", frac_part, width = BASE_UNIT_EXPONENT);

    let whole = parse_digits(int_part, display)?;
    let fraction = parse_digits(&padded, display)?;

    whole
        .checked_mul(unit_scale())
        .and_then(|scaled| scaled.checked_add(fraction))
        .ok_or_else(|| SyncError::InvalidAmount(format!("{:?} is out of range", display)))
}

/// Convert base units into the canonical display string.
///
/// Zero renders as `"0"`, whole amounts carry no decimal point, and the
/// fraction never has trailing zeros.
pub fn to_display_units(base: U256) -> String {
    let scale = unit_scale();
    let whole = base / scale;
    let fraction = base % scale;

    if fraction.is_zero() {
        return whole.to_string();
    }

    let frac_digits = format!("{:0>width$}", fraction.to_string(), width = BASE_UNIT_EXPONENT);
    format!("{}.{}", whole, frac_digits.trim_end_matches('0'))
}

/// Canonical rendering of a display amount, after truncation.
pub fn canonical_form(display: &str) -> Result<String> {
    to_base_units(display).map(to_display_units)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(s: &str) -> U256 {
        U256::from_str_radix(s, 10).unwrap()
    }

    #[test]
    fn test_whole_and_fractional_amounts() {
        assert_eq!(to_base_units("1").unwrap(), wei("1000000000000000000"));
        assert_eq!(to_base_units("1.5").unwrap(), wei("1500000000000000000"));
        assert_eq!(to_base_units("0.000000000000000001").unwrap(), U256::from(1u64));
        assert_eq!(to_base_units(".25").unwrap(), wei("250000000000000000"));
        assert_eq!(to_base_units("7.").unwrap(), wei("7000000000000000000"));
        assert_eq!(to_base_units("0").unwrap(), U256::ZERO);
    }

    #[test]
    fn test_rejects_non_numerals() {
        for input in ["-1", "abc", "", ".", "1.2.3", "1e18", " 1", "1 ", "+1", "1,5", "0x10"] {
            assert!(
                matches!(to_base_units(input), Err(SyncError::InvalidAmount(_))),
                "expected InvalidAmount for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_excess_precision_truncates() {
        // 19th digit is dropped even when it would round up
        assert_eq!(
            to_base_units("0.0000000000000000019").unwrap(),
            U256::from(1u64)
        );
        assert_eq!(
            to_base_units("1.9999999999999999999999").unwrap(),
            wei("1999999999999999999")
        );
        assert_eq!(to_base_units("0.0000000000000000009").unwrap(), U256::ZERO);
    }

    #[test]
    fn test_overflow_is_invalid() {
        let huge = "9".repeat(80);
        assert!(matches!(to_base_units(&huge), Err(SyncError::InvalidAmount(_))));
    }

    #[test]
    fn test_display_canonical_form() {
        assert_eq!(to_display_units(U256::ZERO), "0");
        assert_eq!(to_display_units(wei("1500000000000000000")), "1.5");
        assert_eq!(to_display_units(wei("2000000000000000000")), "2");
        assert_eq!(to_display_units(U256::from(1u64)), "0.000000000000000001");
        assert_eq!(
            to_display_units(U256::MAX / unit_scale() * unit_scale()),
            (U256::MAX / unit_scale()).to_string()
        );
    }

    #[test]
    fn test_round_trip_matches_canonical_form() {
        let cases = [
            ("1.5", "1.5"),
            ("001.500", "1.5"),
            ("0.0", "0"),
            ("000", "0"),
            (".1", "0.1"),
            ("42.", "42"),
            ("123456789.123456789123456789", "123456789.123456789123456789"),
            ("0.100000000000000000", "0.1"),
        ];
        for (input, expected) in cases {
            let base = to_base_units(input).unwrap();
            assert_eq!(to_display_units(base), expected, "input {:?}", input);
            assert_eq!(canonical_form(input).unwrap(), expected);
        }
    }
}
