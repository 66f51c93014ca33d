use num_bigint::BigUint;
use num_traits::Zero;

use crate::errors::{ModelError, Result};

/// Smallest indivisible unit of the native token.
pub type Planck = BigUint;

/// Decimal places of the fixed-point pool reward counters.
pub const REWARD_COUNTER_DECIMALS: u32 = 18;

/// `10^18`, the scale of every reward counter.
pub fn reward_counter_unit() -> BigUint {
    BigUint::from(10u32).pow(REWARD_COUNTER_DECIMALS)
}

/// Parses a planck integer as the chain client renders it.
///
/// Thousands separators and surrounding whitespace are accepted; signs,
/// fractions and any other character are rejected.
pub fn parse_planck(raw: &str) -> Result<Planck> {
    let digits: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ModelError::InvalidAmount(raw.to_string()));
    }

    BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| ModelError::InvalidAmount(raw.to_string()))
}

/// Renders planck as a token amount with `units` decimals.
///
/// Exact: the value never passes through floating point. Trailing zeros of
/// the fraction are trimmed but at least one fractional digit is kept.
pub fn planck_to_unit(value: &Planck, units: u32) -> String {
    let digits = value.to_str_radix(10);
    let units = units as usize;

    let (whole, fraction) = if digits.len() > units {
        let (whole, fraction) = digits.split_at(digits.len() - units);
        (whole.to_string(), fraction.to_string())
    } else {
        ("0".to_string(), format!("{digits:0>units$}"))
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Converts a decimal token amount into planck.
pub fn unit_to_planck(raw: &str, units: u32) -> Result<Planck> {
    let trimmed = raw.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if fraction.len() > units as usize {
        return Err(ModelError::TooManyDecimals {
            found: fraction.len(),
            units,
        });
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ModelError::InvalidAmount(raw.to_string()));
    }

    let whole = if whole.is_empty() && !fraction.is_empty() {
        Planck::zero()
    } else {
        parse_planck(whole).map_err(|_| ModelError::InvalidAmount(raw.to_string()))?
    };

    let padded = format!("{fraction:0<width$}", width = units as usize);
    let fraction = if padded.is_empty() {
        Planck::zero()
    } else {
        parse_planck(&padded)?
    };

    Ok(whole * BigUint::from(10u32).pow(units) + fraction)
}
