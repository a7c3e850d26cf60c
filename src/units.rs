// src/units.rs
//! Conversion between wei (base unit) and ether (display unit).

use crate::error::{Result, StakingError};
use alloy_primitives::U256;
use std::str::FromStr;

/// Fractional digits of the display unit
pub const DISPLAY_DECIMALS: usize = 18;

const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// Parse a decimal ether string into wei.
///
/// Accepts digits with an optional single `.`; no sign, no exponent,
/// at most 18 fractional digits.
pub fn to_base_unit(display_amount: &str) -> Result<U256> {
    let amount = display_amount.trim();
    if amount.is_empty() {
        return Err(StakingError::InvalidAmount("amount is empty".to_string()));
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(StakingError::InvalidAmount(format!("'{}' has no digits", amount)));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(StakingError::InvalidAmount(format!("'{}' is not a decimal number", amount)));
    }
    if fraction.len() > DISPLAY_DECIMALS {
        return Err(StakingError::InvalidAmount(format!(
            "'{}' has more than {} decimal places",
            amount, DISPLAY_DECIMALS
        )));
    }

    let too_large = || StakingError::InvalidAmount(format!("'{}' is too large", amount));

    let whole_wei = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str(whole).map_err(|_| too_large())?
    };

    let padded = format!("{:0<width$}", fraction, width = DISPLAY_DECIMALS);
    let fraction_wei = U256::from_str(&padded).map_err(|_| too_large())?;

    whole_wei
        .checked_mul(U256::from(WEI_PER_ETHER))
        .and_then(|w| w.checked_add(fraction_wei))
        .ok_or_else(too_large)
}

/// Format wei as an exact ether string with trailing zeros trimmed
/// (`1500000000000000000` -> `"1.5"`, `0` -> `"0"`).
pub fn to_display_unit(base_amount: U256) -> String {
    let (whole, fraction) = split(base_amount);
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0>width$}", fraction, width = DISPLAY_DECIMALS);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Ether string truncated to at most `max_decimals` fractional digits, for balances.
pub fn format_display(base_amount: U256, max_decimals: usize) -> String {
    let (whole, fraction) = split(base_amount);
    let digits = format!("{:0>width$}", fraction, width = DISPLAY_DECIMALS);
    let shown = digits[..max_decimals.min(DISPLAY_DECIMALS)].trim_end_matches('0');
    if shown.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, shown)
    }
}

fn split(base_amount: U256) -> (U256, u64) {
    let unit = U256::from(WEI_PER_ETHER);
    // remainder is always below 10^18 and fits a u64
    (base_amount / unit, (base_amount % unit).to::<u64>())
}
