//! Pure parsing of user-facing input: decimal SOL amounts and base58 addresses
//!
//! Nothing in this module touches the network. Amounts are converted with
//! `rust_decimal` so the SOL-to-lamport conversion is exact and deterministic;
//! sub-lamport remainders are truncated toward zero, never rounded up.

use crate::error::{FlowError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Convert a user-entered decimal SOL amount into lamports.
///
/// Fails on empty, non-numeric, or negative input. Fractional lamports are
/// truncated: `"0.0000000019"` yields 1 lamport.
pub fn parse_amount(text: &str) -> Result<u64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FlowError::InvalidAmount("amount is empty".to_string()));
    }

    let value = Decimal::from_str(trimmed)
        .map_err(|_| FlowError::InvalidAmount(format!("'{trimmed}' is not a number")))?;

    if value.is_sign_negative() {
        return Err(FlowError::InvalidAmount(
            "amount must not be negative".to_string(),
        ));
    }

    let lamports = value
        .checked_mul(Decimal::from(LAMPORTS_PER_SOL))
        .ok_or_else(|| {
            FlowError::InvalidAmount(format!("'{trimmed}' exceeds the representable range"))
        })?
        .trunc();

    lamports.to_u64().ok_or_else(|| {
        FlowError::InvalidAmount(format!("'{trimmed}' exceeds the representable range"))
    })
}

/// Decode a textual wallet address into a `Pubkey`.
///
/// Only structural validation (base58 alphabet, 32-byte length) is performed;
/// no network call checks that the account exists.
pub fn parse_address(text: &str) -> Result<Pubkey> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FlowError::InvalidAddress("address is empty".to_string()));
    }

    Pubkey::from_str(trimmed)
        .map_err(|e| FlowError::InvalidAddress(format!("'{trimmed}' is not a valid address: {e}")))
}

/// Form-field variant of [`parse_amount`]: blank input means "not provided"
/// rather than an error, so presence checks stay with the request builder.
pub fn parse_optional_amount(text: &str) -> Result<Option<u64>> {
    if text.trim().is_empty() {
        Ok(None)
    } else {
        parse_amount(text).map(Some)
    }
}

/// Form-field variant of [`parse_address`], see [`parse_optional_amount`].
pub fn parse_optional_address(text: &str) -> Result<Option<Pubkey>> {
    if text.trim().is_empty() {
        Ok(None)
    } else {
        parse_address(text).map(Some)
    }
}

/// Render a lamport amount as a decimal SOL string with trailing zeros
/// stripped (1_500_000_000 becomes "1.5").
pub fn format_sol(lamports: u64) -> String {
    (Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL))
        .normalize()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_and_fractional_sol_amounts() {
        assert_eq!(parse_amount("1.5").unwrap(), 1_500_000_000);
        assert_eq!(parse_amount("2").unwrap(), 2_000_000_000);
        assert_eq!(parse_amount("0.5").unwrap(), 500_000_000);
        assert_eq!(parse_amount("0").unwrap(), 0);
        assert_eq!(parse_amount(" 1.5 ").unwrap(), 1_500_000_000);
    }

    #[test]
    fn sub_lamport_remainders_truncate() {
        assert_eq!(parse_amount("0.000000001").unwrap(), 1);
        assert_eq!(parse_amount("0.0000000019").unwrap(), 1);
        assert_eq!(parse_amount("0.0000000009").unwrap(), 0);
        assert_eq!(parse_amount("1.9999999999").unwrap(), 1_999_999_999);
    }

    #[test]
    fn conversion_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(parse_amount("1.5").unwrap(), 1_500_000_000);
        }
    }

    #[test]
    fn malformed_amounts_are_rejected() {
        assert!(matches!(
            parse_amount(""),
            Err(FlowError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_amount("   "),
            Err(FlowError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_amount("abc"),
            Err(FlowError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_amount("-1"),
            Err(FlowError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_amount("1.5 SOL"),
            Err(FlowError::InvalidAmount(_))
        ));
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        // u64::MAX lamports is ~18.4 billion SOL
        assert!(parse_amount("20000000000").is_err());
    }

    #[test]
    fn addresses_round_trip_through_base58() {
        let pubkey = Pubkey::new_unique();
        assert_eq!(parse_address(&pubkey.to_string()).unwrap(), pubkey);
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        assert!(matches!(
            parse_address(""),
            Err(FlowError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_address("not-an-address"),
            Err(FlowError::InvalidAddress(_))
        ));
        // Valid base58 but the wrong length
        assert!(matches!(
            parse_address("abc123"),
            Err(FlowError::InvalidAddress(_))
        ));
    }

    #[test]
    fn optional_parsers_treat_blank_as_absent() {
        assert_eq!(parse_optional_amount("").unwrap(), None);
        assert_eq!(parse_optional_amount("  ").unwrap(), None);
        assert_eq!(parse_optional_amount("1.5").unwrap(), Some(1_500_000_000));
        assert!(parse_optional_amount("abc").is_err());

        assert_eq!(parse_optional_address("").unwrap(), None);
        assert!(parse_optional_address("garbage!").is_err());
    }

    #[test]
    fn sol_formatting_strips_trailing_zeros() {
        assert_eq!(format_sol(1_500_000_000), "1.5");
        assert_eq!(format_sol(1_000_000_000), "1");
        assert_eq!(format_sol(1), "0.000000001");
        assert_eq!(format_sol(0), "0");
    }
}
