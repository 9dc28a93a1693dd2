//! Cash amounts travel as `Decimal` and are stored as integer cents.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Fraction digits kept for a cash amount.
pub const AMOUNT_SCALE: u32 = 2;

/// Parse a non-negative amount with at most two fraction digits.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let amount = Decimal::from_str(input.trim()).ok()?;
    if amount.is_sign_negative() || amount.scale() > AMOUNT_SCALE {
        return None;
    }
    Some(amount)
}

pub fn to_cents(amount: Decimal) -> Option<i64> {
    amount.checked_mul(Decimal::ONE_HUNDRED)?.to_i64()
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, AMOUNT_SCALE)
}
