//! Full-precision multiply-then-divide.
//!
//! `a * b` is formed in 512 bits so the product never overflows before the
//! division; only the final quotient has to fit in 256 bits.

use ruint::aliases::{U256, U512};

use crate::{MathError, Result};

/// Rounding direction for the final quotient.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    /// Truncate toward zero.
    Down,
    /// Round away from zero when there is a remainder.
    Up,
}

/// Compute `a * b / denominator` with a 512-bit intermediate.
///
/// # Errors
///
/// - [`MathError::DivisionByZero`] if `denominator` is zero
/// - [`MathError::Overflow`] if the quotient exceeds 256 bits
pub fn mul_div(a: U256, b: U256, denominator: U256, rounding: Rounding) -> Result<U256> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    let product = U512::from(a) * U512::from(b);
    let (quotient, remainder) = product.div_rem(U512::from(denominator));

    let bytes: [u8; 64] = quotient.to_le_bytes();
    if bytes[32..].iter().any(|b| *b != 0) {
        return Err(MathError::Overflow);
    }
    let mut low = [0u8; 32];
    low.copy_from_slice(&bytes[..32]);
    let quotient = U256::from_le_bytes(low);

    match rounding {
        Rounding::Up if !remainder.is_zero() => quotient
            .checked_add(U256::from(1u64))
            .ok_or(MathError::Overflow),
        _ => Ok(quotient),
    }
}
