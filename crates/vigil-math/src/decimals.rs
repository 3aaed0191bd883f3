//! Decimal rescaling between fixed-point precisions.
//!
//! Scaling up is exact. Scaling down truncates the excess digits, so a value
//! scaled down and back up may lose at most one unit of the lower precision.

use ruint::aliases::U256;

use crate::{MathError, Result};

/// Largest power of ten representable in 256 bits.
pub const MAX_DECIMALS: u8 = 77;

/// `10^exp` as a 256-bit integer.
///
/// # Errors
///
/// - [`MathError::DecimalsOutOfRange`] if `exp` exceeds [`MAX_DECIMALS`]
pub fn pow10(exp: u8) -> Result<U256> {
    if exp > MAX_DECIMALS {
        return Err(MathError::DecimalsOutOfRange { decimals: exp });
    }
    let ten = U256::from(10u64);
    let mut value = U256::from(1u64);
    for _ in 0..exp {
        value = value.checked_mul(ten).ok_or(MathError::Overflow)?;
    }
    Ok(value)
}

/// Rescale `value` from `from` decimals to `to` decimals.
///
/// # Errors
///
/// - [`MathError::DecimalsOutOfRange`] if either precision exceeds [`MAX_DECIMALS`]
/// - [`MathError::Overflow`] if scaling up does not fit in 256 bits
pub fn rescale(value: U256, from: u8, to: u8) -> Result<U256> {
    for decimals in [from, to] {
        if decimals > MAX_DECIMALS {
            return Err(MathError::DecimalsOutOfRange { decimals });
        }
    }
    if to >= from {
        let factor = pow10(to - from)?;
        value.checked_mul(factor).ok_or(MathError::Overflow)
    } else {
        let factor = pow10(from - to)?;
        Ok(value / factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u128) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_pow10() {
        assert_eq!(pow10(0), Ok(u(1)));
        assert_eq!(pow10(18), Ok(u(1_000_000_000_000_000_000)));
        assert!(pow10(MAX_DECIMALS).is_ok());
        assert_eq!(
            pow10(78),
            Err(MathError::DecimalsOutOfRange { decimals: 78 })
        );
    }

    #[test]
    fn test_scale_up_is_exact() {
        // 399 with 8 decimals -> 18 decimals
        let native = u(39_900_000_000);
        let scaled = rescale(native, 8, 18).expect("scale up");
        assert_eq!(scaled, u(399_000_000_000_000_000_000));
        assert_eq!(rescale(scaled, 18, 8), Ok(native));
    }

    #[test]
    fn test_scale_down_truncates() {
        assert_eq!(rescale(u(1_999), 3, 0), Ok(u(1)));
        assert_eq!(rescale(u(123_456_789), 8, 6), Ok(u(1_234_567)));
    }

    #[test]
    fn test_round_trip_down_then_up_within_one_unit() {
        let original = u(987_654_321_987);
        let down = rescale(original, 12, 5).expect("down");
        let back = rescale(down, 5, 12).expect("up");
        let unit = pow10(7).expect("unit");
        assert!(back <= original);
        assert!(original - back < unit);
    }

    #[test]
    fn test_same_precision_is_identity() {
        assert_eq!(rescale(u(42), 8, 8), Ok(u(42)));
    }

    #[test]
    fn test_scale_up_overflow() {
        assert_eq!(rescale(U256::MAX, 0, 1), Err(MathError::Overflow));
    }
}
