//! Tick to price conversion.
//!
//! A tick `t` encodes the price `1.0001^t`. The square root of that price is
//! computed in Q64.96 by binary decomposition of `|t|` with precomputed
//! Q128.128 factors `sqrt(1.0001)^-(2^i)`, inverting at the end for positive
//! ticks. The factors and rounding are the ones used by Uniswap V3, so the
//! result is bit-identical to what a pool-side consumer computes.

use ruint::aliases::U256;

use crate::full_math::{mul_div, Rounding};
use crate::{MathError, Result};

/// Smallest tick whose price fits the Q64.96 range.
pub const MIN_TICK: i32 = -887_272;

/// Largest tick whose price fits the Q64.96 range.
pub const MAX_TICK: i32 = 887_272;

/// Number of fractional bits in a Q64.96 value.
pub const RESOLUTION_96: usize = 96;

/// One ether worth of wei, the 18-decimal fixed-point unit.
const ONE_E18: u64 = 1_000_000_000_000_000_000;

/// `sqrt(1.0001)^-1` in Q128.128, applied when bit 0 of `|tick|` is set.
const RATIO_BIT_0: u128 = 0xfffcb933bd6fad37aa2d162d1a594001;

/// `sqrt(1.0001)^-(2^i)` in Q128.128 for bits 1 through 19 of `|tick|`.
const RATIO_BITS: [u128; 19] = [
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x9aa508b5b7a84e1c677de54f3e99bc9,
    0x5d6af8dedb81196699c329225ee604,
    0x2216e584f5fa1ea926041bedfe98,
    0x48a170391f7dc42444e8fa2,
];

/// `2^96`, the Q64.96 unit.
pub fn q96() -> U256 {
    U256::from(1u64) << RESOLUTION_96
}

/// Compute `sqrt(1.0001^tick) * 2^96`, rounded up.
///
/// # Errors
///
/// - [`MathError::TickOutOfRange`] if `tick` is outside `[MIN_TICK, MAX_TICK]`
pub fn sqrt_ratio_at_tick(tick: i32) -> Result<U256> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::TickOutOfRange {
            tick: i64::from(tick),
        });
    }
    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 1 != 0 {
        U256::from(RATIO_BIT_0)
    } else {
        U256::from(1u64) << 128usize
    };
    for (i, factor) in RATIO_BITS.iter().enumerate() {
        if abs_tick & (2u32 << i) != 0 {
            ratio = (ratio * U256::from(*factor)) >> 128usize;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up so the result never understates the price.
    let truncated = ratio >> 32usize;
    let remainder = ratio & U256::from(u32::MAX);
    if remainder.is_zero() {
        Ok(truncated)
    } else {
        Ok(truncated + U256::from(1u64))
    }
}

/// Square a Q64.96 sqrt price into a Q96 price.
pub fn price_x96_from_sqrt(sqrt_price_x96: U256) -> Result<U256> {
    mul_div(sqrt_price_x96, sqrt_price_x96, q96(), Rounding::Down)
}

/// Convert a Q96 value into an 18-decimal fixed-point integer (truncating).
pub fn x96_to_x10_18(value_x96: U256) -> Result<U256> {
    mul_div(value_x96, U256::from(ONE_E18), q96(), Rounding::Down)
}

/// Price `1.0001^tick` as an 18-decimal fixed-point integer.
///
/// # Examples
///
/// ```
/// use vigil_math::tick_to_price_x10_18;
/// use vigil_math::U256;
///
/// let one = tick_to_price_x10_18(0).unwrap();
/// assert_eq!(one, U256::from(1_000_000_000_000_000_000u64));
/// ```
pub fn tick_to_price_x10_18(tick: i32) -> Result<U256> {
    let sqrt_price_x96 = sqrt_ratio_at_tick(tick)?;
    x96_to_x10_18(price_x96_from_sqrt(sqrt_price_x96)?)
}
