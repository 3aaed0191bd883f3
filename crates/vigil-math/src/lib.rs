//! # vigil-math
//!
//! Fixed-point arithmetic used by the price adapters.
//!
//! ## Modules
//!
//! - [`full_math`] — 512-bit intermediate `mul_div` with explicit rounding
//! - [`tick_math`] — tick to Q64.96 sqrt price, bit-compatible with Uniswap V3
//! - [`decimals`] — decimal rescaling between precisions (truncating)

pub mod decimals;
pub mod full_math;
pub mod tick_math;

pub use ruint::aliases::{U256, U512};

pub use decimals::{pow10, rescale};
pub use full_math::{mul_div, Rounding};
pub use tick_math::{sqrt_ratio_at_tick, tick_to_price_x10_18};

/// Error types for fixed-point operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    /// Denominator of a division is zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Result does not fit in 256 bits.
    #[error("arithmetic overflow")]
    Overflow,

    /// Tick lies outside `[MIN_TICK, MAX_TICK]`.
    #[error("tick {tick} out of range")]
    TickOutOfRange {
        /// The rejected tick.
        tick: i64,
    },

    /// Decimal precision too large to scale within 256 bits.
    #[error("decimals out of range: {decimals}")]
    DecimalsOutOfRange {
        /// The rejected precision.
        decimals: u8,
    },
}

/// Convenience result type for math operations.
pub type Result<T> = std::result::Result<T, MathError>;
