//! # vigil-types
//!
//! Shared domain types used across the Vigil workspace: source identities,
//! raw round data as reported by a round-based feed, and the normalized
//! price observation every adapter produces.

pub mod address;
pub mod observation;

pub use address::{Address, AddressError};
pub use observation::{PriceObservation, RoundData};

/// 256-bit unsigned integer used for fixed-point prices.
pub use ruint::aliases::U256;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Highest native precision a round-based source may declare.
pub const MAX_SOURCE_DECIMALS: u8 = 18;

/// Precision of every price derived from a pool TWAP.
pub const TWAP_DECIMALS: u8 = 18;

/// Default TWAP lookback window in seconds (30 minutes).
pub const DEFAULT_TWAP_WINDOW_SECS: u32 = 1800;
