//! # vigil-oracle
//!
//! Trust-bounded price feeds over untrusted external sources.
//!
//! Two source shapes are supported: a round-keyed push feed (an aggregator
//! publishing `latestRoundData()`) and a cumulative-tick pull feed (a pool
//! answering `observe()`). Each is wrapped by a [`source::SourceAdapter`] that
//! normalizes readings into a [`vigil_types::PriceObservation`]. The cached
//! [`facade::PriceFeed`] admits observations only when their timestamp strictly
//! advances and serves the last accepted value; [`staleness`] classifies how
//! old that value is.
//!
//! ## Modules
//!
//! - [`source`] — source capabilities and the adapter trait
//! - [`round_feed`] — adapter over a round-based aggregator
//! - [`twap_pool`] — adapter deriving a TWAP from pool tick cumulatives
//! - [`staleness`] — Fresh / StaleUsable / Expired classification
//! - [`cache`] — strict-monotonic commit of accepted observations
//! - [`history`] — bounded ring of accepted observations and their TWAP
//! - [`facade`] — the cached price feed consumers read from
//! - [`pool_feed`] — the stateless pool-backed price feed
//! - [`config`] — TOML configuration
//! - [`stub`] — scripted in-memory sources

pub mod cache;
pub mod config;
pub mod facade;
pub mod history;
pub mod pool_feed;
pub mod round_feed;
pub mod source;
pub mod staleness;
pub mod stub;
pub mod twap_pool;

pub use facade::{ExpiredPolicy, FeedSettings, FreezeReason, PriceFeed, PriceFeedView};
pub use pool_feed::PoolPriceFeed;
pub use round_feed::RoundFeedAdapter;
pub use source::{PoolSource, RoundSource, SourceAdapter, SourceError};
pub use staleness::{Freshness, StalenessGuard};
pub use twap_pool::TwapPoolAdapter;

use vigil_math::MathError;
use vigil_types::{Address, Timestamp};

/// Broad category of an [`OracleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad construction parameters. Fatal, never recovered.
    Configuration,
    /// The source returned unusable data for this call only.
    SourceData,
    /// The candidate observation did not advance time.
    Ordering,
    /// The cached value may not be served under the configured policy.
    Serving,
}

/// Error types for oracle operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// Source precision outside the supported range.
    #[error("source decimals {decimals} outside [0, {max}]")]
    InvalidDecimals {
        /// Declared precision.
        decimals: u8,
        /// Highest accepted precision.
        max: u8,
    },

    /// Normal interval is longer than the liveness timeout.
    #[error("normal interval {normal_interval}s exceeds liveness timeout {liveness_timeout}s")]
    InvalidIntervals {
        /// Fresh boundary in seconds.
        normal_interval: u64,
        /// Expiry boundary in seconds.
        liveness_timeout: u64,
    },

    /// The source address holds no contract code.
    #[error("source {0} is not a contract")]
    NotAContract(Address),

    /// Malformed or inconsistent configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The source reported a zero or negative price.
    #[error("invalid price: {0}")]
    InvalidPrice(i128),

    /// The latest round has not completed (`updated_at == 0`).
    #[error("round {round_id} is incomplete")]
    IncompleteRound {
        /// Id of the incomplete round.
        round_id: u128,
    },

    /// The pool cannot cover the requested lookback window.
    #[error("insufficient history: need {required}s, have {available}s")]
    InsufficientHistory {
        /// Seconds of history requested.
        required: u64,
        /// Seconds of history available.
        available: u64,
    },

    /// The observation claims a time later than the current time.
    #[error("observation at {observed_at} is ahead of current time {now}")]
    FutureTimestamp {
        /// Timestamp reported by the source.
        observed_at: Timestamp,
        /// Current time.
        now: Timestamp,
    },

    /// The source answered with something that does not match its interface.
    #[error("failed to decode source response: {0}")]
    Decode(String),

    /// The source did not answer.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// Fixed-point conversion failed.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Candidate timestamp does not strictly advance past the cached one.
    #[error("non-advancing timestamp: {candidate} <= {last}")]
    NonAdvancingTimestamp {
        /// Timestamp of the rejected observation.
        candidate: Timestamp,
        /// Timestamp of the cached observation.
        last: Timestamp,
    },

    /// The cached price is older than the liveness timeout.
    #[error("price expired: age {age}s exceeds liveness timeout {liveness_timeout}s")]
    Expired {
        /// Age of the cached observation.
        age: u64,
        /// Configured liveness timeout.
        liveness_timeout: u64,
    },
}

impl OracleError {
    /// The taxonomy category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OracleError::InvalidDecimals { .. }
            | OracleError::InvalidIntervals { .. }
            | OracleError::NotAContract(_)
            | OracleError::InvalidConfig(_) => ErrorKind::Configuration,
            OracleError::InvalidPrice(_)
            | OracleError::IncompleteRound { .. }
            | OracleError::InsufficientHistory { .. }
            | OracleError::FutureTimestamp { .. }
            | OracleError::Decode(_)
            | OracleError::SourceUnavailable(_)
            | OracleError::Math(_) => ErrorKind::SourceData,
            OracleError::NonAdvancingTimestamp { .. } => ErrorKind::Ordering,
            OracleError::Expired { .. } => ErrorKind::Serving,
        }
    }

    /// Short revert code used by existing on-chain consumers, where one exists.
    pub fn legacy_code(&self) -> Option<&'static str> {
        match self {
            OracleError::NonAdvancingTimestamp { .. } => Some("CPF_NU"),
            OracleError::NotAContract(_) => Some("UPF_PANC"),
            _ => None,
        }
    }
}

/// Convenience result type for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;
