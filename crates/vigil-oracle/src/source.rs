//! Source capabilities.
//!
//! [`RoundSource`] and [`PoolSource`] describe the two external interfaces
//! the adapters consume. Implementors provide the actual I/O (an RPC client,
//! a host binding, or the scripted sources in [`crate::stub`]); the adapters
//! only see these traits, so the validation logic runs without a chain.

use vigil_types::{Address, PriceObservation, RoundData, Timestamp};

use crate::{OracleError, Result};

/// Failures an external source can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The call produced no answer.
    #[error("no response: {0}")]
    NoResponse(String),

    /// The answer does not match the expected interface.
    #[error("decode failure: {0}")]
    Decode(String),

    /// The pool was asked for history older than its oldest observation.
    #[error("history too short: requested {requested}s, available {available}s")]
    HistoryTooShort {
        /// Seconds ago that were requested.
        requested: u64,
        /// Seconds of history the pool holds.
        available: u64,
    },
}

impl From<SourceError> for OracleError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NoResponse(msg) => OracleError::SourceUnavailable(msg),
            SourceError::Decode(msg) => OracleError::Decode(msg),
            SourceError::HistoryTooShort {
                requested,
                available,
            } => OracleError::InsufficientHistory {
                required: requested,
                available,
            },
        }
    }
}

/// A round-based push feed (aggregator interface).
pub trait RoundSource {
    /// Identity of the aggregator.
    fn address(&self) -> Address;

    /// Native precision of the aggregator's answers.
    fn decimals(&self) -> std::result::Result<u8, SourceError>;

    /// The most recent round.
    fn latest_round_data(&self) -> std::result::Result<RoundData, SourceError>;
}

/// A cumulative-tick pull feed (pool oracle interface).
pub trait PoolSource {
    /// Identity of the pool.
    fn address(&self) -> Address;

    /// Whether any contract code lives at [`address`](PoolSource::address).
    fn has_code(&self) -> bool;

    /// Tick cumulatives at each of `seconds_ago` before `now`.
    fn observe(
        &self,
        now: Timestamp,
        seconds_ago: &[u32],
    ) -> std::result::Result<Vec<i64>, SourceError>;
}

/// Normalizes one external source into [`PriceObservation`]s.
pub trait SourceAdapter {
    /// Identity of the wrapped source.
    fn source(&self) -> Address;

    /// Precision of the observations this adapter produces.
    fn decimals(&self) -> u8;

    /// Read the source once. Pure with respect to adapter state.
    fn read(&self, now: Timestamp) -> Result<PriceObservation>;
}

impl<T: RoundSource + ?Sized> RoundSource for &T {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn decimals(&self) -> std::result::Result<u8, SourceError> {
        (**self).decimals()
    }

    fn latest_round_data(&self) -> std::result::Result<RoundData, SourceError> {
        (**self).latest_round_data()
    }
}

impl<T: PoolSource + ?Sized> PoolSource for &T {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn has_code(&self) -> bool {
        (**self).has_code()
    }

    fn observe(
        &self,
        now: Timestamp,
        seconds_ago: &[u32],
    ) -> std::result::Result<Vec<i64>, SourceError> {
        (**self).observe(now, seconds_ago)
    }
}
