//! Raw round data and normalized price observations.

use ruint::aliases::U256;
use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// One round as reported by a round-based aggregator's `latestRoundData()`.
///
/// `answer` is signed because the upstream feed reports signed answers; a
/// non-positive answer is a data error handled by the adapter, not here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundData {
    pub round_id: u128,
    pub answer: i128,
    pub started_at: Timestamp,
    /// Zero means the round has not completed yet.
    pub updated_at: Timestamp,
    pub answered_in_round: u128,
}

impl RoundData {
    /// A completed round where every timestamp equals `at`.
    pub fn completed(round_id: u128, answer: i128, at: Timestamp) -> Self {
        Self {
            round_id,
            answer,
            started_at: at,
            updated_at: at,
            answered_in_round: round_id,
        }
    }
}

/// A price reading normalized by a source adapter.
///
/// Immutable once constructed; the facade stores the last accepted one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Price as an unsigned fixed-point integer with `decimals` digits of precision.
    pub price: U256,
    /// Source-native precision of `price`.
    pub decimals: u8,
    /// Unix timestamp at which the source produced the value.
    pub observed_at: Timestamp,
    /// Round id for round-based sources; zero for pool-derived readings.
    pub sequence: u128,
}

impl PriceObservation {
    pub fn new(price: U256, decimals: u8, observed_at: Timestamp, sequence: u128) -> Self {
        Self {
            price,
            decimals,
            observed_at,
            sequence,
        }
    }

    /// Seconds elapsed between the observation and `now`, zero if `now` is earlier.
    pub fn age(&self, now: Timestamp) -> u64 {
        now.saturating_sub(self.observed_at)
    }
}
