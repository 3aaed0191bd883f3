//! Adapter over a round-based aggregator.
//!
//! Reads `latestRoundData()` and rejects rounds a consumer must never act on:
//! incomplete rounds (`updated_at == 0`), non-positive answers, and rounds
//! stamped later than the current time. The aggregator's declared precision is
//! checked once at construction.

use tracing::{debug, info};
use vigil_types::{Address, PriceObservation, Timestamp, MAX_SOURCE_DECIMALS, U256};

use crate::source::{RoundSource, SourceAdapter};
use crate::{OracleError, Result};

/// Normalizes an aggregator's rounds into [`PriceObservation`]s.
#[derive(Debug, Clone)]
pub struct RoundFeedAdapter<S> {
    source: S,
    decimals: u8,
}

impl<S: RoundSource> RoundFeedAdapter<S> {
    /// Wrap `source`, reading its precision once.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InvalidDecimals`] if the source declares more than 18 decimals
    /// - any [`SourceError`](crate::SourceError) raised by `decimals()`
    pub fn new(source: S) -> Result<Self> {
        let decimals = source.decimals()?;
        if decimals > MAX_SOURCE_DECIMALS {
            return Err(OracleError::InvalidDecimals {
                decimals,
                max: MAX_SOURCE_DECIMALS,
            });
        }
        info!(source = %source.address(), decimals, "round feed adapter ready");
        Ok(Self { source, decimals })
    }

    /// The wrapped source.
    pub fn inner(&self) -> &S {
        &self.source
    }
}

impl<S: RoundSource> SourceAdapter for RoundFeedAdapter<S> {
    fn source(&self) -> Address {
        self.source.address()
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn read(&self, now: Timestamp) -> Result<PriceObservation> {
        let round = self.source.latest_round_data()?;

        if round.updated_at == 0 {
            return Err(OracleError::IncompleteRound {
                round_id: round.round_id,
            });
        }
        if round.answer <= 0 {
            return Err(OracleError::InvalidPrice(round.answer));
        }
        if round.updated_at > now {
            return Err(OracleError::FutureTimestamp {
                observed_at: round.updated_at,
                now,
            });
        }

        debug!(
            round_id = round.round_id,
            answer = round.answer,
            updated_at = round.updated_at,
            "round read"
        );
        Ok(PriceObservation::new(
            U256::from(round.answer.unsigned_abs()),
            self.decimals,
            round.updated_at,
            round.round_id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use vigil_types::RoundData;

    use super::*;
    use crate::stub::ScriptedRoundSource;
    use crate::SourceError;

    const NOW: Timestamp = 1_700_000_000;

    fn source(decimals: u8) -> ScriptedRoundSource {
        ScriptedRoundSource::new(Address::from_low_byte(1), decimals)
    }

    #[test]
    fn test_decimals_upper_bound() {
        assert!(RoundFeedAdapter::new(source(18)).is_ok());
        let err = RoundFeedAdapter::new(source(19)).unwrap_err();
        assert_eq!(
            err,
            OracleError::InvalidDecimals {
                decimals: 19,
                max: 18
            }
        );
    }

    #[test]
    fn test_zero_decimals_allowed() {
        let adapter = RoundFeedAdapter::new(source(0)).expect("adapter");
        assert_eq!(adapter.decimals(), 0);
    }

    #[test]
    fn test_read_normalizes_round() {
        let src = source(8);
        src.push_round(RoundData::completed(3, 39_900_000_000, NOW - 10));
        let adapter = RoundFeedAdapter::new(src).expect("adapter");

        let obs = adapter.read(NOW).expect("read");
        assert_eq!(obs.price, U256::from(39_900_000_000u64));
        assert_eq!(obs.decimals, 8);
        assert_eq!(obs.observed_at, NOW - 10);
        assert_eq!(obs.sequence, 3);
        assert_eq!(adapter.source(), Address::from_low_byte(1));
    }

    #[test]
    fn test_non_positive_answer_rejected() {
        let src = source(8);
        let adapter = RoundFeedAdapter::new(&src).expect("adapter");

        src.push_round(RoundData::completed(1, 0, NOW));
        assert_eq!(adapter.read(NOW), Err(OracleError::InvalidPrice(0)));

        src.push_round(RoundData::completed(2, -5, NOW));
        assert_eq!(adapter.read(NOW), Err(OracleError::InvalidPrice(-5)));
    }

    #[test]
    fn test_incomplete_round_rejected() {
        let src = source(8);
        src.push_round(RoundData {
            round_id: 4,
            answer: 100,
            started_at: NOW,
            updated_at: 0,
            answered_in_round: 4,
        });
        let adapter = RoundFeedAdapter::new(src).expect("adapter");
        assert_eq!(
            adapter.read(NOW),
            Err(OracleError::IncompleteRound { round_id: 4 })
        );
    }

    #[test]
    fn test_future_round_rejected() {
        let src = source(8);
        src.push_round(RoundData::completed(1, 100, NOW + 1));
        let adapter = RoundFeedAdapter::new(src).expect("adapter");
        assert_eq!(
            adapter.read(NOW),
            Err(OracleError::FutureTimestamp {
                observed_at: NOW + 1,
                now: NOW
            })
        );
    }

    #[test]
    fn test_source_failure_propagates() {
        let src = source(8);
        src.fail_with(Some(SourceError::Decode("unexpected return data".into())));
        let adapter = RoundFeedAdapter::new(&src).expect("adapter");
        assert!(matches!(adapter.read(NOW), Err(OracleError::Decode(_))));
    }

    #[test]
    fn test_no_round_published() {
        let adapter = RoundFeedAdapter::new(source(8)).expect("adapter");
        assert!(matches!(
            adapter.read(NOW),
            Err(OracleError::SourceUnavailable(_))
        ));
    }
}
