//! Bounded history of accepted observations.
//!
//! Every observation the cache accepts is appended here so consumers can ask
//! for a time-weighted average over recent rounds:
//!
//! ```text
//! TWAP = sum(price_i * duration_i) / sum(duration_i)
//! ```
//!
//! where `duration_i` is how long `price_i` stayed current inside the window
//! `[now - interval, now]`. The newest price stays current until `now`. When
//! history does not reach back to the start of the window, only the covered
//! part is averaged.

use std::collections::VecDeque;

use vigil_types::{PriceObservation, Timestamp, U256};

use crate::{OracleError, Result};

/// Default number of observations retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1440;

/// Ring buffer of accepted observations, oldest first.
#[derive(Debug, Clone)]
pub struct ObservationHistory {
    entries: VecDeque<PriceObservation>,
    capacity: usize,
}

impl ObservationHistory {
    /// Create an empty history holding at most `capacity` observations.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InvalidConfig`] if `capacity` is zero
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(OracleError::InvalidConfig(
                "history capacity must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
        })
    }

    /// Append an observation, evicting the oldest when full.
    ///
    /// # Errors
    ///
    /// - [`OracleError::NonAdvancingTimestamp`] if `observation` is not newer
    ///   than the latest entry
    pub fn push(&mut self, observation: PriceObservation) -> Result<()> {
        if let Some(latest) = self.entries.back() {
            if observation.observed_at <= latest.observed_at {
                return Err(OracleError::NonAdvancingTimestamp {
                    candidate: observation.observed_at,
                    last: latest.observed_at,
                });
            }
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(observation);
        Ok(())
    }

    pub fn latest(&self) -> Option<&PriceObservation> {
        self.entries.back()
    }

    pub fn oldest(&self) -> Option<&PriceObservation> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Time-weighted average price over the last `interval` seconds before `now`.
    ///
    /// Prices are averaged in their native precision. Returns the latest price
    /// when `interval` is zero or the covered duration is zero.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InsufficientHistory`] if the history is empty
    /// - [`OracleError::Math`] if the weighted sum overflows
    pub fn twap(&self, interval: u64, now: Timestamp) -> Result<U256> {
        let latest = self.latest().ok_or(OracleError::InsufficientHistory {
            required: interval,
            available: 0,
        })?;
        if interval == 0 {
            return Ok(latest.price);
        }

        let window_start = now.saturating_sub(interval);
        let mut weighted_sum = U256::ZERO;
        let mut total_duration: u64 = 0;

        let mut iter = self.entries.iter().peekable();
        while let Some(entry) = iter.next() {
            let segment_end = iter.peek().map_or(now, |next| next.observed_at).min(now);
            let segment_start = entry.observed_at.max(window_start);
            if segment_end <= segment_start {
                continue;
            }
            let duration = segment_end - segment_start;
            let weighted = entry
                .price
                .checked_mul(U256::from(duration))
                .ok_or(vigil_math::MathError::Overflow)?;
            weighted_sum = weighted_sum
                .checked_add(weighted)
                .ok_or(vigil_math::MathError::Overflow)?;
            total_duration += duration;
        }

        if total_duration == 0 {
            return Ok(latest.price);
        }

        // Integer division; truncates toward zero
        let twap = weighted_sum / U256::from(total_duration);
        tracing::debug!(interval, now, total_duration, %twap, "history twap computed");
        Ok(twap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(price: u64, at: Timestamp) -> PriceObservation {
        PriceObservation::new(U256::from(price), 8, at, 0)
    }

    fn history(points: &[(u64, Timestamp)]) -> ObservationHistory {
        let mut h = ObservationHistory::with_capacity(16).expect("history");
        for (price, at) in points {
            h.push(obs(*price, *at)).expect("push");
        }
        h
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            ObservationHistory::with_capacity(0),
            Err(OracleError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_constant_price() {
        let h = history(&[(100, 1000), (100, 2000), (100, 3000)]);
        assert_eq!(h.twap(3000, 4000), Ok(U256::from(100u64)));
    }

    #[test]
    fn test_weighted_average() {
        // 100 for 1000s, then 200 for 1000s => 150
        let h = history(&[(100, 1000), (200, 2000)]);
        assert_eq!(h.twap(2000, 3000), Ok(U256::from(150u64)));
    }

    #[test]
    fn test_window_clips_older_segments() {
        // Window [2500, 3000]: 200 held for the whole window.
        let h = history(&[(100, 1000), (200, 2000)]);
        assert_eq!(h.twap(500, 3000), Ok(U256::from(200u64)));
    }

    #[test]
    fn test_partial_coverage_uses_covered_part() {
        // Window [0, 4000] but history starts at 3000: 100 for 500s, 300 for 500s.
        let h = history(&[(100, 3000), (300, 3500)]);
        assert_eq!(h.twap(4000, 4000), Ok(U256::from(200u64)));
    }

    #[test]
    fn test_zero_interval_returns_latest() {
        let h = history(&[(100, 1000), (250, 2000)]);
        assert_eq!(h.twap(0, 5000), Ok(U256::from(250u64)));
    }

    #[test]
    fn test_price_observed_at_now_carries_no_weight() {
        let h = history(&[(100, 1000), (250, 2000)]);
        assert_eq!(h.twap(600, 2000), Ok(U256::from(100u64)));
    }

    #[test]
    fn test_no_elapsed_time_returns_latest() {
        let h = history(&[(250, 2000)]);
        assert_eq!(h.twap(600, 2000), Ok(U256::from(250u64)));
    }

    #[test]
    fn test_empty_history() {
        let h = ObservationHistory::with_capacity(4).expect("history");
        assert!(matches!(
            h.twap(60, 100),
            Err(OracleError::InsufficientHistory { .. })
        ));
    }

    #[test]
    fn test_non_monotonic_push_rejected() {
        let mut h = history(&[(100, 1000)]);
        let err = h.push(obs(200, 1000)).unwrap_err();
        assert!(matches!(err, OracleError::NonAdvancingTimestamp { .. }));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut h = ObservationHistory::with_capacity(2).expect("history");
        h.push(obs(1, 10)).expect("push");
        h.push(obs(2, 20)).expect("push");
        h.push(obs(3, 30)).expect("push");
        assert_eq!(h.len(), 2);
        assert_eq!(h.oldest().map(|o| o.observed_at), Some(20));
        assert_eq!(h.latest().map(|o| o.observed_at), Some(30));
    }
}
