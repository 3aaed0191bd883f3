//! Staleness classification for cached observations.
//!
//! An observation of age `a = now - observed_at` is:
//!
//! - **Fresh** when `a <= normal_interval`
//! - **StaleUsable** when `normal_interval < a <= liveness_timeout`
//! - **Expired** when `a > liveness_timeout`
//!
//! Both boundaries are inclusive on the lower class. Classification never
//! mutates state and never fails; what to do with an Expired value is decided
//! by the facade's [`ExpiredPolicy`](crate::ExpiredPolicy).

use serde::{Deserialize, Serialize};
use vigil_types::Timestamp;

use crate::{OracleError, Result};

/// How trustworthy a cached observation is at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Fresh,
    StaleUsable,
    Expired,
}

/// Classify an observation taken at `observed_at` as seen at `now`.
///
/// An observation timestamped after `now` has age zero.
pub fn classify(
    observed_at: Timestamp,
    now: Timestamp,
    normal_interval: u64,
    liveness_timeout: u64,
) -> Freshness {
    let age = now.saturating_sub(observed_at);
    if age <= normal_interval {
        Freshness::Fresh
    } else if age <= liveness_timeout {
        Freshness::StaleUsable
    } else {
        Freshness::Expired
    }
}

/// Validated pair of staleness thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessGuard {
    /// Seconds within which an observation is Fresh.
    normal_interval: u64,
    /// Seconds after which an observation is Expired.
    liveness_timeout: u64,
}

impl StalenessGuard {
    /// Create a guard.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InvalidIntervals`] if `normal_interval > liveness_timeout`
    pub fn new(normal_interval: u64, liveness_timeout: u64) -> Result<Self> {
        if normal_interval > liveness_timeout {
            return Err(OracleError::InvalidIntervals {
                normal_interval,
                liveness_timeout,
            });
        }
        Ok(Self {
            normal_interval,
            liveness_timeout,
        })
    }

    /// Classify an observation against this guard's thresholds.
    pub fn classify(&self, observed_at: Timestamp, now: Timestamp) -> Freshness {
        let freshness = classify(
            observed_at,
            now,
            self.normal_interval,
            self.liveness_timeout,
        );
        tracing::debug!(observed_at, now, ?freshness, "staleness classified");
        freshness
    }

    pub fn normal_interval(&self) -> u64 {
        self.normal_interval
    }

    pub fn liveness_timeout(&self) -> u64 {
        self.liveness_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NORMAL: u64 = 900;
    const TIMEOUT: u64 = 2400;

    fn guard() -> StalenessGuard {
        StalenessGuard::new(NORMAL, TIMEOUT).expect("valid thresholds")
    }

    #[test]
    fn test_interval_longer_than_timeout_rejected() {
        let err = StalenessGuard::new(2400, 900).unwrap_err();
        assert!(matches!(
            err,
            OracleError::InvalidIntervals {
                normal_interval: 2400,
                liveness_timeout: 900
            }
        ));
    }

    #[test]
    fn test_equal_thresholds_allowed() {
        let g = StalenessGuard::new(900, 900).expect("equal thresholds");
        assert_eq!(g.classify(1000, 1900), Freshness::Fresh);
        assert_eq!(g.classify(1000, 1901), Freshness::Expired);
    }

    #[test]
    fn test_fresh_boundary_inclusive() {
        assert_eq!(guard().classify(1000, 1000 + NORMAL), Freshness::Fresh);
        assert_eq!(
            guard().classify(1000, 1000 + NORMAL + 1),
            Freshness::StaleUsable
        );
    }

    #[test]
    fn test_timeout_boundary_inclusive() {
        assert_eq!(
            guard().classify(1000, 1000 + TIMEOUT),
            Freshness::StaleUsable
        );
        assert_eq!(guard().classify(1000, 1000 + TIMEOUT + 1), Freshness::Expired);
    }

    #[test]
    fn test_future_observation_is_fresh() {
        assert_eq!(guard().classify(5000, 1000), Freshness::Fresh);
    }

    #[test]
    fn test_free_function_matches_guard() {
        for age in [0, NORMAL, NORMAL + 1, TIMEOUT, TIMEOUT + 1] {
            assert_eq!(
                classify(0, age, NORMAL, TIMEOUT),
                guard().classify(0, age)
            );
        }
    }

    #[test]
    fn test_accessors() {
        let g = guard();
        assert_eq!(g.normal_interval(), NORMAL);
        assert_eq!(g.liveness_timeout(), TIMEOUT);
    }
}
