//! Cached feed state and the strict-monotonic commit rule.
//!
//! A candidate is accepted only if its `observed_at` is strictly greater than
//! the cached observation's. Two observations in the same second cannot be
//! ordered, so the second one is always rejected whatever its price. A
//! rejected commit leaves the cached state untouched.

use vigil_types::{PriceObservation, Timestamp};

use crate::staleness::{Freshness, StalenessGuard};
use crate::{OracleError, Result};

/// The single record a cached feed keeps about its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedFeedState {
    last_accepted: PriceObservation,
    guard: StalenessGuard,
}

impl CachedFeedState {
    /// Seed the state with the mandatory first observation.
    pub fn new(first: PriceObservation, guard: StalenessGuard) -> Self {
        Self {
            last_accepted: first,
            guard,
        }
    }

    /// Return the state that results from accepting `candidate`.
    ///
    /// # Errors
    ///
    /// - [`OracleError::NonAdvancingTimestamp`] if `candidate.observed_at` does
    ///   not strictly exceed the cached timestamp
    pub fn commit(&self, candidate: PriceObservation) -> Result<Self> {
        let last = self.last_accepted.observed_at;
        if candidate.observed_at <= last {
            return Err(OracleError::NonAdvancingTimestamp {
                candidate: candidate.observed_at,
                last,
            });
        }
        Ok(Self {
            last_accepted: candidate,
            guard: self.guard,
        })
    }

    /// Accept `candidate` in place; on error nothing changes.
    pub fn apply(&mut self, candidate: PriceObservation) -> Result<()> {
        *self = self.commit(candidate)?;
        Ok(())
    }

    pub fn last_accepted(&self) -> &PriceObservation {
        &self.last_accepted
    }

    pub fn guard(&self) -> &StalenessGuard {
        &self.guard
    }

    /// Classify the cached observation at `now`.
    pub fn freshness(&self, now: Timestamp) -> Freshness {
        self.guard.classify(self.last_accepted.observed_at, now)
    }
}
