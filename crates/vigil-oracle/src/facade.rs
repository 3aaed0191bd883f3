//! The cached price feed consumers read from.
//!
//! A [`PriceFeed`] exists only in the serving state: construction performs one
//! unconditional read of its source and fails if that read fails. After that:
//!
//! - [`update`](PriceFeed::update) reads the source and commits the result if
//!   its timestamp strictly advances. Staleness does not gate admission; a
//!   stale but advancing round is accepted. A failed update leaves the cached
//!   value untouched and records a [`FreezeReason`].
//! - [`last_price`](PriceFeed::last_price) serves the cached value rescaled to
//!   the feed's output decimals, truncating excess precision.
//! - [`price`](PriceFeed::price) does the same after applying the
//!   [`ExpiredPolicy`] to the cached value's age.
//!
//! There is no retry loop and no fallback source.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vigil_math::rescale;
use vigil_types::{Address, PriceObservation, Timestamp, MAX_SOURCE_DECIMALS, U256};

use crate::cache::CachedFeedState;
use crate::history::{ObservationHistory, DEFAULT_HISTORY_CAPACITY};
use crate::source::SourceAdapter;
use crate::staleness::{Freshness, StalenessGuard};
use crate::{OracleError, Result};

/// What [`PriceFeed::price`] does when the cached value is Expired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiredPolicy {
    /// Serve the last accepted value anyway.
    #[default]
    ServeLastGood,
    /// Fail with [`OracleError::Expired`].
    Reject,
}

/// Why the most recent update failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreezeReason {
    NoResponse,
    InvalidPrice,
    IncompleteRound,
    FutureTimestamp,
    InsufficientHistory,
    Decode,
    NonAdvancingTimestamp,
    Math,
}

impl FreezeReason {
    /// The freeze reason an update failure maps to, if any.
    pub fn from_error(err: &OracleError) -> Option<Self> {
        match err {
            OracleError::SourceUnavailable(_) => Some(FreezeReason::NoResponse),
            OracleError::InvalidPrice(_) => Some(FreezeReason::InvalidPrice),
            OracleError::IncompleteRound { .. } => Some(FreezeReason::IncompleteRound),
            OracleError::FutureTimestamp { .. } => Some(FreezeReason::FutureTimestamp),
            OracleError::InsufficientHistory { .. } => Some(FreezeReason::InsufficientHistory),
            OracleError::Decode(_) => Some(FreezeReason::Decode),
            OracleError::NonAdvancingTimestamp { .. } => Some(FreezeReason::NonAdvancingTimestamp),
            OracleError::Math(_) => Some(FreezeReason::Math),
            OracleError::InvalidDecimals { .. }
            | OracleError::InvalidIntervals { .. }
            | OracleError::NotAContract(_)
            | OracleError::InvalidConfig(_)
            | OracleError::Expired { .. } => None,
        }
    }
}

/// Construction parameters for a [`PriceFeed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    /// Seconds within which the cached value is Fresh.
    pub normal_interval: u64,
    /// Seconds after which the cached value is Expired.
    pub liveness_timeout: u64,
    pub expired_policy: ExpiredPolicy,
    /// Output precision; `None` keeps the source's native decimals.
    pub output_decimals: Option<u8>,
    /// Accepted observations kept for [`PriceFeed::twap`].
    pub history_capacity: usize,
}

impl FeedSettings {
    /// Settings with the given thresholds and defaults for everything else.
    pub fn new(normal_interval: u64, liveness_timeout: u64) -> Self {
        Self {
            normal_interval,
            liveness_timeout,
            expired_policy: ExpiredPolicy::default(),
            output_decimals: None,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    pub fn with_expired_policy(mut self, policy: ExpiredPolicy) -> Self {
        self.expired_policy = policy;
        self
    }

    pub fn with_output_decimals(mut self, decimals: u8) -> Self {
        self.output_decimals = Some(decimals);
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}

/// Read surface shared by every price feed.
pub trait PriceFeedView {
    /// Identity of the underlying source.
    fn source(&self) -> Address;

    /// Precision of the prices this feed serves.
    fn decimals(&self) -> u8;

    /// Current price at `now`, in [`decimals`](PriceFeedView::decimals) precision.
    fn price(&self, now: Timestamp) -> Result<U256>;
}

/// A price feed caching the last accepted observation of one source.
#[derive(Debug)]
pub struct PriceFeed<A> {
    adapter: A,
    state: CachedFeedState,
    history: ObservationHistory,
    decimals: u8,
    expired_policy: ExpiredPolicy,
    freeze_reason: Option<FreezeReason>,
}

impl<A: SourceAdapter> PriceFeed<A> {
    /// Build a feed and seed it with one read of `adapter` at `now`.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InvalidIntervals`] if the normal interval exceeds the timeout
    /// - [`OracleError::InvalidDecimals`] if the output precision exceeds 18
    /// - [`OracleError::InvalidConfig`] if the history capacity is zero
    /// - any error of the first `adapter.read(now)`
    pub fn new(adapter: A, settings: FeedSettings, now: Timestamp) -> Result<Self> {
        let guard = StalenessGuard::new(settings.normal_interval, settings.liveness_timeout)?;
        let decimals = settings.output_decimals.unwrap_or_else(|| adapter.decimals());
        if decimals > MAX_SOURCE_DECIMALS {
            return Err(OracleError::InvalidDecimals {
                decimals,
                max: MAX_SOURCE_DECIMALS,
            });
        }
        let mut history = ObservationHistory::with_capacity(settings.history_capacity)?;

        let first = adapter.read(now)?;
        history.push(first)?;

        info!(
            source = %adapter.source(),
            decimals,
            observed_at = first.observed_at,
            normal_interval = settings.normal_interval,
            liveness_timeout = settings.liveness_timeout,
            "price feed serving"
        );

        Ok(Self {
            adapter,
            state: CachedFeedState::new(first, guard),
            history,
            decimals,
            expired_policy: settings.expired_policy,
            freeze_reason: None,
        })
    }

    /// Pull one observation from the source and commit it.
    ///
    /// # Errors
    ///
    /// - any error of `adapter.read(now)`
    /// - [`OracleError::NonAdvancingTimestamp`] if the observation does not advance time
    pub fn update(&mut self, now: Timestamp) -> Result<()> {
        match self.try_update(now) {
            Ok(accepted) => {
                self.freeze_reason = None;
                info!(
                    source = %self.adapter.source(),
                    sequence = accepted.sequence,
                    observed_at = accepted.observed_at,
                    price = %accepted.price,
                    "observation accepted"
                );
                Ok(())
            }
            Err(err) => {
                self.freeze_reason = FreezeReason::from_error(&err);
                warn!(
                    source = %self.adapter.source(),
                    kind = ?err.kind(),
                    error = %err,
                    "update rejected"
                );
                Err(err)
            }
        }
    }

    fn try_update(&mut self, now: Timestamp) -> Result<PriceObservation> {
        let candidate = self.adapter.read(now)?;
        let next = self.state.commit(candidate)?;
        self.history.push(candidate)?;
        self.state = next;
        Ok(candidate)
    }

    /// Cached price in output decimals, without any staleness check.
    pub fn last_price(&self) -> Result<U256> {
        let last = self.state.last_accepted();
        rescale(last.price, last.decimals, self.decimals).map_err(OracleError::from)
    }

    /// Cached price in output decimals after applying the expired policy.
    ///
    /// # Errors
    ///
    /// - [`OracleError::Expired`] if the value is Expired and the policy is
    ///   [`ExpiredPolicy::Reject`]
    pub fn price(&self, now: Timestamp) -> Result<U256> {
        if self.expired_policy == ExpiredPolicy::Reject && self.is_timed_out(now) {
            return Err(OracleError::Expired {
                age: self.age(now),
                liveness_timeout: self.state.guard().liveness_timeout(),
            });
        }
        self.last_price()
    }

    /// Time-weighted average of accepted prices over `interval` seconds before `now`.
    pub fn twap(&self, interval: u64, now: Timestamp) -> Result<U256> {
        let average = self.history.twap(interval, now)?;
        let native = self.state.last_accepted().decimals;
        rescale(average, native, self.decimals).map_err(OracleError::from)
    }

    /// Output precision, fixed at construction.
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Native precision of the source.
    pub fn source_decimals(&self) -> u8 {
        self.adapter.decimals()
    }

    /// Identity of the source (aggregator or pool).
    pub fn source(&self) -> Address {
        self.adapter.source()
    }

    pub fn last_observation(&self) -> &PriceObservation {
        self.state.last_accepted()
    }

    /// Seconds since the cached observation.
    pub fn age(&self, now: Timestamp) -> u64 {
        self.state.last_accepted().age(now)
    }

    pub fn freshness(&self, now: Timestamp) -> Freshness {
        self.state.freshness(now)
    }

    /// Whether the cached value is past the liveness timeout.
    pub fn is_timed_out(&self, now: Timestamp) -> bool {
        self.freshness(now) == Freshness::Expired
    }

    /// Reason the most recent update failed; cleared by a successful update.
    pub fn freeze_reason(&self) -> Option<FreezeReason> {
        self.freeze_reason
    }

    pub fn expired_policy(&self) -> ExpiredPolicy {
        self.expired_policy
    }

    pub fn normal_interval(&self) -> u64 {
        self.state.guard().normal_interval()
    }

    pub fn liveness_timeout(&self) -> u64 {
        self.state.guard().liveness_timeout()
    }

    pub fn history(&self) -> &ObservationHistory {
        &self.history
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }
}

impl<A: SourceAdapter> PriceFeedView for PriceFeed<A> {
    fn source(&self) -> Address {
        PriceFeed::source(self)
    }

    fn decimals(&self) -> u8 {
        PriceFeed::decimals(self)
    }

    fn price(&self, now: Timestamp) -> Result<U256> {
        PriceFeed::price(self, now)
    }
}
