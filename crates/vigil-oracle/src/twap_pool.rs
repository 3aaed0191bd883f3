//! Adapter deriving a time-weighted average price from a pool.
//!
//! The pool keeps a running sum of its tick over time. Sampling that sum at
//! `now - W` and `now` gives the average tick over the window:
//!
//! ```text
//! avg_tick = (cumulative(now) - cumulative(now - W)) / W
//! price    = 1.0001^avg_tick        (18 decimals)
//! ```
//!
//! The division truncates toward zero, matching the signed integer division
//! the deployed feed uses, so prices agree bit for bit. A pool younger than
//! `W` fails the read; there is no partial-window fallback. The adapter keeps
//! no state between reads.

use tracing::{debug, info};
use vigil_math::{tick_to_price_x10_18, MathError};
use vigil_types::{Address, PriceObservation, Timestamp, DEFAULT_TWAP_WINDOW_SECS, TWAP_DECIMALS};

use crate::source::{PoolSource, SourceAdapter};
use crate::{OracleError, Result};

/// Derives [`PriceObservation`]s from a pool's tick cumulatives.
#[derive(Debug, Clone)]
pub struct TwapPoolAdapter<P> {
    pool: P,
    window: u32,
}

impl<P: PoolSource> TwapPoolAdapter<P> {
    /// Wrap `pool` with the default 30-minute window.
    ///
    /// # Errors
    ///
    /// - [`OracleError::NotAContract`] if no code lives at the pool address
    pub fn new(pool: P) -> Result<Self> {
        Self::with_window(pool, DEFAULT_TWAP_WINDOW_SECS)
    }

    /// Wrap `pool` with a custom lookback window in seconds.
    ///
    /// # Errors
    ///
    /// - [`OracleError::NotAContract`] if no code lives at the pool address
    /// - [`OracleError::InvalidConfig`] if `window` is zero
    pub fn with_window(pool: P, window: u32) -> Result<Self> {
        if !pool.has_code() {
            return Err(OracleError::NotAContract(pool.address()));
        }
        if window == 0 {
            return Err(OracleError::InvalidConfig(
                "twap window must be non-zero".to_string(),
            ));
        }
        info!(pool = %pool.address(), window, "twap pool adapter ready");
        Ok(Self { pool, window })
    }

    /// Lookback window in seconds.
    pub fn window(&self) -> u32 {
        self.window
    }

    /// The wrapped pool.
    pub fn inner(&self) -> &P {
        &self.pool
    }

    /// Average tick over the window ending at `now`.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InsufficientHistory`] if the pool is younger than the window
    /// - [`OracleError::Decode`] if the pool does not answer with two cumulatives
    /// - [`OracleError::Math`] if the average does not fit a tick
    pub fn average_tick(&self, now: Timestamp) -> Result<i32> {
        let cumulatives = self.pool.observe(now, &[self.window, 0])?;
        let [start, end] = cumulatives.as_slice() else {
            return Err(OracleError::Decode(format!(
                "expected 2 tick cumulatives, got {}",
                cumulatives.len()
            )));
        };

        let delta = end.checked_sub(*start).ok_or(MathError::Overflow)?;
        let average = delta / i64::from(self.window);
        let tick = i32::try_from(average).map_err(|_| MathError::TickOutOfRange { tick: average })?;
        debug!(delta, window = self.window, tick, "average tick derived");
        Ok(tick)
    }
}

impl<P: PoolSource> SourceAdapter for TwapPoolAdapter<P> {
    fn source(&self) -> Address {
        self.pool.address()
    }

    fn decimals(&self) -> u8 {
        TWAP_DECIMALS
    }

    fn read(&self, now: Timestamp) -> Result<PriceObservation> {
        let tick = self.average_tick(now)?;
        let price = tick_to_price_x10_18(tick)?;
        Ok(PriceObservation::new(price, TWAP_DECIMALS, now, 0))
    }
}
