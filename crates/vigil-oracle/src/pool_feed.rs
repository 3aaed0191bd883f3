//! Pool-backed price feed.
//!
//! The pool already buffers its cumulative tick history, so this feed keeps
//! no cache: every [`price`](PoolPriceFeed::price) call derives the TWAP live.
//! Construction does not read the pool; it only checks that code exists at the
//! pool address. A contract with the wrong interface therefore constructs
//! fine and fails on its first read with a decode error.

use vigil_types::{Address, Timestamp, TWAP_DECIMALS, U256};

use crate::facade::PriceFeedView;
use crate::source::{PoolSource, SourceAdapter};
use crate::twap_pool::TwapPoolAdapter;
use crate::Result;

/// A stateless TWAP price feed over one pool.
#[derive(Debug, Clone)]
pub struct PoolPriceFeed<P> {
    adapter: TwapPoolAdapter<P>,
}

impl<P: PoolSource> PoolPriceFeed<P> {
    /// Build a feed over `pool` with the default 30-minute window.
    ///
    /// # Errors
    ///
    /// - [`OracleError::NotAContract`](crate::OracleError::NotAContract) if no
    ///   code lives at the pool address
    pub fn new(pool: P) -> Result<Self> {
        Ok(Self {
            adapter: TwapPoolAdapter::new(pool)?,
        })
    }

    /// Build a feed with a custom window in seconds.
    pub fn with_window(pool: P, window: u32) -> Result<Self> {
        Ok(Self {
            adapter: TwapPoolAdapter::with_window(pool, window)?,
        })
    }

    /// TWAP over the window ending at `now`, 18 decimals.
    pub fn price(&self, now: Timestamp) -> Result<U256> {
        Ok(self.adapter.read(now)?.price)
    }

    /// Average tick over the window ending at `now`.
    pub fn average_tick(&self, now: Timestamp) -> Result<i32> {
        self.adapter.average_tick(now)
    }

    /// Always 18.
    pub fn decimals(&self) -> u8 {
        TWAP_DECIMALS
    }

    /// Address of the pool.
    pub fn source(&self) -> Address {
        self.adapter.source()
    }

    pub fn window(&self) -> u32 {
        self.adapter.window()
    }
}

impl<P: PoolSource> PriceFeedView for PoolPriceFeed<P> {
    fn source(&self) -> Address {
        PoolPriceFeed::source(self)
    }

    fn decimals(&self) -> u8 {
        PoolPriceFeed::decimals(self)
    }

    fn price(&self, now: Timestamp) -> Result<U256> {
        PoolPriceFeed::price(self, now)
    }
}
