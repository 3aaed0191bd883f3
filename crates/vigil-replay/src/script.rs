//! Replay scripts and reports.
//!
//! A round script seeds the feed with its first step and calls `update()` on
//! every later one:
//!
//! ```json
//! {
//!   "source": { "kind": "round", "address": "0x…01", "decimals": 8 },
//!   "steps": [
//!     { "at": 1000, "round": { "round_id": 0, "answer": 39900000000,
//!                              "started_at": 1000, "updated_at": 1000,
//!                              "answered_in_round": 0 } },
//!     { "at": 1015, "round": { ... } },
//!     { "at": 1030 }
//!   ]
//! }
//! ```
//!
//! A step without a round re-reads whatever the source last published. A pool
//! script integrates a tick timeline and reports the TWAP at every step.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use vigil_oracle::config::FeedConfig;
use vigil_oracle::stub::{ScriptedPool, ScriptedRoundSource};
use vigil_oracle::{ErrorKind, Freshness, OracleError, PoolPriceFeed, PriceFeed, RoundFeedAdapter};
use vigil_types::{Address, RoundData, Timestamp, U256};

/// The source a script drives.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceScript {
    Round {
        address: Address,
        decimals: u8,
    },
    Pool {
        address: Address,
        /// `(since, tick)` pairs.
        ticks: Vec<(Timestamp, i32)>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub at: Timestamp,
    #[serde(default)]
    pub round: Option<RoundData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    pub source: SourceScript,
    pub steps: Vec<Step>,
}

/// Outcome of one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub at: Timestamp,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freshness: Option<Freshness>,
}

impl StepReport {
    fn served(at: Timestamp, price: U256, freshness: Option<Freshness>) -> Self {
        Self {
            at,
            accepted: true,
            error: None,
            kind: None,
            price: Some(price),
            freshness,
        }
    }

    fn rejected(at: Timestamp, err: &OracleError, freshness: Option<Freshness>) -> Self {
        Self {
            at,
            accepted: false,
            error: Some(err.to_string()),
            kind: Some(err.kind()),
            price: None,
            freshness,
        }
    }
}

/// Outcome of a whole replay.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub source: Address,
    pub decimals: u8,
    pub steps: Vec<StepReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_price: Option<U256>,
}

impl Report {
    pub fn accepted(&self) -> usize {
        self.steps.iter().filter(|s| s.accepted).count()
    }
}

/// Run `script` under `config`.
pub fn run(script: &Script, config: &FeedConfig) -> anyhow::Result<Report> {
    match &script.source {
        SourceScript::Round { address, decimals } => {
            run_rounds(*address, *decimals, &script.steps, config)
        }
        SourceScript::Pool { address, ticks } => run_pool(*address, ticks, &script.steps, config),
    }
}

fn run_rounds(
    address: Address,
    decimals: u8,
    steps: &[Step],
    config: &FeedConfig,
) -> anyhow::Result<Report> {
    let (first, rest) = steps
        .split_first()
        .context("a round script needs at least one step")?;
    let source = ScriptedRoundSource::new(address, decimals);
    if let Some(round) = first.round {
        source.push_round(round);
    }

    let adapter = RoundFeedAdapter::new(source.clone())?;
    let mut feed = PriceFeed::new(adapter, config.settings(), first.at)
        .context("feed construction failed on the first step")?;

    let mut reports = vec![StepReport::served(
        first.at,
        feed.last_price()?,
        Some(feed.freshness(first.at)),
    )];
    for step in rest {
        if let Some(round) = step.round {
            source.push_round(round);
        }
        let report = match feed.update(step.at).and_then(|()| feed.last_price()) {
            Ok(price) => StepReport::served(step.at, price, Some(feed.freshness(step.at))),
            Err(err) => StepReport::rejected(step.at, &err, Some(feed.freshness(step.at))),
        };
        reports.push(report);
    }

    Ok(Report {
        source: feed.source(),
        decimals: feed.decimals(),
        steps: reports,
        final_price: Some(feed.last_price()?),
    })
}

fn run_pool(
    address: Address,
    ticks: &[(Timestamp, i32)],
    steps: &[Step],
    config: &FeedConfig,
) -> anyhow::Result<Report> {
    let pool = ScriptedPool::timeline(address);
    for (since, tick) in ticks {
        pool.record_tick(*since, *tick);
    }
    let feed = PoolPriceFeed::with_window(pool, config.twap.window_secs)?;

    let reports: Vec<StepReport> = steps
        .iter()
        .map(|step| match feed.price(step.at) {
            Ok(price) => StepReport::served(step.at, price, None),
            Err(err) => StepReport::rejected(step.at, &err, None),
        })
        .collect();
    let final_price = reports.iter().rev().find_map(|r| r.price);

    Ok(Report {
        source: feed.source(),
        decimals: feed.decimals(),
        steps: reports,
        final_price,
    })
}
