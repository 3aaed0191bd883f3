//! Scripted in-memory sources.
//!
//! These stand in for a live aggregator or pool during development, replay,
//! and tests. Clones share the same script, so a caller can keep a handle and
//! publish new rounds after handing the source to an adapter.

use std::sync::{Arc, Mutex, MutexGuard};

use vigil_types::{Address, RoundData, Timestamp};

use crate::source::{PoolSource, RoundSource, SourceError};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, SourceError> {
    mutex
        .lock()
        .map_err(|_| SourceError::NoResponse("script lock poisoned".to_string()))
}

#[derive(Debug, Default)]
struct RoundScript {
    rounds: Vec<RoundData>,
    failure: Option<SourceError>,
}

/// An aggregator that answers with the most recently pushed round.
#[derive(Debug, Clone)]
pub struct ScriptedRoundSource {
    address: Address,
    decimals: u8,
    script: Arc<Mutex<RoundScript>>,
}

impl ScriptedRoundSource {
    /// Create a source with no rounds published yet.
    pub fn new(address: Address, decimals: u8) -> Self {
        Self {
            address,
            decimals,
            script: Arc::new(Mutex::new(RoundScript::default())),
        }
    }

    /// Publish a round; it becomes the answer to `latest_round_data()`.
    pub fn push_round(&self, round: RoundData) {
        if let Ok(mut script) = self.script.lock() {
            script.rounds.push(round);
        }
    }

    /// Make every `latest_round_data()` call fail with `failure` until cleared.
    pub fn fail_with(&self, failure: Option<SourceError>) {
        if let Ok(mut script) = self.script.lock() {
            script.failure = failure;
        }
    }

    /// Number of rounds published so far.
    pub fn rounds_published(&self) -> usize {
        self.script.lock().map(|s| s.rounds.len()).unwrap_or(0)
    }
}

impl RoundSource for ScriptedRoundSource {
    fn address(&self) -> Address {
        self.address
    }

    fn decimals(&self) -> Result<u8, SourceError> {
        Ok(self.decimals)
    }

    fn latest_round_data(&self) -> Result<RoundData, SourceError> {
        let script = lock(&self.script)?;
        if let Some(failure) = &script.failure {
            return Err(failure.clone());
        }
        script
            .rounds
            .last()
            .copied()
            .ok_or_else(|| SourceError::NoResponse("no round published".to_string()))
    }
}

#[derive(Debug)]
enum PoolScript {
    /// Answer every `observe()` with the same cumulatives.
    Fixed(Vec<i64>),
    /// Integrate a tick timeline into cumulatives. Entries are `(since, tick)`.
    Timeline(Vec<(Timestamp, i32)>),
}

/// A pool oracle answering `observe()` from a script.
#[derive(Debug, Clone)]
pub struct ScriptedPool {
    address: Address,
    has_code: bool,
    script: Arc<Mutex<PoolScript>>,
}

impl ScriptedPool {
    /// A pool whose `observe()` always returns `cumulatives`, whatever is asked.
    pub fn fixed(address: Address, cumulatives: Vec<i64>) -> Self {
        Self {
            address,
            has_code: true,
            script: Arc::new(Mutex::new(PoolScript::Fixed(cumulatives))),
        }
    }

    /// A pool with an empty tick timeline; see [`record_tick`](Self::record_tick).
    pub fn timeline(address: Address) -> Self {
        Self {
            address,
            has_code: true,
            script: Arc::new(Mutex::new(PoolScript::Timeline(Vec::new()))),
        }
    }

    /// An address with no contract code behind it.
    pub fn without_code(address: Address) -> Self {
        Self {
            has_code: false,
            ..Self::fixed(address, Vec::new())
        }
    }

    /// Replace the fixed reply. Switches a timeline pool to fixed replies.
    pub fn set_reply(&self, cumulatives: Vec<i64>) {
        if let Ok(mut script) = self.script.lock() {
            *script = PoolScript::Fixed(cumulatives);
        }
    }

    /// Make `tick` the pool's current tick from `since` onward.
    ///
    /// No-op on a fixed-reply pool.
    pub fn record_tick(&self, since: Timestamp, tick: i32) {
        if let Ok(mut script) = self.script.lock() {
            if let PoolScript::Timeline(ticks) = &mut *script {
                ticks.push((since, tick));
                ticks.sort_by_key(|(at, _)| *at);
            }
        }
    }
}

/// Running tick sum at `at` over a sorted timeline starting at `ticks[0].0`.
fn tick_cumulative(ticks: &[(Timestamp, i32)], at: Timestamp) -> i64 {
    let mut cumulative: i64 = 0;
    for (i, (since, tick)) in ticks.iter().enumerate() {
        if *since >= at {
            break;
        }
        let until = ticks.get(i + 1).map_or(at, |(next, _)| *next).min(at);
        let elapsed = i64::try_from(until - since).unwrap_or(i64::MAX);
        cumulative = cumulative.wrapping_add(i64::from(*tick).wrapping_mul(elapsed));
    }
    cumulative
}

impl PoolSource for ScriptedPool {
    fn address(&self) -> Address {
        self.address
    }

    fn has_code(&self) -> bool {
        self.has_code
    }

    fn observe(&self, now: Timestamp, seconds_ago: &[u32]) -> Result<Vec<i64>, SourceError> {
        let script = lock(&self.script)?;
        match &*script {
            PoolScript::Fixed(cumulatives) => Ok(cumulatives.clone()),
            PoolScript::Timeline(ticks) => {
                let available = ticks
                    .first()
                    .map_or(0, |(first, _)| now.saturating_sub(*first));
                seconds_ago
                    .iter()
                    .map(|ago| {
                        let ago = u64::from(*ago);
                        if ticks.is_empty() || ago > available {
                            return Err(SourceError::HistoryTooShort {
                                requested: ago,
                                available,
                            });
                        }
                        Ok(tick_cumulative(ticks, now - ago))
                    })
                    .collect()
            }
        }
    }
}
