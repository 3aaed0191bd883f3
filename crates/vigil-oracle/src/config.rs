//! Feed configuration.
//!
//! ```toml
//! [staleness]
//! normal_interval_secs = 900
//! liveness_timeout_secs = 2400
//! expired_policy = "serve_last_good"
//!
//! [output]
//! decimals = 18
//!
//! [twap]
//! window_secs = 1800
//! history_capacity = 1440
//! ```
//!
//! Every field has a default; an empty file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use vigil_types::{DEFAULT_TWAP_WINDOW_SECS, MAX_SOURCE_DECIMALS};

use crate::facade::{ExpiredPolicy, FeedSettings};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::staleness::StalenessGuard;
use crate::{OracleError, Result};

/// Complete feed configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub staleness: StalenessConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub twap: TwapConfig,
}

/// Staleness thresholds and expired-state policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalenessConfig {
    /// Fresh boundary in seconds (inclusive).
    #[serde(default = "default_normal_interval")]
    pub normal_interval_secs: u64,
    /// StaleUsable upper boundary in seconds (inclusive).
    #[serde(default = "default_liveness_timeout")]
    pub liveness_timeout_secs: u64,
    #[serde(default)]
    pub expired_policy: ExpiredPolicy,
}

/// Output precision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Absent = source-native decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
}

/// Pool TWAP window and accepted-round history size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwapConfig {
    #[serde(default = "default_window")]
    pub window_secs: u32,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

// Default value functions

fn default_normal_interval() -> u64 {
    900
}

fn default_liveness_timeout() -> u64 {
    2400
}

fn default_window() -> u32 {
    DEFAULT_TWAP_WINDOW_SECS
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

impl Default for StalenessConfig {
    fn default() -> Self {
        Self {
            normal_interval_secs: default_normal_interval(),
            liveness_timeout_secs: default_liveness_timeout(),
            expired_policy: ExpiredPolicy::default(),
        }
    }
}

impl Default for TwapConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl FeedConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: FeedConfig =
            toml::from_str(content).map_err(|e| OracleError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| OracleError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        StalenessGuard::new(
            self.staleness.normal_interval_secs,
            self.staleness.liveness_timeout_secs,
        )?;
        if let Some(decimals) = self.output.decimals {
            if decimals > MAX_SOURCE_DECIMALS {
                return Err(OracleError::InvalidDecimals {
                    decimals,
                    max: MAX_SOURCE_DECIMALS,
                });
            }
        }
        if self.twap.window_secs == 0 {
            return Err(OracleError::InvalidConfig(
                "twap.window_secs must be non-zero".to_string(),
            ));
        }
        if self.twap.history_capacity == 0 {
            return Err(OracleError::InvalidConfig(
                "twap.history_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings for a cached [`PriceFeed`](crate::PriceFeed).
    pub fn settings(&self) -> FeedSettings {
        FeedSettings {
            normal_interval: self.staleness.normal_interval_secs,
            liveness_timeout: self.staleness.liveness_timeout_secs,
            expired_policy: self.staleness.expired_policy,
            output_decimals: self.output.decimals,
            history_capacity: self.twap.history_capacity,
        }
    }
}
