//! Position specification: entry and exit rules for one simulated position.
//!
//! `PositionConfig` is the plain, serializable shape produced by the strategy
//! layer. `PositionSpec` is the validated, immutable form the engine accepts;
//! the only way to build one is through validation, so an engine call never
//! sees a zero or negative entry price or amount.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ids::SpecId;
use super::side::Side;

/// Errors raised while constructing a [`PositionSpec`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    #[error("entry price must be finite and positive, got {0}")]
    InvalidEntryPrice(f64),
    #[error("amount must be finite and positive, got {0}")]
    InvalidAmount(f64),
    #[error("take profit must be finite, got {0}")]
    InvalidTakeProfit(f64),
    #[error("stop loss must be finite and non-negative, got {0}")]
    InvalidStopLoss(f64),
    #[error("trailing stop needs finite activation and non-negative delta, got activation={activation_return} delta={trailing_delta}")]
    InvalidTrailingStop {
        activation_return: f64,
        trailing_delta: f64,
    },
    #[error("time limit must be non-negative seconds, got {0}")]
    InvalidTimeLimit(i64),
}

/// Trailing stop parameters, both expressed as fractional returns (0.02 = 2%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailingStopConfig {
    /// Net return that must be exceeded before the stop arms.
    pub activation_return: f64,
    /// Distance kept between the best net return and the floor.
    pub trailing_delta: f64,
}

impl TrailingStopConfig {
    pub fn new(activation_return: f64, trailing_delta: f64) -> Self {
        Self {
            activation_return,
            trailing_delta,
        }
    }
}

/// Unvalidated position description, as read from TOML/JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionConfig {
    pub creation_timestamp: i64,
    pub side: Side,
    pub entry_price: f64,
    pub amount: f64,
    #[serde(default)]
    pub is_limit_entry: bool,
    #[serde(default)]
    pub take_profit: Option<f64>,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub trailing_stop: Option<TrailingStopConfig>,
    /// Seconds after `creation_timestamp` at which the position is closed.
    #[serde(default)]
    pub time_limit: Option<i64>,
}

/// Validated, immutable position specification.
///
/// Deserializes through [`PositionConfig`], so invalid input is rejected at
/// the serde boundary with the same [`SpecError`] as [`PositionSpec::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PositionConfig", into = "PositionConfig")]
pub struct PositionSpec {
    creation_timestamp: i64,
    side: Side,
    entry_price: f64,
    amount: f64,
    is_limit_entry: bool,
    take_profit: Option<f64>,
    stop_loss: Option<f64>,
    trailing_stop: Option<TrailingStopConfig>,
    time_limit: Option<i64>,
}

impl PositionSpec {
    /// Market-entry spec with no barriers configured.
    ///
    /// Barriers are added with the `with_*` builders, each of which
    /// re-validates.
    ///
    /// # Example
    /// ```
    /// use barrierlab_core::domain::{PositionSpec, Side};
    ///
    /// let spec = PositionSpec::new(0, Side::Long, 100.0, 1.0)
    ///     .and_then(|s| s.with_take_profit(0.02))
    ///     .and_then(|s| s.with_time_limit(3_600))
    ///     .unwrap();
    /// assert_eq!(spec.take_profit(), Some(0.02));
    ///
    /// assert!(PositionSpec::new(0, Side::Long, 0.0, 1.0).is_err());
    /// ```
    pub fn new(
        creation_timestamp: i64,
        side: Side,
        entry_price: f64,
        amount: f64,
    ) -> Result<Self, SpecError> {
        Self::try_from(PositionConfig {
            creation_timestamp,
            side,
            entry_price,
            amount,
            is_limit_entry: false,
            take_profit: None,
            stop_loss: None,
            trailing_stop: None,
            time_limit: None,
        })
    }

    pub fn with_limit_entry(self, is_limit_entry: bool) -> Self {
        Self {
            is_limit_entry,
            ..self
        }
    }

    pub fn with_take_profit(self, take_profit: f64) -> Result<Self, SpecError> {
        Self::try_from(PositionConfig {
            take_profit: Some(take_profit),
            ..PositionConfig::from(self)
        })
    }

    pub fn with_stop_loss(self, stop_loss: f64) -> Result<Self, SpecError> {
        Self::try_from(PositionConfig {
            stop_loss: Some(stop_loss),
            ..PositionConfig::from(self)
        })
    }

    pub fn with_trailing_stop(self, trailing_stop: TrailingStopConfig) -> Result<Self, SpecError> {
        Self::try_from(PositionConfig {
            trailing_stop: Some(trailing_stop),
            ..PositionConfig::from(self)
        })
    }

    pub fn with_time_limit(self, time_limit: i64) -> Result<Self, SpecError> {
        Self::try_from(PositionConfig {
            time_limit: Some(time_limit),
            ..PositionConfig::from(self)
        })
    }

    pub fn creation_timestamp(&self) -> i64 {
        self.creation_timestamp
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn is_limit_entry(&self) -> bool {
        self.is_limit_entry
    }

    pub fn take_profit(&self) -> Option<f64> {
        self.take_profit
    }

    pub fn stop_loss(&self) -> Option<f64> {
        self.stop_loss
    }

    pub fn trailing_stop(&self) -> Option<TrailingStopConfig> {
        self.trailing_stop
    }

    pub fn time_limit(&self) -> Option<i64> {
        self.time_limit
    }

    /// Absolute expiry timestamp, if a time limit is configured.
    pub fn expiry_timestamp(&self) -> Option<i64> {
        self.time_limit
            .map(|limit| self.creation_timestamp.saturating_add(limit))
    }

    /// Deterministic content hash of this spec.
    pub fn id(&self) -> SpecId {
        SpecId::of(self)
    }
}

impl TryFrom<PositionConfig> for PositionSpec {
    type Error = SpecError;

    fn try_from(config: PositionConfig) -> Result<Self, Self::Error> {
        if !config.entry_price.is_finite() || config.entry_price <= 0.0 {
            return Err(SpecError::InvalidEntryPrice(config.entry_price));
        }
        if !config.amount.is_finite() || config.amount <= 0.0 {
            return Err(SpecError::InvalidAmount(config.amount));
        }
        if let Some(tp) = config.take_profit {
            if !tp.is_finite() {
                return Err(SpecError::InvalidTakeProfit(tp));
            }
        }
        if let Some(sl) = config.stop_loss {
            if !sl.is_finite() || sl < 0.0 {
                return Err(SpecError::InvalidStopLoss(sl));
            }
        }
        if let Some(ts) = config.trailing_stop {
            if !ts.activation_return.is_finite()
                || !ts.trailing_delta.is_finite()
                || ts.trailing_delta < 0.0
            {
                return Err(SpecError::InvalidTrailingStop {
                    activation_return: ts.activation_return,
                    trailing_delta: ts.trailing_delta,
                });
            }
        }
        if let Some(limit) = config.time_limit {
            if limit < 0 {
                return Err(SpecError::InvalidTimeLimit(limit));
            }
        }

        Ok(Self {
            creation_timestamp: config.creation_timestamp,
            side: config.side,
            entry_price: config.entry_price,
            amount: config.amount,
            is_limit_entry: config.is_limit_entry,
            take_profit: config.take_profit,
            stop_loss: config.stop_loss,
            trailing_stop: config.trailing_stop,
            time_limit: config.time_limit,
        })
    }
}

impl From<PositionSpec> for PositionConfig {
    fn from(spec: PositionSpec) -> Self {
        Self {
            creation_timestamp: spec.creation_timestamp,
            side: spec.side,
            entry_price: spec.entry_price,
            amount: spec.amount,
            is_limit_entry: spec.is_limit_entry,
            take_profit: spec.take_profit,
            stop_loss: spec.stop_loss,
            trailing_stop: spec.trailing_stop,
            time_limit: spec.time_limit,
        }
    }
}
