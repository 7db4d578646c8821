//! Simulation output: per-bar ledger rows, close type, and the result bundle.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::position_spec::PositionSpec;

/// Barrier that closed the position.
///
/// Declaration order is the tie-break priority: when two barriers fire on
/// the same bar, the earlier variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseType {
    TakeProfit,
    StopLoss,
    TrailingStop,
    TimeLimit,
}

impl CloseType {
    /// All close types in tie-break priority order.
    pub const ALL: [CloseType; 4] = [
        CloseType::TakeProfit,
        CloseType::StopLoss,
        CloseType::TrailingStop,
        CloseType::TimeLimit,
    ];

    /// Tie-break rank (lower wins).
    pub fn priority(self) -> u8 {
        match self {
            CloseType::TakeProfit => 0,
            CloseType::StopLoss => 1,
            CloseType::TrailingStop => 2,
            CloseType::TimeLimit => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CloseType::TakeProfit => "take_profit",
            CloseType::StopLoss => "stop_loss",
            CloseType::TrailingStop => "trailing_stop",
            CloseType::TimeLimit => "time_limit",
        }
    }
}

impl fmt::Display for CloseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ledger row per bar, from the first bar at/after creation through the close bar.
///
/// Every numeric field is finite; rows before the entry bar are all zero
/// apart from `timestamp` and `close_price`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRow {
    pub timestamp: i64,
    pub close_price: f64,
    pub net_pnl_pct: f64,
    pub net_pnl_quote: f64,
    pub cum_fees_quote: f64,
    pub filled_amount_quote: f64,
    pub current_avg_entry_price: f64,
}

impl SimulationRow {
    /// Row for a bar where the position is not (yet) open.
    pub fn flat(timestamp: i64, close_price: f64) -> Self {
        Self {
            timestamp,
            close_price,
            net_pnl_pct: 0.0,
            net_pnl_quote: 0.0,
            cum_fees_quote: 0.0,
            filled_amount_quote: 0.0,
            current_avg_entry_price: 0.0,
        }
    }
}

/// The bar at which the position opened and its realized fill price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryFill {
    /// Index into the price series.
    pub index: usize,
    pub timestamp: i64,
    pub price: f64,
}

/// Complete, immutable outcome of simulating one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub spec: PositionSpec,
    pub rows: Vec<SimulationRow>,
    pub close_type: CloseType,
    /// `None` when the entry condition was never met.
    pub entry: Option<EntryFill>,
}

impl SimulationResult {
    pub fn is_filled(&self) -> bool {
        self.entry.is_some()
    }

    pub fn entry_timestamp(&self) -> Option<i64> {
        self.entry.map(|e| e.timestamp)
    }

    /// Realized fill price (close of the entry bar).
    pub fn entry_price(&self) -> Option<f64> {
        self.entry.map(|e| e.price)
    }

    pub fn final_row(&self) -> Option<&SimulationRow> {
        self.rows.last()
    }

    /// Timestamp of the last ledger row.
    pub fn close_timestamp(&self) -> Option<i64> {
        self.final_row().map(|r| r.timestamp)
    }

    pub fn net_pnl_pct(&self) -> f64 {
        self.final_row().map_or(0.0, |r| r.net_pnl_pct)
    }

    pub fn net_pnl_quote(&self) -> f64 {
        self.final_row().map_or(0.0, |r| r.net_pnl_quote)
    }

    pub fn cum_fees_quote(&self) -> f64 {
        self.final_row().map_or(0.0, |r| r.cum_fees_quote)
    }
}
