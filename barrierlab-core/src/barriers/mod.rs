//! Barrier evaluators: take-profit, stop-loss, trailing-stop, time-limit.
//!
//! Each evaluator is a pure scan over the return series from the entry bar
//! onward and yields the timestamp of its first trigger, if any. None of them
//! share state, so evaluation order does not matter.
//!
//! **Price sourcing is asymmetric:**
//! - take-profit and trailing-stop read the cost-adjusted `net_pnl_pct`
//!   derived from bar closes;
//! - stop-loss compares the raw bar `low` (long) / `high` (short) against a
//!   stop price derived from the realized fill, ignoring costs.
//!
//! See `stop_loss_ignores_close_and_costs` in the tests.

pub mod ratchet;
pub mod trailing;

pub use ratchet::RatchetState;
pub use trailing::{trailing_floor_path, TrailingPhase, TrailingStop};

use tracing::trace;

use crate::domain::{CloseType, PositionSpec, Side};
use crate::engine::returns::ReturnSeries;

/// First-trigger timestamp of every barrier. Time limit is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierCandidates {
    pub take_profit: Option<i64>,
    pub stop_loss: Option<i64>,
    pub trailing_stop: Option<i64>,
    pub time_limit: i64,
}

impl BarrierCandidates {
    /// Run all four evaluators against `series`.
    pub fn evaluate(series: &ReturnSeries<'_>, spec: &PositionSpec) -> Self {
        let candidates = Self {
            take_profit: take_profit_hit(series, spec),
            stop_loss: stop_loss_hit(series, spec),
            trailing_stop: trailing_stop_hit(series, spec),
            time_limit: time_limit_at(series, spec),
        };
        trace!(?candidates, "barrier candidates");
        candidates
    }

    /// Present candidates, paired with their close type, in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (CloseType, i64)> {
        [
            self.take_profit.map(|t| (CloseType::TakeProfit, t)),
            self.stop_loss.map(|t| (CloseType::StopLoss, t)),
            self.trailing_stop.map(|t| (CloseType::TrailingStop, t)),
            Some((CloseType::TimeLimit, self.time_limit)),
        ]
        .into_iter()
        .flatten()
    }
}

/// First bar whose net return strictly exceeds `take_profit`.
pub fn take_profit_hit(series: &ReturnSeries<'_>, spec: &PositionSpec) -> Option<i64> {
    let tp = spec.take_profit()?;
    series
        .active()
        .find(|(_, row)| row.net_pnl_pct > tp)
        .map(|(bar, _)| bar.timestamp)
}

/// Stop price for a realized fill: `fill * (1 - stop_loss * side_sign)`.
pub fn stop_price(side: Side, fill_price: f64, stop_loss: f64) -> f64 {
    fill_price * (1.0 - stop_loss * side.sign())
}

/// First bar whose low (long) or high (short) crosses the stop price.
pub fn stop_loss_hit(series: &ReturnSeries<'_>, spec: &PositionSpec) -> Option<i64> {
    let sl = spec.stop_loss()?;
    let stop = stop_price(spec.side(), series.entry().price, sl);
    series
        .active()
        .find(|(bar, _)| match spec.side() {
            Side::Long => bar.low <= stop,
            Side::Short => bar.high >= stop,
        })
        .map(|(bar, _)| bar.timestamp)
}

/// First bar on which the trailing stop transitions to `Triggered`.
pub fn trailing_stop_hit(series: &ReturnSeries<'_>, spec: &PositionSpec) -> Option<i64> {
    let mut stop = TrailingStop::new(spec.trailing_stop()?);
    series
        .active()
        .find(|(_, row)| stop.observe(row.net_pnl_pct).is_triggered())
        .map(|(bar, _)| bar.timestamp)
}

/// Expiry timestamp, or the last available bar when no limit is configured.
pub fn time_limit_at(series: &ReturnSeries<'_>, spec: &PositionSpec) -> i64 {
    spec.expiry_timestamp()
        .unwrap_or_else(|| series.last_timestamp())
}
