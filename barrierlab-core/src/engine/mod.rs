//! Simulation engine: single-position triple-barrier pipeline.
//!
//! Data flows strictly forward:
//! 1. `entry`: resolve the bar at which the position opens
//! 2. `returns`: build the untruncated, cost-adjusted return series
//! 3. `barriers`: evaluate take-profit / stop-loss / trailing-stop / time-limit
//! 4. `close`: pick the earliest candidate (priority tie-break) and truncate
//! 5. `ledger`: replace the close row with realized round-trip economics
//!
//! `simulate` is a pure function of its inputs: no I/O, no shared mutable
//! state. Many simulations may read one price series concurrently.

pub mod close;
pub mod cost_model;
pub mod entry;
pub mod ledger;
pub mod returns;

pub use close::{resolve_close, truncate_at, CloseDecision};
pub use cost_model::CostModel;
pub use entry::{resolve_entry, window_start};
pub use ledger::finalize;
pub use returns::{finite_or_zero, net_return, ReturnSeries};

use tracing::debug;

use crate::barriers::BarrierCandidates;
use crate::domain::{CloseType, PositionSpec, PriceBar, SimulationResult, SimulationRow};

/// Simulate one position over `series` with a per-trade fee rate.
///
/// `series` must be sorted ascending by timestamp; it is not re-sorted.
/// A position that never opens (empty series, or a limit price that is never
/// touched) yields a zero-PnL result closed by `TimeLimit`.
///
/// # Example
/// ```
/// use barrierlab_core::domain::{CloseType, PositionSpec, PriceBar, Side};
/// use barrierlab_core::engine::simulate;
///
/// let series: Vec<PriceBar> = [100.0, 101.0, 103.0, 99.0]
///     .iter()
///     .enumerate()
///     .map(|(i, &c)| PriceBar::flat(i as i64 * 60, c))
///     .collect();
/// let spec = PositionSpec::new(0, Side::Long, 100.0, 1.0)
///     .and_then(|s| s.with_take_profit(0.02))
///     .unwrap();
///
/// let result = simulate(&series, spec, 0.0004);
/// assert_eq!(result.close_type, CloseType::TakeProfit);
/// assert_eq!(result.close_timestamp(), Some(120));
/// ```
pub fn simulate(
    series: &[PriceBar],
    spec: PositionSpec,
    per_trade_cost_rate: f64,
) -> SimulationResult {
    simulate_with_cost(series, spec, &CostModel::new(per_trade_cost_rate))
}

/// [`simulate`] with an explicit [`CostModel`].
pub fn simulate_with_cost(
    series: &[PriceBar],
    spec: PositionSpec,
    cost: &CostModel,
) -> SimulationResult {
    let start = window_start(series, spec.creation_timestamp());

    let Some(entry) = resolve_entry(series, &spec) else {
        let rows = unfilled_rows(&series[start..], &spec);
        debug!(
            bars = series.len(),
            rows = rows.len(),
            limit_entry = spec.is_limit_entry(),
            "position never entered"
        );
        return SimulationResult {
            spec,
            rows,
            close_type: CloseType::TimeLimit,
            entry: None,
        };
    };

    let returns = ReturnSeries::build(series, start, entry, &spec, cost);
    let candidates = BarrierCandidates::evaluate(&returns, &spec);
    let decision = resolve_close(&candidates);

    let rows = truncate_at(returns.into_rows(), decision.timestamp);
    let rows = finalize(rows, &entry, &spec, cost);

    debug!(
        close_type = %decision.close_type,
        entry_timestamp = entry.timestamp,
        close_timestamp = ?rows.last().map(|r| r.timestamp),
        "position closed"
    );

    SimulationResult {
        spec,
        rows,
        close_type: decision.close_type,
        entry: Some(entry),
    }
}

/// Zeroed rows through the time limit (or end of data) for a position that
/// never opened.
fn unfilled_rows(window: &[PriceBar], spec: &PositionSpec) -> Vec<SimulationRow> {
    let expiry = spec.expiry_timestamp();
    window
        .iter()
        .take_while(|bar| expiry.map_or(true, |t| bar.timestamp <= t))
        .map(|bar| SimulationRow::flat(bar.timestamp, bar.close))
        .collect()
}
