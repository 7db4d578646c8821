//! Return series: signed, cost-adjusted returns from entry to end of data.
//!
//! Net return at bar `t`:
//!   `(close[t] - fill) / fill * side_sign - 2 * per_trade_rate`
//!
//! The series is built over the full remaining data before any barrier is
//! known; the close resolver truncates it afterwards.

use tracing::warn;

use crate::domain::{EntryFill, PositionSpec, PriceBar, SimulationRow};
use crate::engine::cost_model::CostModel;

/// Replace NaN / ±inf with `0.0`. Ledger fields are always finite.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Net (side-signed, cost-adjusted) return of exiting at `exit_price`.
pub fn net_return(spec: &PositionSpec, fill_price: f64, exit_price: f64, cost: &CostModel) -> f64 {
    (exit_price - fill_price) / fill_price * spec.side().sign() - cost.round_trip_rate()
}

/// Open-position row marked at `close_price` with the given quote notional.
///
/// The second element is true if any field had to be coerced to zero.
pub(crate) fn position_row(
    timestamp: i64,
    close_price: f64,
    spec: &PositionSpec,
    fill_price: f64,
    notional: f64,
    cost: &CostModel,
) -> (SimulationRow, bool) {
    let raw_pct = net_return(spec, fill_price, close_price, cost);
    let raw_quote = raw_pct * notional;
    let raw_fees = cost.fees_on(notional);

    let coerced = !(raw_pct.is_finite()
        && raw_quote.is_finite()
        && raw_fees.is_finite()
        && notional.is_finite()
        && fill_price.is_finite());

    let row = SimulationRow {
        timestamp,
        close_price,
        net_pnl_pct: finite_or_zero(raw_pct),
        net_pnl_quote: finite_or_zero(raw_quote),
        cum_fees_quote: finite_or_zero(raw_fees),
        filled_amount_quote: finite_or_zero(notional),
        current_avg_entry_price: finite_or_zero(fill_price),
    };
    (row, coerced)
}

/// Candidate ledger for one position, before truncation.
///
/// `bars` and `rows` are parallel slices starting at the first bar at/after
/// creation; `entry_offset` points at the entry bar inside them.
#[derive(Debug, Clone)]
pub struct ReturnSeries<'a> {
    bars: &'a [PriceBar],
    rows: Vec<SimulationRow>,
    entry_offset: usize,
    entry: EntryFill,
}

impl<'a> ReturnSeries<'a> {
    /// Build rows from `window_start` to the end of `series`.
    ///
    /// `entry.index` must lie in `window_start..series.len()`.
    pub fn build(
        series: &'a [PriceBar],
        window_start: usize,
        entry: EntryFill,
        spec: &PositionSpec,
        cost: &CostModel,
    ) -> Self {
        let bars = &series[window_start..];
        let entry_offset = entry.index - window_start;
        // Open leg only; the close bar doubles it in the ledger finalizer.
        let notional = spec.amount() * entry.price;

        let mut coerced = 0usize;
        let rows = bars
            .iter()
            .enumerate()
            .map(|(offset, bar)| {
                if offset < entry_offset {
                    return SimulationRow::flat(bar.timestamp, bar.close);
                }
                let (row, was_coerced) =
                    position_row(bar.timestamp, bar.close, spec, entry.price, notional, cost);
                coerced += usize::from(was_coerced);
                row
            })
            .collect();

        if coerced > 0 {
            warn!(
                coerced,
                entry_timestamp = entry.timestamp,
                fill_price = entry.price,
                "non-finite ledger values coerced to 0.0"
            );
        }

        Self {
            bars,
            rows,
            entry_offset,
            entry,
        }
    }

    pub fn entry(&self) -> EntryFill {
        self.entry
    }

    pub fn rows(&self) -> &[SimulationRow] {
        &self.rows
    }

    /// `(bar, row)` pairs from the entry bar onward.
    pub fn active(&self) -> impl Iterator<Item = (&PriceBar, &SimulationRow)> + '_ {
        self.bars[self.entry_offset..]
            .iter()
            .zip(&self.rows[self.entry_offset..])
    }

    /// Timestamp of the last available bar.
    pub fn last_timestamp(&self) -> i64 {
        // The entry bar is always in the window, so `bars` is never empty.
        self.bars
            .last()
            .map_or(self.entry.timestamp, |bar| bar.timestamp)
    }

    pub fn into_rows(self) -> Vec<SimulationRow> {
        self.rows
    }
}
