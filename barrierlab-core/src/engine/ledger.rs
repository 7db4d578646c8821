//! Ledger finalization: terminal row with realized close economics.
//!
//! Runs strictly after truncation. The last kept row is replaced by a fresh
//! row priced at that bar's close (not the barrier threshold), with both legs
//! of the round trip in the notional:
//!
//! - `filled_amount_quote = amount * fill * 2`
//! - `net_pnl_quote = net_pnl_pct * filled_amount_quote`
//! - `cum_fees_quote = 2 * per_trade_rate * filled_amount_quote`

use tracing::warn;

use crate::domain::{EntryFill, PositionSpec, SimulationRow};
use crate::engine::cost_model::CostModel;
use crate::engine::returns::position_row;

/// Replace the last row of an already-truncated ledger with the close row.
///
/// A ledger whose last row predates the entry (cannot happen for a resolved
/// close) is returned unchanged.
pub fn finalize(
    mut rows: Vec<SimulationRow>,
    entry: &EntryFill,
    spec: &PositionSpec,
    cost: &CostModel,
) -> Vec<SimulationRow> {
    let Some(last) = rows.last_mut() else {
        return rows;
    };
    if last.timestamp < entry.timestamp {
        return rows;
    }

    let round_trip_notional = spec.amount() * entry.price * 2.0;
    let (close_row, coerced) = position_row(
        last.timestamp,
        last.close_price,
        spec,
        entry.price,
        round_trip_notional,
        cost,
    );
    if coerced {
        warn!(
            close_timestamp = close_row.timestamp,
            fill_price = entry.price,
            "non-finite close row values coerced to 0.0"
        );
    }
    *last = close_row;
    rows
}
