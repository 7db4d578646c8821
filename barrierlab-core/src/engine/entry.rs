//! Entry resolution: the bar at which the position actually opens.
//!
//! The scan window runs from the first bar at/after `creation_timestamp`
//! through the time-limit expiry (if any). Limit entries use the bar close as
//! the touch proxy, not high/low: a coarse bar-close fill model.

use crate::domain::{EntryFill, PositionSpec, PriceBar, Side};

/// Index of the first bar with `timestamp >= creation_timestamp`.
///
/// Equals `series.len()` when every bar predates creation.
pub fn window_start(series: &[PriceBar], creation_timestamp: i64) -> usize {
    series.partition_point(|bar| bar.timestamp < creation_timestamp)
}

/// Whether a limit order for `side` at `limit_price` fills on `bar`.
pub fn limit_touched(side: Side, limit_price: f64, bar: &PriceBar) -> bool {
    match side {
        Side::Long => bar.close <= limit_price,
        Side::Short => bar.close >= limit_price,
    }
}

/// Find the entry bar, or `None` if the position never opens.
///
/// `None` covers both an empty window (no bars at/after creation) and a
/// limit price that is never touched before expiry.
pub fn resolve_entry(series: &[PriceBar], spec: &PositionSpec) -> Option<EntryFill> {
    let start = window_start(series, spec.creation_timestamp());
    let expiry = spec.expiry_timestamp();

    series[start..]
        .iter()
        .enumerate()
        .take_while(|(_, bar)| expiry.map_or(true, |t| bar.timestamp <= t))
        .find(|(_, bar)| {
            !spec.is_limit_entry() || limit_touched(spec.side(), spec.entry_price(), bar)
        })
        .map(|(offset, bar)| EntryFill {
            index: start + offset,
            timestamp: bar.timestamp,
            price: bar.close,
        })
}
