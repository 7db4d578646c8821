//! Close resolution: earliest barrier wins, ties broken by priority.
//!
//! Priority on equal timestamps: TakeProfit > StopLoss > TrailingStop > TimeLimit.

use crate::barriers::BarrierCandidates;
use crate::domain::{CloseType, SimulationRow};

/// Winning barrier and the timestamp it fired at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseDecision {
    pub close_type: CloseType,
    pub timestamp: i64,
}

/// Pick the minimum candidate timestamp; equal timestamps go to the
/// higher-priority close type.
pub fn resolve_close(candidates: &BarrierCandidates) -> CloseDecision {
    let (close_type, timestamp) = candidates
        .iter()
        .min_by_key(|&(kind, ts)| (ts, kind.priority()))
        .unwrap_or((CloseType::TimeLimit, candidates.time_limit));
    CloseDecision {
        close_type,
        timestamp,
    }
}

/// Keep rows with `timestamp <= close_timestamp`; later rows are dropped.
pub fn truncate_at(mut rows: Vec<SimulationRow>, close_timestamp: i64) -> Vec<SimulationRow> {
    let keep = rows.partition_point(|row| row.timestamp <= close_timestamp);
    rows.truncate(keep);
    rows
}
