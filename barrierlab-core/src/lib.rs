//! BarrierLab Core: triple-barrier position simulation.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (price bars, position specs, ledger rows, close types)
//! - Entry resolution (market and bar-close limit fills)
//! - Cost-adjusted return series
//! - Barrier evaluators with a ratcheted trailing-stop state machine
//! - Close resolution with fixed tie-break priority, and ledger finalization

pub mod barriers;
pub mod domain;
pub mod engine;

pub use domain::{
    CloseType, PositionSpec, PriceBar, Side, SimulationResult, SimulationRow, SpecError,
    TrailingStopConfig,
};
pub use engine::{simulate, simulate_with_cost, CostModel};
