//! Domain types for BarrierLab

pub mod bar;
pub mod ids;
pub mod position_spec;
pub mod side;
pub mod simulation;

pub use bar::{first_unordered, is_ordered, PriceBar};
pub use ids::SpecId;
pub use position_spec::{PositionConfig, PositionSpec, SpecError, TrailingStopConfig};
pub use side::Side;
pub use simulation::{CloseType, EntryFill, SimulationResult, SimulationRow};
