//! BarrierLab Runner: batch simulation over a shared price series.
//!
//! This crate builds on `barrierlab-core` to provide:
//! - TOML-loadable batch configuration (fee rate, parallelism, pool size)
//! - A batch driver that fans simulations out over rayon, with progress
//!   reporting and cooperative cancellation
//! - Batch results addressable by spec id, with close-type tallies

pub mod batch;
pub mod config;

pub use batch::{BatchDriver, BatchResults, RunError};
pub use config::{BatchConfig, ConfigError};
