//! Batch driver: one simulation per position spec over a shared price series.
//!
//! Simulations are independent and only read the series, so they fan out
//! over rayon with no locking. Results always come back in input order.
//!
//! Three entry points:
//! - `run()`: simulate every spec.
//! - `run_with_progress()`: same, invoking a callback after each simulation.
//! - `run_cancellable()`: stops scheduling new simulations once a flag is
//!   set; in-flight ones run to completion.
//!
//! `run_controlled()` combines the last two.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;
use thiserror::Error;
use tracing::info;

use barrierlab_core::domain::{first_unordered, CloseType, PositionSpec, PriceBar, SpecId};
use barrierlab_core::engine::simulate_with_cost;
use barrierlab_core::{CostModel, SimulationResult};

use crate::config::{BatchConfig, ConfigError};

/// Errors from the batch driver.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("price series not strictly ascending at bar {index}")]
    UnorderedSeries { index: usize },
}

/// Runs batches of simulations under one [`BatchConfig`].
pub struct BatchDriver {
    config: BatchConfig,
    cost: CostModel,
    pool: Option<rayon::ThreadPool>,
}

impl BatchDriver {
    /// Validate `config` and build the dedicated pool if `num_threads` is set.
    pub fn new(config: BatchConfig) -> Result<Self, RunError> {
        config.validate()?;
        let pool = match (config.parallel, config.num_threads) {
            (true, Some(n)) => Some(rayon::ThreadPoolBuilder::new().num_threads(n).build()?),
            _ => None,
        };
        Ok(Self {
            cost: CostModel::new(config.per_trade_cost_rate),
            config,
            pool,
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Simulate every spec against `series`.
    pub fn run(
        &self,
        series: &[PriceBar],
        specs: &[PositionSpec],
    ) -> Result<BatchResults, RunError> {
        self.run_controlled(series, specs, None, |_, _, _| {})
    }

    /// Simulate every spec, reporting progress.
    ///
    /// The callback is invoked after each simulation completes with:
    /// - Number of simulations completed so far (1-based)
    /// - Total number of specs
    /// - The completed result
    ///
    /// In parallel mode completions arrive in no particular order.
    pub fn run_with_progress<F>(
        &self,
        series: &[PriceBar],
        specs: &[PositionSpec],
        progress_callback: F,
    ) -> Result<BatchResults, RunError>
    where
        F: Fn(usize, usize, &SimulationResult) + Send + Sync,
    {
        self.run_controlled(series, specs, None, progress_callback)
    }

    /// Simulate specs until `cancel` is set.
    ///
    /// Specs not yet started when the flag flips are skipped and counted in
    /// [`BatchResults::skipped`].
    pub fn run_cancellable(
        &self,
        series: &[PriceBar],
        specs: &[PositionSpec],
        cancel: &AtomicBool,
    ) -> Result<BatchResults, RunError> {
        self.run_controlled(series, specs, Some(cancel), |_, _, _| {})
    }

    /// Progress reporting and cancellation together.
    ///
    /// `cancel` is checked before each simulation starts; `progress_callback`
    /// runs after each one completes.
    pub fn run_controlled<F>(
        &self,
        series: &[PriceBar],
        specs: &[PositionSpec],
        cancel: Option<&AtomicBool>,
        progress_callback: F,
    ) -> Result<BatchResults, RunError>
    where
        F: Fn(usize, usize, &SimulationResult) + Send + Sync,
    {
        if let Some(index) = first_unordered(series) {
            return Err(RunError::UnorderedSeries { index });
        }

        let total = specs.len();
        info!(
            positions = total,
            bars = series.len(),
            parallel = self.config.parallel,
            threads = ?self.config.num_threads,
            "batch started"
        );

        let completed = AtomicUsize::new(0);
        let run_one = |spec: &PositionSpec| -> Option<SimulationResult> {
            if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
                return None;
            }
            let result = simulate_with_cost(series, spec.clone(), &self.cost);
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            progress_callback(done, total, &result);
            Some(result)
        };

        let outcomes: Vec<Option<SimulationResult>> = match (&self.pool, self.config.parallel) {
            (_, false) => specs.iter().map(run_one).collect(),
            (Some(pool), true) => pool.install(|| specs.par_iter().map(run_one).collect()),
            (None, true) => specs.par_iter().map(run_one).collect(),
        };

        let skipped = outcomes.iter().filter(|o| o.is_none()).count();
        let results = BatchResults::new(outcomes.into_iter().flatten().collect(), skipped);

        if skipped > 0 {
            info!(skipped, completed = results.len(), "batch cancelled");
        }
        info!(
            completed = results.len(),
            filled = results.filled_count(),
            close_types = ?results.close_type_counts(),
            "batch finished"
        );

        Ok(results)
    }
}

/// Results from one batch, in input order.
#[derive(Debug)]
pub struct BatchResults {
    results: Vec<SimulationResult>,
    by_spec_id: HashMap<SpecId, usize>,
    skipped: usize,
}

impl BatchResults {
    fn new(results: Vec<SimulationResult>, skipped: usize) -> Self {
        let mut by_spec_id = HashMap::with_capacity(results.len());
        for (idx, result) in results.iter().enumerate() {
            // Duplicate specs share an id; the first one wins.
            by_spec_id.entry(result.spec.id()).or_insert(idx);
        }
        Self {
            results,
            by_spec_id,
            skipped,
        }
    }

    pub fn all(&self) -> &[SimulationResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Result for the spec with this id.
    pub fn get(&self, spec_id: &SpecId) -> Option<&SimulationResult> {
        self.by_spec_id.get(spec_id).map(|&idx| &self.results[idx])
    }

    /// How many results closed by each barrier.
    pub fn close_type_counts(&self) -> BTreeMap<CloseType, usize> {
        let mut counts = BTreeMap::new();
        for result in &self.results {
            *counts.entry(result.close_type).or_insert(0) += 1;
        }
        counts
    }

    pub fn filled_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_filled()).count()
    }

    pub fn unfilled_count(&self) -> usize {
        self.results.len() - self.filled_count()
    }

    /// Specs never simulated because the batch was cancelled.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn into_results(self) -> Vec<SimulationResult> {
        self.results
    }
}
