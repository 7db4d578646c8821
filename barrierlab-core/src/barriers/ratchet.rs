//! Ratchet invariant enforcement
//!
//! **Core Rule:** the trailing floor may rise, never fall.
//!
//! Net returns are already side-signed, so a single rule (running maximum)
//! covers long and short positions alike.

/// Running-maximum level for a trailing floor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatchetState {
    /// Current floor (high-water mark of proposed levels)
    current_level: Option<f64>,
}

impl RatchetState {
    /// Create an unset ratchet
    pub fn new() -> Self {
        Self {
            current_level: None,
        }
    }

    /// Create a ratchet with an initial level
    pub fn with_initial_level(initial_level: f64) -> Self {
        Self {
            current_level: Some(initial_level),
        }
    }

    /// Apply ratchet to a proposed floor
    ///
    /// Returns `max(current, proposed)`; the first call initializes the level.
    ///
    /// # Example
    /// ```
    /// use barrierlab_core::barriers::RatchetState;
    ///
    /// let mut ratchet = RatchetState::with_initial_level(0.010);
    ///
    /// // Raising: 1.0% → 2.5% (allowed)
    /// assert_eq!(ratchet.apply(0.025), 0.025);
    ///
    /// // Lowering: 2.5% → 1.5% (blocked, stays at 2.5%)
    /// assert_eq!(ratchet.apply(0.015), 0.025);
    /// ```
    pub fn apply(&mut self, proposed: f64) -> f64 {
        let level = match self.current_level {
            None => proposed,
            Some(current) => current.max(proposed),
        };
        self.current_level = Some(level);
        level
    }

    /// Get current ratchet level (if set)
    pub fn current_level(&self) -> Option<f64> {
        self.current_level
    }
}
