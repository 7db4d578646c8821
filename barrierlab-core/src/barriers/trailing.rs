//! Trailing stop state machine: `Disarmed → Armed → Triggered`.
//!
//! - Arms on the first bar where net return exceeds `activation_return`.
//!   The floor starts at `net_return - trailing_delta` on that bar.
//! - While armed the floor is carried forward as running state through a
//!   [`RatchetState`]; it never falls when the return pulls back.
//! - Triggers on the first bar strictly after arming where the net return
//!   is below the (updated) floor. Triggered is terminal.

use serde::{Deserialize, Serialize};

use super::ratchet::RatchetState;
use crate::domain::TrailingStopConfig;

/// Phase of a trailing stop after observing a bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrailingPhase {
    Disarmed,
    Armed { floor: f64 },
    Triggered { floor: f64 },
}

impl TrailingPhase {
    pub fn floor(&self) -> Option<f64> {
        match *self {
            TrailingPhase::Disarmed => None,
            TrailingPhase::Armed { floor } | TrailingPhase::Triggered { floor } => Some(floor),
        }
    }

    pub fn is_triggered(&self) -> bool {
        matches!(self, TrailingPhase::Triggered { .. })
    }
}

/// Trailing stop fed one net return per bar.
#[derive(Debug, Clone)]
pub struct TrailingStop {
    config: TrailingStopConfig,
    ratchet: RatchetState,
    phase: TrailingPhase,
}

impl TrailingStop {
    pub fn new(config: TrailingStopConfig) -> Self {
        Self {
            config,
            ratchet: RatchetState::new(),
            phase: TrailingPhase::Disarmed,
        }
    }

    pub fn phase(&self) -> TrailingPhase {
        self.phase
    }

    /// Advance by one bar with that bar's net return.
    ///
    /// # Example
    /// ```
    /// use barrierlab_core::barriers::{TrailingPhase, TrailingStop};
    /// use barrierlab_core::domain::TrailingStopConfig;
    ///
    /// let mut ts = TrailingStop::new(TrailingStopConfig::new(0.01, 0.005));
    /// assert_eq!(ts.observe(0.005), TrailingPhase::Disarmed);
    /// assert!(matches!(ts.observe(0.03), TrailingPhase::Armed { .. }));
    /// assert!(ts.observe(0.02).is_triggered()); // 0.02 < 0.025 floor
    /// ```
    pub fn observe(&mut self, net_pnl_pct: f64) -> TrailingPhase {
        let proposed = net_pnl_pct - self.config.trailing_delta;
        self.phase = match self.phase {
            TrailingPhase::Disarmed => {
                if net_pnl_pct > self.config.activation_return {
                    TrailingPhase::Armed {
                        floor: self.ratchet.apply(proposed),
                    }
                } else {
                    TrailingPhase::Disarmed
                }
            }
            TrailingPhase::Armed { .. } => {
                let floor = self.ratchet.apply(proposed);
                if net_pnl_pct < floor {
                    TrailingPhase::Triggered { floor }
                } else {
                    TrailingPhase::Armed { floor }
                }
            }
            triggered @ TrailingPhase::Triggered { .. } => triggered,
        };
        self.phase
    }
}

/// Floor value on every bar from arming through trigger (or series end).
///
/// Empty if the stop never arms.
pub fn trailing_floor_path(config: TrailingStopConfig, net_returns: &[f64]) -> Vec<f64> {
    let mut stop = TrailingStop::new(config);
    let mut path = Vec::new();
    for &pnl in net_returns {
        let phase = stop.observe(pnl);
        if let Some(floor) = phase.floor() {
            path.push(floor);
        }
        if phase.is_triggered() {
            break;
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TrailingStopConfig {
        TrailingStopConfig::new(0.01, 0.005)
    }

    #[test]
    fn stays_disarmed_until_activation_exceeded() {
        let mut ts = TrailingStop::new(config());
        assert_eq!(ts.observe(0.0), TrailingPhase::Disarmed);
        // Equal to activation is not enough (strict >)
        assert_eq!(ts.observe(0.01), TrailingPhase::Disarmed);
        assert!(matches!(ts.observe(0.011), TrailingPhase::Armed { .. }));
    }

    #[test]
    fn arming_bar_never_triggers() {
        // delta = 0 makes floor == pnl on the arming bar
        let mut ts = TrailingStop::new(TrailingStopConfig::new(0.0, 0.0));
        assert!(matches!(ts.observe(0.02), TrailingPhase::Armed { .. }));
    }

    #[test]
    fn floor_carried_forward_on_pullback() {
        let mut ts = TrailingStop::new(config());
        ts.observe(0.02); // arm, floor 0.015
        ts.observe(0.03); // floor 0.025
        let phase = ts.observe(0.026); // still above floor
        let floor = phase.floor().unwrap();
        assert!((floor - 0.025).abs() < 1e-12);
        assert!(!phase.is_triggered());
    }

    #[test]
    fn reversal_triggers_while_still_profitable() {
        let mut ts = TrailingStop::new(config());
        for pnl in [0.005, 0.015, 0.03] {
            assert!(!ts.observe(pnl).is_triggered());
        }
        let phase = ts.observe(0.02);
        assert!(phase.is_triggered());
        assert!((phase.floor().unwrap() - 0.025).abs() < 1e-12);
    }

    #[test]
    fn triggered_is_terminal() {
        let mut ts = TrailingStop::new(config());
        ts.observe(0.03);
        ts.observe(0.0);
        assert!(ts.phase().is_triggered());
        assert!(ts.observe(0.5).is_triggered());
    }

    #[test]
    fn floor_path_is_non_decreasing() {
        let returns = [0.0, 0.012, 0.018, 0.015, 0.03, 0.027, 0.026, 0.02];
        let path = trailing_floor_path(config(), &returns);
        assert!(!path.is_empty());
        assert!(path.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn floor_path_empty_when_never_armed() {
        assert!(trailing_floor_path(config(), &[0.0, 0.005, -0.02]).is_empty());
    }
}
