//! Cost model: per-trade fee rate and round-trip cost.
//!
//! One rate is charged on the opening trade and once more on the closing
//! trade. The round trip is a constant offset to every bar's return; it is
//! not re-derived per bar from the mark price.

/// Trading friction for a single position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    /// Fractional fee per trade (0.0004 = 4 bps).
    pub per_trade_rate: f64,
}

impl CostModel {
    pub fn new(per_trade_rate: f64) -> Self {
        Self { per_trade_rate }
    }

    pub fn frictionless() -> Self {
        Self::new(0.0)
    }

    /// Opening fee plus closing fee, as a fraction of notional.
    pub fn round_trip_rate(&self) -> f64 {
        2.0 * self.per_trade_rate
    }

    /// Round-trip fees on a quote notional.
    ///
    /// `fees = round_trip_rate * notional`
    pub fn fees_on(&self, notional: f64) -> f64 {
        self.round_trip_rate() * notional
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::frictionless()
    }
}
