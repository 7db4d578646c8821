use serde::{Deserialize, Serialize};

/// Position side (direction of price-return exposure)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Long position: profits when price rises
    Long,
    /// Short position: profits when price falls
    Short,
}

impl Side {
    /// Sign multiplier applied to raw price returns (+1 long, -1 short).
    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}
