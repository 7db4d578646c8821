use serde::{Deserialize, Serialize};
use std::fmt;

use super::position_spec::PositionSpec;

/// Deterministic position-spec ID (BLAKE3 of the canonical JSON form).
///
/// Two specs with identical fields always hash to the same ID, across runs
/// and platforms, so batch results can be looked up by spec content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpecId(pub String);

impl SpecId {
    pub fn of(spec: &PositionSpec) -> Self {
        // Field order is fixed by the struct definition, so the JSON is canonical.
        let json = serde_json::to_string(spec).expect("PositionSpec must serialize");
        Self(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
