use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name of the resource every task carries to describe how uncertain its
/// duration estimate is.
pub const UNCERTAINTY_RESOURCE: &str = "Uncertainty";

/// Qualitative uncertainty of a task's duration estimate.
///
/// Each level maps to a multiplier that bounds the sampled duration:
/// a task of duration `d` is sampled from `[d / m, d * m]` with mode `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Uncertainty {
    Low,
    Moderate,
    High,
    Extreme,
}

impl Uncertainty {
    pub const ALL: [Uncertainty; 4] = [
        Uncertainty::Low,
        Uncertainty::Moderate,
        Uncertainty::High,
        Uncertainty::Extreme,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            Uncertainty::Low => 1.1,
            Uncertainty::Moderate => 1.5,
            Uncertainty::High => 2.0,
            Uncertainty::Extreme => 5.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Uncertainty::Low => "low",
            Uncertainty::Moderate => "moderate",
            Uncertainty::High => "high",
            Uncertainty::Extreme => "extreme",
        }
    }
}

impl Default for Uncertainty {
    fn default() -> Self {
        Uncertainty::Low
    }
}

impl fmt::Display for Uncertainty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Uncertainty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Uncertainty::Low),
            "moderate" => Ok(Uncertainty::Moderate),
            "high" => Ok(Uncertainty::High),
            "extreme" => Ok(Uncertainty::Extreme),
            other => Err(format!(
                "invalid uncertainty: {other} (expected \"low\", \"moderate\", \"high\" or \"extreme\")"
            )),
        }
    }
}
