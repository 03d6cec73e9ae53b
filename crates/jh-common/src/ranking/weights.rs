use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default factor weights applied when preferences carry no explicit map.
pub const DEFAULT_WEIGHTS: RankingWeights = RankingWeights {
    keywords: 0.30,
    location: 0.20,
    salary: 0.20,
    experience: 0.15,
    company: 0.10,
    freshness: 0.05,
};

/// Per-factor weights for the overall score. Weights need not sum to one;
/// the engine multiplies scores directly and clamps the combined result.
/// Entries missing from a serialized map deserialize as 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
    #[serde(default)]
    pub keywords: f64,
    #[serde(default)]
    pub location: f64,
    #[serde(default)]
    pub salary: f64,
    #[serde(default)]
    pub experience: f64,
    #[serde(default)]
    pub company: f64,
    #[serde(default)]
    pub freshness: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl RankingWeights {
    /// Build weights from a factor-name map; absent entries weigh 0.
    pub fn from_map(map: &HashMap<String, f64>) -> Self {
        let get = |name: &str| map.get(name).copied().unwrap_or(0.0);
        Self {
            keywords: get("keywords"),
            location: get("location"),
            salary: get("salary"),
            experience: get("experience"),
            company: get("company"),
            freshness: get("freshness"),
        }
    }

    pub fn sum(&self) -> f64 {
        self.keywords + self.location + self.salary + self.experience + self.company + self.freshness
    }
}
