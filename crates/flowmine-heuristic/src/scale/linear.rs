//! Proportional scaling without bucketing.

use flowmine_core::MiningError;
use flowmine_core::config::ScaleConfig;

use super::{ScaleStrategy, ScaleTable, bound_score, distinct_sorted};

/// Maps magnitudes linearly from `[min, max]` onto `[score_min, score_max]`.
///
/// Useful when every count should be visually distinguishable. A single
/// distinct magnitude scores `score_min`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScale {
    pub score_min: f64,
    pub score_max: f64,
}

impl Default for LinearScale {
    fn default() -> Self {
        let config = ScaleConfig::default();
        Self {
            score_min: config.score_min,
            score_max: config.score_max,
        }
    }
}

impl LinearScale {
    /// Strategy spanning the score range of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::InvalidScaleBounds`] if the score range is
    /// inverted or not finite.
    pub fn from_config(config: &ScaleConfig) -> Result<Self, MiningError> {
        config.validate()?;
        Ok(Self {
            score_min: config.score_min,
            score_max: config.score_max,
        })
    }
}

impl ScaleStrategy for LinearScale {
    fn fit(&self, magnitudes: &[f64]) -> ScaleTable {
        let values = distinct_sorted(magnitudes);
        let (Some(&lo), Some(&hi)) = (values.first(), values.last()) else {
            return ScaleTable::default();
        };
        let span = hi - lo;

        let pairs = values
            .into_iter()
            .map(|v| {
                let t = if span > 0.0 { (v - lo) / span } else { 0.0 };
                let score = (self.score_max - self.score_min).mul_add(t, self.score_min);
                (v, bound_score(score, self.score_min, self.score_max))
            })
            .collect();
        ScaleTable::from_pairs(pairs)
    }
}
