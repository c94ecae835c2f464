//! @ai:module:intent Weighted composite scoring over normalized metrics
//! @ai:module:layer domain
//! @ai:module:public_api MetricWeights, compute_composite
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::record::{Metric, ScoreField, ScoredRecord};
use serde::{Deserialize, Serialize};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// @ai:intent Weight per metric for one composite score
/// @ai:invariant all four metrics present, each >= 0, summing to 1.0 (checked by validate)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricWeights {
    pub win_rate: f64,
    pub podium_rate: f64,
    pub points_share: f64,
    pub one_two_rate: f64,
}

impl MetricWeights {
    /// @ai:intent Primary TDI weighting
    pub fn tdi() -> Self {
        Self {
            win_rate: 0.35,
            podium_rate: 0.25,
            points_share: 0.25,
            one_two_rate: 0.15,
        }
    }

    /// @ai:intent Sensitivity weighting that favours points share
    pub fn tdi_alt() -> Self {
        Self {
            win_rate: 0.25,
            podium_rate: 0.15,
            points_share: 0.45,
            one_two_rate: 0.15,
        }
    }

    /// @ai:effects pure
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::WinRate => self.win_rate,
            Metric::PodiumRate => self.podium_rate,
            Metric::PointsShare => self.points_share,
            Metric::OneTwoRate => self.one_two_rate,
        }
    }

    /// @ai:effects pure
    pub fn sum(&self) -> f64 {
        Metric::ALL.iter().map(|m| self.get(*m)).sum()
    }

    /// @ai:intent Check weights are finite, non-negative and sum to 1.0
    /// @ai:effects pure
    pub fn validate(&self) -> Result<()> {
        for metric in Metric::ALL {
            let w = self.get(metric);
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidWeights(format!(
                    "weight for {} must be a non-negative number, got {}",
                    metric, w
                )));
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(Error::InvalidWeights(format!(
                "weights must sum to 1.0, got {:.6}",
                sum
            )));
        }

        Ok(())
    }

    /// @ai:intent Weighted sum of a record's normalized metrics
    /// @ai:effects pure
    pub fn score(&self, record: &ScoredRecord) -> f64 {
        Metric::ALL
            .iter()
            .map(|m| self.get(*m) * record.norms.get(*m))
            .sum()
    }
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self::tdi()
    }
}

/// @ai:intent Write the weighted sum of normalized metrics into the target score field
/// @ai:pre records already carry all four `_norm` values
/// @ai:post score is linear in each normalized input
/// @ai:effects pure (mutates only the passed records)
pub fn compute_composite(
    records: &mut [ScoredRecord],
    weights: &MetricWeights,
    target: ScoreField,
) -> Result<()> {
    weights.validate()?;
    write_composite(records, weights, target);
    Ok(())
}

/// @ai:pre weights already validated
pub(crate) fn write_composite(records: &mut [ScoredRecord], weights: &MetricWeights, target: ScoreField) {
    for record in records.iter_mut() {
        let score = weights.score(record);
        record.set_score(target, score);
    }
}
