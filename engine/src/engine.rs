//! @ai:module:intent Orchestrate rates, normalization and composite scoring
//! @ai:module:layer application
//! @ai:module:public_api EngineConfig, MetricEngine, build_all_metrics
//! @ai:module:depends_on rates, normalize, composite
//! @ai:module:stateless true

use crate::composite::{write_composite, MetricWeights};
use crate::error::Result;
use crate::normalize::{normalize, normalize_scores, GroupScope};
use crate::rates::compute_rates;
use crate::record::{Metric, ScoreField, ScoredRecord, SeasonTeamRecord};
use serde::{Deserialize, Serialize};

/// @ai:intent Weights and normalization grouping used by the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub group_by: GroupScope,
    #[serde(default = "MetricWeights::tdi")]
    pub weights: MetricWeights,
    #[serde(default = "MetricWeights::tdi_alt")]
    pub alt_weights: MetricWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            group_by: GroupScope::Year,
            weights: MetricWeights::tdi(),
            alt_weights: MetricWeights::tdi_alt(),
        }
    }
}

impl EngineConfig {
    /// @ai:intent Validate both weight sets
    /// @ai:effects pure
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.alt_weights.validate()
    }
}

/// @ai:intent Computes scored tables from season-team records
/// @ai:invariant the held config has passed validation
#[derive(Debug, Clone, Default)]
pub struct MetricEngine {
    config: EngineConfig,
}

impl MetricEngine {
    /// @ai:intent Create an engine, rejecting invalid weight sets up front
    /// @ai:effects pure
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// @ai:intent Run the full metric pipeline over a season table
    /// @ai:post output rows match input rows one to one, in order
    /// @ai:post TDI and TDI_alt use the configured weights; TDI_normalized spans the whole table
    /// @ai:effects pure
    /// @ai:idempotent true
    pub fn build(&self, records: &[SeasonTeamRecord]) -> Vec<ScoredRecord> {
        let mut scored = compute_rates(records);

        normalize(&mut scored, &Metric::ALL, self.config.group_by);

        write_composite(&mut scored, &self.config.weights, ScoreField::Tdi);
        write_composite(&mut scored, &self.config.alt_weights, ScoreField::TdiAlt);

        normalize_scores(
            &mut scored,
            ScoreField::Tdi,
            ScoreField::TdiNormalized,
            GroupScope::Global,
        );

        scored
    }
}

/// @ai:intent Score a season table with the standard TDI and TDI_alt presets
/// @ai:effects pure
pub fn build_all_metrics(records: &[SeasonTeamRecord]) -> Vec<ScoredRecord> {
    MetricEngine::default().build(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn sample_table() -> Vec<SeasonTeamRecord> {
        vec![
            SeasonTeamRecord::new(1988, "McLaren", 16, 15, 16, 199.0).with_one_two(10),
            SeasonTeamRecord::new(1988, "Ferrari", 16, 1, 10, 65.0).with_one_two(1),
            SeasonTeamRecord::new(1988, "Benetton", 16, 0, 7, 39.0).with_one_two(0),
            SeasonTeamRecord::new(1989, "McLaren", 16, 10, 16, 141.0).with_one_two(5),
            SeasonTeamRecord::new(1989, "Williams", 16, 2, 8, 77.0).with_one_two(1),
            SeasonTeamRecord::new(1989, "Minardi", 0, 0, 0, 0.0),
        ]
    }

    #[test]
    fn test_two_team_scenario() {
        let scored = build_all_metrics(&[
            SeasonTeamRecord::new(2020, "A", 10, 5, 8, 200.0),
            SeasonTeamRecord::new(2020, "B", 10, 2, 4, 100.0),
        ]);

        assert!((scored[0].rates.points_share - 0.667).abs() < 1e-3);
        assert!((scored[1].rates.points_share - 0.333).abs() < 1e-3);
        assert_eq!(scored[0].norms.win_rate, 1.0);
        assert_eq!(scored[1].norms.win_rate, 0.0);
        assert!(scored[0].tdi > scored[1].tdi);
    }

    #[test]
    fn test_single_team_season_all_norms_one() {
        let scored = build_all_metrics(&[SeasonTeamRecord::new(1950, "Solo", 5, 1, 2, 20.0)]);

        for metric in Metric::ALL {
            assert_eq!(scored[0].norms.get(metric), 1.0);
        }
        assert!((scored[0].tdi - 1.0).abs() < 1e-12);
        assert!((scored[0].tdi_alt - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_outputs_finite_and_bounded() {
        let scored = build_all_metrics(&sample_table());

        for r in &scored {
            for metric in Metric::ALL {
                let norm = r.norms.get(metric);
                assert!((0.0..=1.0).contains(&norm), "{} {} {}", r.team(), metric, norm);
            }
            for score in [r.tdi, r.tdi_alt, r.tdi_normalized] {
                assert!(score.is_finite());
                assert!((0.0..=1.0 + 1e-12).contains(&score));
            }
        }
    }

    #[test]
    fn test_group_max_gets_norm_one() {
        let scored = build_all_metrics(&sample_table());

        for year in [1988, 1989] {
            for metric in Metric::ALL {
                let season: Vec<_> = scored.iter().filter(|r| r.year() == year).collect();
                let max = season
                    .iter()
                    .map(|r| r.rates.get(metric))
                    .fold(f64::MIN, f64::max);
                for r in season.iter().filter(|r| r.rates.get(metric) == max) {
                    assert_eq!(r.norms.get(metric), 1.0);
                }
            }
        }
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let first = build_all_metrics(&sample_table());
        let projected: Vec<_> = first.iter().map(ScoredRecord::to_input).collect();
        let second = build_all_metrics(&projected);

        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_weights_change_primary_only() {
        let config = EngineConfig {
            weights: MetricWeights {
                win_rate: 1.0,
                podium_rate: 0.0,
                points_share: 0.0,
                one_two_rate: 0.0,
            },
            ..Default::default()
        };
        let engine = MetricEngine::new(config).unwrap();
        let scored = engine.build(&sample_table());
        let standard = build_all_metrics(&sample_table());

        for (custom, reference) in scored.iter().zip(&standard) {
            assert_eq!(custom.tdi, custom.norms.win_rate);
            assert_eq!(custom.tdi_alt, reference.tdi_alt);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            alt_weights: MetricWeights {
                win_rate: 0.9,
                podium_rate: 0.9,
                points_share: 0.0,
                one_two_rate: 0.0,
            },
            ..Default::default()
        };

        assert!(matches!(MetricEngine::new(config), Err(Error::InvalidWeights(_))));
    }

    #[test]
    fn test_config_rejects_unknown_keys() {
        let parsed: EngineConfig = serde_json::from_str(r#"{"group_by":"global"}"#).unwrap();
        assert_eq!(parsed.group_by, GroupScope::Global);
        assert_eq!(parsed.weights, MetricWeights::tdi());

        let misspelled = serde_json::from_str::<EngineConfig>(r#"{"group-by":"global"}"#);
        assert!(misspelled.is_err());
    }

    #[test]
    fn test_tdi_normalized_spans_table() {
        let scored = build_all_metrics(&sample_table());

        let max = scored.iter().map(|r| r.tdi_normalized).fold(f64::MIN, f64::max);
        let min = scored.iter().map(|r| r.tdi_normalized).fold(f64::MAX, f64::min);
        assert_eq!(max, 1.0);
        assert_eq!(min, 0.0);
    }

    #[test]
    fn test_empty_table() {
        assert!(build_all_metrics(&[]).is_empty());
    }
}
