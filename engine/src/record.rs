//! @ai:module:intent Define data structures for season-team records and derived metrics
//! @ai:module:layer domain
//! @ai:module:public_api SeasonTeamRecord, ScoredRecord, Metric, MetricValues, ScoreField, NULL_MARKERS
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};

/// Cell values read as missing data
pub const NULL_MARKERS: [&str; 4] = ["", "\\N", "NA", "NaN"];

/// @ai:intent One constructor's aggregated performance in one season
/// @ai:invariant (year, team) is unique within a table
/// @ai:note null cells read as 0 (counts, points) or absent (one-two); whole floats like `17.0` are accepted as counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonTeamRecord {
    pub year: i32,
    pub team: String,
    #[serde(deserialize_with = "lenient::count")]
    pub races: u32,
    #[serde(deserialize_with = "lenient::count")]
    pub wins: u32,
    #[serde(deserialize_with = "lenient::count")]
    pub podiums: u32,
    #[serde(deserialize_with = "lenient::points")]
    pub points: f64,
    #[serde(default, deserialize_with = "lenient::optional_count")]
    pub one_two_finishes: Option<u32>,
}

impl SeasonTeamRecord {
    /// @ai:intent Create a record without the optional one-two column
    /// @ai:effects pure
    pub fn new(year: i32, team: impl Into<String>, races: u32, wins: u32, podiums: u32, points: f64) -> Self {
        Self {
            year,
            team: team.into(),
            races,
            wins,
            podiums,
            points,
            one_two_finishes: None,
        }
    }

    /// @ai:intent Attach a one-two finish count
    /// @ai:effects pure
    pub fn with_one_two(mut self, one_two_finishes: u32) -> Self {
        self.one_two_finishes = Some(one_two_finishes);
        self
    }
}

/// Tolerant numeric cells for season tables written by other tools
mod lenient {
    use super::NULL_MARKERS;
    use serde::de::{self, Deserializer, Unexpected, Visitor};
    use std::fmt;

    /// Reads a number, a numeric string, or a null marker
    struct CellVisitor;

    impl<'de> Visitor<'de> for CellVisitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or a null marker")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(v.is_finite().then_some(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let v = v.trim();
            if NULL_MARKERS.contains(&v) {
                return Ok(None);
            }
            match v.parse::<f64>() {
                Ok(n) => Ok(n.is_finite().then_some(n)),
                Err(_) => Err(E::invalid_value(Unexpected::Str(v), &self)),
            }
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    fn whole<E: de::Error>(value: Option<f64>) -> Result<Option<u32>, E> {
        match value {
            None => Ok(None),
            Some(v) if v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) => Ok(Some(v as u32)),
            Some(v) => Err(E::invalid_value(Unexpected::Float(v), &"a whole non-negative count")),
        }
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let cell = deserializer.deserialize_any(CellVisitor)?;
        Ok(whole::<D::Error>(cell)?.unwrap_or(0))
    }

    pub fn optional_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        whole(deserializer.deserialize_any(CellVisitor)?)
    }

    pub fn points<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(deserializer.deserialize_any(CellVisitor)?.unwrap_or(0.0))
    }
}

/// @ai:intent The four rate metrics that feed the composite scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    WinRate,
    PodiumRate,
    PointsShare,
    OneTwoRate,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::WinRate,
        Metric::PodiumRate,
        Metric::PointsShare,
        Metric::OneTwoRate,
    ];

    /// @ai:intent Column name of the raw rate
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::WinRate => "win_rate",
            Metric::PodiumRate => "podium_rate",
            Metric::PointsShare => "points_share",
            Metric::OneTwoRate => "one_two_rate",
        }
    }

    /// @ai:intent Column name of the normalized rate
    /// @ai:effects pure
    pub fn norm_column(&self) -> &'static str {
        match self {
            Metric::WinRate => "win_rate_norm",
            Metric::PodiumRate => "podium_rate_norm",
            Metric::PointsShare => "points_share_norm",
            Metric::OneTwoRate => "one_two_rate_norm",
        }
    }

    /// @ai:intent Parse a metric from its column name
    /// @ai:effects pure
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent One value per metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricValues {
    pub win_rate: f64,
    pub podium_rate: f64,
    pub points_share: f64,
    pub one_two_rate: f64,
}

impl MetricValues {
    /// @ai:effects pure
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::WinRate => self.win_rate,
            Metric::PodiumRate => self.podium_rate,
            Metric::PointsShare => self.points_share,
            Metric::OneTwoRate => self.one_two_rate,
        }
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::WinRate => self.win_rate = value,
            Metric::PodiumRate => self.podium_rate = value,
            Metric::PointsShare => self.points_share = value,
            Metric::OneTwoRate => self.one_two_rate = value,
        }
    }
}

/// @ai:intent Composite score fields written by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreField {
    #[serde(rename = "TDI")]
    Tdi,
    #[serde(rename = "TDI_alt")]
    TdiAlt,
    #[serde(rename = "TDI_normalized")]
    TdiNormalized,
}

impl ScoreField {
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreField::Tdi => "TDI",
            ScoreField::TdiAlt => "TDI_alt",
            ScoreField::TdiNormalized => "TDI_normalized",
        }
    }
}

/// @ai:intent A season-team record with rates, normalized rates and composite scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: SeasonTeamRecord,
    pub rates: MetricValues,
    pub norms: MetricValues,
    #[serde(rename = "TDI")]
    pub tdi: f64,
    #[serde(rename = "TDI_alt")]
    pub tdi_alt: f64,
    #[serde(rename = "TDI_normalized")]
    pub tdi_normalized: f64,
}

impl ScoredRecord {
    /// @ai:intent Wrap a record with zeroed derived fields
    /// @ai:effects pure
    pub fn unscored(record: SeasonTeamRecord) -> Self {
        Self {
            record,
            rates: MetricValues::default(),
            norms: MetricValues::default(),
            tdi: 0.0,
            tdi_alt: 0.0,
            tdi_normalized: 0.0,
        }
    }

    pub fn year(&self) -> i32 {
        self.record.year
    }

    pub fn team(&self) -> &str {
        &self.record.team
    }

    /// @ai:effects pure
    pub fn score(&self, field: ScoreField) -> f64 {
        match field {
            ScoreField::Tdi => self.tdi,
            ScoreField::TdiAlt => self.tdi_alt,
            ScoreField::TdiNormalized => self.tdi_normalized,
        }
    }

    pub fn set_score(&mut self, field: ScoreField, value: f64) {
        match field {
            ScoreField::Tdi => self.tdi = value,
            ScoreField::TdiAlt => self.tdi_alt = value,
            ScoreField::TdiNormalized => self.tdi_normalized = value,
        }
    }

    /// @ai:intent Project back onto the input schema, dropping derived fields
    /// @ai:effects pure
    pub fn to_input(&self) -> SeasonTeamRecord {
        self.record.clone()
    }
}

/// @ai:intent Flat row layout used when persisting a scored table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRow {
    pub year: i32,
    pub team: String,
    pub races: u32,
    pub wins: u32,
    pub podiums: u32,
    pub points: f64,
    pub one_two_finishes: Option<u32>,
    pub win_rate: f64,
    pub podium_rate: f64,
    pub points_share: f64,
    pub one_two_rate: f64,
    pub win_rate_norm: f64,
    pub podium_rate_norm: f64,
    pub points_share_norm: f64,
    pub one_two_rate_norm: f64,
    #[serde(rename = "TDI")]
    pub tdi: f64,
    #[serde(rename = "TDI_alt")]
    pub tdi_alt: f64,
    #[serde(rename = "TDI_normalized")]
    pub tdi_normalized: f64,
}

impl From<&ScoredRecord> for ScoredRow {
    fn from(scored: &ScoredRecord) -> Self {
        let r = &scored.record;
        Self {
            year: r.year,
            team: r.team.clone(),
            races: r.races,
            wins: r.wins,
            podiums: r.podiums,
            points: r.points,
            one_two_finishes: r.one_two_finishes,
            win_rate: scored.rates.win_rate,
            podium_rate: scored.rates.podium_rate,
            points_share: scored.rates.points_share,
            one_two_rate: scored.rates.one_two_rate,
            win_rate_norm: scored.norms.win_rate,
            podium_rate_norm: scored.norms.podium_rate,
            points_share_norm: scored.norms.points_share,
            one_two_rate_norm: scored.norms.one_two_rate,
            tdi: scored.tdi,
            tdi_alt: scored.tdi_alt,
            tdi_normalized: scored.tdi_normalized,
        }
    }
}

impl From<ScoredRow> for ScoredRecord {
    fn from(row: ScoredRow) -> Self {
        Self {
            record: SeasonTeamRecord {
                year: row.year,
                team: row.team,
                races: row.races,
                wins: row.wins,
                podiums: row.podiums,
                points: row.points,
                one_two_finishes: row.one_two_finishes,
            },
            rates: MetricValues {
                win_rate: row.win_rate,
                podium_rate: row.podium_rate,
                points_share: row.points_share,
                one_two_rate: row.one_two_rate,
            },
            norms: MetricValues {
                win_rate: row.win_rate_norm,
                podium_rate: row.podium_rate_norm,
                points_share: row.points_share_norm,
                one_two_rate: row.one_two_rate_norm,
            },
            tdi: row.tdi,
            tdi_alt: row.tdi_alt,
            tdi_normalized: row.tdi_normalized,
        }
    }
}
