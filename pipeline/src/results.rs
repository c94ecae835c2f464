//! @ai:module:intent Result types collected by a pipeline run
//! @ai:module:layer domain
//! @ai:module:public_api PipelineResults, SeasonSummary
//! @ai:module:stateless true

use crate::data::CleanReport;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tdi_engine::{compare_rankings, rank_season, EngineConfig, ScoreField, ScoredRecord, SensitivityReport};

/// @ai:intent Leader and margin of one season under TDI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub year: i32,
    pub team_count: usize,
    pub leader: String,
    pub leader_tdi: f64,
    pub runner_up: Option<String>,
    /// Leader TDI minus runner-up TDI; the leader's TDI when unopposed
    pub margin: f64,
}

/// @ai:intent Complete output of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResults {
    pub timestamp: String,
    pub engine: EngineConfig,
    pub seasons: Vec<SeasonSummary>,
    pub records: Vec<ScoredRecord>,
    pub sensitivity: SensitivityReport,
    #[serde(default)]
    pub cleaning: Vec<CleanReport>,
    #[serde(default)]
    pub skipped_results: usize,
}

impl PipelineResults {
    /// @ai:intent Summarize a scored table into results
    /// @ai:effects pure
    pub fn new(records: Vec<ScoredRecord>, engine: EngineConfig) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            engine,
            seasons: summarize_seasons(&records),
            sensitivity: compare_rankings(&records),
            records,
            cleaning: Vec::new(),
            skipped_results: 0,
        }
    }

    /// @ai:intent Read results previously written as JSON
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read results file: {}", path.display()))?;
        let results = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse results file: {}", path.display()))?;
        Ok(results)
    }

    /// @ai:effects pure
    pub fn latest_year(&self) -> Option<i32> {
        self.records.iter().map(|r| r.year()).max()
    }

    /// @ai:intent Sorted list of seasons present in the table
    /// @ai:effects pure
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.year()).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// @ai:intent The configured focus season, or the latest one
    /// @ai:effects pure
    pub fn focus_year(&self, configured: Option<i32>) -> Option<i32> {
        configured.or_else(|| self.latest_year())
    }

    /// @ai:intent Best `n` teams of a season by a score
    /// @ai:effects pure
    pub fn top_teams(&self, year: i32, n: usize, field: ScoreField) -> Vec<&ScoredRecord> {
        let season: Vec<&ScoredRecord> = self.records.iter().filter(|r| r.year() == year).collect();
        rank_season(&season, field).into_iter().take(n).collect()
    }

    /// @ai:intent Teams with the highest mean TDI across all seasons
    /// @ai:post ties are broken by team name
    /// @ai:effects pure
    pub fn top_teams_by_mean(&self, n: usize) -> Vec<String> {
        let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for record in &self.records {
            let entry = totals.entry(record.team()).or_insert((0.0, 0));
            entry.0 += record.tdi;
            entry.1 += 1;
        }

        let mut means: Vec<(&str, f64)> = totals
            .into_iter()
            .map(|(team, (sum, count))| (team, sum / count as f64))
            .collect();

        means.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        means.into_iter().take(n).map(|(team, _)| team.to_string()).collect()
    }
}

/// @ai:intent Find each season's TDI leader and runner-up
/// @ai:post one summary per season, ascending by year
/// @ai:effects pure
pub fn summarize_seasons(records: &[ScoredRecord]) -> Vec<SeasonSummary> {
    let mut by_year: BTreeMap<i32, Vec<&ScoredRecord>> = BTreeMap::new();
    for record in records {
        by_year.entry(record.year()).or_default().push(record);
    }

    by_year
        .into_iter()
        .filter_map(|(year, season)| {
            let ranked = rank_season(&season, ScoreField::Tdi);
            let leader = ranked.first()?;
            let runner_up = ranked.get(1);

            Some(SeasonSummary {
                year,
                team_count: ranked.len(),
                leader: leader.team().to_string(),
                leader_tdi: leader.tdi,
                runner_up: runner_up.map(|r| r.team().to_string()),
                margin: leader.tdi - runner_up.map(|r| r.tdi).unwrap_or(0.0),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tdi_engine::{build_all_metrics, SeasonTeamRecord};
    use tempfile::TempDir;

    fn sample() -> Vec<ScoredRecord> {
        build_all_metrics(&[
            SeasonTeamRecord::new(2019, "Mercedes", 21, 15, 21, 739.0),
            SeasonTeamRecord::new(2019, "Ferrari", 21, 3, 19, 504.0),
            SeasonTeamRecord::new(2019, "Red Bull", 21, 3, 9, 417.0),
            SeasonTeamRecord::new(2020, "Mercedes", 17, 13, 17, 573.0),
            SeasonTeamRecord::new(2020, "Red Bull", 17, 2, 13, 319.0),
            SeasonTeamRecord::new(2021, "Haas", 22, 0, 0, 0.0),
        ])
    }

    #[test]
    fn test_season_summaries() {
        let seasons = summarize_seasons(&sample());

        assert_eq!(seasons.len(), 3);
        assert_eq!(seasons[0].year, 2019);
        assert_eq!(seasons[0].leader, "Mercedes");
        assert_eq!(seasons[0].team_count, 3);
        assert_eq!(seasons[1].runner_up.as_deref(), Some("Red Bull"));
        assert!(seasons[1].margin > 0.0);
    }

    #[test]
    fn test_single_team_season_has_no_runner_up() {
        let seasons = summarize_seasons(&sample());
        let solo = &seasons[2];

        assert_eq!(solo.leader, "Haas");
        assert_eq!(solo.runner_up, None);
        assert_eq!(solo.margin, solo.leader_tdi);
    }

    #[test]
    fn test_top_teams_and_focus_year() {
        let results = PipelineResults::new(sample(), EngineConfig::default());

        assert_eq!(results.focus_year(None), Some(2021));
        assert_eq!(results.focus_year(Some(2019)), Some(2019));

        let top: Vec<&str> = results
            .top_teams(2019, 2, ScoreField::Tdi)
            .into_iter()
            .map(|r| r.team())
            .collect();
        assert_eq!(top, vec!["Mercedes", "Ferrari"]);
        assert_eq!(results.top_teams_by_mean(1), vec!["Haas".to_string()]);
    }

    #[test]
    fn test_results_json_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results.json");
        let results = PipelineResults::new(sample(), EngineConfig::default());

        std::fs::write(&path, serde_json::to_string_pretty(&results).unwrap()).unwrap();
        let loaded = PipelineResults::load(&path).unwrap();

        let leaders: Vec<&str> = loaded.seasons.iter().map(|s| s.leader.as_str()).collect();
        assert_eq!(leaders, vec!["Mercedes", "Mercedes", "Haas"]);
        assert_eq!(loaded.records.len(), 6);
    }
}
