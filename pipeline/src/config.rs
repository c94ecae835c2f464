//! @ai:module:intent Configuration structs for the TDI pipeline
//! @ai:module:layer infrastructure
//! @ai:module:public_api PipelineConfig, PathConfig, ChartConfig, FilterConfig
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tdi_engine::{EngineConfig, SeasonTeamRecord};

/// @ai:intent Main configuration for the pipeline
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub charts: ChartConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

/// @ai:intent Input and output locations
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// @ai:intent Chart selection and sizing
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_pie_top_n")]
    pub pie_top_n: usize,
    #[serde(default = "default_top_n")]
    pub heatmap_top_n: usize,
    #[serde(default = "default_recent_years")]
    pub recent_years: i32,
    /// Season used for the bar and pie charts; latest season when unset
    #[serde(default)]
    pub focus_year: Option<i32>,
    /// Teams drawn on the trend chart; top `top_n` by mean TDI when unset
    #[serde(default)]
    pub trend_teams: Option<Vec<String>>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

/// @ai:intent Filter configuration for selecting seasons and teams
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    pub from_year: Option<i32>,
    pub to_year: Option<i32>,
    pub teams: Option<Vec<String>>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            processed_dir: default_processed_dir(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            pie_top_n: default_pie_top_n(),
            heatmap_top_n: default_top_n(),
            recent_years: default_recent_years(),
            focus_year: None,
            trend_teams: None,
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("data/processed")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_top_n() -> usize {
    10
}

fn default_pie_top_n() -> usize {
    5
}

fn default_recent_years() -> i32 {
    10
}

fn default_width() -> u32 {
    1200
}

fn default_height() -> u32 {
    700
}

impl PipelineConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @ai:intent Reject weight sets that do not sum to 1.0 and empty chart sizes
    /// @ai:effects pure
    pub fn validate(&self) -> anyhow::Result<()> {
        self.engine.validate()?;

        if self.charts.width == 0 || self.charts.height == 0 {
            anyhow::bail!("chart width and height must be positive");
        }

        if let (Some(from), Some(to)) = (self.filter.from_year, self.filter.to_year) {
            if from > to {
                anyhow::bail!("filter.from_year ({}) is after filter.to_year ({})", from, to);
            }
        }

        Ok(())
    }

    /// @ai:intent Processed-table directory under the output root
    pub fn processed_output_dir(&self) -> PathBuf {
        self.paths.output_dir.join("processed")
    }

    /// @ai:intent Chart directory under the output root
    pub fn visuals_dir(&self) -> PathBuf {
        self.paths.output_dir.join("visuals")
    }
}

impl FilterConfig {
    /// @ai:intent Check if filter matches a season-team pair
    /// @ai:effects pure
    pub fn matches(&self, year: i32, team: &str) -> bool {
        let from_match = self.from_year.map(|from| year >= from).unwrap_or(true);
        let to_match = self.to_year.map(|to| year <= to).unwrap_or(true);

        let team_match = self
            .teams
            .as_ref()
            .map(|t| t.iter().any(|name| name.eq_ignore_ascii_case(team)))
            .unwrap_or(true);

        from_match && to_match && team_match
    }

    /// @ai:intent Keep only the records the filter matches
    /// @ai:effects pure
    pub fn apply(&self, records: Vec<SeasonTeamRecord>) -> Vec<SeasonTeamRecord> {
        records
            .into_iter()
            .filter(|r| self.matches(r.year, &r.team))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.from_year.is_none() && self.to_year.is_none() && self.teams.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdi_engine::{GroupScope, MetricWeights};
    use tempfile::TempDir;

    #[test]
    fn test_filter_matches_all_when_empty() {
        let filter = FilterConfig::default();
        assert!(filter.is_empty());
        assert!(filter.matches(1950, "Alfa Romeo"));
    }

    #[test]
    fn test_filter_matches_year_range() {
        let filter = FilterConfig {
            from_year: Some(2000),
            to_year: Some(2010),
            ..Default::default()
        };
        assert!(filter.matches(2000, "Ferrari"));
        assert!(filter.matches(2010, "Ferrari"));
        assert!(!filter.matches(1999, "Ferrari"));
        assert!(!filter.matches(2011, "Ferrari"));
    }

    #[test]
    fn test_filter_matches_teams_case_insensitive() {
        let filter = FilterConfig {
            teams: Some(vec!["red bull".to_string(), "Mercedes".to_string()]),
            ..Default::default()
        };
        assert!(filter.matches(2023, "Red Bull"));
        assert!(!filter.matches(2023, "Ferrari"));
    }

    #[test]
    fn test_config_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tdi.toml");

        let mut config = PipelineConfig::default();
        config.charts.focus_year = Some(2023);
        config.save(&path).unwrap();

        let loaded = PipelineConfig::load(&path).unwrap();
        assert_eq!(loaded.charts.focus_year, Some(2023));
        assert_eq!(loaded.engine.weights, MetricWeights::tdi());
        assert_eq!(loaded.engine.alt_weights, MetricWeights::tdi_alt());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
[engine.weights]
win_rate = 0.4
podium_rate = 0.2
points_share = 0.3
one_two_rate = 0.1

[charts]
top_n = 5
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.charts.top_n, 5);
        assert_eq!(config.charts.pie_top_n, 5);
        assert_eq!(config.engine.alt_weights, MetricWeights::tdi_alt());
        assert_eq!(config.paths.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_unknown_engine_key_rejected() {
        let result = toml::from_str::<PipelineConfig>("[engine]\ngroup-by = \"global\"\n");
        assert!(result.is_err());

        let config: PipelineConfig = toml::from_str("[engine]\ngroup_by = \"global\"\n").unwrap();
        assert_eq!(config.engine.group_by, GroupScope::Global);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        std::fs::write(
            &path,
            "[engine.alt_weights]\nwin_rate = 0.5\npodium_rate = 0.5\npoints_share = 0.5\none_two_rate = 0.0\n",
        )
        .unwrap();

        assert!(PipelineConfig::load(&path).is_err());
    }
}
