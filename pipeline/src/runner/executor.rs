//! @ai:module:intent Run the load, aggregate, score, persist, report and visualize steps
//! @ai:module:layer application
//! @ai:module:public_api PipelineRunner, PipelineInput, RunSummary, create_runner
//! @ai:module:depends_on config, data, aggregate, results, report, runner::step
//! @ai:module:stateless true

use crate::aggregate::{SeasonAggregator, SeasonAggregatorTrait};
use crate::config::PipelineConfig;
use crate::data::{load_raw_dir, prepare_datasets, raw::RACES_FILE, CleanReport, RaceData};
use crate::error::PipelineError;
use crate::report::ReportGenerator;
use crate::results::PipelineResults;
use crate::runner::step::{run_step, Step, StepOutcome};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tdi_engine::{write_scored_table, MetricEngine, ScoredRecord, SeasonTeamRecord};

/// File name of the persisted season table
pub const SEASON_OUTPUT: &str = "team_metrics.csv";
/// File name of the persisted scored table
pub const SCORED_OUTPUT: &str = "team_tdi.csv";

/// @ai:intent Where the run takes its data from
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineInput {
    /// Directory with races.csv, results.csv and constructors.csv
    Raw(PathBuf),
    /// Directory with team_year_summary.csv
    Processed(PathBuf),
}

impl PipelineInput {
    /// @ai:intent Prefer raw tables when present, else the processed directory
    /// @ai:effects fs:read
    pub fn detect(config: &PipelineConfig) -> Self {
        if config.paths.raw_dir.join(RACES_FILE).is_file() {
            Self::Raw(config.paths.raw_dir.clone())
        } else {
            Self::Processed(config.paths.processed_dir.clone())
        }
    }
}

/// Data produced by the load step
enum Loaded {
    Raw(RaceData),
    Season {
        records: Vec<SeasonTeamRecord>,
        cleaning: Vec<CleanReport>,
    },
}

/// @ai:intent Everything a completed run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcomes: Vec<StepOutcome>,
    pub results: PipelineResults,
    pub season_path: PathBuf,
    pub scored_path: PathBuf,
    pub charts: Vec<String>,
}

/// @ai:intent Executes the pipeline steps in order, stopping at the first failure
pub struct PipelineRunner<A: SeasonAggregatorTrait> {
    config: PipelineConfig,
    engine: MetricEngine,
    aggregator: A,
    reports: ReportGenerator,
}

impl<A: SeasonAggregatorTrait> PipelineRunner<A> {
    /// @ai:intent Create a runner, validating the engine weights up front
    /// @ai:effects pure
    pub fn new(config: PipelineConfig, aggregator: A) -> Result<Self, PipelineError> {
        let engine = MetricEngine::new(config.engine)?;
        Ok(Self {
            config,
            engine,
            aggregator,
            reports: ReportGenerator::new(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// @ai:intent Create output/processed and output/visuals
    /// @ai:effects fs:write
    fn ensure_output_dirs(&self) -> Result<(), PipelineError> {
        std::fs::create_dir_all(self.config.processed_output_dir())?;
        std::fs::create_dir_all(self.config.visuals_dir())?;
        Ok(())
    }

    /// @ai:effects fs:read
    fn load(&self, input: &PipelineInput) -> anyhow::Result<(Loaded, String)> {
        match input {
            PipelineInput::Raw(dir) => {
                let data = load_raw_dir(dir)?;
                let detail = format!("{} results from {}", data.results.len(), dir.display());
                Ok((Loaded::Raw(data), detail))
            }
            PipelineInput::Processed(dir) => {
                let prepared = prepare_datasets(dir)?;
                let detail = format!(
                    "{} tables, {} season rows from {}",
                    prepared.tables.len(),
                    prepared.season.records.len(),
                    dir.display()
                );
                Ok((
                    Loaded::Season {
                        records: prepared.season.records,
                        cleaning: prepared.reports,
                    },
                    detail,
                ))
            }
        }
    }

    /// @ai:intent Build the season table and apply the configured filter
    /// @ai:effects pure
    fn aggregate(
        &self,
        loaded: Loaded,
    ) -> anyhow::Result<((Vec<SeasonTeamRecord>, Vec<CleanReport>, usize), String)> {
        let (records, cleaning, skipped, source) = match loaded {
            Loaded::Raw(data) => {
                let aggregation = self.aggregator.aggregate(&data);
                (aggregation.records, Vec::new(), aggregation.skipped_results, "aggregated")
            }
            Loaded::Season { records, cleaning } => (records, cleaning, 0, "supplied"),
        };

        let total = records.len();
        let records = self.config.filter.apply(records);

        if records.is_empty() {
            tracing::warn!("No season-team rows left after filtering ({} before)", total);
        }

        let detail = format!("{} season rows {}, {} kept by filter", total, source, records.len());
        Ok(((records, cleaning, skipped), detail))
    }

    /// @ai:effects fs:write
    fn persist(
        &self,
        records: &[SeasonTeamRecord],
        scored: &[ScoredRecord],
    ) -> anyhow::Result<((PathBuf, PathBuf), String)> {
        let dir = self.config.processed_output_dir();
        let season_path = dir.join(SEASON_OUTPUT);
        let scored_path = dir.join(SCORED_OUTPUT);

        write_season_table(&season_path, records)?;
        write_scored_table(&scored_path, scored)
            .with_context(|| format!("Failed to write {}", scored_path.display()))?;

        let detail = format!("{} and {}", season_path.display(), scored_path.display());
        Ok(((season_path, scored_path), detail))
    }

    /// @ai:intent Run every step against the given input
    /// @ai:post outcomes list the completed steps in order
    /// @ai:effects fs:read, fs:write
    pub fn run(&self, input: &PipelineInput) -> Result<RunSummary, PipelineError> {
        self.ensure_output_dirs()?;
        let mut outcomes = Vec::with_capacity(Step::ALL.len());

        let loaded = run_step(Step::Load, &mut outcomes, || self.load(input))?;

        let (records, cleaning, skipped) =
            run_step(Step::Aggregate, &mut outcomes, || self.aggregate(loaded))?;

        let scored = run_step(Step::Score, &mut outcomes, || {
            let scored = self.engine.build(&records);
            let detail = format!("{} records scored", scored.len());
            Ok((scored, detail))
        })?;

        let (season_path, scored_path) =
            run_step(Step::Persist, &mut outcomes, || self.persist(&records, &scored))?;

        let mut results = PipelineResults::new(scored, self.config.engine);
        results.cleaning = cleaning;
        results.skipped_results = skipped;

        run_step(Step::Report, &mut outcomes, || {
            let files = self.reports.generate_reports(&results, &self.config.charts, &self.config.paths.output_dir)?;
            Ok(((), files.join(", ")))
        })?;

        let charts = run_step(Step::Visualize, &mut outcomes, || {
            let charts = self
                .reports
                .generate_charts(&results, &self.config.charts, &self.config.visuals_dir())?;
            let detail = format!("{} charts", charts.len());
            Ok((charts, detail))
        })?;

        Ok(RunSummary {
            outcomes,
            results,
            season_path,
            scored_path,
            charts,
        })
    }
}

/// @ai:intent Create a runner with the default season aggregator
/// @ai:effects pure
pub fn create_runner(config: PipelineConfig) -> Result<PipelineRunner<SeasonAggregator>, PipelineError> {
    PipelineRunner::new(config, SeasonAggregator::new())
}

/// @ai:intent Write season-team records as CSV
/// @ai:effects fs:write
pub fn write_season_table(path: &Path, records: &[SeasonTeamRecord]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregation;
    use crate::config::PathConfig;
    use tdi_engine::read_season_table;
    use tempfile::TempDir;

    /// Aggregator that ignores raw data and returns a fixed table
    struct FixedAggregator(Vec<SeasonTeamRecord>);

    impl SeasonAggregatorTrait for FixedAggregator {
        fn aggregate(&self, _data: &RaceData) -> Aggregation {
            Aggregation {
                records: self.0.clone(),
                skipped_results: 3,
            }
        }
    }

    fn config_in(root: &Path) -> PipelineConfig {
        let mut config = PipelineConfig {
            paths: PathConfig {
                raw_dir: root.join("raw"),
                processed_dir: root.join("processed"),
                output_dir: root.join("output"),
            },
            ..Default::default()
        };
        config.charts.width = 400;
        config.charts.height = 300;
        config
    }

    fn write_processed(config: &PipelineConfig) {
        std::fs::create_dir_all(&config.paths.processed_dir).unwrap();
        std::fs::write(
            config.paths.processed_dir.join("team_year_summary.csv"),
            "year,team,races,wins,podiums,points,one_two_finishes\n\
             2022,Red Bull,22,17,20,759,4\n\
             2022,Ferrari,22,4,16,554,1\n\
             2023,Red Bull,22,21,22,860,8\n\
             2023,Mercedes,22,0,8,409,0\n",
        )
        .unwrap();
    }

    #[test]
    fn test_run_from_processed_table() {
        let temp = TempDir::new().unwrap();
        let config = config_in(temp.path());
        write_processed(&config);

        let runner = create_runner(config.clone()).unwrap();
        let summary = runner
            .run(&PipelineInput::Processed(config.paths.processed_dir.clone()))
            .unwrap();

        let steps: Vec<Step> = summary.outcomes.iter().map(|o| o.step).collect();
        assert_eq!(steps, Step::ALL.to_vec());

        assert!(summary.scored_path.exists());
        let season = read_season_table(&summary.season_path).unwrap();
        assert_eq!(season.records.len(), 4);

        assert_eq!(summary.results.seasons.len(), 2);
        assert_eq!(summary.results.seasons[1].leader, "Red Bull");
        assert!(config.paths.output_dir.join("results.json").exists());
        assert!(config.paths.output_dir.join("results.md").exists());
    }

    #[test]
    fn test_filter_applies_before_scoring() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(temp.path());
        config.filter.from_year = Some(2023);
        write_processed(&config);

        let summary = create_runner(config.clone())
            .unwrap()
            .run(&PipelineInput::Processed(config.paths.processed_dir.clone()))
            .unwrap();

        assert!(summary.results.records.iter().all(|r| r.year() == 2023));
    }

    #[test]
    fn test_raw_input_uses_aggregator() {
        let temp = TempDir::new().unwrap();
        let config = config_in(temp.path());
        let raw = &config.paths.raw_dir;
        std::fs::create_dir_all(raw).unwrap();
        std::fs::write(raw.join("races.csv"), "raceId,year\n1,2009\n").unwrap();
        std::fs::write(raw.join("results.csv"), "raceId,constructorId,positionOrder,points\n").unwrap();
        std::fs::write(raw.join("constructors.csv"), "constructorId,name\n").unwrap();

        assert_eq!(PipelineInput::detect(&config), PipelineInput::Raw(raw.clone()));

        let runner = PipelineRunner::new(
            config.clone(),
            FixedAggregator(vec![SeasonTeamRecord::new(2009, "Brawn", 17, 8, 15, 172.0)]),
        )
        .unwrap();
        let summary = runner.run(&PipelineInput::detect(&config)).unwrap();

        assert_eq!(summary.results.skipped_results, 3);
        assert_eq!(summary.results.records[0].team(), "Brawn");
    }

    #[test]
    fn test_missing_input_fails_at_load() {
        let temp = TempDir::new().unwrap();
        let config = config_in(temp.path());

        let err = create_runner(config.clone())
            .unwrap()
            .run(&PipelineInput::detect(&config))
            .unwrap_err();

        match err {
            PipelineError::Step { step, .. } => assert_eq!(step, Step::Load),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_weights_rejected_at_creation() {
        let mut config = PipelineConfig::default();
        config.engine.weights.win_rate = 0.9;

        assert!(create_runner(config).is_err());
    }
}
