//! @ai:module:intent CLI for the TDI pipeline
//! @ai:module:layer presentation

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tdi_engine::{read_scored_table, read_season_table, write_scored_table, MetricEngine, ScoreField};
use tdi_pipeline::{
    config::PipelineConfig,
    data::{load_raw_dir, prepare_datasets},
    report::ReportGenerator,
    results::PipelineResults,
    runner::{create_runner, PipelineInput, RunSummary, SCORED_OUTPUT},
};

const DEFAULT_CONFIG: &str = "tdi.toml";

#[derive(Parser)]
#[command(name = "tdi-pipeline")]
#[command(about = "Load, aggregate, score, report and chart F1 constructor dominance")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline
    Run {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Aggregate from a raw directory (races.csv, results.csv, constructors.csv)
        #[arg(long, conflicts_with = "processed")]
        raw: Option<PathBuf>,

        /// Score a processed directory containing team_year_summary.csv
        #[arg(long)]
        processed: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score a season-team CSV with the configured weights
    Score {
        /// Path to the season-team CSV
        input: PathBuf,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Where to write the scored CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate reports and charts from an existing results file
    Report {
        /// Path to results JSON file
        #[arg(short, long)]
        results: PathBuf,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for reports
        #[arg(short, long, default_value = "reports")]
        output: PathBuf,
    },

    /// Show the top teams of a season from a scored CSV
    Top {
        /// Path to the scored CSV (defaults to the pipeline output)
        #[arg(long)]
        scored: Option<PathBuf>,

        /// Season to show (defaults to the latest)
        #[arg(short, long)]
        year: Option<i32>,

        /// Number of teams
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,

        /// Rank by TDI_alt instead of TDI
        #[arg(long)]
        alt: bool,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate configuration and input data
    Validate {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tdi_pipeline=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            raw,
            processed,
            output,
        } => run_pipeline(config, raw, processed, output),
        Commands::Score {
            input,
            config,
            output,
        } => score_table(input, config, output),
        Commands::Report {
            results,
            config,
            output,
        } => generate_reports(results, config, output),
        Commands::Top {
            scored,
            year,
            count,
            alt,
            config,
        } => show_top(scored, year, count, alt, config),
        Commands::Validate { config } => validate(config),
        Commands::Init { output } => init_config(output),
    }
}

/// @ai:intent Run every pipeline step and print a summary
/// @ai:effects fs:read, fs:write
fn run_pipeline(
    config_path: Option<PathBuf>,
    raw: Option<PathBuf>,
    processed: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_or_default_config(config_path)?;
    if let Some(dir) = output {
        config.paths.output_dir = dir;
    }

    let input = match (raw, processed) {
        (Some(dir), _) => PipelineInput::Raw(dir),
        (None, Some(dir)) => PipelineInput::Processed(dir),
        (None, None) => PipelineInput::detect(&config),
    };

    tracing::info!("Input: {:?}", input);
    tracing::info!("Output directory: {}", config.paths.output_dir.display());

    let runner = create_runner(config)?;
    let summary = runner.run(&input)?;

    print_summary(&summary);
    Ok(())
}

/// @ai:intent Score one season CSV and write the scored table
/// @ai:effects fs:read, fs:write
fn score_table(input: PathBuf, config_path: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let config = load_or_default_config(config_path)?;
    let engine = MetricEngine::new(config.engine)?;

    let season = read_season_table(&input)
        .with_context(|| format!("Failed to read season table: {}", input.display()))?;
    let scored = engine.build(&season.records);

    let output = output.unwrap_or_else(|| config.processed_output_dir().join(SCORED_OUTPUT));
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_scored_table(&output, &scored)?;

    let results = PipelineResults::new(scored, config.engine);
    print_leaders(&results);
    println!();
    println!("Scored table written to {}", output.display());
    Ok(())
}

/// @ai:intent Regenerate reports and charts from a results file
/// @ai:effects fs:read, fs:write
fn generate_reports(results_path: PathBuf, config_path: Option<PathBuf>, output_dir: PathBuf) -> Result<()> {
    let config = load_or_default_config(config_path)?;
    let results = PipelineResults::load(&results_path)?;

    let reporter = ReportGenerator::new();
    let files = reporter.generate_all(&results, &config.charts, &output_dir)?;

    println!("Reports generated in {}", output_dir.display());
    for file in &files {
        println!("  - {}", file);
    }
    Ok(())
}

/// @ai:intent Print the top teams of one season
/// @ai:effects fs:read
fn show_top(
    scored: Option<PathBuf>,
    year: Option<i32>,
    count: usize,
    alt: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_or_default_config(config_path)?;
    let path = scored.unwrap_or_else(|| config.processed_output_dir().join(SCORED_OUTPUT));
    let records = read_scored_table(&path)
        .with_context(|| format!("Failed to read scored table: {}", path.display()))?;

    let results = PipelineResults::new(records, config.engine);
    let Some(year) = results.focus_year(year) else {
        println!("No seasons in {}", path.display());
        return Ok(());
    };

    let field = if alt { ScoreField::TdiAlt } else { ScoreField::Tdi };
    let top = results.top_teams(year, count, field);

    if top.is_empty() {
        println!("No teams recorded for {}", year);
        return Ok(());
    }

    println!("Top {} teams in {} by {}:", top.len(), year, field.as_str());
    println!();
    println!("{:<4} {:<28} {:>8} {:>8} {:>8}", "#", "Team", "TDI", "TDI_alt", "Norm");
    println!("{}", "-".repeat(60));

    for (i, record) in top.iter().enumerate() {
        println!(
            "{:<4} {:<28} {:>8.3} {:>8.3} {:>8.3}",
            i + 1,
            record.team(),
            record.tdi,
            record.tdi_alt,
            record.tdi_normalized
        );
    }

    Ok(())
}

/// @ai:intent Check configuration and that the input can be loaded
/// @ai:effects fs:read
fn validate(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_or_default_config(config_path)?;
    config.validate()?;
    println!("Configuration is valid.");

    match PipelineInput::detect(&config) {
        PipelineInput::Raw(dir) => {
            let data = load_raw_dir(&dir)?;
            println!("Raw input: {}", dir.display());
            println!("  races:        {}", data.races.len());
            println!("  results:      {}", data.results.len());
            println!("  constructors: {}", data.constructors.len());
        }
        PipelineInput::Processed(dir) => {
            let prepared = prepare_datasets(&dir)?;
            println!("Processed input: {}", dir.display());
            println!("  season-team rows: {}", prepared.season.records.len());

            if !prepared.season.schema.has_one_two {
                println!("  note: no one_two_finishes column; one-two rate will be 0");
            }

            for report in &prepared.reports {
                println!(
                    "  {}: {} rows ({} duplicates removed, {} columns with nulls)",
                    report.name,
                    report.rows_after,
                    report.duplicates_removed,
                    report.null_counts.len()
                );
            }
        }
    }

    println!("Validation passed!");
    Ok(())
}

/// @ai:intent Write the default configuration
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    let config = PipelineConfig::default();
    config.save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

/// @ai:intent Load the given config, ./tdi.toml if present, or defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::load(&p)
            .with_context(|| format!("Failed to load config: {}", p.display())),
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG);

            if default_path.exists() {
                PipelineConfig::load(&default_path)
            } else {
                Ok(PipelineConfig::default())
            }
        }
    }
}

/// @ai:intent Print each season's leader
fn print_leaders(results: &PipelineResults) {
    println!("{:<6} {:<24} {:>7} {:<24} {:>7}", "Year", "Leader", "TDI", "Runner-up", "Margin");
    println!("{}", "-".repeat(72));

    for season in &results.seasons {
        println!(
            "{:<6} {:<24} {:>7.3} {:<24} {:>7.3}",
            season.year,
            season.leader,
            season.leader_tdi,
            season.runner_up.as_deref().unwrap_or("-"),
            season.margin
        );
    }
}

/// @ai:intent Print a run summary
fn print_summary(summary: &RunSummary) {
    println!();
    println!("Team Dominance Index Pipeline");
    println!("=============================");
    println!();

    for outcome in &summary.outcomes {
        println!("{:<10} {:>6} ms  {}", outcome.step.as_str(), outcome.duration_ms, outcome.detail);
    }
    println!();

    print_leaders(&summary.results);
    println!();

    let sensitivity = &summary.results.sensitivity;
    println!(
        "TDI_alt changes the leader in {} of {} seasons",
        sensitivity.leader_changes.len(),
        sensitivity.seasons
    );
    if summary.results.skipped_results > 0 {
        println!("Skipped {} results with unknown references", summary.results.skipped_results);
    }

    println!();
    println!("Season table: {}", summary.season_path.display());
    println!("Scored table: {}", summary.scored_path.display());
    println!("Charts:       {}", summary.charts.len());
}
