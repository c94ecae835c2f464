//! @ai:module:intent CLI entry point for the TDI metric engine
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on table, engine, sensitivity, output

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tdi_engine::{
    build_all_metrics, check_columns, compare_rankings, output, table, OutputFormat,
};

#[derive(Parser)]
#[command(name = "tdi")]
#[command(author, version, about = "Team Dominance Index scoring for F1 constructor seasons")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a season-team table
    Score {
        /// Path to the season-team CSV
        input: PathBuf,

        /// Write the scored table to this CSV file
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Check a season-team table for required columns
    Check {
        /// Path to the season-team CSV
        input: PathBuf,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Compare per-season rankings under TDI and TDI_alt
    Sensitivity {
        /// Path to the season-team CSV
        input: PathBuf,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,

        /// Fail with exit code 1 if any season changes leader
        #[arg(long, default_value = "false")]
        fail_on_leader_change: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
    Csv,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
            Format::Csv => OutputFormat::Csv,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            input,
            output: output_path,
            format,
        } => match table::read_season_table(&input) {
            Ok(season) => {
                let scored = build_all_metrics(&season.records);

                if let Some(path) = output_path {
                    if let Err(e) = table::write_scored_table(&path, &scored) {
                        eprintln!("Error: {}", e);
                        return ExitCode::from(2);
                    }
                }

                let format: OutputFormat = format.into();
                let rendered = match format {
                    OutputFormat::Csv => output::scored_csv(&scored),
                    _ => Ok(output::format_scored(&scored, format)),
                };

                match rendered {
                    Ok(text) => {
                        println!("{}", text);
                        ExitCode::SUCCESS
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        ExitCode::from(2)
                    }
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(2)
            }
        },

        Commands::Check { input, format } => {
            let headers = match csv::Reader::from_path(&input).and_then(|mut r| r.headers().cloned()) {
                Ok(headers) => headers,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::from(2);
                }
            };

            let raw: Vec<&str> = headers.iter().collect();
            let report = check_columns(&raw);
            println!("{}", output::format_schema(&report, format.into()));

            if report.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }

        Commands::Sensitivity {
            input,
            format,
            fail_on_leader_change,
        } => match table::read_season_table(&input) {
            Ok(season) => {
                let scored = build_all_metrics(&season.records);
                let report = compare_rankings(&scored);
                println!("{}", output::format_sensitivity(&report, format.into()));

                if fail_on_leader_change && report.has_leader_changes() {
                    ExitCode::from(1)
                } else {
                    ExitCode::SUCCESS
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(2)
            }
        },
    }
}
