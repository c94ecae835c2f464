//! @ai:module:intent F1 Team Dominance Index pipeline library
//! @ai:module:layer application
//! @ai:module:public_api config, data, aggregate, results, runner, report, error

pub mod aggregate;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod results;
pub mod runner;

pub use aggregate::{Aggregation, SeasonAggregator, SeasonAggregatorTrait};
pub use config::PipelineConfig;
pub use data::{clean_table, load_processed_dir, load_raw_dir, prepare_datasets, CleanReport, RawTable};
pub use error::PipelineError;
pub use report::ReportGenerator;
pub use results::{PipelineResults, SeasonSummary};
pub use runner::{create_runner, PipelineInput, PipelineRunner, RunSummary, Step, StepOutcome};
