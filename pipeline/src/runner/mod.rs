//! @ai:module:intent Step orchestration for pipeline runs
//! @ai:module:layer application
//! @ai:module:public_api PipelineRunner, PipelineInput, RunSummary, Step, StepOutcome

pub mod executor;
pub mod step;

pub use executor::{
    create_runner, write_season_table, PipelineInput, PipelineRunner, RunSummary, SCORED_OUTPUT,
    SEASON_OUTPUT,
};
pub use step::{run_step, Step, StepOutcome};
