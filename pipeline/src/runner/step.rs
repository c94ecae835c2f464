//! @ai:module:intent Pipeline step identifiers and per-step outcomes
//! @ai:module:layer domain
//! @ai:module:public_api Step, StepOutcome, run_step
//! @ai:module:stateless true

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// @ai:intent The stages of a pipeline run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Load,
    Aggregate,
    Score,
    Persist,
    Report,
    Visualize,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::Load,
        Step::Aggregate,
        Step::Score,
        Step::Persist,
        Step::Report,
        Step::Visualize,
    ];

    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Load => "load",
            Step::Aggregate => "aggregate",
            Step::Score => "score",
            Step::Persist => "persist",
            Step::Report => "report",
            Step::Visualize => "visualize",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// @ai:intent What a completed step did and how long it took
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: Step,
    pub duration_ms: u64,
    pub detail: String,
}

/// @ai:intent Run one step, logging start and completion and recording its outcome
/// @ai:post on failure nothing is recorded and the error names the step
/// @ai:effects state:write
pub fn run_step<T, F>(step: Step, outcomes: &mut Vec<StepOutcome>, f: F) -> Result<T, PipelineError>
where
    F: FnOnce() -> anyhow::Result<(T, String)>,
{
    tracing::info!("Starting step: {}", step);
    let start = Instant::now();

    match f() {
        Ok((value, detail)) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            tracing::info!("Finished step: {} ({} ms) {}", step, duration_ms, detail);
            outcomes.push(StepOutcome {
                step,
                duration_ms,
                detail,
            });
            Ok(value)
        }
        Err(e) => {
            tracing::error!("Step {} failed: {:#}", step, e);
            Err(PipelineError::step(step, &e))
        }
    }
}
