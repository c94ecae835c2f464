//! @ai:module:intent Error types for the TDI pipeline
//! @ai:module:layer domain
//! @ai:module:public_api PipelineError
//! @ai:module:stateless true

use crate::runner::Step;
use thiserror::Error;

/// @ai:intent Typed failures the pipeline reports to its caller
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Step `{step}` failed: {message}")]
    Step { step: Step, message: String },

    #[error(transparent)]
    Engine(#[from] tdi_engine::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// @ai:intent Wrap any step failure, keeping the full context chain in the message
    /// @ai:effects pure
    pub fn step(step: Step, err: &anyhow::Error) -> Self {
        Self::Step {
            step,
            message: format!("{:#}", err),
        }
    }

    /// @ai:intent Whether the failure is caused by absent tables, files or columns
    /// @ai:effects pure
    pub fn is_missing_input(&self) -> bool {
        match self {
            Self::MissingInput(_) => true,
            Self::Engine(e) => e.is_missing_input(),
            _ => false,
        }
    }
}
