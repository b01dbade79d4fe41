use thiserror::Error;

/// Failures raised while building or solving an optimization model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid optimizer settings: {0}")]
    InvalidSettings(String),

    #[error("inconsistent input data: {0}")]
    BadInput(String),

    #[error("model has not been generated yet")]
    NotGenerated,

    #[error("solver reported unknown status code {0}")]
    UnknownStatus(i32),

    #[cfg(feature = "gurobi-solver")]
    #[error("solver failure: {0}")]
    Solver(#[from] grb::Error),
}

/// Failures at the external language-model boundary.
///
/// Transport errors and rate-limit/server responses are retriable under the
/// client's retry policy; credential and schema errors are not.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("missing LLM credential: set {0}")]
    MissingCredential(&'static str),

    #[error("LLM transport failure: {0}")]
    Transport(String),

    #[error("LLM API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM response did not match the expected schema: {0}")]
    Schema(String),
}

impl LlmError {
    pub fn is_retriable(&self) -> bool {
        match self {
            LlmError::Transport(_) => true,
            LlmError::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            LlmError::MissingCredential(_) | LlmError::Schema(_) => false,
        }
    }
}

/// Failures surfaced by an interrogator: model failures, LLM failures, or a
/// capability that is declared but not implemented.
#[derive(Debug, Error)]
pub enum InterrogatorError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0} is not implemented")]
    Unimplemented(&'static str),
}
