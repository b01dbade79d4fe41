//! Thin interrogation layer over a commercial optimization solver.
//!
//! Model construction, solving and infeasibility diagnosis are delegated to
//! Gurobi (behind the `gurobi-solver` feature); natural-language understanding
//! and input mutation are delegated to an OpenAI-compatible completion
//! service. The call chain is a single synchronous pipeline:
//! build → solve → describe → ask.

pub mod domain;
pub mod error;
pub mod llm;
pub mod models;

pub use domain::interrogator::{Interrogator, ModelInterrogator};
pub use domain::metadata::ModelMetadata;
pub use domain::model::OptModel;
pub use domain::problems::{TransportationInput, TransportationOutput};
pub use error::{InterrogatorError, LlmError, ModelError};
pub use llm::{LlmClient, LlmSettings};
pub use models::{
    InfeasibilityDiagnostic, OptInput, OptOutput, OptimizerSettings, SolveOutcome, SolveStatus,
};

#[cfg(feature = "gurobi-solver")]
pub use domain::problems::TransportationModel;
