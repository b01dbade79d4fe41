use crate::domain::metadata::ModelMetadata;
use crate::domain::model::OptModel;
use crate::error::InterrogatorError;
use crate::llm::LlmClient;
use crate::models::SolveOutcome;

/// Natural-language interrogation over a solved optimization model.
pub trait Interrogator {
    type Output;

    /// Answer a free-text query from the model's inputs, outputs and metadata.
    fn answer(&self, query: &str) -> Result<String, InterrogatorError>;

    /// Explain the model's decision-making process. Declared in the contract
    /// but not yet supported by any implementation; fails rather than
    /// returning a default.
    fn explain(&self, query: &str) -> Result<String, InterrogatorError>;

    /// Rewrite the input record according to a free-text scenario and re-run
    /// the full generate/solve/extract pipeline on the new record.
    fn what_if(&mut self, query: &str)
        -> Result<SolveOutcome<Self::Output>, InterrogatorError>;
}

/// Interrogator composing a concrete model, its input record, its solved
/// output and a metadata snapshot, all captured eagerly at construction.
/// Construction therefore solves the model and can fail.
pub struct ModelInterrogator<M: OptModel> {
    model: M,
    input: M::Input,
    output: SolveOutcome<M::Output>,
    metadata: ModelMetadata,
    llm: LlmClient,
}

impl<M: OptModel> ModelInterrogator<M> {
    pub fn new(mut model: M, input: M::Input, llm: LlmClient) -> Result<Self, InterrogatorError> {
        let output = model.get_solution(&input)?;
        let metadata = model.metadata()?;
        Ok(ModelInterrogator {
            model,
            input,
            output,
            metadata,
            llm,
        })
    }

    /// The output captured at construction time. `what_if` results do not
    /// replace this snapshot.
    pub fn output(&self) -> &SolveOutcome<M::Output> {
        &self.output
    }

    fn context(&self) -> Result<String, InterrogatorError> {
        Ok(format!(
            "input_data: {}\noutput_data: {}\nmodel_metadata: {}",
            serde_json::to_string(&self.input)?,
            serde_json::to_string(&self.output)?,
            self.metadata.to_json()?,
        ))
    }
}

impl<M: OptModel> Interrogator for ModelInterrogator<M> {
    type Output = M::Output;

    fn answer(&self, query: &str) -> Result<String, InterrogatorError> {
        let context = self.context()?;
        Ok(self.llm.answer(query, &context)?)
    }

    fn explain(&self, _query: &str) -> Result<String, InterrogatorError> {
        Err(InterrogatorError::Unimplemented("explain"))
    }

    fn what_if(
        &mut self,
        query: &str,
    ) -> Result<SolveOutcome<Self::Output>, InterrogatorError> {
        let new_input: M::Input = self.llm.transform(query, &self.input)?;
        log::info!("what-if scenario produced a new input record, re-solving");
        Ok(self.model.get_solution(&new_input)?)
    }
}
