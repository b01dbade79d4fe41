use crate::domain::metadata::ModelMetadata;
use crate::error::ModelError;
use crate::models::{OptInput, OptOutput, SolveOutcome, SolveStatus};

/// Abstract contract for optimization models, one implementation per problem
/// family. The set of problem families is closed; dispatch is static.
///
/// A model instance owns exactly one solver-native model, created by
/// [`generate`](OptModel::generate), mutated by [`solve`](OptModel::solve) and
/// dropped with the instance. There is no pooling or reuse across problems.
pub trait OptModel {
    type Input: OptInput;
    type Output: OptOutput;

    /// Build the solver-native variables, constraints and objective
    /// deterministically from the input record.
    fn generate(&mut self, input: &Self::Input) -> Result<(), ModelError>;

    /// Invoke the solver's optimize routine, mutating solver-internal status.
    fn solve(&mut self) -> Result<(), ModelError>;

    /// Current solver status; `Loaded` before the first solve.
    fn status(&self) -> Result<SolveStatus, ModelError>;

    /// True iff the solver holds a usable incumbent (optimal, integer-feasible
    /// or time-limit with a solution).
    fn is_solved(&self) -> bool {
        self.status()
            .map(SolveStatus::is_terminal_success)
            .unwrap_or(false)
    }

    /// Resolve the model for `input`: regenerate if the model is missing or
    /// was built from a different input, reuse the incumbent without
    /// re-solving when one exists, and otherwise solve. Failure to solve
    /// yields a typed diagnostic, never a bare string.
    fn get_solution(
        &mut self,
        input: &Self::Input,
    ) -> Result<SolveOutcome<Self::Output>, ModelError>;

    /// Snapshot of the current solver state. Recomputed on every call; a later
    /// solve does not retroactively update an earlier snapshot.
    fn metadata(&self) -> Result<ModelMetadata, ModelError>;

    /// Number of times the solver's optimize routine has been invoked on the
    /// current instance.
    fn solve_count(&self) -> usize;
}
