use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ModelError;

/// Decisions below this magnitude are treated as zero when building output
/// records.
pub const FLOW_TOLERANCE: f64 = 1e-6;

#[doc(hidden)]
pub mod sealed {
    /// Marker supertrait restricting `OptInput`/`OptOutput` to record types
    /// defined by this crate's problem families.
    pub trait Sealed {}
}

/// Input record for an optimization problem.
///
/// There is no instantiable base type; only concrete problem records implement
/// this trait. Inputs must round-trip through JSON so the LLM boundary can
/// rewrite them into a new instance of the same record type.
pub trait OptInput:
    sealed::Sealed + Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned
{
}

/// Output record for an optimization problem.
pub trait OptOutput: sealed::Sealed + Clone + fmt::Debug + Serialize {}

/// Solver termination status, mirroring Gurobi's status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Loaded,
    Optimal,
    Infeasible,
    InfOrUnbd,
    Unbounded,
    Cutoff,
    IterationLimit,
    NodeLimit,
    TimeLimit,
    SolutionLimit,
    Interrupted,
    Numeric,
    Suboptimal,
    InProgress,
    UserObjLimit,
    WorkLimit,
    MemLimit,
}

impl SolveStatus {
    /// Numeric status code as reported by the solver.
    pub fn code(self) -> i32 {
        match self {
            SolveStatus::Loaded => 1,
            SolveStatus::Optimal => 2,
            SolveStatus::Infeasible => 3,
            SolveStatus::InfOrUnbd => 4,
            SolveStatus::Unbounded => 5,
            SolveStatus::Cutoff => 6,
            SolveStatus::IterationLimit => 7,
            SolveStatus::NodeLimit => 8,
            SolveStatus::TimeLimit => 9,
            SolveStatus::SolutionLimit => 10,
            SolveStatus::Interrupted => 11,
            SolveStatus::Numeric => 12,
            SolveStatus::Suboptimal => 13,
            SolveStatus::InProgress => 14,
            SolveStatus::UserObjLimit => 15,
            SolveStatus::WorkLimit => 16,
            SolveStatus::MemLimit => 17,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            1 => SolveStatus::Loaded,
            2 => SolveStatus::Optimal,
            3 => SolveStatus::Infeasible,
            4 => SolveStatus::InfOrUnbd,
            5 => SolveStatus::Unbounded,
            6 => SolveStatus::Cutoff,
            7 => SolveStatus::IterationLimit,
            8 => SolveStatus::NodeLimit,
            9 => SolveStatus::TimeLimit,
            10 => SolveStatus::SolutionLimit,
            11 => SolveStatus::Interrupted,
            12 => SolveStatus::Numeric,
            13 => SolveStatus::Suboptimal,
            14 => SolveStatus::InProgress,
            15 => SolveStatus::UserObjLimit,
            16 => SolveStatus::WorkLimit,
            17 => SolveStatus::MemLimit,
            _ => return None,
        })
    }

    /// True iff the solver terminated with a usable incumbent: proven optimal,
    /// an integer-feasible incumbent without proof of optimality, or a time
    /// limit hit with a solution in hand.
    pub fn is_terminal_success(self) -> bool {
        matches!(
            self,
            SolveStatus::Optimal | SolveStatus::Suboptimal | SolveStatus::TimeLimit
        )
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Solver configuration attached to a model instance at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    mip_gap: f64,
    time_limit: u32,
}

impl OptimizerSettings {
    /// `mip_gap` must lie in [0, 1]; `time_limit` is in seconds.
    pub fn new(mip_gap: f64, time_limit: u32) -> Result<Self, ModelError> {
        if !(0.0..=1.0).contains(&mip_gap) {
            return Err(ModelError::InvalidSettings(format!(
                "mip_gap must be in [0, 1], got {}",
                mip_gap
            )));
        }
        Ok(OptimizerSettings { mip_gap, time_limit })
    }

    pub fn mip_gap(&self) -> f64 {
        self.mip_gap
    }

    /// Time limit in seconds.
    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        OptimizerSettings {
            mip_gap: 0.01,
            time_limit: 300,
        }
    }
}

/// Typed result of a solve: either an output record or a structured
/// infeasibility diagnostic. The failure path never degrades to a bare string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SolveOutcome<O> {
    Solved(O),
    Infeasible(InfeasibilityDiagnostic),
}

impl<O> SolveOutcome<O> {
    pub fn solution(&self) -> Option<&O> {
        match self {
            SolveOutcome::Solved(output) => Some(output),
            SolveOutcome::Infeasible(_) => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&InfeasibilityDiagnostic> {
        match self {
            SolveOutcome::Solved(_) => None,
            SolveOutcome::Infeasible(diag) => Some(diag),
        }
    }
}

/// IIS-based diagnostic for a model that failed to solve: the constraints and
/// variable bounds implicated in an irreducible inconsistent subsystem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfeasibilityDiagnostic {
    pub status: SolveStatus,
    pub constraints: Vec<String>,
    pub lower_bounds: Vec<String>,
    pub upper_bounds: Vec<String>,
}

impl InfeasibilityDiagnostic {
    pub fn new(status: SolveStatus) -> Self {
        InfeasibilityDiagnostic {
            status,
            constraints: Vec::new(),
            lower_bounds: Vec::new(),
            upper_bounds: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
            && self.lower_bounds.is_empty()
            && self.upper_bounds.is_empty()
    }
}

impl fmt::Display for InfeasibilityDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Model failed with status {}. Irreducible Inconsistent Subsystem (IIS) details:",
            self.status
        )?;
        for name in &self.constraints {
            writeln!(f, "Constraint: {}", name)?;
        }
        for name in &self.lower_bounds {
            writeln!(f, "Variable {} has an issue with its lower bound.", name)?;
        }
        for name in &self.upper_bounds {
            writeln!(f, "Variable {} has an issue with its upper bound.", name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        for code in 1..=17 {
            let status = SolveStatus::from_code(code).expect("known code");
            assert_eq!(status.code(), code);
        }
        assert_eq!(SolveStatus::from_code(0), None);
        assert_eq!(SolveStatus::from_code(18), None);
    }

    #[test]
    fn test_terminal_success_truth_table() {
        for code in 1..=17 {
            let status = SolveStatus::from_code(code).expect("known code");
            let expected = matches!(
                status,
                SolveStatus::Optimal | SolveStatus::Suboptimal | SolveStatus::TimeLimit
            );
            assert_eq!(status.is_terminal_success(), expected, "status {}", status);
        }
    }

    #[test]
    fn test_settings_accept_valid_ranges() {
        let settings = OptimizerSettings::new(0.05, 60).expect("valid settings");
        assert_eq!(settings.mip_gap(), 0.05);
        assert_eq!(settings.time_limit(), 60);
        // Boundary values are allowed
        assert!(OptimizerSettings::new(0.0, 0).is_ok());
        assert!(OptimizerSettings::new(1.0, 0).is_ok());
    }

    #[test]
    fn test_settings_reject_out_of_range_gap() {
        assert!(OptimizerSettings::new(-0.1, 60).is_err());
        assert!(OptimizerSettings::new(1.5, 60).is_err());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = OptimizerSettings::default();
        assert_eq!(settings.mip_gap(), 0.01);
        assert_eq!(settings.time_limit(), 300);
    }

    #[test]
    fn test_diagnostic_display_lists_members() {
        let mut diag = InfeasibilityDiagnostic::new(SolveStatus::Infeasible);
        diag.constraints.push("Demand[C1]".to_string());
        diag.upper_bounds.push("x[W1,C1]".to_string());
        let rendered = diag.to_string();
        assert!(rendered.contains("Constraint: Demand[C1]"));
        assert!(rendered.contains("Variable x[W1,C1] has an issue with its upper bound."));
        assert!(!diag.is_empty());
    }
}
