//! Read-only metadata snapshots over solver state.
//!
//! A snapshot is computed at the moment of extraction and never kept in sync
//! with the solver afterwards; callers re-extract after every solve.

use serde::Serialize;

use crate::models::SolveStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BasicInfo {
    pub model_name: String,
    pub num_vars: i32,
    pub num_constrs: i32,
    pub num_qconstrs: i32,
    #[serde(rename = "NumSOS")]
    pub num_sos: i32,
    pub objective_sense: String,
}

/// Solution value is populated only when the model status is `Optimal`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VariableInfo {
    pub name: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub objective_coeff: f64,
    pub solution_value: Option<f64>,
}

/// Shadow price is populated only when the model status is `Optimal`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConstraintInfo {
    pub name: String,
    pub sense: String,
    #[serde(rename = "RHS")]
    pub rhs: f64,
    pub shadow_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SolutionInfo {
    #[serde(rename_all = "PascalCase")]
    Optimal {
        status: SolveStatus,
        objective_value: f64,
        runtime: f64,
        /// Undefined for pure LPs.
        #[serde(rename = "MIPGap")]
        mip_gap: Option<f64>,
        node_count: f64,
    },
    #[serde(rename_all = "PascalCase")]
    Other { status: SolveStatus },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelMetadata {
    pub basic_info: BasicInfo,
    pub variables: Vec<VariableInfo>,
    pub constraints: Vec<ConstraintInfo>,
    pub solution: SolutionInfo,
}

impl ModelMetadata {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(feature = "gurobi-solver")]
mod gurobi {
    use grb::prelude::*;

    use super::{BasicInfo, ConstraintInfo, ModelMetadata, SolutionInfo, VariableInfo};
    use crate::error::ModelError;
    use crate::models::SolveStatus;

    impl ModelMetadata {
        /// Extract a snapshot from a Gurobi model. Pure read: the solver state
        /// is never mutated here.
        pub fn from_gurobi(model: &Model) -> Result<Self, ModelError> {
            let raw_status = model.status()? as i32;
            let status = SolveStatus::from_code(raw_status)
                .ok_or(ModelError::UnknownStatus(raw_status))?;
            let optimal = status == SolveStatus::Optimal;

            let sense = match model.get_attr(attr::ModelSense)? {
                ModelSense::Minimize => "Minimize",
                ModelSense::Maximize => "Maximize",
            };
            let basic_info = BasicInfo {
                model_name: model.get_attr(attr::ModelName)?,
                num_vars: model.get_attr(attr::NumVars)?,
                num_constrs: model.get_attr(attr::NumConstrs)?,
                num_qconstrs: model.get_attr(attr::NumQConstrs)?,
                num_sos: model.get_attr(attr::NumSOS)?,
                objective_sense: sense.to_string(),
            };

            let mut variables = Vec::new();
            for var in model.get_vars()? {
                variables.push(VariableInfo {
                    name: model.get_obj_attr(attr::VarName, var)?,
                    lower_bound: model.get_obj_attr(attr::LB, var)?,
                    upper_bound: model.get_obj_attr(attr::UB, var)?,
                    objective_coeff: model.get_obj_attr(attr::Obj, var)?,
                    solution_value: if optimal {
                        Some(model.get_obj_attr(attr::X, var)?)
                    } else {
                        None
                    },
                });
            }

            let mut constraints = Vec::new();
            for constr in model.get_constrs()? {
                let sense = match model.get_obj_attr(attr::Sense, constr)? {
                    grb::ConstrSense::Less => "<=",
                    grb::ConstrSense::Greater => ">=",
                    grb::ConstrSense::Equal => "=",
                };
                constraints.push(ConstraintInfo {
                    name: model.get_obj_attr(attr::ConstrName, constr)?,
                    sense: sense.to_string(),
                    rhs: model.get_obj_attr(attr::RHS, constr)?,
                    shadow_price: if optimal {
                        Some(model.get_obj_attr(attr::Pi, constr)?)
                    } else {
                        None
                    },
                });
            }

            let solution = if optimal {
                SolutionInfo::Optimal {
                    status,
                    objective_value: model.get_attr(attr::ObjVal)?,
                    runtime: model.get_attr(attr::Runtime)?,
                    // Undefined for pure LPs and models without an incumbent.
                    mip_gap: model.get_attr(attr::MIPGap).ok(),
                    node_count: model.get_attr(attr::NodeCount)?,
                }
            } else {
                SolutionInfo::Other { status }
            };

            Ok(ModelMetadata {
                basic_info,
                variables,
                constraints,
                solution,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> ModelMetadata {
        ModelMetadata {
            basic_info: BasicInfo {
                model_name: "transportation".to_string(),
                num_vars: 6,
                num_constrs: 5,
                num_qconstrs: 0,
                num_sos: 0,
                objective_sense: "Minimize".to_string(),
            },
            variables: vec![VariableInfo {
                name: "x[W1,C1]".to_string(),
                lower_bound: 0.0,
                upper_bound: f64::INFINITY,
                objective_coeff: 2.0,
                solution_value: Some(0.0),
            }],
            constraints: vec![ConstraintInfo {
                name: "Supply[W1]".to_string(),
                sense: "<=".to_string(),
                rhs: 20.0,
                shadow_price: Some(0.0),
            }],
            solution: SolutionInfo::Optimal {
                status: SolveStatus::Optimal,
                objective_value: 90.0,
                runtime: 0.01,
                mip_gap: None,
                node_count: 0.0,
            },
        }
    }

    #[test]
    fn test_snapshot_serializes_with_solver_field_names() {
        let json = sample_metadata().to_json().expect("serialize");
        assert!(json.contains("\"BasicInfo\""));
        assert!(json.contains("\"ModelName\": \"transportation\""));
        assert!(json.contains("\"NumSOS\": 0"));
        assert!(json.contains("\"ShadowPrice\": 0.0"));
        assert!(json.contains("\"ObjectiveValue\": 90.0"));
    }

    #[test]
    fn test_non_optimal_solution_carries_only_status() {
        let mut metadata = sample_metadata();
        metadata.solution = SolutionInfo::Other {
            status: SolveStatus::Infeasible,
        };
        let json = metadata.to_json().expect("serialize");
        assert!(json.contains("\"Status\": \"Infeasible\""));
        assert!(!json.contains("\"ObjectiveValue\""));
    }
}
