//! Transportation problem: ship goods from warehouses to customers at minimal
//! cost, respecting per-warehouse supply caps and exact per-customer demand.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::ModelError;
use crate::models::{sealed, OptInput, OptOutput, SolveStatus};

/// Input record for the transportation problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportationInput {
    pub warehouses: Vec<String>,
    pub customers: Vec<String>,
    /// Supply available at each warehouse.
    pub supply: HashMap<String, f64>,
    /// Demand required at each customer.
    pub demand: HashMap<String, f64>,
    /// Unit transportation cost per warehouse/customer pair.
    pub cost: HashMap<String, HashMap<String, f64>>,
}

impl sealed::Sealed for TransportationInput {}
impl OptInput for TransportationInput {}

/// Output record: solver status, objective value and the positive flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportationOutput {
    pub status: SolveStatus,
    pub total_cost: f64,
    /// Flows keyed by (warehouse, customer), serialized as `"W1->C1"` keys so
    /// the record stays plain JSON.
    #[serde(with = "flow_map")]
    pub flows: BTreeMap<(String, String), f64>,
}

impl sealed::Sealed for TransportationOutput {}
impl OptOutput for TransportationOutput {}

mod flow_map {
    use serde::de::{Deserializer, Error};
    use serde::ser::{SerializeMap, Serializer};
    use serde::Deserialize;
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        flows: &BTreeMap<(String, String), f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(flows.len()))?;
        for ((warehouse, customer), value) in flows {
            map.serialize_entry(&format!("{}->{}", warehouse, customer), value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<(String, String), f64>, D::Error> {
        let raw: BTreeMap<String, f64> = BTreeMap::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, value)| {
                let (warehouse, customer) = key
                    .split_once("->")
                    .ok_or_else(|| D::Error::custom(format!("bad flow key {:?}", key)))?;
                Ok(((warehouse.to_string(), customer.to_string()), value))
            })
            .collect()
    }
}

/// Reject records whose maps do not cover the declared warehouses and
/// customers, before any solver object is built.
pub(crate) fn validate(input: &TransportationInput) -> Result<(), ModelError> {
    for warehouse in &input.warehouses {
        if !input.supply.contains_key(warehouse) {
            return Err(ModelError::BadInput(format!(
                "warehouse {} has no supply entry",
                warehouse
            )));
        }
        let Some(costs) = input.cost.get(warehouse) else {
            return Err(ModelError::BadInput(format!(
                "warehouse {} has no cost row",
                warehouse
            )));
        };
        for customer in &input.customers {
            if !costs.contains_key(customer) {
                return Err(ModelError::BadInput(format!(
                    "no cost for route {} -> {}",
                    warehouse, customer
                )));
            }
        }
    }
    for customer in &input.customers {
        if !input.demand.contains_key(customer) {
            return Err(ModelError::BadInput(format!(
                "customer {} has no demand entry",
                customer
            )));
        }
    }
    Ok(())
}

#[cfg(feature = "gurobi-solver")]
pub use gurobi::TransportationModel;

#[cfg(feature = "gurobi-solver")]
mod gurobi {
    use grb::prelude::*;
    use std::collections::BTreeMap;

    use super::{validate, TransportationInput, TransportationOutput};
    use crate::domain::metadata::ModelMetadata;
    use crate::domain::model::OptModel;
    use crate::error::ModelError;
    use crate::models::{
        InfeasibilityDiagnostic, OptimizerSettings, SolveOutcome, SolveStatus, FLOW_TOLERANCE,
    };

    /// Gurobi-backed model for the transportation problem.
    pub struct TransportationModel {
        settings: OptimizerSettings,
        built: Option<Built>,
        solves: usize,
    }

    struct Built {
        model: Model,
        input: TransportationInput,
        flows: Vec<((String, String), Var)>,
    }

    impl TransportationModel {
        pub fn new(settings: OptimizerSettings) -> Self {
            TransportationModel {
                settings,
                built: None,
                solves: 0,
            }
        }

        fn built(&self) -> Result<&Built, ModelError> {
            self.built.as_ref().ok_or(ModelError::NotGenerated)
        }

        fn extract_output(&self) -> Result<TransportationOutput, ModelError> {
            let built = self.built()?;
            let status = self.status()?;
            let mut flows = BTreeMap::new();
            for ((warehouse, customer), var) in &built.flows {
                let value = built.model.get_obj_attr(attr::X, var)?;
                if value > FLOW_TOLERANCE {
                    log::info!(
                        "send {} units from {} to {} at cost {}",
                        value,
                        warehouse,
                        customer,
                        built.input.cost[warehouse][customer]
                    );
                    flows.insert((warehouse.clone(), customer.clone()), value);
                }
            }
            let total_cost = built.model.get_attr(attr::ObjVal)?;
            log::info!("total transportation cost: {}", total_cost);
            Ok(TransportationOutput {
                status,
                total_cost,
                flows,
            })
        }

        fn extract_diagnostic(&mut self) -> Result<InfeasibilityDiagnostic, ModelError> {
            let status = self.status()?;
            let built = self.built.as_mut().ok_or(ModelError::NotGenerated)?;
            let mut diag = InfeasibilityDiagnostic::new(status);
            // The IIS is only defined for infeasible systems.
            if matches!(status, SolveStatus::Infeasible | SolveStatus::InfOrUnbd) {
                built.model.compute_iis()?;
                for constr in built.model.get_constrs()? {
                    if built.model.get_obj_attr(attr::IISConstr, constr)? != 0 {
                        diag.constraints
                            .push(built.model.get_obj_attr(attr::ConstrName, constr)?);
                    }
                }
                for var in built.model.get_vars()? {
                    let name = built.model.get_obj_attr(attr::VarName, var)?;
                    if built.model.get_obj_attr(attr::IISLB, var)? != 0 {
                        diag.lower_bounds.push(name.clone());
                    }
                    if built.model.get_obj_attr(attr::IISUB, var)? != 0 {
                        diag.upper_bounds.push(name);
                    }
                }
            }
            log::warn!("{}", diag);
            Ok(diag)
        }
    }

    impl Default for TransportationModel {
        fn default() -> Self {
            TransportationModel::new(OptimizerSettings::default())
        }
    }

    impl OptModel for TransportationModel {
        type Input = TransportationInput;
        type Output = TransportationOutput;

        fn generate(&mut self, input: &TransportationInput) -> Result<(), ModelError> {
            validate(input)?;

            let mut env = Env::new("")?;
            env.set(param::OutputFlag, 0)?;
            env.set(param::MIPGap, self.settings.mip_gap())?;
            env.set(param::TimeLimit, f64::from(self.settings.time_limit()))?;
            let mut model = Model::with_env("transportation", &env)?;

            let mut flows: Vec<((String, String), Var)> = Vec::new();
            for warehouse in &input.warehouses {
                for customer in &input.customers {
                    let name = format!("x[{},{}]", warehouse, customer);
                    let var = add_ctsvar!(model, name: &name, bounds: 0.0..)?;
                    flows.push(((warehouse.clone(), customer.clone()), var));
                }
            }
            model.update()?;

            let objective = flows
                .iter()
                .map(|((warehouse, customer), var)| input.cost[warehouse][customer] * *var)
                .grb_sum();
            model.set_objective(objective, ModelSense::Minimize)?;

            for warehouse in &input.warehouses {
                let shipped = flows
                    .iter()
                    .filter(|((from, _), _)| from == warehouse)
                    .map(|(_, var)| *var)
                    .grb_sum();
                let cap = input.supply[warehouse];
                model.add_constr(&format!("Supply[{}]", warehouse), c!(shipped <= cap))?;
            }
            for customer in &input.customers {
                let received = flows
                    .iter()
                    .filter(|((_, to), _)| to == customer)
                    .map(|(_, var)| *var)
                    .grb_sum();
                let required = input.demand[customer];
                model.add_constr(&format!("Demand[{}]", customer), c!(received == required))?;
            }
            model.update()?;

            self.built = Some(Built {
                model,
                input: input.clone(),
                flows,
            });
            Ok(())
        }

        fn solve(&mut self) -> Result<(), ModelError> {
            let built = self.built.as_mut().ok_or(ModelError::NotGenerated)?;
            log::info!("optimizing transportation model");
            built.model.optimize()?;
            self.solves += 1;
            Ok(())
        }

        fn status(&self) -> Result<SolveStatus, ModelError> {
            match &self.built {
                None => Ok(SolveStatus::Loaded),
                Some(built) => {
                    let raw = built.model.status()? as i32;
                    SolveStatus::from_code(raw).ok_or(ModelError::UnknownStatus(raw))
                }
            }
        }

        fn get_solution(
            &mut self,
            input: &TransportationInput,
        ) -> Result<SolveOutcome<TransportationOutput>, ModelError> {
            let stale = match &self.built {
                Some(built) => &built.input != input,
                None => true,
            };
            if stale {
                self.generate(input)?;
            }
            if self.is_solved() {
                // Idempotent repeated read: the incumbent is extracted without
                // re-invoking the solver.
                return Ok(SolveOutcome::Solved(self.extract_output()?));
            }
            self.solve()?;
            if self.status()?.is_terminal_success() {
                Ok(SolveOutcome::Solved(self.extract_output()?))
            } else {
                Ok(SolveOutcome::Infeasible(self.extract_diagnostic()?))
            }
        }

        fn metadata(&self) -> Result<ModelMetadata, ModelError> {
            ModelMetadata::from_gurobi(&self.built()?.model)
        }

        fn solve_count(&self) -> usize {
            self.solves
        }
    }
}
