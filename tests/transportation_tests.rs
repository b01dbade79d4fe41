//! End-to-end tests against a real Gurobi installation.

#![cfg(feature = "gurobi-solver")]

use std::collections::HashMap;

use decilens::domain::metadata::SolutionInfo;
use decilens::{
    OptModel, OptimizerSettings, SolveOutcome, SolveStatus, TransportationInput,
    TransportationModel,
};

fn sample_input() -> TransportationInput {
    TransportationInput {
        warehouses: vec!["W1".to_string(), "W2".to_string()],
        customers: vec!["C1".to_string(), "C2".to_string(), "C3".to_string()],
        supply: HashMap::from([("W1".to_string(), 20.0), ("W2".to_string(), 30.0)]),
        demand: HashMap::from([
            ("C1".to_string(), 10.0),
            ("C2".to_string(), 10.0),
            ("C3".to_string(), 30.0),
        ]),
        cost: HashMap::from([
            (
                "W1".to_string(),
                HashMap::from([
                    ("C1".to_string(), 2.0),
                    ("C2".to_string(), 3.0),
                    ("C3".to_string(), 1.0),
                ]),
            ),
            (
                "W2".to_string(),
                HashMap::from([
                    ("C1".to_string(), 4.0),
                    ("C2".to_string(), 1.0),
                    ("C3".to_string(), 3.0),
                ]),
            ),
        ]),
    }
}

fn flow(output: &decilens::TransportationOutput, warehouse: &str, customer: &str) -> f64 {
    output
        .flows
        .get(&(warehouse.to_string(), customer.to_string()))
        .copied()
        .unwrap_or(0.0)
}

#[test]
fn test_optimal_cost_and_flows() {
    let mut model = TransportationModel::new(OptimizerSettings::default());
    let outcome = model.get_solution(&sample_input()).expect("solve");
    let output = outcome.solution().expect("solved");

    assert_eq!(output.status, SolveStatus::Optimal);
    assert!((output.total_cost - 90.0).abs() < 1e-6);
    assert!((flow(output, "W1", "C2") - 10.0).abs() < 1e-6);
    assert!((flow(output, "W1", "C3") - 10.0).abs() < 1e-6);
    assert!((flow(output, "W2", "C1") - 10.0).abs() < 1e-6);
    assert!((flow(output, "W2", "C3") - 20.0).abs() < 1e-6);
    assert_eq!(output.flows.len(), 4);
}

#[test]
fn test_repeated_get_solution_is_idempotent() {
    let mut model = TransportationModel::new(OptimizerSettings::default());
    let input = sample_input();
    let first = model.get_solution(&input).expect("first solve");
    let second = model.get_solution(&input).expect("second read");
    assert_eq!(model.solve_count(), 1);
    assert_eq!(
        first.solution().expect("solved").flows,
        second.solution().expect("solved").flows
    );
}

#[test]
fn test_changed_input_triggers_resolve() {
    let mut model = TransportationModel::new(OptimizerSettings::default());
    let input = sample_input();
    model.get_solution(&input).expect("first solve");

    let mut doubled = input.clone();
    for row in doubled.cost.values_mut() {
        for cost in row.values_mut() {
            *cost *= 2.0;
        }
    }
    let outcome = model.get_solution(&doubled).expect("re-solve");
    assert_eq!(model.solve_count(), 2);
    assert!((outcome.solution().expect("solved").total_cost - 180.0).abs() < 1e-6);
}

#[test]
fn test_is_solved_tracks_solver_state() {
    let mut model = TransportationModel::new(OptimizerSettings::default());
    assert!(!model.is_solved());
    model.generate(&sample_input()).expect("generate");
    assert!(!model.is_solved());
    model.solve().expect("solve");
    assert!(model.is_solved());
}

#[test]
fn test_metadata_gates_values_on_optimality() {
    let mut model = TransportationModel::new(OptimizerSettings::default());
    let input = sample_input();
    model.generate(&input).expect("generate");

    let unsolved = model.metadata().expect("metadata before solve");
    assert_eq!(unsolved.basic_info.num_vars, 6);
    assert_eq!(unsolved.basic_info.num_constrs, 5);
    assert_eq!(unsolved.basic_info.objective_sense, "Minimize");
    assert!(unsolved.variables.iter().all(|v| v.solution_value.is_none()));
    assert!(unsolved.constraints.iter().all(|c| c.shadow_price.is_none()));
    assert!(matches!(unsolved.solution, SolutionInfo::Other { .. }));

    model.get_solution(&input).expect("solve");
    let solved = model.metadata().expect("metadata after solve");
    assert!(solved.variables.iter().all(|v| v.solution_value.is_some()));
    assert!(solved.constraints.iter().all(|c| c.shadow_price.is_some()));
    match solved.solution {
        SolutionInfo::Optimal { objective_value, .. } => {
            assert!((objective_value - 90.0).abs() < 1e-6);
        }
        SolutionInfo::Other { status } => panic!("expected optimal solution, got {}", status),
    }
}

#[test]
fn test_infeasible_instance_yields_diagnostic() {
    let mut input = sample_input();
    // Total demand now far exceeds total supply.
    input.demand.insert("C3".to_string(), 1000.0);

    let mut model = TransportationModel::new(OptimizerSettings::default());
    let outcome = model.get_solution(&input).expect("solve");
    match outcome {
        SolveOutcome::Infeasible(diag) => {
            assert!(matches!(
                diag.status,
                SolveStatus::Infeasible | SolveStatus::InfOrUnbd
            ));
            assert!(!diag.is_empty(), "diagnostic must implicate at least one member");
        }
        SolveOutcome::Solved(output) => panic!("expected infeasibility, got {:?}", output),
    }
}
