use dotenv::dotenv;
use std::collections::HashMap;

use decilens::{
    Interrogator, LlmClient, LlmSettings, ModelInterrogator, OptModel, OptimizerSettings,
    TransportationInput, TransportationModel,
};

fn demo_input() -> TransportationInput {
    // Classic two-warehouse, three-customer transportation instance.
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

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let input = demo_input();
    let mut model = TransportationModel::new(OptimizerSettings::default());
    let outcome = model.get_solution(&input)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    let settings = match LlmSettings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("{}; skipping the interrogation demo", err);
            return Ok(());
        }
    };
    let llm = LlmClient::from_settings(&settings)?;
    let mut interrogator = ModelInterrogator::new(model, input, llm)?;

    for query in [
        "What is the optimal solution for the transportation problem?",
        "How many warehouses and how many customers are there?",
    ] {
        println!("> {}", query);
        println!("{}", interrogator.answer(query)?);
    }

    for query in [
        "The courier company just doubled the transportation costs, how does this affect the total cost?",
        "The demand at customer C1 has increased by 100 times, how does this affect the total cost?",
    ] {
        println!("> {}", query);
        let outcome = interrogator.what_if(query)?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    Ok(())
}

fn main() {
    dotenv().ok();
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
