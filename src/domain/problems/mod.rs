pub mod transportation;

pub use transportation::{TransportationInput, TransportationOutput};

#[cfg(feature = "gurobi-solver")]
pub use transportation::TransportationModel;
