pub mod interrogator;
pub mod metadata;
pub mod model;
pub mod problems;

pub use interrogator::{Interrogator, ModelInterrogator};
pub use metadata::ModelMetadata;
pub use model::OptModel;
