//! Error types for the model layer

mod model_error;

pub use model_error::ModelError;
