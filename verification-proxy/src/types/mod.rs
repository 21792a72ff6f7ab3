mod environment;
mod error;

pub use environment::{Environment, DEFAULT_PORT};
pub use error::{AppError, CONFIGURATION_ERROR, VERIFICATION_FAILED};
