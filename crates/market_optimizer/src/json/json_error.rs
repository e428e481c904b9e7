use thiserror::Error;

use crate::{
    problem::validation_error::ValidationError, solver::optimizer_error::ConfigurationError,
};

#[derive(Debug, Error)]
pub enum JsonError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    #[error("Invalid time of day \"{0}\", expected HH:MM")]
    InvalidTime(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
