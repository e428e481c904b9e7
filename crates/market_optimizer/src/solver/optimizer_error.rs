use jiff::SignedDuration;
use thiserror::Error;

use crate::problem::validation_error::ValidationError;

/// Out-of-range optimizer parameters, rejected before the first iteration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("{0} must be greater than zero")]
    ZeroCount(&'static str),

    #[error("{name} must be {expected}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("Stay duration of day {day} must not be negative, got {duration:?}")]
    NegativeStayDuration {
        day: usize,
        duration: SignedDuration,
    },
}

impl ConfigurationError {
    pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<(), Self> {
        if value.is_nan() || value < 0.0 {
            return Err(ConfigurationError::OutOfRange {
                name,
                value,
                expected: ">= 0",
            });
        }
        Ok(())
    }

    pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<(), Self> {
        if value.is_nan() || value <= 0.0 {
            return Err(ConfigurationError::OutOfRange {
                name,
                value,
                expected: "> 0",
            });
        }
        Ok(())
    }

    pub(crate) fn check_open_unit(name: &'static str, value: f64) -> Result<(), Self> {
        if value.is_nan() || value <= 0.0 || value >= 1.0 {
            return Err(ConfigurationError::OutOfRange {
                name,
                value,
                expected: "in (0, 1)",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimizerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
