//! Fluid property errors.

use cycle_core::TfError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during working-fluid property evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative temperature, zero mass flow, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Argument outside the correlation's intended range.
    #[error("Value out of range for {what}")]
    OutOfRange { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl From<FluidError> for TfError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::NonPhysical { what } => TfError::Invariant {
                what: Box::leak(format!("non-physical fluid value: {}", what).into_boxed_str()),
            },
            FluidError::OutOfRange { what } => TfError::InvalidArg {
                what: Box::leak(format!("fluid value out of range: {}", what).into_boxed_str()),
            },
            FluidError::InvalidArg { what } => TfError::InvalidArg {
                what: Box::leak(format!("invalid fluid argument: {}", what).into_boxed_str()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::NonPhysical { what: "temperature" };
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn error_to_tf_error() {
        let fluid_err = FluidError::OutOfRange { what: "alpha" };
        let tf_err: TfError = fluid_err.into();
        assert!(matches!(tf_err, TfError::InvalidArg { .. }));
    }
}
