//! Error types for the cycle solver (§7).

use cycle_components::ComponentError;
use cycle_core::error::TfError;
use cycle_graph::GraphError;
use thiserror::Error;

/// Errors raised while building or running a cycle solve.
#[derive(Error, Debug, Clone)]
pub enum SolverError {
    /// The graph's topology itself is ill-formed -- a dangling connection,
    /// a missing or duplicated atmosphere, or a reference to an
    /// unregistered unit.
    #[error("topology error: {0}")]
    TopologyError(#[from] GraphError),

    /// A unit's local update didn't get the backward-orientation seed it
    /// needed for the first outer iteration (§9 "initial guesses").
    #[error("missing initial guess: {what}")]
    MissingInitialGuess { what: &'static str },

    /// The Picard outer loop didn't reach the configured tolerance within
    /// its iteration budget.
    #[error("convergence failed after {iterations} iterations (max residual {max_residual:.3e}, tolerance {tolerance:.3e})")]
    ConvergenceFailed {
        iterations: usize,
        max_residual: f64,
        tolerance: f64,
    },

    /// A unit's local physics raised an error -- a non-physical
    /// intermediate value, an unsupported configuration, or an inner
    /// Picard loop that didn't settle.
    #[error("component error: {0}")]
    Component(#[from] ComponentError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for TfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::TopologyError(_) => TfError::InvalidArg { what: "topology" },
            SolverError::MissingInitialGuess { what } => TfError::InvalidArg { what },
            SolverError::ConvergenceFailed { .. } => TfError::InvalidArg {
                what: "convergence",
            },
            SolverError::Component(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_initial_guess_display() {
        let err = SolverError::MissingInitialGuess {
            what: "turbine backward p_out",
        };
        assert!(err.to_string().contains("turbine backward p_out"));
    }
}
