//! Graph-specific error types.

use cycle_core::{StreamId, UnitId};
use thiserror::Error;

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised while assembling or inferring behaviour over a cycle graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A `connect_*` call named a unit that was never registered with the graph.
    #[error("connect referenced unregistered unit {0}")]
    TopologyError(UnitId),

    /// A `make_output`/`make_input` assertion would force both ends of a
    /// stream to the same polarity -- the topology is ill-posed or
    /// over-constrained.
    #[error(
        "port polarity conflict on unit {unit} channel {channel:?}: already {existing:?}, cannot also become {attempted:?}"
    )]
    PortPolarityConflict {
        unit: UnitId,
        channel: crate::graph::Channel,
        existing: crate::graph::Polarity,
        attempted: crate::graph::Polarity,
    },

    /// Behaviour inference made no further progress after `max_passes`
    /// passes with ports still left `Undefined`.
    #[error("behaviour setting did not converge after {max_passes} passes ({remaining} ports still undefined)")]
    BehaviourSettingFailed { max_passes: usize, remaining: usize },

    /// Exactly one `Atmosphere` unit is required to anchor the topological walk.
    #[error("expected exactly one Atmosphere unit, found {found}")]
    AtmosphereCount { found: usize },

    /// Behaviour inference finished without error, but a stream still
    /// doesn't have exactly one `Input` end and one `Output` end -- a
    /// final consistency check failed even though no individual
    /// assignment conflicted.
    #[error("stream {0} did not settle to exactly one input and one output end")]
    UnresolvedStream(StreamId),
}
