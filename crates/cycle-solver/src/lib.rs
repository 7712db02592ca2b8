//! cycle-solver: the fixed-point outer loop that converges a cycle graph.
//!
//! Ties together [`cycle_graph`]'s behaviour inference and topological
//! ordering with [`cycle_components`]'s per-unit local updates (§4.4):
//! [`builder::CycleBuilder`] assembles a topology together with each unit's
//! physical parameters and working-fluid assignment into a [`builder::Cycle`];
//! [`solve::solve`] runs it to convergence.

pub mod builder;
pub mod error;
pub mod solve;

pub use builder::{Cycle, CycleBuilder, UnitFluids, UnitParams};
pub use error::{SolverError, SolverResult};
pub use solve::{solve, SolveConfig, SolveReport};
