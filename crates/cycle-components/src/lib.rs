//! cycle-components: unit models for the gas-turbine cycle solver.
//!
//! Each module holds one unit kind's `update` function: given a
//! [`cycle_graph::Graph`] with behaviour already resolved, read that unit's
//! `Input`-polarity ports and write its `Output`-polarity ones. Components
//! never decide port polarity themselves -- that is `cycle_graph`'s job --
//! and never drive the outer iteration -- that is `cycle_solver`'s.
//!
//! # Example
//!
//! ```no_run
//! use cycle_components::{compressor, params::CompressorParams};
//! use cycle_fluids::WorkFluid;
//! use cycle_graph::{Graph, UnitId};
//!
//! fn run(graph: &mut Graph, unit: UnitId) -> cycle_components::error::ComponentResult<()> {
//!     let params = CompressorParams::new(12.0);
//!     compressor::update(graph, unit, &params, WorkFluid::AmbientAir)
//! }
//! ```

pub mod atmosphere;
pub mod combustion_chamber;
pub mod common;
pub mod compressor;
pub mod error;
pub mod inlet;
pub mod load;
pub mod nozzle;
pub mod outlet;
pub mod params;
pub mod sink;
pub mod source;
pub mod turbine;

pub use common::inputs_ready;
pub use error::{ComponentError, ComponentResult};
pub use params::ComponentParams;
