//! cycle-graph: the typed-port dataflow graph underlying the cycle solver.
//!
//! Provides:
//! - Core graph data structures -- [`Unit`], [`Stream`], [`PortSlot`] -- and
//!   the [`UnitKind`] tag that drives behaviour inference and topological
//!   ordering (§3, §9).
//! - [`GraphBuilder`] for incremental assembly: register units, then wire
//!   them with `connect_gas_dynamic`, `connect_static_gas_dynamic`, or
//!   `connect_mechanical` (§6).
//! - [`behaviour::run_to_fixed_point`] for port-polarity inference (§4.2).
//! - [`indexing::topological_order`] for the upstream-to-downstream solve
//!   order the fixed-point solver iterates in (§4.3).
//!
//! # Example
//!
//! ```
//! use cycle_graph::{GraphBuilder, UnitKind};
//!
//! let mut builder = GraphBuilder::new();
//! let atm = builder.add_unit(UnitKind::Atmosphere, "Atm");
//! let inlet = builder.add_unit(UnitKind::Inlet, "Inlet");
//! builder.connect_gas_dynamic(atm, inlet).unwrap();
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.units().len(), 2);
//! assert_eq!(graph.streams().len(), 5);
//! ```

pub mod behaviour;
pub mod builder;
pub mod error;
pub mod graph;
pub mod indexing;
pub mod validate;

// Re-exports for ergonomics
pub use behaviour::run_to_fixed_point;
pub use builder::GraphBuilder;
pub use error::GraphError;
pub use graph::{
    Channel, Graph, MechPorts, Polarity, PortRole, PortSlot, Stream, Unit, UnitKind,
    GAS_DYNAMIC_CHANNELS, STATIC_CHANNELS,
};
pub use indexing::topological_order;
pub use validate::validate_polarity_uniqueness;
