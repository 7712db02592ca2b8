//! Post-inference consistency checks.
//!
//! Behaviour inference (§4.2) only ever narrows `Undefined` ports toward
//! `Input`/`Output` and raises [`GraphError::PortPolarityConflict`] the
//! moment two assignments disagree, so by construction a graph that exits
//! [`crate::behaviour::run_to_fixed_point`] without error already satisfies
//! polarity uniqueness. This module re-checks that invariant directly from
//! the stream arena (§8 "Polarity uniqueness") as a final belt-and-braces
//! pass, independent of the inference bookkeeping that produced it.

use crate::error::{GraphError, GraphResult};
use crate::graph::{Graph, Polarity};

/// Confirm every stream has settled to exactly one `Input` end and one
/// `Output` end. Called once after [`crate::behaviour::run_to_fixed_point`]
/// succeeds.
pub fn validate_polarity_uniqueness(graph: &Graph) -> GraphResult<()> {
    for stream in graph.streams() {
        let upstream_unit = graph
            .unit(stream.upstream_unit)
            .expect("stream references a live upstream unit");
        let downstream_unit = graph
            .unit(stream.downstream_unit)
            .expect("stream references a live downstream unit");

        let upstream_polarity = upstream_unit
            .slot(stream.upstream_role, stream.channel)
            .map(|p| p.polarity);
        let downstream_polarity = downstream_unit
            .slot(stream.downstream_role, stream.channel)
            .map(|p| p.polarity);

        let settled = match (upstream_polarity, downstream_polarity) {
            (Some(a), Some(b)) => {
                matches!(
                    (a, b),
                    (Polarity::Output, Polarity::Input) | (Polarity::Input, Polarity::Output)
                )
            }
            _ => false,
        };

        if !settled {
            return Err(GraphError::UnresolvedStream(stream.id));
        }
    }
    Ok(())
}
