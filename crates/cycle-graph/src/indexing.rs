//! Topological ordering of the gas path (§4.3).
//!
//! The walk is anchored at the single `Atmosphere` unit and follows each
//! unit's outlet-side temperature stream to its downstream neighbour --
//! every gas-dynamic connection carries all five channels together, so
//! any one of them identifies the same neighbour. `Load` units have no
//! gas-dynamic ports and sit outside this walk entirely; they're
//! appended at the end, since by the time every gas-dynamic unit in the
//! walk has run once, every shaft stream a `Load` depends on already has
//! a value.

use cycle_core::UnitId;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Channel, Graph, PortRole, UnitKind};

/// Build the upstream-to-downstream solve order.
pub fn topological_order(graph: &Graph) -> GraphResult<Vec<UnitId>> {
    let atmospheres: Vec<UnitId> = graph
        .units()
        .iter()
        .filter(|u| u.kind == UnitKind::Atmosphere)
        .map(|u| u.id)
        .collect();
    if atmospheres.len() != 1 {
        return Err(GraphError::AtmosphereCount { found: atmospheres.len() });
    }
    let atmosphere = atmospheres[0];
    let gas_dynamic_count = graph.units().iter().filter(|u| u.kind.is_gas_dynamic()).count();

    let mut order = vec![atmosphere];
    let mut current = atmosphere;
    loop {
        let unit = graph.unit(current).expect("unit exists");
        let outlet_slot = unit.gas_slot(PortRole::Outlet, Channel::Temperature);
        let sid = outlet_slot.stream.ok_or(GraphError::TopologyError(current))?;
        let stream = graph.stream(sid).expect("stream exists");
        let next = if stream.upstream_unit == current {
            stream.downstream_unit
        } else {
            stream.upstream_unit
        };
        if next == atmosphere {
            break;
        }
        if order.len() > gas_dynamic_count {
            return Err(GraphError::TopologyError(current));
        }
        order.push(next);
        current = next;
    }

    if order.len() != gas_dynamic_count {
        return Err(GraphError::TopologyError(current));
    }

    for unit in graph.units() {
        if !unit.kind.is_gas_dynamic() {
            order.push(unit.id);
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;

    #[test]
    fn topological_order_walks_atmosphere_forward_and_appends_loads() {
        let mut b = GraphBuilder::new();
        let atm = b.add_unit(UnitKind::Atmosphere, "Atm");
        let inlet = b.add_unit(UnitKind::Inlet, "Inlet");
        let comp = b.add_unit(UnitKind::Compressor, "C1");
        let cc = b.add_unit(UnitKind::CombustionChamber, "CC");
        let turb = b.add_unit(UnitKind::Turbine, "T1");
        let noz = b.add_unit(UnitKind::Nozzle { backward_anchor: false }, "Noz");
        let load = b.add_unit(UnitKind::Load { is_placeholder: true }, "Dummy");

        b.connect_gas_dynamic(atm, inlet).unwrap();
        b.connect_gas_dynamic(inlet, comp).unwrap();
        b.connect_gas_dynamic(comp, cc).unwrap();
        b.connect_gas_dynamic(cc, turb).unwrap();
        b.connect_gas_dynamic(turb, noz).unwrap();
        b.connect_static_gas_dynamic(noz, atm).unwrap();
        b.connect_mechanical(turb, comp, load).unwrap();

        let g = b.build().unwrap();
        let order = topological_order(&g).unwrap();

        assert_eq!(order.len(), 7);
        assert_eq!(order[0], atm);
        assert_eq!(&order[1..6], &[inlet, comp, cc, turb, noz]);
        assert_eq!(order[6], load);
    }

    #[test]
    fn topological_order_fails_without_exactly_one_atmosphere() {
        let mut b = GraphBuilder::new();
        b.add_unit(UnitKind::Inlet, "Inlet");
        let g = b.build();
        assert!(matches!(g, Err(GraphError::AtmosphereCount { found: 0 })));
    }

    #[test]
    fn topological_order_fails_on_a_dangling_outlet_stream() {
        let mut b = GraphBuilder::new();
        b.add_unit(UnitKind::Atmosphere, "Atm");
        b.add_unit(UnitKind::Inlet, "Inlet");
        // Inlet's outlet stream is never connected.
        let g = b.build().unwrap();
        assert!(topological_order(&g).is_err());
    }
}
