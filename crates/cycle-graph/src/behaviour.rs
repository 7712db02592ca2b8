//! Behaviour inference: resolve every port's polarity from its unit's kind.
//!
//! Unlike the network this replaces, no numeric solve is involved here --
//! polarity is decided structurally. A handful of units have an
//! unambiguous, fixed direction (inlet, sink, atmosphere, and compressor
//! always emit pressure forward). The rest -- a turbine's two pressure
//! ports, a combustion chamber's or source's pressure orientation, and
//! (unless flagged as the backward anchor of an inverted cycle, §8
//! scenario 3) an outlet or nozzle's inlet pressure -- settle by
//! [`propagate_pressure_through`], which only ever fills in the one side
//! still `Undefined` once the other has been pinned down by a neighbour.
//! A turbine additionally gates that propagation on its own shaft
//! polarity: it only echoes pressure through while driving a compressor
//! (both shaft ports read `Input`, per §4.6's compressor-turbine modes);
//! while driving loads (both shaft ports write `Output`, power-turbine
//! mode) both of its pressure ports are expected to arrive from outside,
//! and it never writes either of them itself.
//!
//! [`run_to_fixed_point`] repeats [`set_behaviour`] over every unit until
//! nothing changes, exactly as described for §4.2's behaviour-setting
//! loop, and surfaces [`crate::error::GraphError::BehaviourSettingFailed`]
//! if some ports are still undecided after the pass budget runs out.

use cycle_core::UnitId;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Channel, Graph, MechPorts, Polarity, PortRole, UnitKind};

/// Default cap on behaviour-inference passes before giving up, matching
/// the network solver's own default outer-iteration budget.
pub const DEFAULT_MAX_PASSES: usize = 50;

/// The four channels that always flow from a unit's inlet to its outlet,
/// regardless of kind: only pressure ever runs the other way.
const FORWARD_CHANNELS: [Channel; 4] = [
    Channel::Temperature,
    Channel::Alpha,
    Channel::FlowFraction,
    Channel::FuelFlowFraction,
];

/// Force `(unit, role, channel)` to `Output`, and its connected peer (if
/// any) to the complementary `Input`. A no-op if the unit's kind doesn't
/// own that slot at all.
pub fn make_output(graph: &mut Graph, unit: UnitId, role: PortRole, channel: Channel) -> GraphResult<()> {
    set_polarity(graph, unit, role, channel, Polarity::Output)
}

/// As [`make_output`], forcing `Input` instead.
pub fn make_input(graph: &mut Graph, unit: UnitId, role: PortRole, channel: Channel) -> GraphResult<()> {
    set_polarity(graph, unit, role, channel, Polarity::Input)
}

fn set_polarity(
    graph: &mut Graph,
    unit: UnitId,
    role: PortRole,
    channel: Channel,
    want: Polarity,
) -> GraphResult<()> {
    let stream_id = {
        let u = graph.unit_mut(unit).expect("unit exists");
        let Some(slot) = u.slot_mut(role, channel) else {
            return Ok(());
        };
        match slot.polarity {
            Polarity::Undefined => slot.polarity = want,
            existing if existing == want => {}
            existing => {
                return Err(GraphError::PortPolarityConflict {
                    unit,
                    channel,
                    existing,
                    attempted: want,
                });
            }
        }
        slot.stream
    };

    let Some(sid) = stream_id else { return Ok(()) };
    let stream = *graph.stream(sid).expect("stream exists");
    let (peer_unit, peer_role) = if stream.upstream_unit == unit && stream.upstream_role == role {
        (stream.downstream_unit, stream.downstream_role)
    } else {
        (stream.upstream_unit, stream.upstream_role)
    };
    let complement = match want {
        Polarity::Output => Polarity::Input,
        Polarity::Input => Polarity::Output,
        Polarity::Undefined => unreachable!("set_polarity never demands Undefined"),
    };

    let peer = graph.unit_mut(peer_unit).expect("peer unit exists");
    let Some(peer_slot) = peer.slot_mut(peer_role, channel) else {
        return Ok(());
    };
    match peer_slot.polarity {
        Polarity::Undefined => peer_slot.polarity = complement,
        existing if existing == complement => {}
        existing => {
            return Err(GraphError::PortPolarityConflict {
                unit: peer_unit,
                channel,
                existing,
                attempted: complement,
            });
        }
    }
    Ok(())
}

/// If exactly one of `unit`'s two pressure ports has resolved to `Input`
/// and the other is still `Undefined`, fill in the other as `Output` and
/// propagate it onward. Does nothing once both sides are already
/// resolved (including the power-turbine case where both arrive from
/// outside) or while both are still unresolved.
fn propagate_pressure_through(graph: &mut Graph, unit: UnitId) -> GraphResult<()> {
    let u = graph.unit(unit).expect("unit exists");
    let inlet = u.gas_slot(PortRole::Inlet, Channel::Pressure).polarity;
    let outlet = u.gas_slot(PortRole::Outlet, Channel::Pressure).polarity;
    match (inlet, outlet) {
        (Polarity::Input, Polarity::Undefined) => make_output(graph, unit, PortRole::Outlet, Channel::Pressure),
        (Polarity::Undefined, Polarity::Input) => make_output(graph, unit, PortRole::Inlet, Channel::Pressure),
        _ => Ok(()),
    }
}

/// Apply `unit`'s fixed behaviour rules, propagating to its directly
/// connected neighbours. Idempotent: already-resolved ports are left
/// alone, so calling this every pass until the graph stabilizes is safe.
pub fn set_behaviour(graph: &mut Graph, unit: UnitId) -> GraphResult<()> {
    let kind = graph.unit(unit).expect("unit exists").kind;

    if kind.is_gas_dynamic() {
        for &channel in &FORWARD_CHANNELS {
            make_input(graph, unit, PortRole::Inlet, channel)?;
            make_output(graph, unit, PortRole::Outlet, channel)?;
        }
    }

    match kind {
        UnitKind::Inlet | UnitKind::Sink => {
            make_output(graph, unit, PortRole::Outlet, Channel::Pressure)?;
        }
        UnitKind::Compressor => {
            make_output(graph, unit, PortRole::Outlet, Channel::Pressure)?;
            make_output(graph, unit, PortRole::Inlet, Channel::ShaftPrimary)?;
        }
        UnitKind::Atmosphere => {
            make_output(graph, unit, PortRole::Outlet, Channel::Pressure)?;
            make_input(graph, unit, PortRole::Inlet, Channel::Pressure)?;
            make_input(graph, unit, PortRole::Inlet, Channel::StaticTemperature)?;
            make_output(graph, unit, PortRole::Inlet, Channel::StaticPressure)?;
        }
        UnitKind::Outlet { backward_anchor } | UnitKind::Nozzle { backward_anchor } => {
            make_output(graph, unit, PortRole::Outlet, Channel::StaticTemperature)?;
            make_input(graph, unit, PortRole::Outlet, Channel::StaticPressure)?;
            // The regular pressure port toward atmosphere is vestigial
            // (atmosphere only needs it as a bookkeeping value) but still
            // has to resolve, so it's always written here.
            make_output(graph, unit, PortRole::Outlet, Channel::Pressure)?;
            if backward_anchor {
                make_output(graph, unit, PortRole::Inlet, Channel::Pressure)?;
            } else {
                make_input(graph, unit, PortRole::Inlet, Channel::Pressure)?;
            }
        }
        UnitKind::Load { is_placeholder } => {
            if is_placeholder {
                make_output(graph, unit, PortRole::Inlet, Channel::ShaftPrimary)?;
            } else {
                make_input(graph, unit, PortRole::Inlet, Channel::ShaftPrimary)?;
            }
        }
        UnitKind::CombustionChamber | UnitKind::Source => {
            propagate_pressure_through(graph, unit)?;
        }
        UnitKind::Turbine => {
            let u = graph.unit(unit).expect("unit exists");
            let drives_a_compressor = match u.mech {
                MechPorts::Generator(slots) => slots.iter().all(|s| s.polarity == Polarity::Input),
                _ => false,
            };
            if drives_a_compressor {
                propagate_pressure_through(graph, unit)?;
            }
        }
    }

    Ok(())
}

/// Run [`set_behaviour`] over every unit, repeatedly, until no unit has an
/// undefined port left, or fail after `max_passes`.
pub fn run_to_fixed_point(graph: &mut Graph, max_passes: usize) -> GraphResult<()> {
    let unit_ids: Vec<UnitId> = graph.units().iter().map(|u| u.id).collect();

    for pass in 0..max_passes {
        for &id in &unit_ids {
            set_behaviour(graph, id)?;
        }
        let remaining = graph.units().iter().filter(|u| u.has_undefined_ports()).count();
        tracing::debug!(pass, remaining, "behaviour inference pass");
        if remaining == 0 {
            return Ok(());
        }
    }

    let remaining = graph.units().iter().filter(|u| u.has_undefined_ports()).count();
    Err(GraphError::BehaviourSettingFailed { max_passes, remaining })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::graph::Graph;

    fn single_shaft_turbojet() -> Graph {
        // atmosphere -> inlet -> compressor -> combustion chamber -> turbine -> nozzle -> atmosphere
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

        b.build().unwrap()
    }

    #[test]
    fn fixed_point_resolves_every_port_in_a_simple_single_shaft_loop() {
        let mut g = single_shaft_turbojet();
        run_to_fixed_point(&mut g, DEFAULT_MAX_PASSES).unwrap();
        for unit in g.units() {
            assert!(!unit.has_undefined_ports(), "{} still undefined", unit.name);
        }
    }

    #[test]
    fn compressor_always_publishes_required_shaft_work() {
        let mut g = single_shaft_turbojet();
        run_to_fixed_point(&mut g, DEFAULT_MAX_PASSES).unwrap();
        let comp = g.units().iter().find(|u| u.name == "C1").unwrap();
        match comp.mech {
            MechPorts::Consumer(slot) => assert_eq!(slot.polarity, Polarity::Output),
            _ => panic!("expected consumer"),
        }
    }

    #[test]
    fn single_shaft_turbine_ends_up_in_upstream_compressor_turbine_mode() {
        let mut g = single_shaft_turbojet();
        run_to_fixed_point(&mut g, DEFAULT_MAX_PASSES).unwrap();
        let turb = g.units().iter().find(|u| u.name == "T1").unwrap();
        let inlet_pres = turb.gas_slot(PortRole::Inlet, Channel::Pressure).polarity;
        let outlet_pres = turb.gas_slot(PortRole::Outlet, Channel::Pressure).polarity;
        assert_eq!(inlet_pres, Polarity::Input);
        assert_eq!(outlet_pres, Polarity::Output);
    }

    #[test]
    fn free_power_turbine_ends_up_with_both_pressure_ports_as_input() {
        // compressor -> cc -> gas-generator turbine -> power turbine -> nozzle(backward anchor) -> atmosphere
        let mut b = GraphBuilder::new();
        let atm = b.add_unit(UnitKind::Atmosphere, "Atm");
        let inlet = b.add_unit(UnitKind::Inlet, "Inlet");
        let comp = b.add_unit(UnitKind::Compressor, "C1");
        let cc = b.add_unit(UnitKind::CombustionChamber, "CC");
        let gg_turb = b.add_unit(UnitKind::Turbine, "GGT");
        let power_turb = b.add_unit(UnitKind::Turbine, "PT");
        let noz = b.add_unit(UnitKind::Nozzle { backward_anchor: true }, "Noz");
        let dummy1 = b.add_unit(UnitKind::Load { is_placeholder: true }, "Dummy1");
        let load = b.add_unit(UnitKind::Load { is_placeholder: false }, "Load");
        let dummy2 = b.add_unit(UnitKind::Load { is_placeholder: true }, "Dummy2");

        b.connect_gas_dynamic(atm, inlet).unwrap();
        b.connect_gas_dynamic(inlet, comp).unwrap();
        b.connect_gas_dynamic(comp, cc).unwrap();
        b.connect_gas_dynamic(cc, gg_turb).unwrap();
        b.connect_gas_dynamic(gg_turb, power_turb).unwrap();
        b.connect_gas_dynamic(power_turb, noz).unwrap();
        b.connect_static_gas_dynamic(noz, atm).unwrap();
        b.connect_mechanical(gg_turb, comp, dummy1).unwrap();
        b.connect_mechanical(power_turb, load, dummy2).unwrap();

        let mut g = b.build().unwrap();
        run_to_fixed_point(&mut g, DEFAULT_MAX_PASSES).unwrap();

        for unit in g.units() {
            assert!(!unit.has_undefined_ports(), "{} still undefined", unit.name);
        }

        let pt = g.units().iter().find(|u| u.name == "PT").unwrap();
        let inlet_pres = pt.gas_slot(PortRole::Inlet, Channel::Pressure).polarity;
        let outlet_pres = pt.gas_slot(PortRole::Outlet, Channel::Pressure).polarity;
        assert_eq!(inlet_pres, Polarity::Input);
        assert_eq!(outlet_pres, Polarity::Input);
    }

    #[test]
    fn make_output_rejects_conflicting_repeat_assignment() {
        let mut b = GraphBuilder::new();
        let inlet = b.add_unit(UnitKind::Inlet, "Inlet");
        let comp = b.add_unit(UnitKind::Compressor, "C1");
        b.add_unit(UnitKind::Atmosphere, "Atm");
        b.connect_gas_dynamic(inlet, comp).unwrap();
        let mut g = b.build().unwrap();

        make_output(&mut g, inlet, PortRole::Outlet, Channel::Pressure).unwrap();
        let err = make_output(&mut g, comp, PortRole::Inlet, Channel::Pressure).unwrap_err();
        assert!(matches!(err, GraphError::PortPolarityConflict { .. }));
    }
}
