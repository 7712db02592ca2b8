//! Atmosphere (§4.10): the ambient reservoir that anchors the cycle,
//! publishing stagnation and static ambient conditions. It owns a handful of
//! vestigial `Input` ports (a regular pressure-inlet, and the static-inlet
//! temperature slot) that the real turbojet loop never reads from; this
//! unit ignores them entirely rather than checking their value.

use cycle_core::UnitId;
use cycle_graph::{Channel, Graph, PortRole};

use crate::error::ComponentResult;
use crate::params::AtmosphereParams;

pub fn update(graph: &mut Graph, unit: UnitId, params: &AtmosphereParams) -> ComponentResult<()> {
    graph.set_gas_value(unit, PortRole::Outlet, Channel::Temperature, params.t0);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::Pressure, params.p0);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::Alpha, f64::INFINITY);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::FlowFraction, 1.0);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::FuelFlowFraction, 0.0);
    graph.set_value_at(unit, PortRole::Inlet, Channel::StaticPressure, params.p0);
    Ok(())
}
