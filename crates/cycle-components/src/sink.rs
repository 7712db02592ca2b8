//! Bleed sink (§4.9): draws cooling and overboard-outflow mass flow off the
//! main path. Pressure is always forward here -- behaviour inference fixes
//! a sink's outlet pressure port `Output` unconditionally, the same as an
//! inlet -- so, unlike the combustion chamber and mixing source, there is
//! no orientation to dispatch on.

use cycle_core::UnitId;
use cycle_graph::{Channel, Graph, PortRole};

use crate::common::check_finite;
use crate::error::ComponentResult;
use crate::params::SinkParams;

pub fn update(graph: &mut Graph, unit: UnitId, params: &SinkParams) -> ComponentResult<()> {
    let t_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::Temperature)
        .expect("check_input guarantees T*_in is present");
    let p_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::Pressure)
        .expect("check_input guarantees p*_in is present");
    let alpha_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::Alpha)
        .expect("check_input guarantees alpha_in is present");
    let g_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::FlowFraction)
        .expect("check_input guarantees g_in is present");
    let g_fuel_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::FuelFlowFraction)
        .expect("check_input guarantees g_fuel_in is present");

    let g_out = g_in - params.g_cooling - params.g_outflow;
    check_finite(g_out, "bleed sink g_out")?;

    graph.set_gas_value(unit, PortRole::Outlet, Channel::Temperature, t_in);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::Pressure, p_in);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::Alpha, alpha_in);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::FlowFraction, g_out);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::FuelFlowFraction, g_fuel_in);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::single_shaft_turbojet;

    #[test]
    fn bleeds_mass_flow_and_passes_everything_else_through() {
        let (mut g, units) = single_shaft_turbojet();
        g.set_gas_value(units.comp, PortRole::Outlet, Channel::Temperature, 600.0);
        g.set_gas_value(units.comp, PortRole::Outlet, Channel::Pressure, 1_200_000.0);
        g.set_gas_value(units.comp, PortRole::Outlet, Channel::Alpha, f64::INFINITY);
        g.set_gas_value(units.comp, PortRole::Outlet, Channel::FlowFraction, 1.0);
        g.set_gas_value(units.comp, PortRole::Outlet, Channel::FuelFlowFraction, 0.0);

        let params = SinkParams::new(0.05, 0.03);
        update(&mut g, units.cc, &params).unwrap();

        let g_out = g.gas_value(units.cc, PortRole::Outlet, Channel::FlowFraction).unwrap();
        assert!((g_out - 0.92).abs() < 1e-9);
        let t_out = g.gas_value(units.cc, PortRole::Outlet, Channel::Temperature).unwrap();
        assert!((t_out - 600.0).abs() < 1e-9);
        let p_out = g.gas_value(units.cc, PortRole::Outlet, Channel::Pressure).unwrap();
        assert!((p_out - 1_200_000.0).abs() < 1e-9);
    }
}
