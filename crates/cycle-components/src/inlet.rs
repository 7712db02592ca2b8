//! Inlet duct (§4.10): stagnation pressure recovery, everything else passes
//! through unchanged.

use cycle_core::UnitId;
use cycle_graph::{Channel, Graph, PortRole};

use crate::common::check_finite;
use crate::error::ComponentResult;
use crate::params::InletParams;

/// `p*_out = p*_in * sigma`; temperature, alpha, and both flow fractions
/// pass through unchanged -- behaviour inference marks them required
/// outputs on this unit's own outlet port, so this has to write them
/// itself rather than leaning on some other unit to do it.
pub fn update(graph: &mut Graph, unit: UnitId, params: &InletParams) -> ComponentResult<()> {
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

    let p_out = p_in * params.sigma;
    check_finite(p_out, "inlet p*_out")?;

    graph.set_gas_value(unit, PortRole::Outlet, Channel::Temperature, t_in);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::Pressure, p_out);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::Alpha, alpha_in);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::FlowFraction, g_in);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::FuelFlowFraction, g_fuel_in);
    Ok(())
}
