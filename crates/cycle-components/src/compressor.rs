//! Compressor (§4.5): Picard iteration on the polytropic exponent kappa.

use cycle_core::UnitId;
use cycle_fluids::WorkFluid;
use cycle_graph::{Channel, Graph, PortRole};

use crate::common::{check_finite, INNER_ITER_CAP};
use crate::error::ComponentResult;
use crate::params::CompressorParams;

/// Advances the compressor's five gas-dynamic outputs and the specific work
/// it draws from its shaft, which it always publishes (§4.2 -- a compressor's
/// labour port is unconditionally `Output`).
pub fn update(
    graph: &mut Graph,
    unit: UnitId,
    params: &CompressorParams,
    fluid: WorkFluid,
) -> ComponentResult<()> {
    let t_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::Temperature)
        .expect("check_input guarantees T*_in is present");
    let p_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::Pressure)
        .expect("check_input guarantees p*_in is present");
    let alpha = graph
        .gas_value(unit, PortRole::Inlet, Channel::Alpha)
        .expect("check_input guarantees alpha_in is present");
    let g_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::FlowFraction)
        .expect("check_input guarantees g_in is present");

    let pi_c = params.pi_c;
    let mut kappa = fluid.k(t_in, alpha);
    let mut t_out = t_in;

    for _ in 0..INNER_ITER_CAP {
        let exp = (kappa - 1.0) / kappa;
        let eta_ad = (pi_c.powf(exp) - 1.0) / (pi_c.powf(exp / params.eta_p) - 1.0);
        t_out = t_in * (1.0 + (pi_c.powf(exp) - 1.0) / eta_ad);
        let new_kappa = fluid.k_av_int(t_in, t_out, alpha);
        let delta = (new_kappa - kappa).abs() / kappa;
        kappa = new_kappa;
        if delta < params.precision {
            break;
        }
    }
    check_finite(t_out, "compressor T*_out")?;

    let c_p_bar = fluid.c_p_av_int(t_in, t_out, alpha);
    let l = c_p_bar * (t_out - t_in);
    let p_out = p_in * pi_c;

    graph.set_gas_value(unit, PortRole::Outlet, Channel::Temperature, t_out);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::Pressure, p_out);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::Alpha, alpha);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::FlowFraction, g_in);
    let g_fuel_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::FuelFlowFraction)
        .expect("check_input guarantees g_fuel_in is present");
    graph.set_gas_value(unit, PortRole::Outlet, Channel::FuelFlowFraction, g_fuel_in);
    graph.set_value_at(unit, PortRole::Inlet, Channel::ShaftPrimary, l);

    Ok(())
}
