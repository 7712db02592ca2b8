//! Mixing source (§4.8): reintroduces a bleed return (e.g. cooling air) back
//! into the hot gas path.

use cycle_core::UnitId;
use cycle_fluids::WorkFluid;
use cycle_graph::{Channel, Graph, Polarity, PortRole};

use crate::common::check_finite;
use crate::error::{ComponentError, ComponentResult};
use crate::params::SourceParams;

/// `fluid` is this stream's own working-fluid species (unchanged by mixing
/// in a return-air source); `return_fluid` is the species of the returning
/// stream, typically ambient air.
pub fn update(
    graph: &mut Graph,
    unit: UnitId,
    params: &SourceParams,
    fluid: WorkFluid,
    return_fluid: WorkFluid,
) -> ComponentResult<()> {
    let t_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::Temperature)
        .expect("check_input guarantees T*_in is present");
    let alpha_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::Alpha)
        .expect("check_input guarantees alpha_in is present");
    let g_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::FlowFraction)
        .expect("check_input guarantees g_in is present");
    let g_fuel_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::FuelFlowFraction)
        .expect("check_input guarantees g_fuel_in is present");

    let l0 = fluid.l0().ok_or(ComponentError::InvalidArg {
        what: "mixing source's own species must carry a stoichiometric ratio",
    })?;

    let g_out = g_in + params.g_return;
    let alpha_out = 1.0 / (l0 * g_fuel_in / (g_in + params.g_return - g_fuel_in));
    check_finite(alpha_out, "mixing source alpha_out")?;

    let cp_hot_true = fluid.c_p(t_in, alpha_in);
    let cp_cold_true = return_fluid.c_p(params.return_temperature, f64::INFINITY);
    let t_out = cycle_fluids::mix_temperature(
        fluid,
        alpha_out,
        cp_hot_true,
        t_in,
        g_in,
        cp_cold_true,
        params.return_temperature,
        params.g_return,
    );
    check_finite(t_out, "mixing source T*_out")?;

    let pin_pol = graph
        .unit(unit)
        .expect("unit exists")
        .gas_slot(PortRole::Inlet, Channel::Pressure)
        .polarity;
    match pin_pol {
        Polarity::Input => {
            let p_in = graph
                .gas_value(unit, PortRole::Inlet, Channel::Pressure)
                .expect("check_input guarantees p*_in is present");
            graph.set_gas_value(unit, PortRole::Outlet, Channel::Pressure, p_in);
        }
        Polarity::Output => {
            let p_out = graph
                .gas_value(unit, PortRole::Outlet, Channel::Pressure)
                .expect("check_input guarantees p*_out is present in downstream orientation");
            graph.set_gas_value(unit, PortRole::Inlet, Channel::Pressure, p_out);
        }
        Polarity::Undefined => {
            return Err(ComponentError::InvalidArg {
                what: "mixing source pressure polarity unresolved",
            })
        }
    }

    graph.set_gas_value(unit, PortRole::Outlet, Channel::Temperature, t_out);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::Alpha, alpha_out);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::FlowFraction, g_out);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::FuelFlowFraction, g_fuel_in);
    Ok(())
}
