//! Static outlet (§4.10): converts the stagnation state at the end of the
//! gas path into the static state implied by a fixed exit velocity, against
//! the static pressure the atmosphere publishes.
//!
//! Unlike the nozzle, the exit velocity `c_out` is a design input here
//! rather than something solved for from an expansion ratio -- there is no
//! inner Picard loop.

use cycle_core::UnitId;
use cycle_fluids::{gas_dynamics, WorkFluid};
use cycle_graph::{Channel, Graph, Polarity, PortRole};

use crate::common::check_finite;
use crate::error::{ComponentError, ComponentResult};
use crate::params::OutletParams;

pub fn update(graph: &mut Graph, unit: UnitId, params: &OutletParams, fluid: WorkFluid) -> ComponentResult<()> {
    let t_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::Temperature)
        .expect("check_input guarantees T*_in is present");
    let alpha = graph
        .gas_value(unit, PortRole::Inlet, Channel::Alpha)
        .expect("check_input guarantees alpha_in is present");
    let p_out_static = graph
        .value_at(unit, PortRole::Outlet, Channel::StaticPressure)
        .expect("check_input guarantees the downstream static pressure is present");

    let k = fluid.k(t_in, alpha);
    let r = fluid.r();
    let a_cr = gas_dynamics::a_cr(t_in, k, r);
    let lam = params.c_out / a_cr;
    let pi = gas_dynamics::pi_lam(lam, k);
    let tau = gas_dynamics::tau_lam(lam, k);

    let p_star_out = p_out_static / pi;
    check_finite(p_star_out, "outlet p*_out")?;
    let t_out = t_in * tau;
    check_finite(t_out, "outlet static T_out")?;

    let backward_anchor = graph
        .unit(unit)
        .expect("unit exists")
        .gas_slot(PortRole::Inlet, Channel::Pressure)
        .polarity
        == Polarity::Output;

    graph.set_gas_value(unit, PortRole::Outlet, Channel::Pressure, p_star_out);
    if backward_anchor {
        let p_star_in = p_star_out / params.sigma;
        graph.set_gas_value(unit, PortRole::Inlet, Channel::Pressure, p_star_in);
    } else {
        let _ = graph
            .gas_value(unit, PortRole::Inlet, Channel::Pressure)
            .ok_or(ComponentError::InvalidArg {
                what: "outlet forward orientation expects p*_in already known",
            })?;
    }
    graph.set_value_at(unit, PortRole::Outlet, Channel::StaticTemperature, t_out);
    Ok(())
}
