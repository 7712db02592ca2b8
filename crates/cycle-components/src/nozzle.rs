//! Convergent nozzle (§4.10): isentropic expansion down to the downstream
//! static pressure, scaled by the velocity coefficient `phi`, with the exit
//! speed (and hence the reduced velocity used for the vestigial pressure
//! bookkeeping) solved by the same Picard-on-kappa pattern as the
//! compressor and turbine.

use cycle_core::UnitId;
use cycle_fluids::{gas_dynamics, WorkFluid};
use cycle_graph::{Channel, Graph, Polarity, PortRole};

use crate::common::{check_finite, INNER_ITER_CAP};
use crate::error::{ComponentError, ComponentResult};
use crate::params::NozzleParams;

pub fn update(graph: &mut Graph, unit: UnitId, params: &NozzleParams, fluid: WorkFluid) -> ComponentResult<()> {
    let backward_anchor = graph
        .unit(unit)
        .expect("unit exists")
        .gas_slot(PortRole::Inlet, Channel::Pressure)
        .polarity
        == Polarity::Output;
    if backward_anchor {
        return Err(ComponentError::InvalidArg {
            what: "nozzle backward orientation is not yet supported: p*_in is required as an input",
        });
    }

    let t_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::Temperature)
        .expect("check_input guarantees T*_in is present");
    let alpha = graph
        .gas_value(unit, PortRole::Inlet, Channel::Alpha)
        .expect("check_input guarantees alpha_in is present");
    let p_in = graph
        .gas_value(unit, PortRole::Inlet, Channel::Pressure)
        .expect("check_input guarantees p*_in is present");
    let p_out_static = graph
        .value_at(unit, PortRole::Outlet, Channel::StaticPressure)
        .expect("check_input guarantees the downstream static pressure is present");

    let pi_n = p_in / p_out_static;

    let mut kappa = fluid.k(t_in, alpha);
    let mut t_out = t_in;
    let mut c_out = 0.0;
    for _ in 0..INNER_ITER_CAP {
        let c_p_bar = fluid.c_p_av_int(t_in, t_out, alpha);
        let h_n = c_p_bar * t_in * (1.0 - pi_n.powf((1.0 - kappa) / kappa));
        c_out = params.phi * (2.0 * h_n).sqrt();
        let t_out_new = t_in - params.phi * h_n / c_p_bar;
        let new_kappa = fluid.k_av_int(t_in, t_out_new, alpha);
        let delta = (new_kappa - kappa).abs() / kappa;
        kappa = new_kappa;
        t_out = t_out_new;
        if delta < params.precision {
            break;
        }
    }
    check_finite(t_out, "nozzle static T_out")?;
    check_finite(c_out, "nozzle exit velocity")?;

    let r = fluid.r();
    let a_cr = gas_dynamics::a_cr(t_in, kappa, r);
    let lam = c_out / a_cr;
    let pi = gas_dynamics::pi_lam(lam, kappa);
    let p_star_out = p_out_static / pi;
    check_finite(p_star_out, "nozzle p*_out")?;

    graph.set_gas_value(unit, PortRole::Outlet, Channel::Pressure, p_star_out);
    graph.set_value_at(unit, PortRole::Outlet, Channel::StaticTemperature, t_out);
    Ok(())
}
