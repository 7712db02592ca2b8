//! Combustion chamber (§4.7): Picard iteration on excess-air ratio alpha,
//! seeded from the previous outer iteration's own output.

use cycle_core::UnitId;
use cycle_fluids::WorkFluid;
use cycle_graph::{Channel, Graph, Polarity, PortRole};

use crate::common::{check_finite, INNER_ITER_CAP};
use crate::error::{ComponentError, ComponentResult};
use crate::params::CombustionChamberParams;

/// `fluid_in` is the working fluid arriving at the inlet (ambient air, or
/// combustion products for a reheat chamber); `fluid_out` is this chamber's
/// own combustion-product species.
pub fn update(
    graph: &mut Graph,
    unit: UnitId,
    params: &CombustionChamberParams,
    fluid_in: WorkFluid,
    fluid_out: WorkFluid,
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

    let l0 = fluid_out
        .l0()
        .expect("combustion-product work fluid always carries a stoichiometric ratio");
    let t_gas = params.t_gas;

    let mut alpha_out = graph
        .gas_value(unit, PortRole::Outlet, Channel::Alpha)
        .unwrap_or(params.initial_alpha_out);
    let mut g_fuel_out = g_fuel_in;
    let mut g_out = g_in;

    for _ in 0..INNER_ITER_CAP {
        let cp_out = fluid_out.c_p_av(t_gas, alpha_out);
        let cp_in = fluid_in.c_p_av(t_in, alpha_in);
        let cp_out_ref = fluid_out.c_p(cycle_fluids::T_REF, alpha_out);
        let denom = params.eta_burn * fluid_out_qn(fluid_out)? - cp_out * t_gas + cp_out_ref * cycle_fluids::T_REF;
        let g_fuel_prime = (cp_out * t_gas - cp_in * t_in) / denom;

        g_out = g_in * (1.0 + g_fuel_prime);
        let new_alpha_out = 1.0 / (l0 * g_fuel_prime * g_in / (g_in - g_fuel_in));
        g_fuel_out = g_fuel_in + g_fuel_prime * g_in;

        let delta = (new_alpha_out - alpha_out).abs() / alpha_out;
        alpha_out = new_alpha_out;
        if delta < params.precision {
            break;
        }
    }
    check_finite(alpha_out, "combustion chamber alpha_out")?;
    check_finite(g_out, "combustion chamber g_out")?;

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
            graph.set_gas_value(unit, PortRole::Outlet, Channel::Pressure, p_in * params.sigma);
        }
        Polarity::Output => {
            let p_out = graph
                .gas_value(unit, PortRole::Outlet, Channel::Pressure)
                .expect("check_input guarantees p*_out is present in downstream orientation");
            graph.set_gas_value(unit, PortRole::Inlet, Channel::Pressure, p_out / params.sigma);
        }
        Polarity::Undefined => {
            return Err(ComponentError::InvalidArg {
                what: "combustion chamber pressure polarity unresolved",
            })
        }
    }

    graph.set_gas_value(unit, PortRole::Outlet, Channel::Temperature, t_gas);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::Alpha, alpha_out);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::FlowFraction, g_out);
    graph.set_gas_value(unit, PortRole::Outlet, Channel::FuelFlowFraction, g_fuel_out);
    Ok(())
}

fn fluid_out_qn(fluid_out: WorkFluid) -> ComponentResult<f64> {
    fluid_out
        .q_n()
        .ok_or(ComponentError::InvalidArg {
            what: "combustion-product work fluid always carries a calorific value",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::single_shaft_turbojet;

    #[test]
    fn raises_temperature_to_target_and_conserves_pressure_recovery() {
        let (mut g, units) = single_shaft_turbojet();
        g.set_gas_value(units.comp, PortRole::Outlet, Channel::Temperature, 600.0);
        g.set_gas_value(units.comp, PortRole::Outlet, Channel::Pressure, 1_200_000.0);
        g.set_gas_value(units.comp, PortRole::Outlet, Channel::Alpha, f64::INFINITY);
        g.set_gas_value(units.comp, PortRole::Outlet, Channel::FlowFraction, 1.0);
        g.set_gas_value(units.comp, PortRole::Outlet, Channel::FuelFlowFraction, 0.0);

        let params = CombustionChamberParams::new(1300.0);
        update(&mut g, units.cc, &params, WorkFluid::AmbientAir, WorkFluid::KeroseneProducts).unwrap();

        let t_out = g.gas_value(units.cc, PortRole::Outlet, Channel::Temperature).unwrap();
        assert!((t_out - 1300.0).abs() < 1e-6);
        let p_out = g.gas_value(units.cc, PortRole::Outlet, Channel::Pressure).unwrap();
        assert!((p_out - 1_200_000.0 * params.sigma).abs() < 1e-3);
        let g_out = g.gas_value(units.cc, PortRole::Outlet, Channel::FlowFraction).unwrap();
        assert!(g_out > 1.0, "burning fuel must increase relative mass flow");
        let alpha_out = g.gas_value(units.cc, PortRole::Outlet, Channel::Alpha).unwrap();
        assert!(alpha_out > 1.0 && alpha_out.is_finite());
    }
}
