//! End-to-end coverage of [`cycle_solver::solve`] against representative
//! topologies (§8): a plain single-shaft turbojet, a free-power-turbine
//! engine on natural-gas products, a reheat cycle, and a bleed/return
//! mixing path. Each assembles a full [`Cycle`] via [`CycleBuilder`],
//! solves it, and checks both that it converges and a handful of
//! invariants that follow from the physics regardless of how many outer
//! iterations it took.

use cycle_components::params::{
    AtmosphereParams, CombustionChamberParams, CompressorParams, InletParams, LoadParams,
    NozzleParams, OutletParams, SinkParams, SourceParams, TurbineParams,
};
use cycle_fluids::WorkFluid;
use cycle_graph::{Channel, PortRole};
use cycle_solver::{solve, Cycle, CycleBuilder, SolveConfig};

const T0: f64 = 288.0;
const P0: f64 = 101_325.0;

fn atmosphere_params() -> AtmosphereParams {
    AtmosphereParams::new(T0, P0)
}

/// §8 scenario 1B: atmosphere, inlet, single compressor, combustion
/// chamber, single turbine driving only that compressor, nozzle exhaust.
fn single_shaft_air_cycle() -> Cycle {
    let mut b = CycleBuilder::new();

    let atm = b.add_atmosphere("Atm", atmosphere_params());
    let inlet = b.add_inlet("Inlet", WorkFluid::AmbientAir, InletParams { sigma: 0.98 });
    let comp = b.add_compressor(
        "C1",
        WorkFluid::AmbientAir,
        CompressorParams::new(10.0),
    );
    let cc = b.add_combustion_chamber(
        "CC",
        WorkFluid::AmbientAir,
        WorkFluid::KeroseneProducts,
        CombustionChamberParams::new(1400.0),
    );
    let turb = b.add_turbine("T1", WorkFluid::KeroseneProducts, TurbineParams::new());
    let noz = b.add_nozzle(
        "Noz",
        false,
        WorkFluid::KeroseneProducts,
        NozzleParams::default(),
    );
    let dummy = b.add_load("Dummy", true, LoadParams::new(0.0));

    b.connect_gas_dynamic(atm, inlet).unwrap();
    b.connect_gas_dynamic(inlet, comp).unwrap();
    b.connect_gas_dynamic(comp, cc).unwrap();
    b.connect_gas_dynamic(cc, turb).unwrap();
    b.connect_gas_dynamic(turb, noz).unwrap();
    b.connect_static_gas_dynamic(noz, atm).unwrap();
    b.connect_mechanical(turb, comp, dummy).unwrap();

    b.build().unwrap()
}

/// §8 scenario 2N: gas-generator turbine drives only the compressor; a
/// free power turbine drives a real 2 MW mechanical load; the loop closes
/// through a backward-oriented outlet (the power turbine's own pressure
/// ports both resolve `Input`, so the exhaust unit's inlet pressure has to
/// be computed backward from the fixed exit velocity, which only
/// [`cycle_components::outlet`] supports -- a nozzle errors in that
/// orientation).
fn free_power_turbine_natural_gas_cycle() -> Cycle {
    let mut b = CycleBuilder::new();

    let atm = b.add_atmosphere("Atm", atmosphere_params());
    let inlet = b.add_inlet("Inlet", WorkFluid::AmbientAir, InletParams { sigma: 0.98 });
    let comp = b.add_compressor(
        "C1",
        WorkFluid::AmbientAir,
        CompressorParams::new(12.0),
    );
    let cc = b.add_combustion_chamber(
        "CC",
        WorkFluid::AmbientAir,
        WorkFluid::NaturalGasProducts,
        CombustionChamberParams::new(1450.0),
    );
    let ggt = b.add_turbine("GGT", WorkFluid::NaturalGasProducts, TurbineParams::new());
    let mut pt_params = TurbineParams::new();
    pt_params.initial_p_out = Some(130_000.0);
    let pt = b.add_turbine("PT", WorkFluid::NaturalGasProducts, pt_params);
    let outlet = b.add_outlet(
        "Outlet",
        true,
        WorkFluid::NaturalGasProducts,
        OutletParams::new(200.0),
    );
    let dummy1 = b.add_load("Dummy1", true, LoadParams::new(0.0));
    let load = b.add_load("Load", false, LoadParams::new(2_000_000.0));
    let dummy2 = b.add_load("Dummy2", true, LoadParams::new(0.0));

    b.connect_gas_dynamic(atm, inlet).unwrap();
    b.connect_gas_dynamic(inlet, comp).unwrap();
    b.connect_gas_dynamic(comp, cc).unwrap();
    b.connect_gas_dynamic(cc, ggt).unwrap();
    b.connect_gas_dynamic(ggt, pt).unwrap();
    b.connect_gas_dynamic(pt, outlet).unwrap();
    b.connect_static_gas_dynamic(outlet, atm).unwrap();
    b.connect_mechanical(ggt, comp, dummy1).unwrap();
    b.connect_mechanical(pt, load, dummy2).unwrap();

    b.build().unwrap()
}

/// §8 scenario 2NIH: a reheat chamber between two turbines, the first
/// driving the compressor, the second a free power turbine driving a real
/// load -- same backward-outlet requirement as the plain free-turbine
/// case above.
fn reheat_cycle() -> Cycle {
    let mut b = CycleBuilder::new();

    let atm = b.add_atmosphere("Atm", atmosphere_params());
    let inlet = b.add_inlet("Inlet", WorkFluid::AmbientAir, InletParams { sigma: 0.98 });
    let comp = b.add_compressor(
        "C1",
        WorkFluid::AmbientAir,
        CompressorParams::new(14.0),
    );
    let cc1 = b.add_combustion_chamber(
        "CC1",
        WorkFluid::AmbientAir,
        WorkFluid::NaturalGasProducts,
        CombustionChamberParams::new(1450.0),
    );
    let ct = b.add_turbine("CT", WorkFluid::NaturalGasProducts, TurbineParams::new());
    let mut cc2_params = CombustionChamberParams::new(1350.0);
    cc2_params.initial_alpha_out = 3.0;
    let cc2 = b.add_combustion_chamber(
        "CC2",
        WorkFluid::NaturalGasProducts,
        WorkFluid::NaturalGasProducts,
        cc2_params,
    );
    let mut pt_params = TurbineParams::new();
    pt_params.initial_p_out = Some(120_000.0);
    let pt = b.add_turbine("PT", WorkFluid::NaturalGasProducts, pt_params);
    let outlet = b.add_outlet(
        "Outlet",
        true,
        WorkFluid::NaturalGasProducts,
        OutletParams::new(200.0),
    );
    let dummy1 = b.add_load("Dummy1", true, LoadParams::new(0.0));
    let load = b.add_load("Load", false, LoadParams::new(1_500_000.0));
    let dummy2 = b.add_load("Dummy2", true, LoadParams::new(0.0));

    b.connect_gas_dynamic(atm, inlet).unwrap();
    b.connect_gas_dynamic(inlet, comp).unwrap();
    b.connect_gas_dynamic(comp, cc1).unwrap();
    b.connect_gas_dynamic(cc1, ct).unwrap();
    b.connect_gas_dynamic(ct, cc2).unwrap();
    b.connect_gas_dynamic(cc2, pt).unwrap();
    b.connect_gas_dynamic(pt, outlet).unwrap();
    b.connect_static_gas_dynamic(outlet, atm).unwrap();
    b.connect_mechanical(ct, comp, dummy1).unwrap();
    b.connect_mechanical(pt, load, dummy2).unwrap();

    b.build().unwrap()
}

/// §8 "mixing source after a combustor": a bleed sink draws air off the
/// compressor discharge, and a mixing source downstream of the combustion
/// chamber reintroduces it into the hot path ahead of the turbine.
fn mixing_source_after_combustor_cycle() -> (Cycle, cycle_core::UnitId, cycle_core::UnitId) {
    let mut b = CycleBuilder::new();

    let atm = b.add_atmosphere("Atm", atmosphere_params());
    let inlet = b.add_inlet("Inlet", WorkFluid::AmbientAir, InletParams { sigma: 0.98 });
    let comp = b.add_compressor(
        "C1",
        WorkFluid::AmbientAir,
        CompressorParams::new(10.0),
    );
    let bleed = b.add_sink("Bleed", WorkFluid::AmbientAir, SinkParams::new(0.05, 0.0));
    let cc = b.add_combustion_chamber(
        "CC",
        WorkFluid::AmbientAir,
        WorkFluid::KeroseneProducts,
        CombustionChamberParams::new(1400.0),
    );
    let ret = b.add_source(
        "Return",
        WorkFluid::KeroseneProducts,
        WorkFluid::AmbientAir,
        SourceParams::new(0.05, 450.0),
    );
    let turb = b.add_turbine("T1", WorkFluid::KeroseneProducts, TurbineParams::new());
    let noz = b.add_nozzle(
        "Noz",
        false,
        WorkFluid::KeroseneProducts,
        NozzleParams::default(),
    );
    let dummy = b.add_load("Dummy", true, LoadParams::new(0.0));

    b.connect_gas_dynamic(atm, inlet).unwrap();
    b.connect_gas_dynamic(inlet, comp).unwrap();
    b.connect_gas_dynamic(comp, bleed).unwrap();
    b.connect_gas_dynamic(bleed, cc).unwrap();
    b.connect_gas_dynamic(cc, ret).unwrap();
    b.connect_gas_dynamic(ret, turb).unwrap();
    b.connect_gas_dynamic(turb, noz).unwrap();
    b.connect_static_gas_dynamic(noz, atm).unwrap();
    b.connect_mechanical(turb, comp, dummy).unwrap();

    (b.build().unwrap(), ret, turb)
}

#[test]
fn single_shaft_air_cycle_converges_and_closes_pressure_forward() {
    let mut cycle = single_shaft_air_cycle();
    let report = solve(&mut cycle, &SolveConfig::default()).expect("single-shaft cycle should converge");
    assert!(report.iterations >= 1);
    assert!(report.max_residual < SolveConfig::default().tolerance);

    // Forward pressure chain from atmosphere through inlet and compressor
    // settles algebraically on the first pass, independent of outer-loop
    // convergence: p*_comp_out = p0 * sigma_inlet * pi_c.
    let units = &cycle.graph;
    let comp = units
        .units()
        .iter()
        .find(|u| u.name == "C1")
        .expect("compressor present");
    let p_comp_out = units
        .gas_value(comp.id, PortRole::Outlet, Channel::Pressure)
        .expect("compressor outlet pressure resolved");
    let expected = P0 * 0.98 * 10.0;
    assert!(
        (p_comp_out - expected).abs() / expected < 1e-6,
        "p_comp_out={p_comp_out}, expected={expected}"
    );
}

#[test]
fn single_shaft_air_cycle_resolve_is_idempotent() {
    let mut cycle = single_shaft_air_cycle();
    solve(&mut cycle, &SolveConfig::default()).unwrap();
    let second = solve(&mut cycle, &SolveConfig::default()).unwrap();
    assert_eq!(second.iterations, 1, "re-solving a converged cycle should settle in one pass");
    assert!(second.max_residual < 1e-9);
}

#[test]
fn free_power_turbine_natural_gas_cycle_converges() {
    let mut cycle = free_power_turbine_natural_gas_cycle();
    let report = solve(&mut cycle, &SolveConfig::default())
        .expect("free-power-turbine cycle should converge");
    assert!(report.max_residual < SolveConfig::default().tolerance);

    let load = cycle
        .graph
        .units()
        .iter()
        .find(|u| u.name == "Load")
        .expect("load present");
    let shaft = cycle
        .graph
        .value_at(load.id, PortRole::Inlet, Channel::ShaftPrimary)
        .expect("load shaft work resolved");
    assert!(shaft > 0.0, "power turbine should deliver positive specific work, got {shaft}");
}

#[test]
fn reheat_cycle_converges_with_two_combustion_chambers() {
    let mut cycle = reheat_cycle();
    let report = solve(&mut cycle, &SolveConfig::default()).expect("reheat cycle should converge");
    assert!(report.max_residual < SolveConfig::default().tolerance);

    let cc1_out = cycle
        .graph
        .units()
        .iter()
        .find(|u| u.name == "CC1")
        .expect("first chamber present");
    let cc2_out = cycle
        .graph
        .units()
        .iter()
        .find(|u| u.name == "CC2")
        .expect("second chamber present");
    let t_ct_in = cycle
        .graph
        .gas_value(cc1_out.id, PortRole::Outlet, Channel::Temperature)
        .unwrap();
    let t_pt_in = cycle
        .graph
        .gas_value(cc2_out.id, PortRole::Outlet, Channel::Temperature)
        .unwrap();
    assert!((t_ct_in - 1450.0).abs() < 1.0, "CC1 should hit its target T_gas, got {t_ct_in}");
    assert!((t_pt_in - 1350.0).abs() < 1.0, "CC2 should hit its target T_gas, got {t_pt_in}");
}

#[test]
fn mixing_source_after_combustor_conserves_mass_through_the_return() {
    let (mut cycle, ret, turb) = mixing_source_after_combustor_cycle();
    let report = solve(&mut cycle, &SolveConfig::default())
        .expect("bleed/return cycle should converge");
    assert!(report.max_residual < SolveConfig::default().tolerance);

    let g_before = cycle
        .graph
        .gas_value(ret, PortRole::Inlet, Channel::FlowFraction)
        .expect("return inlet flow fraction resolved");
    let g_after = cycle
        .graph
        .gas_value(turb, PortRole::Inlet, Channel::FlowFraction)
        .expect("turbine inlet flow fraction resolved");
    assert!(
        (g_after - (g_before + 0.05)).abs() < 1e-9,
        "return should add exactly g_return back onto the main path: before={g_before}, after={g_after}"
    );
}
