//! The Picard fixed-point outer loop (§4.4): assemble behaviour and solve
//! order once up front, then repeatedly run every ready unit's local
//! update, relax, and check convergence.

use std::collections::HashMap;

use cycle_core::{Real, UnitId};
use cycle_fluids::WorkFluid;
use cycle_graph::{Channel, Graph, Polarity, PortRole, UnitKind};

use cycle_components::common::inputs_ready;
use cycle_components::{atmosphere, combustion_chamber, compressor, inlet, load, nozzle, outlet, sink, source, turbine};

use crate::builder::{Cycle, UnitFluids, UnitParams};
use crate::error::{SolverError, SolverResult};

/// Outer-loop tuning. Defaults match §4.4/§9's stated typical values.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolveConfig {
    pub max_iterations: usize,
    pub tolerance: Real,
    /// Under-relaxation factor applied to every stream each pass; 1.0 is no
    /// relaxation.
    pub omega: Real,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-2,
            omega: 1.0,
        }
    }
}

/// Outcome of a successful solve: how many outer iterations it took and the
/// residual it converged to.
#[derive(Debug, Clone, Copy)]
pub struct SolveReport {
    pub iterations: usize,
    pub max_residual: Real,
}

/// Run behaviour inference, compute solve order, seed the backward-flowing
/// ports that would otherwise stall the first outer iteration, then iterate
/// to convergence.
pub fn solve(cycle: &mut Cycle, config: &SolveConfig) -> SolverResult<SolveReport> {
    cycle_graph::run_to_fixed_point(&mut cycle.graph, cycle_graph::behaviour::DEFAULT_MAX_PASSES)?;
    cycle_graph::validate_polarity_uniqueness(&cycle.graph)?;
    let order = cycle_graph::topological_order(&cycle.graph)?;

    seed_initial_guesses(cycle, &order)?;

    for iteration in 0..config.max_iterations {
        for stream in cycle.graph.streams_mut() {
            stream.previous = stream.value;
        }

        for &unit in &order {
            if !inputs_ready(&cycle.graph, unit) {
                continue;
            }
            dispatch(cycle, unit)?;
        }

        for stream in cycle.graph.streams_mut() {
            stream.relax(config.omega);
        }

        let max_residual = cycle
            .graph
            .streams()
            .iter()
            .map(|s| s.residual())
            .fold(0.0_f64, f64::max);

        tracing::info!(iteration, max_residual, "outer iteration");

        if max_residual < config.tolerance {
            return Ok(SolveReport {
                iterations: iteration + 1,
                max_residual,
            });
        }
    }

    let max_residual = cycle
        .graph
        .streams()
        .iter()
        .map(|s| s.residual())
        .fold(0.0_f64, f64::max);
    tracing::warn!(
        iterations = config.max_iterations,
        max_residual,
        tolerance = config.tolerance,
        "outer loop did not converge"
    );
    Err(SolverError::ConvergenceFailed {
        iterations: config.max_iterations,
        max_residual,
        tolerance: config.tolerance,
    })
}

fn dispatch(cycle: &mut Cycle, unit: UnitId) -> SolverResult<()> {
    let kind = cycle.graph.unit(unit).expect("unit exists").kind;
    let params = cycle
        .params
        .get(&unit)
        .unwrap_or_else(|| panic!("unit {unit} has no parameters registered"));
    let fluids = cycle
        .fluids
        .get(&unit)
        .copied()
        .unwrap_or(UnitFluids::Single(WorkFluid::AmbientAir));

    match (kind, params) {
        (UnitKind::Inlet, UnitParams::Inlet(p)) => inlet::update(&mut cycle.graph, unit, p)?,
        (UnitKind::Compressor, UnitParams::Compressor(p)) => {
            compressor::update(&mut cycle.graph, unit, p, fluids.single())?
        }
        (UnitKind::Turbine, UnitParams::Turbine(p)) => {
            turbine::update(&mut cycle.graph, unit, p, fluids.single())?
        }
        (UnitKind::CombustionChamber, UnitParams::CombustionChamber(p)) => {
            let (fluid_in, fluid_out) = match fluids {
                UnitFluids::Transition { fluid_in, fluid_out } => (fluid_in, fluid_out),
                UnitFluids::Single(f) => (f, f),
            };
            combustion_chamber::update(&mut cycle.graph, unit, p, fluid_in, fluid_out)?
        }
        (UnitKind::Source, UnitParams::Source(p)) => {
            let (fluid, return_fluid) = match fluids {
                UnitFluids::Transition { fluid_in, fluid_out } => (fluid_in, fluid_out),
                UnitFluids::Single(f) => (f, f),
            };
            source::update(&mut cycle.graph, unit, p, fluid, return_fluid)?
        }
        (UnitKind::Sink, UnitParams::Sink(p)) => sink::update(&mut cycle.graph, unit, p)?,
        (UnitKind::Outlet { .. }, UnitParams::Outlet(p)) => {
            outlet::update(&mut cycle.graph, unit, p, fluids.single())?
        }
        (UnitKind::Nozzle { .. }, UnitParams::Nozzle(p)) => {
            nozzle::update(&mut cycle.graph, unit, p, fluids.single())?
        }
        (UnitKind::Atmosphere, UnitParams::Atmosphere(p)) => atmosphere::update(&mut cycle.graph, unit, p)?,
        (UnitKind::Load { .. }, UnitParams::Load(p)) => load::update(&mut cycle.graph, unit, p)?,
        (kind, _) => panic!("unit {unit} of kind {kind:?} has mismatched parameters"),
    }
    Ok(())
}

/// Pre-seed the backward-flowing ports that would otherwise deadlock the
/// first outer iteration (§9 "initial guesses"):
///
/// - The atmosphere's own vestigial `Input` ports (five gas-dynamic
///   channels plus the static-inlet temperature) are structurally
///   necessary but never actually read by [`atmosphere::update`]; since
///   the atmosphere runs first in solve order but its sole neighbour runs
///   last, they're unconditionally seeded with harmless defaults rather
///   than surfaced as a missing-guess error.
/// - A turbine in downstream-compressor-turbine orientation, or a
///   combustion chamber/source computing its inlet pressure backward,
///   needs an explicit seed (`TurbineParams::initial_p_out` /
///   `CombustionChamberParams::initial_p_in` / `SourceParams::initial_p_in`);
///   its absence is a [`SolverError::MissingInitialGuess`], not silently
///   defaulted, because there's no value that's "harmless" to guess at a
///   real thermodynamic state.
fn seed_initial_guesses(cycle: &mut Cycle, order: &[UnitId]) -> SolverResult<()> {
    for &unit in order {
        let kind = cycle.graph.unit(unit).expect("unit exists").kind;
        if kind != UnitKind::Atmosphere {
            continue;
        }
        let t0 = match cycle.params.get(&unit) {
            Some(UnitParams::Atmosphere(p)) => p.t0,
            _ => panic!("atmosphere unit has no AtmosphereParams registered"),
        };
        let p0 = match cycle.params.get(&unit) {
            Some(UnitParams::Atmosphere(p)) => p.p0,
            _ => unreachable!(),
        };
        cycle.graph.set_gas_value(unit, PortRole::Inlet, Channel::Temperature, t0);
        cycle.graph.set_gas_value(unit, PortRole::Inlet, Channel::Pressure, p0);
        cycle
            .graph
            .set_gas_value(unit, PortRole::Inlet, Channel::Alpha, f64::INFINITY);
        cycle
            .graph
            .set_gas_value(unit, PortRole::Inlet, Channel::FlowFraction, 1.0);
        cycle
            .graph
            .set_gas_value(unit, PortRole::Inlet, Channel::FuelFlowFraction, 0.0);
        cycle
            .graph
            .set_value_at(unit, PortRole::Inlet, Channel::StaticTemperature, t0);
    }

    for &unit in order {
        let kind = cycle.graph.unit(unit).expect("unit exists").kind;
        match kind {
            UnitKind::Turbine => seed_turbine(cycle, unit)?,
            UnitKind::CombustionChamber => seed_pressure_backward(cycle, unit, |p| match p {
                UnitParams::CombustionChamber(p) => p.initial_p_in,
                _ => None,
            })?,
            UnitKind::Source => seed_pressure_backward(cycle, unit, |p| match p {
                UnitParams::Source(p) => p.initial_p_in,
                _ => None,
            })?,
            _ => {}
        }
    }
    Ok(())
}

fn seed_turbine(cycle: &mut Cycle, unit: UnitId) -> SolverResult<()> {
    let inlet_pressure_downstream = cycle
        .graph
        .unit(unit)
        .expect("unit exists")
        .gas_slot(PortRole::Inlet, Channel::Pressure)
        .polarity
        == Polarity::Output;
    let outlet_pressure_downstream = cycle
        .graph
        .unit(unit)
        .expect("unit exists")
        .gas_slot(PortRole::Outlet, Channel::Pressure)
        .polarity
        == Polarity::Input;

    if outlet_pressure_downstream && cycle.graph.gas_value(unit, PortRole::Outlet, Channel::Pressure).is_none() {
        let seed = match cycle.params.get(&unit) {
            Some(UnitParams::Turbine(p)) => p.initial_p_out,
            _ => None,
        };
        let seed = seed.ok_or(SolverError::MissingInitialGuess {
            what: "turbine downstream orientation needs TurbineParams::initial_p_out",
        })?;
        cycle.graph.set_gas_value(unit, PortRole::Outlet, Channel::Pressure, seed);
    }
    if inlet_pressure_downstream && cycle.graph.gas_value(unit, PortRole::Inlet, Channel::Pressure).is_none() {
        let seed = match cycle.params.get(&unit) {
            Some(UnitParams::Turbine(p)) => p.initial_p_in,
            _ => None,
        };
        let seed = seed.ok_or(SolverError::MissingInitialGuess {
            what: "turbine upstream-from-power-turbine orientation needs TurbineParams::initial_p_in",
        })?;
        cycle.graph.set_gas_value(unit, PortRole::Inlet, Channel::Pressure, seed);
    }
    Ok(())
}

fn seed_pressure_backward(
    cycle: &mut Cycle,
    unit: UnitId,
    seed_of: impl Fn(&UnitParams) -> Option<Real>,
) -> SolverResult<()> {
    let downstream_orientation = cycle
        .graph
        .unit(unit)
        .expect("unit exists")
        .gas_slot(PortRole::Inlet, Channel::Pressure)
        .polarity
        == Polarity::Output;
    if !downstream_orientation {
        return Ok(());
    }
    if cycle.graph.gas_value(unit, PortRole::Inlet, Channel::Pressure).is_some() {
        return Ok(());
    }
    let seed = cycle
        .params
        .get(&unit)
        .and_then(seed_of)
        .ok_or(SolverError::MissingInitialGuess {
            what: "downstream combustion chamber or mixing source needs its initial_p_in seed",
        })?;
    cycle.graph.set_gas_value(unit, PortRole::Inlet, Channel::Pressure, seed);
    Ok(())
}
