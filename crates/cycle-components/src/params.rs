//! Per-unit physical parameters.
//!
//! A [`Graph`](cycle_graph::Graph) fixes topology and, after behaviour
//! inference, port polarity -- but it carries no physical parameters at all
//! (efficiencies, pressure ratios, target temperatures). Those live here, one
//! struct per unit kind, collected into a [`ComponentParams`] bank indexed
//! in parallel with the graph's unit arena (see `cycle_solver::builder`).
//!
//! Defaults match §4's stated typical values; every field can be overridden
//! per unit at construction time.

use cycle_core::Real;

/// p*_out = p*_in * sigma (pressure recovery).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InletParams {
    pub sigma: Real,
}

impl Default for InletParams {
    fn default() -> Self {
        Self { sigma: 0.99 }
    }
}

/// §4.5: Picard iteration on the polytropic exponent kappa.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompressorParams {
    pub pi_c: Real,
    pub eta_p: Real,
    pub precision: Real,
}

impl CompressorParams {
    pub fn new(pi_c: Real) -> Self {
        Self {
            pi_c,
            ..Default::default()
        }
    }
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            pi_c: 1.0,
            eta_p: 0.89,
            precision: 1e-2,
        }
    }
}

/// §4.6: three modes (power turbine, upstream/downstream compressor-turbine),
/// resolved at solve time from the unit's own pressure-port polarities rather
/// than from a flag here. `initial_p_in`/`initial_p_out` only matter when the
/// corresponding pressure port resolves to `Input` in the *downstream*
/// orientation, where the value that would otherwise prime the first outer
/// iteration is written by a unit later in the solve order (§9 "initial
/// guesses"); leaving the relevant one `None` in that situation surfaces
/// `MissingInitialGuess`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurbineParams {
    pub eta_p: Real,
    pub eta_m: Real,
    pub eta_r: Real,
    pub precision: Real,
    pub initial_p_in: Option<Real>,
    pub initial_p_out: Option<Real>,
}

impl TurbineParams {
    pub fn new() -> Self {
        Self {
            eta_p: 0.91,
            eta_m: 0.99,
            eta_r: 0.99,
            precision: 1e-2,
            initial_p_in: None,
            initial_p_out: None,
        }
    }
}

/// §4.7. `t_gas` is the target gas-generator exit stagnation temperature;
/// `initial_alpha_out` seeds the chamber's own inner Picard loop on excess
/// air (default 2.5, §4.7); `initial_p_in` mirrors
/// [`TurbineParams::initial_p_in`] for a downstream-orientation chamber.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombustionChamberParams {
    pub t_gas: Real,
    pub eta_burn: Real,
    pub sigma: Real,
    pub t_fuel: Real,
    pub initial_alpha_out: Real,
    pub precision: Real,
    pub initial_p_in: Option<Real>,
}

impl CombustionChamberParams {
    pub fn new(t_gas: Real) -> Self {
        Self {
            t_gas,
            ..Default::default()
        }
    }
}

impl Default for CombustionChamberParams {
    fn default() -> Self {
        Self {
            t_gas: 1200.0,
            eta_burn: 0.99,
            sigma: 0.98,
            t_fuel: 288.0,
            initial_alpha_out: 2.5,
            precision: 1e-2,
            initial_p_in: None,
        }
    }
}

/// §4.8: mixing source (e.g. cooling-air return rejoining the hot path).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceParams {
    pub g_return: Real,
    pub return_temperature: Real,
    pub initial_p_in: Option<Real>,
}

impl SourceParams {
    pub fn new(g_return: Real, return_temperature: Real) -> Self {
        Self {
            g_return,
            return_temperature,
            initial_p_in: None,
        }
    }
}

/// §4.9: bleed sink, draws `g_cooling` (routed to blade/case cooling) and
/// `g_outflow` (lost overboard) off the main path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SinkParams {
    pub g_cooling: Real,
    pub g_outflow: Real,
}

impl SinkParams {
    pub fn new(g_cooling: Real, g_outflow: Real) -> Self {
        Self { g_cooling, g_outflow }
    }
}

/// §4.10: jet exit, given exit velocity `c_out` and pressure-recovery `sigma`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutletParams {
    pub c_out: Real,
    pub sigma: Real,
}

impl OutletParams {
    pub fn new(c_out: Real) -> Self {
        Self {
            c_out,
            ..Default::default()
        }
    }
}

impl Default for OutletParams {
    fn default() -> Self {
        Self {
            c_out: 100.0,
            sigma: 0.99,
        }
    }
}

/// §4.10: convergent nozzle, isentropic expansion to the downstream static
/// pressure, scaled by the velocity coefficient `phi`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NozzleParams {
    pub phi: Real,
    pub precision: Real,
}

impl Default for NozzleParams {
    fn default() -> Self {
        Self {
            phi: 0.97,
            precision: 1e-2,
        }
    }
}

/// §4.10: the ambient reservoir that anchors the cycle. `initial_inlet_temperature`
/// is the pre-seed for the loop-closing ports that would otherwise stall the
/// first outer iteration (§9 "initial guesses").
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtmosphereParams {
    pub t0: Real,
    pub p0: Real,
    pub initial_inlet_temperature: Real,
}

impl AtmosphereParams {
    pub fn new(t0: Real, p0: Real) -> Self {
        Self {
            t0,
            p0,
            initial_inlet_temperature: t0,
        }
    }
}

impl Default for AtmosphereParams {
    fn default() -> Self {
        Self::new(288.0, 101_325.0)
    }
}

/// §4.11: mechanical-only load. `power` is the net shaft power demanded;
/// zero marks the placeholder second shaft of a single generator unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadParams {
    pub power: Real,
}

impl LoadParams {
    pub fn new(power: Real) -> Self {
        Self { power }
    }
}

/// One unit's physical parameters, tagged by kind to match
/// [`cycle_graph::UnitKind`] for dispatch in `cycle_solver`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentParams {
    Inlet(InletParams),
    Compressor(CompressorParams),
    Turbine(TurbineParams),
    CombustionChamber(CombustionChamberParams),
    Source(SourceParams),
    Sink(SinkParams),
    Outlet(OutletParams),
    Nozzle(NozzleParams),
    Atmosphere(AtmosphereParams),
    Load(LoadParams),
}
