//! Common utilities shared by every unit's local update.

use crate::error::{ComponentError, ComponentResult};
use cycle_core::numeric::ensure_finite;
use cycle_core::UnitId;
use cycle_graph::{Graph, Polarity};

/// Safety cap on a unit's own inner Picard loop (kappa, eta_ad, alpha_out),
/// distinct from the outer solver's iteration budget (§9 "design notes").
pub const INNER_ITER_CAP: usize = 20;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    Ok(())
}

/// `check_input()` (§4.4): true once every `Input`-polarity port this unit
/// owns -- gas-dynamic, static, or mechanical -- has a value on its stream.
/// A unit whose inputs aren't all ready yet is skipped for this pass.
pub fn inputs_ready(graph: &Graph, unit: UnitId) -> bool {
    let Some(u) = graph.unit(unit) else {
        return false;
    };
    u.all_slots()
        .filter(|slot| slot.polarity == Polarity::Input)
        .all(|slot| {
            slot.stream
                .and_then(|sid| graph.stream(sid))
                .and_then(|s| s.value)
                .is_some()
        })
}

/// Test-only fixture: a closed single-shaft turbojet loop (atmosphere,
/// inlet, compressor, combustion chamber, turbine, nozzle, a shaft and its
/// placeholder cap), already run through behaviour inference. Every unit
/// test module in this crate exercises its unit of interest against this
/// same topology rather than reinventing a fresh one, mirroring the fixture
/// `cycle_graph::behaviour` uses for its own tests.
#[cfg(test)]
#[derive(Clone, Copy)]
pub(crate) struct LoopUnits {
    pub atm: UnitId,
    pub inlet: UnitId,
    pub comp: UnitId,
    pub cc: UnitId,
    pub turb: UnitId,
    pub noz: UnitId,
    pub load: UnitId,
}

#[cfg(test)]
pub(crate) fn single_shaft_turbojet() -> (Graph, LoopUnits) {
    use cycle_graph::{builder::GraphBuilder, UnitKind};

    let mut b = GraphBuilder::new();
    let atm = b.add_unit(UnitKind::Atmosphere, "Atm");
    let inlet = b.add_unit(UnitKind::Inlet, "Inlet");
    let comp = b.add_unit(UnitKind::Compressor, "C1");
    let cc = b.add_unit(UnitKind::CombustionChamber, "CC");
    let turb = b.add_unit(UnitKind::Turbine, "T1");
    let noz = b.add_unit(UnitKind::Nozzle { backward_anchor: false }, "Noz");
    let load = b.add_unit(UnitKind::Load { is_placeholder: true }, "Dummy");

    b.connect_gas_dynamic(atm, inlet).unwrap();
    b.connect_gas_dynamic(inlet, comp).unwrap();
    b.connect_gas_dynamic(comp, cc).unwrap();
    b.connect_gas_dynamic(cc, turb).unwrap();
    b.connect_gas_dynamic(turb, noz).unwrap();
    b.connect_static_gas_dynamic(noz, atm).unwrap();
    b.connect_mechanical(turb, comp, load).unwrap();

    let mut g = b.build().unwrap();
    cycle_graph::run_to_fixed_point(&mut g, 50).unwrap();

    (
        g,
        LoopUnits {
            atm,
            inlet,
            comp,
            cc,
            turb,
            noz,
            load,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }
}
