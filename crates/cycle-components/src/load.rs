//! Mechanical load (§4.11): consumes or, for the placeholder second shaft of
//! a single-generator unit, publishes shaft work. Behaviour inference
//! already decided which; there is nothing left for this unit to compute
//! except, in the placeholder case, writing its fixed demand.

use cycle_core::UnitId;
use cycle_graph::{Channel, Graph, Polarity, PortRole};

use crate::error::{ComponentError, ComponentResult};
use crate::params::LoadParams;

pub fn update(graph: &mut Graph, unit: UnitId, params: &LoadParams) -> ComponentResult<()> {
    let polarity = graph
        .unit(unit)
        .expect("unit exists")
        .slot(PortRole::Inlet, Channel::ShaftPrimary)
        .map(|slot| slot.polarity)
        .unwrap_or(Polarity::Undefined);

    match polarity {
        Polarity::Output => graph.set_value_at(unit, PortRole::Inlet, Channel::ShaftPrimary, params.power),
        Polarity::Input => {
            // The generating turbine already wrote this shaft's value; a
            // real load draws it but computes nothing further.
        }
        Polarity::Undefined => {
            return Err(ComponentError::InvalidArg {
                what: "load shaft polarity unresolved",
            })
        }
    }
    Ok(())
}
