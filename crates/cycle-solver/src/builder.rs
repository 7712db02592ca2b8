//! Ties a [`GraphBuilder`] topology to the physical parameters and
//! working-fluid species (§6) each unit needs at solve time.
//!
//! [`GraphBuilder`] only knows shape; [`cycle_components::params`] only
//! knows physical values. Neither knows about the other's unit, so this
//! module keeps a parallel map, keyed by the same [`UnitId`]s `GraphBuilder`
//! hands out, and assembles both into a [`Cycle`] ready to hand to
//! [`crate::solve::solve`].

use std::collections::HashMap;

use cycle_core::UnitId;
use cycle_fluids::WorkFluid;
use cycle_graph::error::GraphResult;
use cycle_graph::{Graph, GraphBuilder, UnitKind};

use cycle_components::params::{
    AtmosphereParams, CombustionChamberParams, CompressorParams, InletParams, LoadParams,
    NozzleParams, OutletParams, SinkParams, SourceParams, TurbineParams,
};

/// The working-fluid species attached to one unit. Most units carry a
/// single species throughout; a combustion chamber or mixing source
/// changes species partway through its own update (§6: ambient air
/// upstream of the first combustor, the chosen combustion-product species
/// downstream of it).
#[derive(Debug, Clone, Copy)]
pub enum UnitFluids {
    Single(WorkFluid),
    Transition { fluid_in: WorkFluid, fluid_out: WorkFluid },
}

impl UnitFluids {
    pub fn single(self) -> WorkFluid {
        match self {
            UnitFluids::Single(f) => f,
            UnitFluids::Transition { fluid_out, .. } => fluid_out,
        }
    }
}

/// Per-unit physical parameters, tagged to match [`UnitKind`] for dispatch
/// in [`crate::solve`].
#[derive(Debug, Clone, Copy)]
pub enum UnitParams {
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

/// A fully assembled topology, ready to solve: the graph itself plus every
/// unit's physical parameters and working-fluid assignment.
pub struct Cycle {
    pub graph: Graph,
    pub params: HashMap<UnitId, UnitParams>,
    pub fluids: HashMap<UnitId, UnitFluids>,
}

/// Builder pairing [`GraphBuilder`]'s topology calls with the physical
/// parameters and fluid species each unit needs.
#[derive(Default)]
pub struct CycleBuilder {
    graph: GraphBuilder,
    params: HashMap<UnitId, UnitParams>,
    fluids: HashMap<UnitId, UnitFluids>,
}

impl CycleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_inlet(&mut self, name: impl Into<String>, fluid: WorkFluid, params: InletParams) -> UnitId {
        let id = self.graph.add_unit(UnitKind::Inlet, name);
        self.fluids.insert(id, UnitFluids::Single(fluid));
        self.params.insert(id, UnitParams::Inlet(params));
        id
    }

    pub fn add_compressor(
        &mut self,
        name: impl Into<String>,
        fluid: WorkFluid,
        params: CompressorParams,
    ) -> UnitId {
        let id = self.graph.add_unit(UnitKind::Compressor, name);
        self.fluids.insert(id, UnitFluids::Single(fluid));
        self.params.insert(id, UnitParams::Compressor(params));
        id
    }

    pub fn add_turbine(
        &mut self,
        name: impl Into<String>,
        fluid: WorkFluid,
        params: TurbineParams,
    ) -> UnitId {
        let id = self.graph.add_unit(UnitKind::Turbine, name);
        self.fluids.insert(id, UnitFluids::Single(fluid));
        self.params.insert(id, UnitParams::Turbine(params));
        id
    }

    pub fn add_combustion_chamber(
        &mut self,
        name: impl Into<String>,
        fluid_in: WorkFluid,
        fluid_out: WorkFluid,
        params: CombustionChamberParams,
    ) -> UnitId {
        let id = self.graph.add_unit(UnitKind::CombustionChamber, name);
        self.fluids.insert(id, UnitFluids::Transition { fluid_in, fluid_out });
        self.params.insert(id, UnitParams::CombustionChamber(params));
        id
    }

    pub fn add_source(
        &mut self,
        name: impl Into<String>,
        fluid: WorkFluid,
        return_fluid: WorkFluid,
        params: SourceParams,
    ) -> UnitId {
        let id = self.graph.add_unit(UnitKind::Source, name);
        self.fluids.insert(
            id,
            UnitFluids::Transition {
                fluid_in: fluid,
                fluid_out: return_fluid,
            },
        );
        self.params.insert(id, UnitParams::Source(params));
        id
    }

    pub fn add_sink(&mut self, name: impl Into<String>, fluid: WorkFluid, params: SinkParams) -> UnitId {
        let id = self.graph.add_unit(UnitKind::Sink, name);
        self.fluids.insert(id, UnitFluids::Single(fluid));
        self.params.insert(id, UnitParams::Sink(params));
        id
    }

    pub fn add_outlet(
        &mut self,
        name: impl Into<String>,
        backward_anchor: bool,
        fluid: WorkFluid,
        params: OutletParams,
    ) -> UnitId {
        let id = self.graph.add_unit(UnitKind::Outlet { backward_anchor }, name);
        self.fluids.insert(id, UnitFluids::Single(fluid));
        self.params.insert(id, UnitParams::Outlet(params));
        id
    }

    pub fn add_nozzle(
        &mut self,
        name: impl Into<String>,
        backward_anchor: bool,
        fluid: WorkFluid,
        params: NozzleParams,
    ) -> UnitId {
        let id = self.graph.add_unit(UnitKind::Nozzle { backward_anchor }, name);
        self.fluids.insert(id, UnitFluids::Single(fluid));
        self.params.insert(id, UnitParams::Nozzle(params));
        id
    }

    pub fn add_atmosphere(&mut self, name: impl Into<String>, params: AtmosphereParams) -> UnitId {
        let id = self.graph.add_unit(UnitKind::Atmosphere, name);
        self.fluids.insert(id, UnitFluids::Single(WorkFluid::AmbientAir));
        self.params.insert(id, UnitParams::Atmosphere(params));
        id
    }

    pub fn add_load(&mut self, name: impl Into<String>, is_placeholder: bool, params: LoadParams) -> UnitId {
        let id = self.graph.add_unit(UnitKind::Load { is_placeholder }, name);
        self.params.insert(id, UnitParams::Load(params));
        id
    }

    pub fn connect_gas_dynamic(&mut self, upstream: UnitId, downstream: UnitId) -> GraphResult<()> {
        self.graph.connect_gas_dynamic(upstream, downstream)?;
        Ok(())
    }

    pub fn connect_static_gas_dynamic(&mut self, upstream: UnitId, downstream: UnitId) -> GraphResult<()> {
        self.graph.connect_static_gas_dynamic(upstream, downstream)?;
        Ok(())
    }

    pub fn connect_mechanical(
        &mut self,
        generator: UnitId,
        consumer1: UnitId,
        consumer2: UnitId,
    ) -> GraphResult<()> {
        self.graph.connect_mechanical(generator, consumer1, consumer2)?;
        Ok(())
    }

    pub fn build(self) -> GraphResult<Cycle> {
        let graph = self.graph.build()?;
        Ok(Cycle {
            graph,
            params: self.params,
            fluids: self.fluids,
        })
    }
}
