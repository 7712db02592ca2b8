//! Incremental graph builder: register units, then wire them together.

use cycle_core::{StreamId, UnitId};

use crate::error::{GraphError, GraphResult};
use crate::graph::{
    Graph, MechPorts, PortRole, Stream, Unit, UnitKind, GAS_DYNAMIC_CHANNELS, STATIC_CHANNELS,
};

/// Builder for constructing a [`Graph`] incrementally: register every unit
/// first, then connect them with `connect_gas_dynamic`,
/// `connect_static_gas_dynamic`, or `connect_mechanical`.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    units: Vec<Unit>,
    streams: Vec<Stream>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit of the given kind and return its ID. Its ports are
    /// created with the shape `kind` implies (§3) but no stream links yet.
    pub fn add_unit(&mut self, kind: UnitKind, name: impl Into<String>) -> UnitId {
        let id = UnitId::from_index(self.units.len() as u32);
        self.units.push(Unit::new(id, kind, name.into()));
        id
    }

    fn require_unit(&self, id: UnitId) -> GraphResult<()> {
        if (id.index() as usize) < self.units.len() {
            Ok(())
        } else {
            Err(GraphError::TopologyError(id))
        }
    }

    fn push_stream(
        &mut self,
        channel: crate::graph::Channel,
        upstream: UnitId,
        upstream_role: PortRole,
        downstream: UnitId,
        downstream_role: PortRole,
    ) -> StreamId {
        let id = StreamId::from_index(self.streams.len() as u32);
        self.streams.push(Stream {
            id,
            channel,
            value: None,
            previous: None,
            upstream_unit: upstream,
            upstream_role,
            downstream_unit: downstream,
            downstream_role,
        });
        id
    }

    /// Create the five gas-dynamic streams (T*, p*, alpha, g, g_fuel) between
    /// `upstream`'s outlet ports and `downstream`'s inlet ports.
    pub fn connect_gas_dynamic(
        &mut self,
        upstream: UnitId,
        downstream: UnitId,
    ) -> GraphResult<[StreamId; 5]> {
        self.require_unit(upstream)?;
        self.require_unit(downstream)?;

        let mut ids = [StreamId::from_index(0); 5];
        for (i, &channel) in GAS_DYNAMIC_CHANNELS.iter().enumerate() {
            let sid = self.push_stream(
                channel,
                upstream,
                PortRole::Outlet,
                downstream,
                PortRole::Inlet,
            );
            ids[i] = sid;
            self.units[upstream.index() as usize]
                .gas_slot_mut(PortRole::Outlet, channel)
                .stream = Some(sid);
            self.units[downstream.index() as usize]
                .gas_slot_mut(PortRole::Inlet, channel)
                .stream = Some(sid);
        }
        Ok(ids)
    }

    /// As [`Self::connect_gas_dynamic`], plus two static streams (static T,
    /// static p) between `upstream`'s static-outlet ports and
    /// `downstream`'s static-inlet ports. Used for the outlet/nozzle ->
    /// atmosphere edge that closes the cycle.
    pub fn connect_static_gas_dynamic(
        &mut self,
        upstream: UnitId,
        downstream: UnitId,
    ) -> GraphResult<([StreamId; 5], [StreamId; 2])> {
        let regular = self.connect_gas_dynamic(upstream, downstream)?;

        let mut static_ids = [StreamId::from_index(0); 2];
        for (i, &channel) in STATIC_CHANNELS.iter().enumerate() {
            let sid = self.push_stream(
                channel,
                upstream,
                PortRole::Outlet,
                downstream,
                PortRole::Inlet,
            );
            static_ids[i] = sid;

            let up = &mut self.units[upstream.index() as usize];
            let slot = up
                .static_out
                .as_mut()
                .unwrap_or_else(|| panic!("{:?} has no static-outlet ports", up.kind))
                .iter_mut()
                .find(|p| p.channel == channel)
                .expect("static channel present");
            slot.stream = Some(sid);

            let down = &mut self.units[downstream.index() as usize];
            let slot = down
                .static_in
                .as_mut()
                .unwrap_or_else(|| panic!("{:?} has no static-inlet ports", down.kind))
                .iter_mut()
                .find(|p| p.channel == channel)
                .expect("static channel present");
            slot.stream = Some(sid);
        }
        Ok((regular, static_ids))
    }

    /// Create the two mechanical streams (primary, secondary shaft draw)
    /// between `generator`'s two labour-outlet ports and up to two
    /// consumers' labour-inlet ports. Pass the same consumer twice if only
    /// one real consumer exists; the unused slot still needs an initial
    /// guess of zero draw from the solver.
    pub fn connect_mechanical(
        &mut self,
        generator: UnitId,
        consumer1: UnitId,
        consumer2: UnitId,
    ) -> GraphResult<[StreamId; 2]> {
        self.require_unit(generator)?;
        self.require_unit(consumer1)?;
        self.require_unit(consumer2)?;

        use crate::graph::Channel::{ShaftPrimary, ShaftSecondary};
        let channels = [ShaftPrimary, ShaftSecondary];
        let consumers = [consumer1, consumer2];
        let mut ids = [StreamId::from_index(0); 2];

        for (i, (&channel, &consumer)) in channels.iter().zip(consumers.iter()).enumerate() {
            let sid = self.push_stream(channel, generator, PortRole::Outlet, consumer, PortRole::Inlet);
            ids[i] = sid;

            let gen_unit = &mut self.units[generator.index() as usize];
            match &mut gen_unit.mech {
                MechPorts::Generator(slots) => slots[i].stream = Some(sid),
                other => panic!("{:?} is not a mechanical generator: {other:?}", gen_unit.kind),
            }

            let cons_unit = &mut self.units[consumer.index() as usize];
            match &mut cons_unit.mech {
                MechPorts::Consumer(slot) => slot.stream = Some(sid),
                other => panic!("{:?} is not a mechanical consumer: {other:?}", cons_unit.kind),
            }
        }
        Ok(ids)
    }

    /// Freeze the builder into an immutable-shape [`Graph`].
    pub fn build(self) -> GraphResult<Graph> {
        let atmospheres = self
            .units
            .iter()
            .filter(|u| u.kind == UnitKind::Atmosphere)
            .count();
        if atmospheres != 1 {
            return Err(GraphError::AtmosphereCount { found: atmospheres });
        }
        Ok(Graph {
            units: self.units,
            streams: self.streams,
        })
    }
}
