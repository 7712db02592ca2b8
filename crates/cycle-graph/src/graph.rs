//! Core graph data structures: typed ports, scalar streams, and the unit arena.
//!
//! A [`Graph`] is a fixed topology of [`Unit`]s joined by [`Stream`]s. Every
//! gas-dynamic unit owns five inlet and five outlet [`PortSlot`]s (one per
//! [`Channel`]); static-outlet units add two more outlet slots; mechanical
//! units add a labour-consumer or labour-generator slot. Building the graph
//! only fixes the *shape* -- which slots exist -- not their polarity, which
//! is resolved afterwards by behaviour inference (see [`crate::indexing`]).

use cycle_core::{StreamId, UnitId};

/// Which side of a unit a port sits on. Fixed at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortRole {
    /// Upstream-facing: this is where a unit receives a quantity from its
    /// predecessor in the gas path.
    Inlet,
    /// Downstream-facing: this is where a unit hands a quantity to its
    /// successor in the gas path.
    Outlet,
}

/// Whether a port reads (`Input`) or writes (`Output`) its stream during an
/// outer iteration. Resolved by behaviour inference; `Undefined` only exists
/// transiently while inference is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Input,
    Output,
    Undefined,
}

/// The scalar quantity a port carries.
///
/// `Temperature`..`FuelFlowFraction` are the five gas-dynamic channels every
/// unit owns on both its inlet and outlet side. `StaticTemperature` and
/// `StaticPressure` exist only on static-outlet units (outlet, nozzle) and
/// their downstream neighbour (atmosphere). `ShaftPrimary`/`ShaftSecondary`
/// exist only on mechanical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Stagnation temperature T*.
    Temperature,
    /// Stagnation pressure p*.
    Pressure,
    /// Excess-air ratio alpha (infinite for pure air).
    Alpha,
    /// Relative mass flow g, as a fraction of compressor-inlet flow.
    FlowFraction,
    /// Cumulative relative fuel flow g_fuel.
    FuelFlowFraction,
    /// Static temperature, outlet/nozzle <-> atmosphere only.
    StaticTemperature,
    /// Static pressure, outlet/nozzle <-> atmosphere only.
    StaticPressure,
    /// Primary shaft draw, mechanical units only.
    ShaftPrimary,
    /// Secondary shaft draw, mechanical units only.
    ShaftSecondary,
}

/// The five channels carried by every gas-dynamic connection, in the order
/// `connect_gas_dynamic` creates their streams.
pub const GAS_DYNAMIC_CHANNELS: [Channel; 5] = [
    Channel::Temperature,
    Channel::Pressure,
    Channel::Alpha,
    Channel::FlowFraction,
    Channel::FuelFlowFraction,
];

/// The two extra channels a static gas-dynamic connection adds.
pub const STATIC_CHANNELS: [Channel; 2] = [Channel::StaticTemperature, Channel::StaticPressure];

/// A single typed port: its role, its resolved polarity, and the stream it
/// has been wired to (`None` until `connect_*` runs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSlot {
    pub role: PortRole,
    pub channel: Channel,
    pub polarity: Polarity,
    pub stream: Option<StreamId>,
}

impl PortSlot {
    fn new(role: PortRole, channel: Channel) -> Self {
        Self {
            role,
            channel,
            polarity: Polarity::Undefined,
            stream: None,
        }
    }
}

/// What kind of thermodynamic component a unit is.
///
/// This tag drives behaviour inference (§4.2), topological ordering (§4.3),
/// and work-fluid assignment; the actual local-update numerics for each kind
/// live in `cycle-components`, one level up, dispatching on this same tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Inlet,
    Compressor,
    Turbine,
    CombustionChamber,
    Source,
    Sink,
    /// `backward_anchor` distinguishes the common case (this unit's
    /// stagnation pressure simply arrives forward from its gas-path
    /// neighbour, like every other channel) from the inverted topology
    /// (§8 scenario 3) where nothing else provides that neighbour's exit
    /// pressure and this unit must instead derive it backward from the
    /// known ambient static pressure and propagate it upstream. Set at
    /// construction time -- see `set_behaviour`'s Outlet/Nozzle arm.
    Outlet { backward_anchor: bool },
    Nozzle { backward_anchor: bool },
    Atmosphere,
    /// A mechanical-only shaft sink. `is_placeholder` marks the P=0 case
    /// (§4.11): a generator's unused second shaft slot, which publishes a
    /// fixed zero draw instead of consuming a real one.
    Load { is_placeholder: bool },
}

impl UnitKind {
    /// Gas-dynamic units own the full five-inlet/five-outlet port bundle.
    /// `Load` is mechanical-only and has no gas-dynamic ports at all.
    pub fn is_gas_dynamic(self) -> bool {
        !matches!(self, UnitKind::Load { .. })
    }

    /// Static-outlet units (outlet, nozzle) own the two extra static channels
    /// on their outlet side, and so does atmosphere on its inlet side (it is
    /// the downstream peer of whichever unit closes the loop).
    pub fn has_static_outlet_ports(self) -> bool {
        matches!(
            self,
            UnitKind::Outlet { .. } | UnitKind::Nozzle { .. } | UnitKind::Atmosphere
        )
    }

    /// Units that consume shaft work through one labour-inlet port.
    pub fn is_mechanical_consumer(self) -> bool {
        matches!(self, UnitKind::Compressor | UnitKind::Load { .. })
    }

    /// Units that generate shaft work through two labour-outlet ports.
    pub fn is_mechanical_generator(self) -> bool {
        matches!(self, UnitKind::Turbine)
    }
}

/// Mechanical port slots a unit owns, depending on its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MechPorts {
    None,
    /// One labour-inlet port (compressor, load).
    Consumer(PortSlot),
    /// Two labour-outlet ports (turbine): primary and secondary shaft draw.
    Generator([PortSlot; 2]),
}

/// A thermodynamic component in the cycle graph.
#[derive(Debug, Clone)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub name: String,
    /// Gas-dynamic inlet slots, keyed by [`GAS_DYNAMIC_CHANNELS`] order. Empty for `Load`.
    pub gas_in: Vec<PortSlot>,
    /// Gas-dynamic outlet slots, keyed by [`GAS_DYNAMIC_CHANNELS`] order. Empty for `Load`.
    pub gas_out: Vec<PortSlot>,
    /// Static outlet slots (`[static_temperature, static_pressure]`), present
    /// on outlet, nozzle, and atmosphere only.
    pub static_out: Option<[PortSlot; 2]>,
    /// Static inlet slots, present on atmosphere only (the peer of whichever
    /// unit's static outlet closes the loop).
    pub static_in: Option<[PortSlot; 2]>,
    pub mech: MechPorts,
}

impl Unit {
    pub(crate) fn new(id: UnitId, kind: UnitKind, name: String) -> Self {
        let (gas_in, gas_out) = if kind.is_gas_dynamic() {
            (
                GAS_DYNAMIC_CHANNELS
                    .iter()
                    .map(|&c| PortSlot::new(PortRole::Inlet, c))
                    .collect(),
                GAS_DYNAMIC_CHANNELS
                    .iter()
                    .map(|&c| PortSlot::new(PortRole::Outlet, c))
                    .collect(),
            )
        } else {
            (Vec::new(), Vec::new())
        };

        let static_out = matches!(kind, UnitKind::Outlet { .. } | UnitKind::Nozzle { .. }).then(|| {
            [
                PortSlot::new(PortRole::Outlet, Channel::StaticTemperature),
                PortSlot::new(PortRole::Outlet, Channel::StaticPressure),
            ]
        });

        let static_in = matches!(kind, UnitKind::Atmosphere).then(|| {
            [
                PortSlot::new(PortRole::Inlet, Channel::StaticTemperature),
                PortSlot::new(PortRole::Inlet, Channel::StaticPressure),
            ]
        });

        let mech = if kind.is_mechanical_consumer() {
            MechPorts::Consumer(PortSlot::new(PortRole::Inlet, Channel::ShaftPrimary))
        } else if kind.is_mechanical_generator() {
            MechPorts::Generator([
                PortSlot::new(PortRole::Outlet, Channel::ShaftPrimary),
                PortSlot::new(PortRole::Outlet, Channel::ShaftSecondary),
            ])
        } else {
            MechPorts::None
        };

        Self {
            id,
            kind,
            name,
            gas_in,
            gas_out,
            static_out,
            static_in,
            mech,
        }
    }

    /// All Undefined-polarity slots owned by this unit, used by behaviour
    /// inference to decide when a full pass has resolved every port.
    pub fn has_undefined_ports(&self) -> bool {
        self.gas_in
            .iter()
            .chain(self.gas_out.iter())
            .any(|p| p.polarity == Polarity::Undefined)
            || self
                .static_out
                .iter()
                .flatten()
                .any(|p| p.polarity == Polarity::Undefined)
            || self
                .static_in
                .iter()
                .flatten()
                .any(|p| p.polarity == Polarity::Undefined)
            || match &self.mech {
                MechPorts::None => false,
                MechPorts::Consumer(p) => p.polarity == Polarity::Undefined,
                MechPorts::Generator(ps) => ps.iter().any(|p| p.polarity == Polarity::Undefined),
            }
    }

    pub fn gas_slot(&self, role: PortRole, channel: Channel) -> &PortSlot {
        let slots = match role {
            PortRole::Inlet => &self.gas_in,
            PortRole::Outlet => &self.gas_out,
        };
        slots
            .iter()
            .find(|p| p.channel == channel)
            .expect("gas-dynamic channel always present on a gas-dynamic unit")
    }

    pub fn gas_slot_mut(&mut self, role: PortRole, channel: Channel) -> &mut PortSlot {
        let slots = match role {
            PortRole::Inlet => &mut self.gas_in,
            PortRole::Outlet => &mut self.gas_out,
        };
        slots
            .iter_mut()
            .find(|p| p.channel == channel)
            .expect("gas-dynamic channel always present on a gas-dynamic unit")
    }

    /// Every slot this unit owns, across the gas-dynamic, static, and
    /// mechanical bundles. Used by behaviour-inference completion checks
    /// and by the solver's `check_input` gate, which must examine a port's
    /// resolved polarity independent of which bundle it lives in.
    pub fn all_slots(&self) -> impl Iterator<Item = &PortSlot> {
        self.gas_in
            .iter()
            .chain(self.gas_out.iter())
            .chain(self.static_out.iter().flatten())
            .chain(self.static_in.iter().flatten())
            .chain(match &self.mech {
                MechPorts::None => [].iter(),
                MechPorts::Consumer(p) => std::slice::from_ref(p).iter(),
                MechPorts::Generator(ps) => ps.iter(),
            })
    }

    /// Find any slot on this unit by (role, channel), across the gas-dynamic,
    /// static, and mechanical bundles. Returns `None` if this unit's kind
    /// doesn't own that particular slot.
    pub fn slot(&self, role: PortRole, channel: Channel) -> Option<&PortSlot> {
        let gas = match role {
            PortRole::Inlet => &self.gas_in,
            PortRole::Outlet => &self.gas_out,
        };
        if let Some(p) = gas.iter().find(|p| p.channel == channel) {
            return Some(p);
        }
        if let Some(arr) = &self.static_out {
            if let Some(p) = arr.iter().find(|p| p.role == role && p.channel == channel) {
                return Some(p);
            }
        }
        if let Some(arr) = &self.static_in {
            if let Some(p) = arr.iter().find(|p| p.role == role && p.channel == channel) {
                return Some(p);
            }
        }
        match &self.mech {
            MechPorts::None => None,
            MechPorts::Consumer(p) if p.role == role && p.channel == channel => Some(p),
            MechPorts::Generator(ps) => ps.iter().find(|p| p.role == role && p.channel == channel),
            _ => None,
        }
    }

    pub fn slot_mut(&mut self, role: PortRole, channel: Channel) -> Option<&mut PortSlot> {
        let gas = match role {
            PortRole::Inlet => &mut self.gas_in,
            PortRole::Outlet => &mut self.gas_out,
        };
        if gas.iter().any(|p| p.channel == channel) {
            return gas.iter_mut().find(|p| p.channel == channel);
        }
        if let Some(arr) = &mut self.static_out {
            if arr.iter().any(|p| p.role == role && p.channel == channel) {
                return arr.iter_mut().find(|p| p.role == role && p.channel == channel);
            }
        }
        if let Some(arr) = &mut self.static_in {
            if arr.iter().any(|p| p.role == role && p.channel == channel) {
                return arr.iter_mut().find(|p| p.role == role && p.channel == channel);
            }
        }
        match &mut self.mech {
            MechPorts::None => None,
            MechPorts::Consumer(p) if p.role == role && p.channel == channel => Some(p),
            MechPorts::Generator(ps) => ps.iter_mut().find(|p| p.role == role && p.channel == channel),
            _ => None,
        }
    }
}

/// A shared scalar between exactly two ports: one upstream (the writer once
/// polarity is resolved), one downstream (the reader).
#[derive(Debug, Clone, Copy)]
pub struct Stream {
    pub id: StreamId,
    pub channel: Channel,
    /// Current value. `None` until the owning output port has written once.
    pub value: Option<f64>,
    /// Value as of the start of the current outer iteration.
    pub previous: Option<f64>,
    pub upstream_unit: UnitId,
    pub upstream_role: PortRole,
    pub downstream_unit: UnitId,
    pub downstream_role: PortRole,
}

impl Stream {
    /// Relative residual between `previous` and `value`, per §4.4:
    /// `|value - previous| / |value|` when both are finite and nonzero; 0
    /// when both sides are identical finite values (or both +inf, used for
    /// alpha on pure air); 1 ("infinite", i.e. unconverged) whenever either
    /// side is missing, exactly one side is non-finite, or exactly one side
    /// is zero.
    pub fn residual(&self) -> f64 {
        match (self.previous, self.value) {
            (Some(p), Some(v)) => {
                if !p.is_finite() && !v.is_finite() {
                    0.0
                } else if !p.is_finite() || !v.is_finite() {
                    1.0
                } else if p == 0.0 && v == 0.0 {
                    0.0
                } else if v == 0.0 {
                    1.0
                } else {
                    ((v - p) / v).abs()
                }
            }
            _ => 1.0,
        }
    }

    /// Apply relaxation to the current value, per the §4.4/§9 guard: skipped
    /// whenever either side is non-finite (so alpha=infinity on pure air, or
    /// a not-yet-written stream, is never blended against a finite value).
    pub fn relax(&mut self, omega: f64) {
        if let (Some(p), Some(v)) = (self.previous, self.value) {
            if p.is_finite() && v.is_finite() {
                self.value = Some(p + omega * (v - p));
            }
        }
    }
}

/// The immutable-shape, mutable-state cycle graph: a unit arena and a stream
/// arena, with ports carrying indices into the latter.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub(crate) units: Vec<Unit>,
    pub(crate) streams: Vec<Stream>,
}

impl Graph {
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut [Unit] {
        &mut self.units
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn streams_mut(&mut self) -> &mut [Stream] {
        &mut self.streams
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.index() as usize)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(id.index() as usize)
    }

    pub fn stream(&self, id: StreamId) -> Option<&Stream> {
        self.streams.get(id.index() as usize)
    }

    pub fn stream_mut(&mut self, id: StreamId) -> Option<&mut Stream> {
        self.streams.get_mut(id.index() as usize)
    }

    /// Value currently held on a unit's gas-dynamic slot, following its
    /// stream link. `None` if unconnected or never written.
    pub fn gas_value(&self, unit: UnitId, role: PortRole, channel: Channel) -> Option<f64> {
        let slot = self.unit(unit)?.gas_slot(role, channel);
        slot.stream.and_then(|sid| self.stream(sid)?.value)
    }

    pub fn set_gas_value(&mut self, unit: UnitId, role: PortRole, channel: Channel, value: f64) {
        let stream_id = self
            .unit(unit)
            .and_then(|u| u.gas_slot(role, channel).stream);
        if let Some(sid) = stream_id {
            if let Some(s) = self.stream_mut(sid) {
                s.value = Some(value);
            }
        }
    }

    /// Like [`Graph::gas_value`] but for any slot a unit owns -- gas-dynamic,
    /// static, or mechanical. `None` if the unit has no such slot, the slot
    /// is unconnected, or the stream has never been written.
    pub fn value_at(&self, unit: UnitId, role: PortRole, channel: Channel) -> Option<f64> {
        let slot = self.unit(unit)?.slot(role, channel)?;
        slot.stream.and_then(|sid| self.stream(sid)?.value)
    }

    /// Like [`Graph::set_gas_value`] but for any slot a unit owns. A no-op if
    /// the unit has no such slot or the slot is unconnected.
    pub fn set_value_at(&mut self, unit: UnitId, role: PortRole, channel: Channel, value: f64) {
        let stream_id = self.unit(unit).and_then(|u| u.slot(role, channel)?.stream);
        if let Some(sid) = stream_id {
            if let Some(s) = self.stream_mut(sid) {
                s.value = Some(value);
            }
        }
    }
}
