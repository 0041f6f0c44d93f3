// Engine output events and the listener registry.
//
// Every `HarmonicEngine::apply` returns a `StepResult` listing what changed,
// in the order the recompute chain ran it:
//   TuningChanged → LatticeRegenerated → LutRebuilt → SlotChanged /
//   CellToggled → RecomputeCompleted.
// A command that changed nothing produces no events.
//
// Components that prefer push over polling register a callback. Callbacks
// run after the chain has finished, in subscription order, once per event,
// so a listener always observes a fully consistent engine.
//
// See also: `engine.rs` (the emitter), `command.rs` (the inputs).

use crate::chord_bank::SlotId;
use crate::lattice::AxialCoord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Something observable that a command caused.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Derived cell data now follows a different tuning.
    TuningChanged { edo: u32, name: String },
    /// The lattice was regenerated at a new radius.
    LatticeRegenerated { radius: u32, cells: usize },
    /// The harmonic table was rebuilt.
    LutRebuilt {
        edo: u32,
        complexity_weight: f64,
        bandwidth_scale: f64,
        entries: usize,
    },
    /// The current chord slot changed.
    SlotChanged { slot: SlotId },
    /// A cell was switched on or off in the current slot.
    CellToggled { coord: AxialCoord, active: bool },
    /// Cached visuals are up to date.
    RecomputeCompleted { active: usize, labelled: usize },
}

/// Events produced by one command.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub events: Vec<EngineEvent>,
}

impl StepResult {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn recomputed(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, EngineEvent::RecomputeCompleted { .. }))
    }

    pub fn lut_rebuilt(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, EngineEvent::LutRebuilt { .. }))
    }
}

/// Handle returned by `subscribe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

type Listener = Box<dyn FnMut(&EngineEvent) + Send>;

/// Ordered set of event callbacks.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl ListenerRegistry {
    pub fn subscribe(&mut self, callback: impl FnMut(&EngineEvent) + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Returns whether the listener was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver each event to every listener, events outermost.
    pub fn dispatch(&mut self, events: &[EngineEvent]) {
        for event in events {
            for (_, listener) in &mut self.listeners {
                listener(event);
            }
        }
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("next_id", &self.next_id)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
