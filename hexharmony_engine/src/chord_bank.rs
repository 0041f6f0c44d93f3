// Chord slots: which cells are sounding, per slot.
//
// The keyboard keeps up to `slot_count` independent chords (slots `1..=N`).
// Exactly one slot is current; activation changes always write to it, and
// "is this cell sounding" is always asked relative to it. Switching slots
// therefore swaps the whole sounding set without touching the others.
//
// State is an explicit map `cell → set of slots`. Cells with no slots are
// removed, so `active` never holds empty sets.
//
// See also: `engine.rs` which owns the bank alongside the lattice,
// `heatmap.rs` which reads `is_active_now`.

use crate::lattice::AxialCoord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 1-based chord slot number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(pub u8);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordBank {
    slot_count: u8,
    current: SlotId,
    active: BTreeMap<AxialCoord, BTreeSet<SlotId>>,
}

impl ChordBank {
    pub fn new(slot_count: u8) -> Self {
        Self {
            slot_count: slot_count.max(1),
            current: SlotId(1),
            active: BTreeMap::new(),
        }
    }

    pub fn slot_count(&self) -> u8 {
        self.slot_count
    }

    pub fn current_slot(&self) -> SlotId {
        self.current
    }

    pub fn is_valid_slot(&self, slot: SlotId) -> bool {
        (1..=self.slot_count).contains(&slot.0)
    }

    pub fn is_active(&self, coord: AxialCoord, slot: SlotId) -> bool {
        self.active.get(&coord).is_some_and(|slots| slots.contains(&slot))
    }

    /// Active in the current slot.
    pub fn is_active_now(&self, coord: AxialCoord) -> bool {
        self.is_active(coord, self.current)
    }

    /// Set a cell's state in the current slot. Returns whether it changed.
    pub fn set_active(&mut self, coord: AxialCoord, active: bool) -> bool {
        let slot = self.current;
        if active {
            self.active.entry(coord).or_default().insert(slot)
        } else {
            let Some(slots) = self.active.get_mut(&coord) else {
                return false;
            };
            let removed = slots.remove(&slot);
            if slots.is_empty() {
                self.active.remove(&coord);
            }
            removed
        }
    }

    /// Flip a cell in the current slot. Returns the new state.
    pub fn toggle(&mut self, coord: AxialCoord) -> bool {
        let now = !self.is_active_now(coord);
        self.set_active(coord, now);
        now
    }

    /// Switch the current slot. Returns `false` when the slot is out of
    /// range or already current.
    pub fn set_slot(&mut self, slot: SlotId) -> bool {
        if !self.is_valid_slot(slot) || slot == self.current {
            return false;
        }
        self.current = slot;
        true
    }

    /// Deactivate every cell in the current slot. Returns how many were on.
    pub fn clear_current_slot(&mut self) -> usize {
        let slot = self.current;
        let mut cleared = 0;
        self.active.retain(|_, slots| {
            if slots.remove(&slot) {
                cleared += 1;
            }
            !slots.is_empty()
        });
        cleared
    }

    /// Deactivate everything in every slot.
    pub fn clear_all(&mut self) -> usize {
        let cleared = self.active.len();
        self.active.clear();
        cleared
    }

    /// Cells active in `slot`, in coordinate order.
    pub fn active_in(&self, slot: SlotId) -> impl Iterator<Item = AxialCoord> + '_ {
        self.active
            .iter()
            .filter(move |(_, slots)| slots.contains(&slot))
            .map(|(&coord, _)| coord)
    }

    /// Cells active in the current slot.
    pub fn active_now(&self) -> impl Iterator<Item = AxialCoord> + '_ {
        self.active_in(self.current)
    }

    /// Keep only cells matching `keep`, in every slot.
    pub fn retain(&mut self, mut keep: impl FnMut(AxialCoord) -> bool) {
        self.active.retain(|&coord, _| keep(coord));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: AxialCoord = AxialCoord::new(0, 0);
    const B: AxialCoord = AxialCoord::new(3, 1);
    const C: AxialCoord = AxialCoord::new(-2, 5);

    #[test]
    fn slots_are_independent() {
        let mut bank = ChordBank::new(10);
        assert_eq!(bank.current_slot(), SlotId(1));
        assert!(bank.set_active(A, true));
        assert!(bank.set_slot(SlotId(2)));
        assert!(!bank.is_active_now(A));
        assert!(bank.toggle(B));
        assert!(bank.is_active(A, SlotId(1)));
        assert!(bank.is_active(B, SlotId(2)));
        assert!(!bank.is_active(B, SlotId(1)));

        assert!(bank.set_slot(SlotId(1)));
        assert_eq!(bank.active_now().collect::<Vec<_>>(), vec![A]);
    }

    #[test]
    fn set_slot_rejects_out_of_range_and_unchanged() {
        let mut bank = ChordBank::new(10);
        assert!(!bank.set_slot(SlotId(0)));
        assert!(!bank.set_slot(SlotId(11)));
        assert!(!bank.set_slot(SlotId(1)));
        assert!(bank.set_slot(SlotId(10)));
        assert_eq!(bank.current_slot(), SlotId(10));
    }

    #[test]
    fn set_active_reports_changes() {
        let mut bank = ChordBank::new(4);
        assert!(bank.set_active(A, true));
        assert!(!bank.set_active(A, true));
        assert!(bank.set_active(A, false));
        assert!(!bank.set_active(A, false));
        assert!(bank.toggle(C));
        assert!(!bank.toggle(C));
        assert_eq!(bank.active_now().count(), 0);
    }

    #[test]
    fn clearing() {
        let mut bank = ChordBank::new(3);
        bank.set_active(A, true);
        bank.set_active(B, true);
        bank.set_slot(SlotId(2));
        bank.set_active(A, true);
        bank.set_active(C, true);

        assert_eq!(bank.clear_current_slot(), 2);
        assert_eq!(bank.active_now().count(), 0);
        assert_eq!(bank.active_in(SlotId(1)).collect::<Vec<_>>(), vec![A, B]);

        assert_eq!(bank.clear_all(), 2);
        assert_eq!(bank.active_in(SlotId(1)).count(), 0);
    }

    #[test]
    fn retain_prunes_every_slot() {
        let mut bank = ChordBank::new(2);
        bank.set_active(A, true);
        bank.set_active(C, true);
        bank.set_slot(SlotId(2));
        bank.set_active(C, true);
        bank.retain(|c| c.distance(AxialCoord::ORIGIN) <= 2);
        assert!(bank.is_active(A, SlotId(1)));
        assert!(!bank.is_active(C, SlotId(1)));
        assert!(!bank.is_active(C, SlotId(2)));
    }
}
