//! Fixed set of parking spaces guarded by one lock.

use parking_lot::Mutex;
use std::sync::Arc;

use super::observer::{LotObserver, NoopObserver};
use super::SlotId;

pub struct SpacePool {
    slots: Mutex<Vec<bool>>,
    observer: Arc<dyn LotObserver>,
}

impl SpacePool {
    pub fn new(capacity: usize) -> Self {
        Self::with_observer(capacity, Arc::new(NoopObserver))
    }

    pub fn with_observer(capacity: usize, observer: Arc<dyn LotObserver>) -> Self {
        Self {
            slots: Mutex::new(vec![false; capacity]),
            observer,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn has_free_slot(&self) -> bool {
        self.slots.lock().iter().any(|occupied| !occupied)
    }

    /// Lowest free index, if any.
    pub fn find_free_slot(&self) -> Option<SlotId> {
        self.slots.lock().iter().position(|occupied| !occupied)
    }

    /// Finds and occupies the lowest free index under a single lock hold.
    pub fn claim_free_slot(&self) -> Option<SlotId> {
        let slot = {
            let mut slots = self.slots.lock();
            let slot = slots.iter().position(|occupied| !occupied)?;
            slots[slot] = true;
            slot
        };
        self.observer.slot_changed(slot, true);
        Some(slot)
    }

    /// # Panics
    /// Panics if `slot` is out of range or already occupied.
    pub fn occupy(&self, slot: SlotId) {
        self.set(slot, true);
    }

    /// # Panics
    /// Panics if `slot` is out of range or already free.
    pub fn release(&self, slot: SlotId) {
        self.set(slot, false);
    }

    pub fn is_occupied(&self, slot: SlotId) -> bool {
        self.slots.lock().get(slot).copied().unwrap_or(false)
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.lock().iter().filter(|occupied| **occupied).count()
    }

    pub fn snapshot(&self) -> Vec<bool> {
        self.slots.lock().clone()
    }

    fn set(&self, slot: SlotId, occupied: bool) {
        {
            let mut slots = self.slots.lock();
            let capacity = slots.len();
            let current = slots
                .get_mut(slot)
                .unwrap_or_else(|| panic!("slot {slot} out of range (capacity {capacity})"));
            if *current == occupied {
                let state = if occupied { "occupied" } else { "free" };
                panic!("slot {slot} is already {state}");
            }
            *current = occupied;
        }
        self.observer.slot_changed(slot, occupied);
    }
}

impl std::fmt::Debug for SpacePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpacePool")
            .field("slots", &*self.slots.lock())
            .finish()
    }
}
