use types::ProcessSlot;

use crate::config::Config;
use crate::task::Pcb;

/// Fixed arena of process control blocks, indexed by slot.
pub struct ProcessTable {
    slots: [Pcb; Config::MAX_PROCESSES],
    capacity: usize,
}

impl ProcessTable {
    /// A table that hands out at most `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: core::array::from_fn(|i| Pcb::vacant(ProcessSlot::new(i))),
            capacity: capacity.min(Config::MAX_PROCESSES),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lowest slot not holding a live process.
    pub fn free_slot(&self) -> Option<ProcessSlot> {
        self.slots[..self.capacity]
            .iter()
            .find(|pcb| !pcb.live)
            .map(|pcb| pcb.slot)
    }

    pub fn get(&self, slot: ProcessSlot) -> &Pcb {
        &self.slots[slot.index()]
    }

    pub fn get_mut(&mut self, slot: ProcessSlot) -> &mut Pcb {
        &mut self.slots[slot.index()]
    }

    /// The PCB at `slot` if it is in range and live.
    pub fn live(&self, slot: ProcessSlot) -> Option<&Pcb> {
        self.slots.get(slot.index()).filter(|pcb| pcb.live)
    }

    pub fn iter_live(&self) -> impl Iterator<Item = &Pcb> {
        self.slots.iter().filter(|pcb| pcb.live)
    }

    pub fn iter_live_mut(&mut self) -> impl Iterator<Item = &mut Pcb> {
        self.slots.iter_mut().filter(|pcb| pcb.live)
    }

    pub fn live_count(&self) -> usize {
        self.iter_live().count()
    }
}
