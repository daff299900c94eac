//! Slot-level events broadcast by the [`SlotOrchestrator`](crate::SlotOrchestrator).

use banana_core::Slot;

#[derive(Debug, Clone, PartialEq)]
pub enum SlotEvent {
    /// A slot changed. `slot` is its new state.
    Updated { index: usize, slot: Slot },

    /// The last in-flight slot of the current run reached a terminal state.
    Settled,
}
