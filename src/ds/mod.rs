pub mod linked_slots;
pub mod slot_arena;

pub use linked_slots::{Chain, ChainIter, LinkedSlots};
pub use slot_arena::{SlotArena, SlotId};
