//! Sentinel-bounded doubly linked chains stored in one `SlotArena`.
//!
//! Every node, including the two sentinels that bound each chain, is an arena
//! slot linked to its neighbours by [`SlotId`]. Because a chain always has a
//! head and a tail sentinel, splicing never has to special-case an empty list
//! or a missing neighbour.
//!
//! Several chains may share one arena, which is how the LFU engine keeps one
//! chain per frequency bucket while moving nodes between them without
//! reallocating.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<Link<T>>)
//!   ┌────────┬──────────────────────────────────────────┐
//!   │ SlotId │ Link { prev, next, item }                │
//!   ├────────┼──────────────────────────────────────────┤
//!   │ id_0   │ head sentinel { prev: id_0, next: id_2 } │
//!   │ id_1   │ tail sentinel { prev: id_3, next: id_1 } │
//!   │ id_2   │ { prev: id_0, next: id_3, item: A }      │
//!   │ id_3   │ { prev: id_2, next: id_1, item: B }      │
//!   └────────┴──────────────────────────────────────────┘
//!
//!   [head] ◄──► [A] ◄──► [B] ◄──► [tail]
//!    front (oldest)        back (newest)
//! ```
//!
//! A detached node links to itself in both directions.
//!
//! ## Operations
//! - `push_back(chain, item)`: allocate + link before the tail sentinel
//! - `unlink(chain, id)` / `link_back(chain, id)`: O(1) splice, slot kept
//! - `remove(chain, id)`: unlink + free slot
//! - `front(chain)`: node after the head sentinel

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::{InvariantError, ensure_invariant};

#[derive(Debug)]
struct Link<T> {
    prev: SlotId,
    next: SlotId,
    // `None` marks a sentinel.
    item: Option<T>,
}

/// Handle to one chain: its two sentinels plus the number of items between
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chain {
    head: SlotId,
    tail: SlotId,
    len: usize,
}

impl Chain {
    /// Number of items (sentinels excluded).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Arena of linked items that can host any number of [`Chain`]s.
#[derive(Debug)]
pub struct LinkedSlots<T> {
    arena: SlotArena<Link<T>>,
    items: usize,
}

impl<T> LinkedSlots<T> {
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            items: 0,
        }
    }

    /// Reserves room for `capacity` slots (items and sentinels together).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            items: 0,
        }
    }

    /// Number of items across all chains.
    pub fn len(&self) -> usize {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    /// Allocates a new empty chain (two sentinel slots).
    pub fn open_chain(&mut self) -> Chain {
        let placeholder = SlotId(usize::MAX);
        let head = self.arena.insert(Link {
            prev: placeholder,
            next: placeholder,
            item: None,
        });
        let tail = self.arena.insert(Link {
            prev: head,
            next: placeholder,
            item: None,
        });
        if let Some(link) = self.arena.get_mut(head) {
            link.prev = head;
            link.next = tail;
        }
        if let Some(link) = self.arena.get_mut(tail) {
            link.next = tail;
        }
        Chain { head, tail, len: 0 }
    }

    /// Frees the sentinels of an empty chain.
    ///
    /// Returns `false` and leaves the chain untouched if it still has items.
    pub fn close_chain(&mut self, chain: Chain) -> bool {
        if !chain.is_empty() {
            return false;
        }
        self.arena.remove(chain.head);
        self.arena.remove(chain.tail);
        true
    }

    /// Appends `item` at the back of `chain` and returns its slot.
    pub fn push_back(&mut self, chain: &mut Chain, item: T) -> SlotId {
        let id = self.arena.insert(Link {
            prev: SlotId(usize::MAX),
            next: SlotId(usize::MAX),
            item: Some(item),
        });
        if let Some(link) = self.arena.get_mut(id) {
            link.prev = id;
            link.next = id;
        }
        self.items += 1;
        self.link_back(chain, id);
        id
    }

    /// Detaches `id` from `chain` without freeing its slot.
    ///
    /// Returns `false` if `id` is not a linked item.
    pub fn unlink(&mut self, chain: &mut Chain, id: SlotId) -> bool {
        self.try_unlink(chain, id).is_some()
    }

    /// Links a detached item `id` at the back of `chain`.
    ///
    /// Returns `false` if `id` is not a detached item.
    pub fn link_back(&mut self, chain: &mut Chain, id: SlotId) -> bool {
        self.try_link_back(chain, id).is_some()
    }

    /// Unlinks `id` from `chain`, frees its slot and returns the item.
    pub fn remove(&mut self, chain: &mut Chain, id: SlotId) -> Option<T> {
        self.try_unlink(chain, id)?;
        let link = self.arena.remove(id)?;
        self.items -= 1;
        link.item
    }

    /// First item after the head sentinel.
    pub fn front(&self, chain: &Chain) -> Option<SlotId> {
        let next = self.arena.get(chain.head)?.next;
        (next != chain.tail).then_some(next)
    }

    /// Last item before the tail sentinel.
    pub fn back(&self, chain: &Chain) -> Option<SlotId> {
        let prev = self.arena.get(chain.tail)?.prev;
        (prev != chain.head).then_some(prev)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id)?.item.as_ref()
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.arena.get_mut(id)?.item.as_mut()
    }

    /// Iterates `(SlotId, &T)` from front to back.
    pub fn iter<'a>(&'a self, chain: &Chain) -> ChainIter<'a, T> {
        ChainIter {
            slots: self,
            current: self.arena.get(chain.head).map(|link| link.next),
            tail: chain.tail,
            remaining: chain.len,
        }
    }

    /// Drops every item and every chain. Existing [`Chain`] handles become
    /// dangling and must not be reused.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.items = 0;
    }

    /// Walks `chain` checking link symmetry and its recorded length.
    pub fn check_chain(&self, chain: &Chain) -> Result<(), InvariantError> {
        let head = self
            .arena
            .get(chain.head)
            .ok_or_else(|| InvariantError::new("chain head sentinel missing"))?;
        ensure_invariant!(head.item.is_none(), "chain head is not a sentinel");

        let mut prev = chain.head;
        let mut current = head.next;
        let mut count = 0usize;
        while current != chain.tail {
            let link = self
                .arena
                .get(current)
                .ok_or_else(|| InvariantError::new(format!("slot {} missing", current.0)))?;
            ensure_invariant!(link.item.is_some(), "sentinel {} inside chain", current.0);
            ensure_invariant!(
                link.prev == prev,
                "slot {} prev is {} but expected {}",
                current.0,
                link.prev.0,
                prev.0
            );
            count += 1;
            ensure_invariant!(count <= self.items, "cycle detected in chain");
            prev = current;
            current = link.next;
        }

        let tail = self
            .arena
            .get(chain.tail)
            .ok_or_else(|| InvariantError::new("chain tail sentinel missing"))?;
        ensure_invariant!(tail.item.is_none(), "chain tail is not a sentinel");
        ensure_invariant!(tail.prev == prev, "tail sentinel prev link is stale");
        ensure_invariant!(
            count == chain.len,
            "chain holds {} items but records {}",
            count,
            chain.len
        );
        Ok(())
    }

    fn try_unlink(&mut self, chain: &mut Chain, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let link = self.arena.get(id)?;
            link.item.as_ref()?;
            if link.prev == id {
                return None;
            }
            (link.prev, link.next)
        };
        self.arena.get_mut(prev)?.next = next;
        self.arena.get_mut(next)?.prev = prev;
        let link = self.arena.get_mut(id)?;
        link.prev = id;
        link.next = id;
        chain.len -= 1;
        Some(())
    }

    fn try_link_back(&mut self, chain: &mut Chain, id: SlotId) -> Option<()> {
        let last = self.arena.get(chain.tail)?.prev;
        {
            let link = self.arena.get_mut(id)?;
            link.item.as_ref()?;
            if link.prev != id {
                return None;
            }
            link.prev = last;
            link.next = chain.tail;
        }
        self.arena.get_mut(last)?.next = id;
        self.arena.get_mut(chain.tail)?.prev = id;
        chain.len += 1;
        Some(())
    }
}

impl<T> Default for LinkedSlots<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Front-to-back iterator over one chain.
pub struct ChainIter<'a, T> {
    slots: &'a LinkedSlots<T>,
    current: Option<SlotId>,
    tail: SlotId,
    remaining: usize,
}

impl<'a, T> Iterator for ChainIter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        if id == self.tail || self.remaining == 0 {
            self.current = None;
            return None;
        }
        let link = self.slots.arena.get(id)?;
        self.current = Some(link.next);
        self.remaining -= 1;
        link.item.as_ref().map(|item| (id, item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items<T: Copy>(slots: &LinkedSlots<T>, chain: &Chain) -> Vec<T> {
        slots.iter(chain).map(|(_, item)| *item).collect()
    }

    #[test]
    fn empty_chain_has_no_front_or_back() {
        let mut slots: LinkedSlots<u32> = LinkedSlots::new();
        let chain = slots.open_chain();
        assert!(chain.is_empty());
        assert_eq!(slots.front(&chain), None);
        assert_eq!(slots.back(&chain), None);
        assert_eq!(slots.iter(&chain).count(), 0);
        slots.check_chain(&chain).unwrap();
    }

    #[test]
    fn push_back_keeps_insertion_order() {
        let mut slots = LinkedSlots::new();
        let mut chain = slots.open_chain();
        let a = slots.push_back(&mut chain, 'a');
        slots.push_back(&mut chain, 'b');
        let c = slots.push_back(&mut chain, 'c');

        assert_eq!(items(&slots, &chain), vec!['a', 'b', 'c']);
        assert_eq!(slots.front(&chain), Some(a));
        assert_eq!(slots.back(&chain), Some(c));
        assert_eq!(chain.len(), 3);
        assert_eq!(slots.len(), 3);
        slots.check_chain(&chain).unwrap();
    }

    #[test]
    fn unlink_then_link_back_moves_to_back() {
        let mut slots = LinkedSlots::new();
        let mut chain = slots.open_chain();
        let a = slots.push_back(&mut chain, 1);
        slots.push_back(&mut chain, 2);
        slots.push_back(&mut chain, 3);

        assert!(slots.unlink(&mut chain, a));
        assert_eq!(chain.len(), 2);
        assert!(!slots.unlink(&mut chain, a), "already detached");
        assert!(slots.link_back(&mut chain, a));
        assert!(!slots.link_back(&mut chain, a), "already linked");

        assert_eq!(items(&slots, &chain), vec![2, 3, 1]);
        slots.check_chain(&chain).unwrap();
    }

    #[test]
    fn move_between_chains_sharing_an_arena() {
        let mut slots = LinkedSlots::new();
        let mut low = slots.open_chain();
        let mut high = slots.open_chain();
        let a = slots.push_back(&mut low, "a");
        slots.push_back(&mut low, "b");

        slots.unlink(&mut low, a);
        slots.link_back(&mut high, a);

        assert_eq!(items(&slots, &low), vec!["b"]);
        assert_eq!(items(&slots, &high), vec!["a"]);
        slots.check_chain(&low).unwrap();
        slots.check_chain(&high).unwrap();
    }

    #[test]
    fn remove_frees_slot_and_returns_item() {
        let mut slots = LinkedSlots::new();
        let mut chain = slots.open_chain();
        let a = slots.push_back(&mut chain, 10);
        let b = slots.push_back(&mut chain, 20);

        assert_eq!(slots.remove(&mut chain, a), Some(10));
        assert_eq!(slots.remove(&mut chain, a), None);
        assert_eq!(slots.get(a), None);
        assert_eq!(slots.front(&chain), Some(b));
        assert_eq!(slots.len(), 1);
        slots.check_chain(&chain).unwrap();
    }

    #[test]
    fn sentinels_are_not_items() {
        let mut slots: LinkedSlots<u8> = LinkedSlots::new();
        let mut chain = slots.open_chain();
        let (head, tail) = (chain.head, chain.tail);
        assert_eq!(slots.get(head), None);
        assert!(!slots.unlink(&mut chain, head));
        assert_eq!(slots.remove(&mut chain, tail), None);
        slots.check_chain(&chain).unwrap();
    }

    #[test]
    fn close_chain_requires_empty() {
        let mut slots = LinkedSlots::new();
        let mut chain = slots.open_chain();
        let id = slots.push_back(&mut chain, 5u8);
        assert!(!slots.close_chain(chain));

        slots.remove(&mut chain, id);
        assert!(slots.close_chain(chain));
        assert_eq!(slots.get(chain.head), None);
    }

    #[test]
    fn check_chain_detects_bad_length() {
        let mut slots = LinkedSlots::new();
        let mut chain = slots.open_chain();
        slots.push_back(&mut chain, 1u8);
        chain.len = 2;
        let err = slots.check_chain(&chain).unwrap_err();
        assert!(err.message().contains("records 2"));
    }
}
