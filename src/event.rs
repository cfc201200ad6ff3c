//! Event trace model.
//!
//! Every `get`/`put` returns a [`Trace`]: the ordered list of [`Event`]s the
//! call produced. Traces are plain data. They carry no behaviour, cannot be
//! modified once returned, and can be rendered, logged, serialized or
//! asserted on independently of the engine that produced them.
//!
//! ## Ordering within one call
//!
//! ```text
//!   get  (absent)          Miss
//!   get  (present)         Hit ─► Promote
//!   put  (present)         Update ─► Promote
//!   put  (absent, room)    Insert
//!   put  (absent, full)    Evict ─► Insert
//! ```

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Discriminant of an [`Event`], handy for asserting on trace shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventKind {
    Miss,
    Hit,
    Insert,
    Update,
    Promote,
    Evict,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Miss => "MISS",
            EventKind::Hit => "HIT",
            EventKind::Insert => "INSERT",
            EventKind::Update => "UPDATE",
            EventKind::Promote => "PROMOTE",
            EventKind::Evict => "EVICT",
        };
        f.write_str(name)
    }
}

/// Where a newly inserted entry lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Position {
    /// Most-recently-used end of the LRU chain.
    Mru,
    /// Tail of the LFU bucket for this frequency.
    Frequency(u64),
}

/// How a touched entry moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Promotion {
    /// Relinked at the most-recently-used end of the LRU chain.
    ToMru,
    /// Moved from bucket `from` to the tail of bucket `to` (`to == from + 1`).
    Frequency { from: u64, to: u64 },
}

/// One observable transition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Event<K, V> {
    /// `get` on an absent key. Nothing changed.
    Miss { key: K },
    /// `get` found the key.
    Hit { key: K },
    /// A new entry was created.
    Insert { key: K, at: Position },
    /// `put` replaced the value of a resident key.
    Update { key: K, old: V, new: V },
    /// A resident key was touched and moved.
    Promote { key: K, promotion: Promotion },
    /// A resident entry was destroyed to make room.
    Evict { key: K, value: V },
}

impl<K, V> Event<K, V> {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Miss { .. } => EventKind::Miss,
            Event::Hit { .. } => EventKind::Hit,
            Event::Insert { .. } => EventKind::Insert,
            Event::Update { .. } => EventKind::Update,
            Event::Promote { .. } => EventKind::Promote,
            Event::Evict { .. } => EventKind::Evict,
        }
    }

    /// The key this event is about.
    pub fn key(&self) -> &K {
        match self {
            Event::Miss { key }
            | Event::Hit { key }
            | Event::Insert { key, .. }
            | Event::Update { key, .. }
            | Event::Promote { key, .. }
            | Event::Evict { key, .. } => key,
        }
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Event<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Miss { key } => write!(f, "miss {key}"),
            Event::Hit { key } => write!(f, "hit {key}"),
            Event::Insert {
                key,
                at: Position::Mru,
            } => write!(f, "insert {key} at mru"),
            Event::Insert {
                key,
                at: Position::Frequency(freq),
            } => write!(f, "insert {key} at freq {freq}"),
            Event::Update { key, old, new } => write!(f, "update {key}: {old} -> {new}"),
            Event::Promote {
                key,
                promotion: Promotion::ToMru,
            } => write!(f, "promote {key} to mru"),
            Event::Promote {
                key,
                promotion: Promotion::Frequency { from, to },
            } => write!(f, "promote {key} freq {from} -> {to}"),
            Event::Evict { key, value } => write!(f, "evict {key} ({value})"),
        }
    }
}

/// Ordered, append-only record of the events produced by one engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Trace<K, V> {
    events: Vec<Event<K, V>>,
}

impl<K, V> Trace<K, V> {
    pub(crate) fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub(crate) fn push(&mut self, event: Event<K, V>) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event<K, V>] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event<K, V>> {
        self.events.iter()
    }

    /// Event kinds in emission order.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.iter().map(Event::kind).collect()
    }

    pub fn contains_kind(&self, kind: EventKind) -> bool {
        self.events.iter().any(|event| event.kind() == kind)
    }

    /// Key evicted by this call, if any.
    pub fn evicted(&self) -> Option<&K> {
        self.events.iter().find_map(|event| match event {
            Event::Evict { key, .. } => Some(key),
            _ => None,
        })
    }

    pub fn into_events(self) -> Vec<Event<K, V>> {
        self.events
    }
}

impl<K, V> IntoIterator for Trace<K, V> {
    type Item = Event<K, V>;
    type IntoIter = std::vec::IntoIter<Event<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a Trace<K, V> {
    type Item = &'a Event<K, V>;
    type IntoIter = std::slice::Iter<'a, Event<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Trace<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{event}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trace<u32, &'static str> {
        let mut trace = Trace::new();
        trace.push(Event::Evict {
            key: 2,
            value: "two",
        });
        trace.push(Event::Insert {
            key: 3,
            at: Position::Frequency(1),
        });
        trace
    }

    #[test]
    fn kinds_follow_push_order() {
        let trace = sample();
        assert_eq!(trace.kinds(), vec![EventKind::Evict, EventKind::Insert]);
        assert_eq!(trace.len(), 2);
        assert!(trace.contains_kind(EventKind::Evict));
        assert!(!trace.contains_kind(EventKind::Miss));
        assert_eq!(trace.evicted(), Some(&2));
    }

    #[test]
    fn key_accessor_covers_every_variant() {
        let events: Vec<Event<u8, u8>> = vec![
            Event::Miss { key: 1 },
            Event::Hit { key: 1 },
            Event::Insert {
                key: 1,
                at: Position::Mru,
            },
            Event::Update {
                key: 1,
                old: 0,
                new: 9,
            },
            Event::Promote {
                key: 1,
                promotion: Promotion::ToMru,
            },
            Event::Evict { key: 1, value: 0 },
        ];
        assert!(events.iter().all(|event| *event.key() == 1));
    }

    #[test]
    fn display_narrates_events() {
        assert_eq!(sample().to_string(), "evict 2 (two); insert 3 at freq 1");

        let promote: Event<u8, u8> = Event::Promote {
            key: 1,
            promotion: Promotion::Frequency { from: 1, to: 2 },
        };
        assert_eq!(promote.to_string(), "promote 1 freq 1 -> 2");

        let update: Event<u8, &str> = Event::Update {
            key: 4,
            old: "a",
            new: "b",
        };
        assert_eq!(update.to_string(), "update 4: a -> b");
        assert_eq!(EventKind::Promote.to_string(), "PROMOTE");
    }

    #[test]
    fn empty_trace_displays_nothing() {
        let trace: Trace<u8, u8> = Trace::new();
        assert!(trace.is_empty());
        assert_eq!(trace.to_string(), "");
        assert_eq!(trace.evicted(), None);
    }

    #[test]
    fn into_events_preserves_order() {
        let events = sample().into_events();
        assert_eq!(*events[0].key(), 2);
        assert_eq!(*events[1].key(), 3);
    }
}
