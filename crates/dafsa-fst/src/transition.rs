// Transition keys, packed ranges and arc records.

use bytemuck::{Pod, Zeroable};
use dafsa_core::{Label, State};

/// Key of a transition: source state and (input) label.
///
/// Shared by the trie (one next state per key) and the transducer (a range of
/// arcs per key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionKey {
    pub state: State,
    pub label: Label,
}

impl TransitionKey {
    #[inline]
    pub fn new(state: State, label: Label) -> Self {
        Self { state, label }
    }
}

/// One transducer arc: output label and destination state (8 bytes).
///
/// Arcs live in a single append-only arena; a [`TransitionRange`] addresses
/// the arcs of one key by absolute index.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Arc {
    pub output: Label,
    pub next: State,
}

/// Contiguous half-open range `[start, start + len)` into the arc arena (8 bytes).
///
/// An absent key is represented by [`TransitionRange::EMPTY`]; its start is
/// meaningless and its length is zero.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct TransitionRange {
    start: u32,
    len: u32,
}

impl TransitionRange {
    /// The range of a key that has no transitions.
    pub const EMPTY: TransitionRange = TransitionRange { start: 0, len: 0 };

    #[inline]
    pub(crate) fn new(start: u32, len: u32) -> Self {
        Self { start, len }
    }

    /// Absolute index of the first arc.
    #[inline]
    pub fn start(&self) -> usize {
        self.start as usize
    }

    /// Number of arcs.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the absolute index of the last arc.
    #[inline]
    pub fn end(&self) -> usize {
        self.start() + self.len()
    }

    /// Index range, empty for an absent key.
    #[inline]
    pub fn indices(&self) -> std::ops::Range<usize> {
        if self.is_empty() {
            0..0
        } else {
            self.start()..self.end()
        }
    }

    #[inline]
    pub(crate) fn grow(&mut self) {
        self.len += 1;
    }
}

const _: () = assert!(size_of::<Arc>() == 8);
const _: () = assert!(size_of::<TransitionRange>() == 8);
