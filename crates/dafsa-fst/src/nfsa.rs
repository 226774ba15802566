// Packed non-deterministic transducer.

use dafsa_core::label::{pack_label, unpack_label};
use dafsa_core::{Feature, FinalSet, Label, NO_STATE, START_STATE, State};
use hashbrown::HashMap;
use tracing::debug;

use crate::DafsaError;
use crate::events::{self, Builder, Events};
use crate::transition::{Arc, TransitionKey, TransitionRange};

/// Non-deterministic transducer with packed transition ranges.
///
/// Every `(state, input)` key maps to a contiguous range of arcs
/// `(output, next)` in one append-only arena. A key may have any number of
/// arcs, so the same input label can lead to several outputs and states.
///
/// # Construction order
///
/// The range of a key is fixed at its first arc and can only grow at the end
/// of the arena, so all arcs of a key must be added consecutively.
/// [`add_transition`](Self::add_transition) rejects an arc for a key whose
/// range is no longer at the tail. The binary reader sorts each state's
/// transitions by packed label, which groups them by input label.
#[derive(Debug, Clone, Default)]
pub struct Nfsa {
    finals: HashMap<State, FinalSet>,
    ranges: HashMap<TransitionKey, TransitionRange>,
    arcs: Vec<Arc>,
    max_state: State,
}

impl Nfsa {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arc `state --input:output--> next`.
    ///
    /// Fails with [`DafsaError::NonContiguousTransitions`] when arcs for
    /// another key were added since the last arc of `(state, input)`; the
    /// transducer is left unchanged in that case. Fails with
    /// [`DafsaError::InvalidState`] when `state` is [`NO_STATE`].
    pub fn add_transition(
        &mut self,
        state: State,
        input: Label,
        output: Label,
        next: State,
    ) -> Result<(), DafsaError> {
        if state == NO_STATE {
            return Err(DafsaError::InvalidState { state });
        }
        let tail = self.arcs.len() as u32;
        let range = self
            .ranges
            .entry(TransitionKey::new(state, input))
            .or_insert_with(|| TransitionRange::new(tail, 0));
        if range.end() != tail as usize {
            return Err(DafsaError::NonContiguousTransitions { state, input });
        }
        range.grow();
        self.arcs.push(Arc { output, next });
        self.max_state = self.max_state.max(state).max(next);
        Ok(())
    }

    /// Final features of a state, or `None` if the state is not accepting.
    pub fn finals(&self, state: State) -> Option<&FinalSet> {
        self.finals.get(&state)
    }

    /// Attach a final feature to a state. Adding a feature twice is a no-op.
    pub fn add_final(&mut self, state: State, feature: Feature) {
        self.finals.entry(state).or_default().insert(feature);
        self.max_state = self.max_state.max(state);
    }

    /// Packed range of arcs for `(state, input)`.
    ///
    /// An absent key yields [`TransitionRange::EMPTY`].
    #[inline]
    pub fn transitions_info(&self, state: State, input: Label) -> TransitionRange {
        self.ranges
            .get(&TransitionKey::new(state, input))
            .copied()
            .unwrap_or(TransitionRange::EMPTY)
    }

    /// Arcs for `(state, input)`, in insertion order.
    #[inline]
    pub fn transitions(&self, state: State, input: Label) -> &[Arc] {
        &self.arcs[self.transitions_info(state, input).indices()]
    }

    /// Output label of the arc at absolute `index`.
    ///
    /// Panics if `index` is outside the arena.
    #[inline]
    pub fn transition_out(&self, index: usize) -> Label {
        self.arcs[index].output
    }

    /// Destination state of the arc at absolute `index`.
    ///
    /// Panics if `index` is outside the arena.
    #[inline]
    pub fn transition_next(&self, index: usize) -> State {
        self.arcs[index].next
    }

    /// Total number of arcs.
    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Number of distinct `(state, input)` keys.
    pub fn key_count(&self) -> usize {
        self.ranges.len()
    }

    /// Highest state number mentioned by any arc or final feature (at least
    /// the start state).
    pub fn state_count(&self) -> u32 {
        self.max_state.max(START_STATE)
    }

    /// Replay the transducer as construction events with packed labels.
    ///
    /// Fails with [`DafsaError::LabelOverflow`] if an input or output label
    /// does not fit in 16 bits.
    pub fn emit<E: Events + ?Sized>(&self, sink: &mut E) -> Result<(), DafsaError> {
        let mut by_state: HashMap<State, Vec<(Label, State)>> = HashMap::new();
        for (key, range) in &self.ranges {
            let out = by_state.entry(key.state).or_default();
            for arc in &self.arcs[range.indices()] {
                let packed = pack_label(key.label, arc.output).ok_or(DafsaError::LabelOverflow {
                    label: key.label.max(arc.output),
                })?;
                out.push((packed, arc.next));
            }
        }

        let count = self.state_count();
        sink.states(count)?;
        let mut finals = Vec::new();
        for state in START_STATE..=count {
            finals.clear();
            if let Some(set) = self.finals.get(&state) {
                finals.extend(set.iter().copied());
                finals.sort_unstable();
            }
            let transitions: &[(Label, State)] = match by_state.get_mut(&state) {
                Some(t) => {
                    t.sort_unstable();
                    t.as_slice()
                }
                None => &[],
            };
            events::emit_state(sink, state, &finals, transitions)?;
        }

        debug!(states = count, arcs = self.arcs.len(), "transducer emitted");
        Ok(())
    }
}

/// Materializes an [`Nfsa`] from construction events.
///
/// Each transition label is split into a 16-bit input label (high half) and
/// a 16-bit output label (low half). The bracketing hooks are not used.
#[derive(Debug, Default)]
pub struct NfsaBuilder {
    nfsa: Option<Nfsa>,
    current: State,
}

impl NfsaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn nfsa_mut(&mut self) -> Result<&mut Nfsa, DafsaError> {
        self.nfsa.as_mut().ok_or(DafsaError::MissingStates)
    }
}

impl Events for NfsaBuilder {
    fn states(&mut self, count: u32) -> Result<(), DafsaError> {
        let mut nfsa = Nfsa::new();
        nfsa.max_state = count;
        self.nfsa = Some(nfsa);
        Ok(())
    }

    fn state(&mut self, state: State) -> Result<(), DafsaError> {
        self.current = state;
        Ok(())
    }

    fn finals(&mut self, _count: u32) -> Result<(), DafsaError> {
        Ok(())
    }

    fn state_final(&mut self, feature: Feature) -> Result<(), DafsaError> {
        let current = self.current;
        self.nfsa_mut()?.add_final(current, feature);
        Ok(())
    }

    fn transitions(&mut self, _count: u32) -> Result<(), DafsaError> {
        Ok(())
    }

    fn transition(&mut self, label: Label, dest: State) -> Result<(), DafsaError> {
        let current = self.current;
        let (input, output) = unpack_label(label);
        self.nfsa_mut()?.add_transition(current, input, output, dest)
    }
}

impl Builder for NfsaBuilder {
    type Output = Nfsa;

    /// Returns the loaded transducer, or an empty one if no `states` event
    /// was seen.
    fn build(self) -> Nfsa {
        self.nfsa.unwrap_or_default()
    }
}
