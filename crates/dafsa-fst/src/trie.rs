// Deterministic trie over integer labels.

use dafsa_core::{Feature, FinalSet, Label, NO_STATE, START_STATE, State};
use hashbrown::HashMap;
use tracing::debug;

use crate::DafsaError;
use crate::events::{self, Builder, Events};
use crate::transition::TransitionKey;

/// Hash-based trie: exactly one next state per `(state, label)`.
///
/// States are allocated sequentially; state 1 is the start state. No suffix
/// sharing is performed, so every distinct prefix has its own state.
#[derive(Debug, Clone)]
pub struct Trie {
    states: u32,
    trans: HashMap<TransitionKey, State>,
    finals: HashMap<State, FinalSet>,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    /// Create a trie holding only the start state.
    pub fn new() -> Self {
        Self {
            states: START_STATE,
            trans: HashMap::new(),
            finals: HashMap::new(),
        }
    }

    /// Number of states, which is also the highest state number.
    pub fn size(&self) -> u32 {
        self.states
    }

    /// Number of transitions.
    pub fn transition_count(&self) -> usize {
        self.trans.len()
    }

    /// Final features of a state, or `None` if the state is not accepting.
    pub fn finals(&self, state: State) -> Option<&FinalSet> {
        self.finals.get(&state)
    }

    /// Attach a final feature to a state. Adding a feature twice is a no-op.
    pub fn add_final(&mut self, state: State, feature: Feature) {
        self.finals.entry(state).or_default().insert(feature);
    }

    /// Set the single transition of `state` on `label`, replacing any
    /// previous one.
    pub fn set_next(&mut self, state: State, label: Label, next: State) {
        self.trans.insert(TransitionKey::new(state, label), next);
    }

    /// Next state of `state` on `label`, or [`NO_STATE`] if there is none.
    pub fn next(&self, state: State, label: Label) -> State {
        self.trans
            .get(&TransitionKey::new(state, label))
            .copied()
            .unwrap_or(NO_STATE)
    }

    /// Follow `seq` from the start state as far as transitions exist.
    ///
    /// Returns the state reached and the number of labels consumed.
    pub fn walk_prefix(&self, seq: &[Label]) -> (State, usize) {
        let mut state = START_STATE;
        for (idx, &label) in seq.iter().enumerate() {
            let next = self.next(state, label);
            if next == NO_STATE {
                return (state, idx);
            }
            state = next;
        }
        (state, seq.len())
    }

    /// State reached by following all of `seq`, or [`NO_STATE`].
    pub fn lookup(&self, seq: &[Label]) -> State {
        match self.walk_prefix(seq) {
            (state, n) if n == seq.len() => state,
            _ => NO_STATE,
        }
    }

    /// Append a fresh chain of states for `seq[offset..]` starting at `state`
    /// and mark its end with `feature`.
    ///
    /// Returns the end state of the chain. An `offset` at or past the end of
    /// `seq` allocates nothing and marks `state` itself.
    pub fn add_suffix(
        &mut self,
        mut state: State,
        seq: &[Label],
        offset: usize,
        feature: Feature,
    ) -> State {
        for &label in seq.get(offset..).unwrap_or(&[]) {
            self.states += 1;
            let next = self.states;
            self.set_next(state, label, next);
            state = next;
        }
        self.add_final(state, feature);
        state
    }

    /// Add a sequence with a final feature.
    ///
    /// Existing transitions are followed from the start state; the remaining
    /// labels get a new chain of states. If the whole sequence is already
    /// present only the feature is added. An empty sequence is ignored.
    pub fn add(&mut self, seq: &[Label], feature: Feature) {
        if seq.is_empty() {
            return;
        }
        let (state, idx) = self.walk_prefix(seq);
        if idx == seq.len() {
            self.add_final(state, feature);
        } else {
            self.add_suffix(state, seq, idx, feature);
        }
    }

    /// Add a sequence from a one-shot iterator.
    ///
    /// A new state is allocated as soon as a label has no transition, without
    /// scanning for the common prefix first. The resulting trie is the same as
    /// with [`add`](Self::add).
    pub fn add_iter<I>(&mut self, seq: I, feature: Feature)
    where
        I: IntoIterator<Item = Label>,
    {
        let mut iter = seq.into_iter().peekable();
        if iter.peek().is_none() {
            return;
        }

        let mut state = START_STATE;
        for label in iter {
            let mut next = self.next(state, label);
            if next == NO_STATE {
                self.states += 1;
                next = self.states;
                self.set_next(state, label, next);
            }
            state = next;
        }
        self.add_final(state, feature);
    }

    /// Reset to a single start state with no transitions or finals.
    pub fn clear(&mut self) {
        self.states = START_STATE;
        self.trans.clear();
        self.finals.clear();
    }

    /// Replay the trie as construction events.
    ///
    /// States are emitted as `1..=size()`, features in ascending order and
    /// transitions ascending by `(label, dest)`.
    pub fn emit<E: Events + ?Sized>(&self, sink: &mut E) -> Result<(), DafsaError> {
        let mut by_state: HashMap<State, Vec<(Label, State)>> = HashMap::new();
        for (key, &next) in &self.trans {
            by_state.entry(key.state).or_default().push((key.label, next));
        }

        sink.states(self.states)?;
        let mut finals = Vec::new();
        for state in START_STATE..=self.states {
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

        debug!(states = self.states, transitions = self.trans.len(), "trie emitted");
        Ok(())
    }
}

/// Materializes a [`Trie`] from construction events.
///
/// `states(n)` creates the trie with its state counter set to `n`, so that
/// sequences added after loading get fresh state numbers.
#[derive(Debug, Default)]
pub struct TrieBuilder {
    trie: Option<Trie>,
    current: State,
}

impl TrieBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn trie_mut(&mut self) -> Result<&mut Trie, DafsaError> {
        self.trie.as_mut().ok_or(DafsaError::MissingStates)
    }
}

impl Events for TrieBuilder {
    fn states(&mut self, count: u32) -> Result<(), DafsaError> {
        let mut trie = Trie::new();
        trie.states = count.max(START_STATE);
        self.trie = Some(trie);
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
        self.trie_mut()?.add_final(current, feature);
        Ok(())
    }

    fn transitions(&mut self, _count: u32) -> Result<(), DafsaError> {
        Ok(())
    }

    fn transition(&mut self, label: Label, dest: State) -> Result<(), DafsaError> {
        let current = self.current;
        self.trie_mut()?.set_next(current, label, dest);
        Ok(())
    }
}

impl Builder for TrieBuilder {
    type Output = Trie;

    /// Returns the loaded trie, or an empty one if no `states` event was seen.
    fn build(self) -> Trie {
        self.trie.unwrap_or_default()
    }
}
