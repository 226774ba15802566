// Construction-event protocol.
//
// A producer (the binary reader, or `Trie::emit` / `Nfsa::emit`) calls, in
// order:
//
//   states(n)
//   for each of the n states:
//     start_state, state(id)
//     start_finals, finals(k), state_final(tag) x k, end_finals
//     start_transitions, transitions(m), transition(label, dest) x m, end_transitions
//     end_state
//
// The bracketing hooks have no-op defaults.

use dafsa_core::{Feature, Label, State};

use crate::DafsaError;

/// Consumer of an ordered stream of construction events.
///
/// Every event may fail: builders reject contract violations and writers
/// report I/O errors.
pub trait Events {
    /// Total number of states; sent once, before anything else.
    fn states(&mut self, count: u32) -> Result<(), DafsaError>;

    /// The state whose finals and transitions follow.
    fn state(&mut self, state: State) -> Result<(), DafsaError>;

    /// Number of final features of the current state.
    fn finals(&mut self, count: u32) -> Result<(), DafsaError>;

    /// One final feature of the current state.
    fn state_final(&mut self, feature: Feature) -> Result<(), DafsaError>;

    /// Number of transitions of the current state.
    fn transitions(&mut self, count: u32) -> Result<(), DafsaError>;

    /// One transition of the current state. For transducers `label` is a
    /// packed input/output pair, see [`dafsa_core::label::pack_label`].
    fn transition(&mut self, label: Label, dest: State) -> Result<(), DafsaError>;

    fn start_state(&mut self) -> Result<(), DafsaError> {
        Ok(())
    }

    fn end_state(&mut self) -> Result<(), DafsaError> {
        Ok(())
    }

    fn start_finals(&mut self) -> Result<(), DafsaError> {
        Ok(())
    }

    fn end_finals(&mut self) -> Result<(), DafsaError> {
        Ok(())
    }

    fn start_transitions(&mut self) -> Result<(), DafsaError> {
        Ok(())
    }

    fn end_transitions(&mut self) -> Result<(), DafsaError> {
        Ok(())
    }
}

/// An event consumer that materializes a structure.
pub trait Builder: Events {
    type Output;

    /// Finish construction. The builder is consumed.
    fn build(self) -> Self::Output;
}

/// Replay one state's worth of events: finals (already sorted) and
/// transitions (already sorted and, for transducers, packed).
pub(crate) fn emit_state<E: Events + ?Sized>(
    events: &mut E,
    state: State,
    finals: &[Feature],
    transitions: &[(Label, State)],
) -> Result<(), DafsaError> {
    events.start_state()?;
    events.state(state)?;

    events.start_finals()?;
    events.finals(finals.len() as u32)?;
    for &f in finals {
        events.state_final(f)?;
    }
    events.end_finals()?;

    events.start_transitions()?;
    events.transitions(transitions.len() as u32)?;
    for &(label, dest) in transitions {
        events.transition(label, dest)?;
    }
    events.end_transitions()?;

    events.end_state()
}
