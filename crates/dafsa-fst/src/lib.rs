//! Tries and packed non-deterministic transducers over integer-coded labels.
//!
//! Automata are built incrementally (sequence by sequence for a [`Trie`],
//! transition by transition for an [`Nfsa`]) or materialized from a stream of
//! construction events, typically produced by the binary reader. A built
//! [`Nfsa`] is then walked over input text to find every accepting path
//! together with the output it produces.
//!
//! # Architecture
//!
//! - [`transition`] -- transition keys, packed ranges and arc records
//! - [`events`] -- the construction-event protocol shared by all builders
//! - [`trie`] -- deterministic trie construction
//! - [`nfsa`] -- packed non-deterministic transducer
//! - [`format`] -- big-endian binary reader and writer
//! - [`config`] -- walk configuration (explicit DFS stack)
//! - [`walker`] -- depth-first traversal with literal, case-folded and epsilon moves

pub mod config;
pub mod events;
pub mod format;
pub mod nfsa;
pub mod transition;
pub mod trie;
pub mod walker;

pub use config::WalkConfig;
pub use events::{Builder, Events};
pub use nfsa::{Nfsa, NfsaBuilder};
pub use trie::{Trie, TrieBuilder};
pub use walker::{Match, MatchResult, WalkOutcome, Walker};

use dafsa_core::{Label, State};

/// Error type for automaton construction and (de)serialization.
#[derive(Debug, thiserror::Error)]
pub enum DafsaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid {what} count: {value}")]
    InvalidCount { what: &'static str, value: i32 },
    #[error(
        "transitions for state {state}, input label {input} are not contiguous \
         (another key was inserted in between)"
    )]
    NonContiguousTransitions { state: State, input: Label },
    #[error("state {state} cannot have outgoing transitions")]
    InvalidState { state: State },
    #[error("label {label:#x} does not fit in 16 bits")]
    LabelOverflow { label: Label },
    #[error("construction event received before states()")]
    MissingStates,
}
