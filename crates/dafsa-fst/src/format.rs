// Binary automaton format: sequential big-endian 32-bit integers, no header.
//
//   int32 stateCount
//   repeat stateCount:
//     int32 stateIdEcho
//     int32 finalCount, finalCount x int32 feature
//     int32 transitionCount, transitionCount x (int32 label, int32 dest)
//
// State ids are implicit (1..=stateCount in file order); the echo is read
// and ignored.

use std::io::{BufReader, Read, Write};
use std::path::Path;

use dafsa_core::{Feature, Label, State};
use tracing::{debug, debug_span};

use crate::DafsaError;
use crate::events::{Builder, Events};
use crate::nfsa::{Nfsa, NfsaBuilder};
use crate::trie::{Trie, TrieBuilder};

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, DafsaError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_be_bytes(buf))
}

fn read_count<R: Read>(reader: &mut R, what: &'static str) -> Result<u32, DafsaError> {
    let value = read_i32(reader)?;
    u32::try_from(value).map_err(|_| DafsaError::InvalidCount { what, value })
}

/// Read a serialized automaton and replay it into `builder`.
///
/// Each state's transitions are sorted ascending by `(label, dest)` before
/// delivery. For transducers this groups all transitions of one input label
/// together, which the [`Nfsa`] construction order requires.
///
/// Truncated input fails with [`DafsaError::Io`] (`UnexpectedEof`); negative
/// counts fail with [`DafsaError::InvalidCount`]. The builder is not usable
/// after a failure.
pub fn read_automaton<R: Read, E: Events + ?Sized>(
    reader: &mut R,
    builder: &mut E,
) -> Result<(), DafsaError> {
    let states = read_count(reader, "state")?;
    builder.states(states)?;

    let mut trans: Vec<(Label, State)> = Vec::new();
    for i in 0..states {
        builder.start_state()?;
        builder.state(i + 1)?;
        let _echo = read_i32(reader)?;

        let final_count = read_count(reader, "final")?;
        builder.start_finals()?;
        builder.finals(final_count)?;
        for _ in 0..final_count {
            builder.state_final(read_i32(reader)? as Feature)?;
        }
        builder.end_finals()?;

        let trans_count = read_count(reader, "transition")?;
        builder.start_transitions()?;
        builder.transitions(trans_count)?;
        trans.clear();
        for _ in 0..trans_count {
            let label = read_i32(reader)? as Label;
            let dest = read_i32(reader)? as State;
            trans.push((label, dest));
        }
        trans.sort_unstable();
        for &(label, dest) in &trans {
            builder.transition(label, dest)?;
        }
        builder.end_transitions()?;
        builder.end_state()?;
    }
    Ok(())
}

/// Read a serialized automaton with a fresh builder and return the result.
pub fn read_with<R: Read, B: Builder>(
    reader: &mut R,
    mut builder: B,
) -> Result<B::Output, DafsaError> {
    read_automaton(reader, &mut builder)?;
    Ok(builder.build())
}

/// Load a transducer from a serialized automaton.
pub fn read_nfsa<R: Read>(reader: &mut R) -> Result<Nfsa, DafsaError> {
    let nfsa = read_with(reader, NfsaBuilder::new())?;
    debug!(
        states = nfsa.state_count(),
        arcs = nfsa.arc_count(),
        keys = nfsa.key_count(),
        "transducer loaded"
    );
    Ok(nfsa)
}

/// Load a trie from a serialized automaton.
pub fn read_trie<R: Read>(reader: &mut R) -> Result<Trie, DafsaError> {
    let trie = read_with(reader, TrieBuilder::new())?;
    debug!(states = trie.size(), transitions = trie.transition_count(), "trie loaded");
    Ok(trie)
}

/// Load a transducer from a file.
pub fn load_nfsa(path: &Path) -> Result<Nfsa, DafsaError> {
    let _span = debug_span!("load_nfsa", path = %path.display()).entered();
    let file = std::fs::File::open(path)?;
    read_nfsa(&mut BufReader::new(file))
}

/// Load a trie from a file.
pub fn load_trie(path: &Path) -> Result<Trie, DafsaError> {
    let _span = debug_span!("load_trie", path = %path.display()).entered();
    let file = std::fs::File::open(path)?;
    read_trie(&mut BufReader::new(file))
}

/// Construction-event consumer that writes the binary format.
///
/// Counts are written as announced; the producer is responsible for sending
/// exactly as many items as it announced. The state id passed to `state` is
/// written as the echo field.
#[derive(Debug)]
pub struct BinaryWriter<W: Write> {
    writer: W,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_u32(&mut self, value: u32) -> Result<(), DafsaError> {
        self.writer.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W, DafsaError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> Events for BinaryWriter<W> {
    fn states(&mut self, count: u32) -> Result<(), DafsaError> {
        self.write_u32(count)
    }

    fn state(&mut self, state: State) -> Result<(), DafsaError> {
        self.write_u32(state)
    }

    fn finals(&mut self, count: u32) -> Result<(), DafsaError> {
        self.write_u32(count)
    }

    fn state_final(&mut self, feature: Feature) -> Result<(), DafsaError> {
        self.write_u32(feature)
    }

    fn transitions(&mut self, count: u32) -> Result<(), DafsaError> {
        self.write_u32(count)
    }

    fn transition(&mut self, label: Label, dest: State) -> Result<(), DafsaError> {
        self.write_u32(label)?;
        self.write_u32(dest)
    }
}

/// Serialize a trie.
pub fn write_trie<W: Write>(trie: &Trie, writer: W) -> Result<W, DafsaError> {
    let mut out = BinaryWriter::new(writer);
    trie.emit(&mut out)?;
    out.finish()
}

/// Serialize a transducer with packed labels.
pub fn write_nfsa<W: Write>(nfsa: &Nfsa, writer: W) -> Result<W, DafsaError> {
    let mut out = BinaryWriter::new(writer);
    nfsa.emit(&mut out)?;
    out.finish()
}
