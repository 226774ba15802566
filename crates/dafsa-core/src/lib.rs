//! Shared vocabulary for dafsa automata.
//!
//! - [`label`] -- state, label and feature identifiers, sentinels, packed labels
//! - [`case`] -- case folding of integer-coded labels

pub mod case;
pub mod label;

pub use label::{EPSILON, Feature, FinalSet, Label, NO_STATE, START_STATE, State};
