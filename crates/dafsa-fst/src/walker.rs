// Depth-first walk over a packed transducer.

use std::ops::ControlFlow;

use dafsa_core::case::folded_alternatives;
use dafsa_core::label::{char_label, labels_to_string};
use dafsa_core::{EPSILON, Feature, FinalSet, Label, START_STATE, State};
use tracing::{debug, debug_span, warn};

use crate::config::{Frame, MAX_LOOKUPS, WalkConfig};
use crate::nfsa::Nfsa;

/// A final state reached during a walk.
///
/// Borrowed views are only valid for the duration of the callback: the output
/// buffer is reused as the walk backtracks.
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    /// The whole input passed to the walk.
    pub input: &'a [char],
    /// Output labels accumulated along the path (epsilon outputs omitted).
    pub output: &'a [Label],
    /// Offset the walk started at.
    pub start: usize,
    /// Offset reached when the final state was entered.
    pub end: usize,
    /// The final state.
    pub state: State,
    /// Its final features (never empty).
    pub finals: &'a FinalSet,
}

impl<'a> Match<'a> {
    /// The input characters consumed by this match.
    pub fn matched_input(&self) -> &'a [char] {
        &self.input[self.start..self.end]
    }

    /// Output rendered as a string.
    pub fn output_string(&self) -> String {
        labels_to_string(self.output)
    }

    /// Final features in ascending order.
    pub fn sorted_features(&self) -> Vec<Feature> {
        let mut features: Vec<Feature> = self.finals.iter().copied().collect();
        features.sort_unstable();
        features
    }

    pub fn to_owned_match(&self) -> MatchResult {
        MatchResult {
            output: self.output_string(),
            start: self.start,
            end: self.end,
            state: self.state,
            features: self.sorted_features(),
        }
    }
}

/// Owned copy of a [`Match`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub output: String,
    pub start: usize,
    pub end: usize,
    pub state: State,
    pub features: Vec<Feature>,
}

/// Summary of one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Number of matches reported.
    pub matches: usize,
    /// Number of arcs followed.
    pub steps: usize,
    /// The callback asked to stop.
    pub stopped: bool,
    /// Some branch was cut by [`WalkConfig::max_depth`].
    pub truncated: bool,
}

/// Traversal engine over a built [`Nfsa`].
///
/// From each `(state, offset)` the walk explores, in order:
///
/// 1. arcs keyed by the input character at `offset` (or epsilon past the end
///    of the span),
/// 2. arcs keyed by its case-folded forms, when [`WalkConfig::fold_case`] is
///    set,
/// 3. arcs keyed by epsilon, which never consume input.
///
/// Within a class arcs are visited in range order. Following an arc appends
/// its output label (unless epsilon) and advances the offset unless the key
/// was epsilon. Every final state entered is reported to the callback.
///
/// An epsilon arc into a `(state, offset)` already on the current path is not
/// followed, so epsilon cycles terminate.
#[derive(Debug, Clone, Copy)]
pub struct Walker<'a> {
    nfsa: &'a Nfsa,
}

/// Upper bound on the stack capacity reserved by [`Walker::new_config`].
const INITIAL_DEPTH: usize = 64;

impl Nfsa {
    /// Walker over this transducer.
    pub fn walker(&self) -> Walker<'_> {
        Walker::new(self)
    }
}

impl<'a> Walker<'a> {
    pub fn new(nfsa: &'a Nfsa) -> Self {
        Self { nfsa }
    }

    /// Create a configuration with default settings, its stack pre-sized
    /// for this transducer.
    pub fn new_config(&self) -> WalkConfig {
        let depth = (self.nfsa.state_count() as usize).min(INITIAL_DEPTH);
        WalkConfig::with_capacity(depth)
    }

    /// Walk `input[start..end]` from the start state, calling `on_match` at
    /// every final state reached.
    ///
    /// Returning [`ControlFlow::Break`] from the callback stops the walk.
    ///
    /// # Panics
    ///
    /// If `start > end` or `end > input.len()`.
    pub fn walk<F>(
        &self,
        config: &mut WalkConfig,
        input: &[char],
        start: usize,
        end: usize,
        mut on_match: F,
    ) -> WalkOutcome
    where
        F: FnMut(&Match<'_>) -> ControlFlow<()>,
    {
        assert!(
            start <= end && end <= input.len(),
            "walk span {start}..{end} out of range for input of length {}",
            input.len()
        );
        let _span = debug_span!("walk", start, end).entered();

        config.reset();
        let mut outcome = WalkOutcome::default();

        let flow = self.enter(
            config,
            input,
            start,
            end,
            START_STATE,
            start,
            false,
            &mut on_match,
            &mut outcome,
        );
        if flow.is_break() {
            outcome.stopped = true;
        }

        while !outcome.stopped {
            let Some(top) = config.frames.last_mut() else {
                break;
            };

            if top.cursor == top.end {
                top.lookup_pos += 1;
                if top.lookup_pos < top.lookup_len {
                    let range = self
                        .nfsa
                        .transitions_info(top.state, top.lookups[top.lookup_pos])
                        .indices();
                    top.cursor = range.start;
                    top.end = range.end;
                    continue;
                }
                // Exhausted: backtrack.
                let emitted = top.emitted;
                config.frames.pop();
                if emitted {
                    config.output.pop();
                }
                continue;
            }

            let index = top.cursor;
            top.cursor += 1;
            let key = top.lookups[top.lookup_pos];
            let offset = top.offset;

            let output = self.nfsa.transition_out(index);
            let next = self.nfsa.transition_next(index);
            let next_offset = if key == EPSILON { offset } else { offset + 1 };

            if key == EPSILON && config.on_path(next, offset) {
                continue;
            }
            if config.at_depth_limit() {
                outcome.truncated = true;
                continue;
            }

            outcome.steps += 1;
            let emitted = output != EPSILON;
            if emitted {
                config.output.push(output);
            }
            let flow = self.enter(
                config,
                input,
                start,
                end,
                next,
                next_offset,
                emitted,
                &mut on_match,
                &mut outcome,
            );
            if flow.is_break() {
                outcome.stopped = true;
            }
        }

        if outcome.truncated {
            warn!(max_depth = ?config.max_depth, "walk truncated by depth limit");
        }
        debug!(
            matches = outcome.matches,
            steps = outcome.steps,
            stopped = outcome.stopped,
            "walk finished"
        );
        outcome
    }

    /// Walk `input[start..end]` and collect every match.
    pub fn matches(
        &self,
        config: &mut WalkConfig,
        input: &[char],
        start: usize,
        end: usize,
    ) -> Vec<MatchResult> {
        let mut results = Vec::new();
        self.walk(config, input, start, end, |m| {
            results.push(m.to_owned_match());
            ControlFlow::Continue(())
        });
        results
    }

    /// Walk a whole word and collect matches that consume all of it.
    pub fn analyze(&self, config: &mut WalkConfig, word: &str) -> Vec<MatchResult> {
        let input: Vec<char> = word.chars().collect();
        let mut results = self.matches(config, &input, 0, input.len());
        results.retain(|m| m.end == input.len());
        results
    }

    /// Push a frame for `(state, offset)` and report it if final.
    #[allow(clippy::too_many_arguments)]
    fn enter<F>(
        &self,
        config: &mut WalkConfig,
        input: &[char],
        start: usize,
        end: usize,
        state: State,
        offset: usize,
        emitted: bool,
        on_match: &mut F,
        outcome: &mut WalkOutcome,
    ) -> ControlFlow<()>
    where
        F: FnMut(&Match<'_>) -> ControlFlow<()>,
    {
        let ch = if offset < end {
            char_label(input[offset])
        } else {
            EPSILON
        };
        let frame = self.frame(state, offset, ch, emitted, config.fold_case);
        config.frames.push(frame);

        match self.nfsa.finals(state) {
            Some(finals) if !finals.is_empty() => {
                outcome.matches += 1;
                let m = Match {
                    input,
                    output: &config.output,
                    start,
                    end: offset,
                    state,
                    finals,
                };
                on_match(&m)
            }
            _ => ControlFlow::Continue(()),
        }
    }

    fn frame(
        &self,
        state: State,
        offset: usize,
        ch: Label,
        emitted: bool,
        fold_case: bool,
    ) -> Frame {
        let mut lookups = [EPSILON; MAX_LOOKUPS];
        let mut len = 0;
        lookups[len] = ch;
        len += 1;
        if fold_case {
            for &alt in folded_alternatives(ch).as_slice() {
                lookups[len] = alt;
                len += 1;
            }
        }
        // Past the end of the span the literal lookup already is epsilon.
        if ch != EPSILON {
            lookups[len] = EPSILON;
            len += 1;
        }

        let range = self.nfsa.transitions_info(state, ch).indices();
        Frame {
            state,
            offset,
            emitted,
            lookups,
            lookup_len: len,
            lookup_pos: 0,
            cursor: range.start,
            end: range.end,
        }
    }
}
