// Walk configuration and explicit DFS stack.

use dafsa_core::{Label, State};

/// Most lookup keys a frame tries: the literal label, two case-folded
/// alternatives and epsilon.
pub(crate) const MAX_LOOKUPS: usize = 4;

/// One level of the depth-first search: a state at an input offset, plus the
/// position of the search among that state's candidate arcs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub state: State,
    pub offset: usize,
    /// Whether the arc leading into this frame appended an output label.
    pub emitted: bool,
    /// Lookup keys in exploration order: literal, case-folded, epsilon.
    pub lookups: [Label; MAX_LOOKUPS],
    pub lookup_len: usize,
    pub lookup_pos: usize,
    /// Next arc index and end of the current lookup's range.
    pub cursor: usize,
    pub end: usize,
}

/// Walk settings plus the reusable traversal buffers.
///
/// A configuration is created once and reused across walks; each walk resets
/// the buffers but keeps their capacity. Walks over the same transducer on
/// several threads need one configuration per thread.
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Also try case-folded forms of each input character.
    pub fold_case: bool,
    /// Maximum number of frames on the DFS stack; `None` for no limit.
    ///
    /// Branches deeper than this are cut and the walk outcome is marked as
    /// truncated.
    pub max_depth: Option<usize>,

    pub(crate) frames: Vec<Frame>,
    /// Output labels accumulated along the current path.
    pub(crate) output: Vec<Label>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl WalkConfig {
    pub fn new() -> Self {
        Self {
            fold_case: true,
            max_depth: None,
            frames: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Default settings with room for `depth` frames before the stack grows.
    pub fn with_capacity(depth: usize) -> Self {
        Self {
            frames: Vec::with_capacity(depth),
            output: Vec::with_capacity(depth),
            ..Self::new()
        }
    }

    pub fn with_fold_case(mut self, fold_case: bool) -> Self {
        self.fold_case = fold_case;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Clear the stack and output buffer (called at the start of a walk).
    #[inline]
    pub(crate) fn reset(&mut self) {
        self.frames.clear();
        self.output.clear();
    }

    /// Whether `(state, offset)` is already on the current path.
    ///
    /// Offsets never decrease along a path, so only the frames at the top of
    /// the stack sharing `offset` need to be inspected.
    pub(crate) fn on_path(&self, state: State, offset: usize) -> bool {
        self.frames
            .iter()
            .rev()
            .take_while(|f| f.offset == offset)
            .any(|f| f.state == state)
    }

    /// Whether another frame would exceed `max_depth`.
    #[inline]
    pub(crate) fn at_depth_limit(&self) -> bool {
        self.max_depth.is_some_and(|max| self.frames.len() >= max)
    }

    /// Current stack depth.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
