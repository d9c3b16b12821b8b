use super::Interval;

/// One search node of the safe-interval planner. Nodes live in an arena
/// (`Vec<SippNode>`) owned by a single search; `parent` is an arena index.
///
/// Identity is `(cell, interval.low, is_goal)` — `timestep` can shrink
/// without changing which node this is.
#[derive(Debug, Clone)]
pub(crate) struct SippNode {
    pub(crate) cell: usize,
    pub(crate) g: usize,
    pub(crate) h: usize,
    pub(crate) parent: Option<usize>,
    pub(crate) timestep: usize,
    pub(crate) interval: Interval,
    pub(crate) num_of_conflicts: usize,
    pub(crate) is_goal: bool,
    pub(crate) wait_at_goal: bool,
    pub(crate) in_openlist: bool,
}

impl SippNode {
    pub(crate) fn f(&self) -> usize {
        self.g + self.h
    }

    pub(crate) fn identity(&self) -> (usize, usize, bool) {
        (self.cell, self.interval.low, self.is_goal)
    }

    /// Adopt the better route found to the same `(cell, interval, is_goal)`
    /// identity. Heap keys derived from the old fields must be removed
    /// before calling this.
    pub(crate) fn copy_from(&mut self, other: &SippNode) {
        debug_assert_eq!(self.identity(), other.identity());
        self.g = other.g;
        self.h = other.h;
        self.parent = other.parent;
        self.timestep = other.timestep;
        self.interval = other.interval;
        self.num_of_conflicts = other.num_of_conflicts;
        self.wait_at_goal = other.wait_at_goal;
    }
}

/// FOCAL order: fewest conflicts first, then smaller f, then smaller h.
/// The arena id is the final tie-break, which makes expansion order
/// deterministic for identical priorities.
pub(crate) fn focal_key(id: usize, node: &SippNode) -> (usize, usize, usize, usize) {
    (node.num_of_conflicts, node.f(), node.h, id)
}

/// OPEN order: smaller f first, then smaller h, then arena id.
pub(crate) fn open_key(id: usize, node: &SippNode) -> (usize, usize, usize) {
    (node.f(), node.h, id)
}
