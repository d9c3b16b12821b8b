use std::collections::HashSet;

/// Hard constraint handed down by a high-level search. `Vertex` with
/// `is_permanent` forbids the cell from `timestep` onward; `Range` forbids
/// the half-open window `[first, last)`.
#[derive(Clone, Eq, PartialEq, Debug, Hash, PartialOrd, Ord)]
pub enum Constraint {
    Vertex {
        cell: usize,
        timestep: usize,
        is_permanent: bool,
    },
    Edge {
        from: usize,
        to: usize,
        to_timestep: usize,
    },
    Range {
        cell: usize,
        first: usize,
        last: usize,
    },
}

/// The slice of a high-level search node that the low level consumes:
/// per-agent constraint sets plus a lower bound on each agent's path length.
#[derive(Debug, Clone, Default)]
pub struct HighLevelNode {
    pub constraints: Vec<HashSet<Constraint>>,
    pub path_length_constraints: Vec<usize>,
}

impl HighLevelNode {
    pub fn new(num_of_agents: usize) -> Self {
        HighLevelNode {
            constraints: vec![HashSet::new(); num_of_agents],
            path_length_constraints: vec![0; num_of_agents],
        }
    }
}
