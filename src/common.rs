mod highlevel;
mod lowlevel;

pub use highlevel::{Constraint, HighLevelNode};
pub(crate) use lowlevel::{focal_key, open_key, SippNode};

use std::collections::VecDeque;
use tracing::error;

use crate::map::Map;

/// Sentinel for "unbounded" timesteps. Half of `usize::MAX` so that the
/// `+ 1` arithmetic on interval bounds never overflows.
pub(crate) const MAX_TIMESTEP: usize = usize::MAX / 2;

/// Entry `t` is the cell occupied during `[t, t + 1)`.
pub type Path = Vec<usize>;

/// Half-open time range `[low, high)` during which a cell or transition is
/// free of hard constraints. `num_collisions` flags soft conflicts with
/// other agents' current paths inside the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Interval {
    pub(crate) low: usize,
    pub(crate) high: usize,
    pub(crate) num_collisions: usize,
}

impl Interval {
    pub(crate) fn new(low: usize, high: usize, num_collisions: usize) -> Self {
        Interval {
            low,
            high,
            num_collisions,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: usize,
    pub start: usize,
    pub goal: usize,
    /// Exact distance from each cell to `goal`, by backward BFS.
    /// Unreachable cells hold `MAX_TIMESTEP`.
    pub heuristic: Vec<usize>,
    pub path: Path,
}

impl Agent {
    pub fn new(id: usize, start: usize, goal: usize, map: &Map) -> Self {
        Agent {
            id,
            start,
            goal,
            heuristic: compute_heuristic(map, goal),
            path: Vec::new(),
        }
    }

    pub fn verify(&self, map: &Map) -> bool {
        !map.is_obstacle(self.start)
            && !map.is_obstacle(self.goal)
            && self.heuristic[self.start] < MAX_TIMESTEP
    }
}

fn compute_heuristic(map: &Map, goal: usize) -> Vec<usize> {
    let mut dist = vec![MAX_TIMESTEP; map.map_size()];
    let mut queue = VecDeque::new();
    dist[goal] = 0;
    queue.push_back(goal);
    while let Some(cell) = queue.pop_front() {
        for &next in map.get_neighbors(cell) {
            if dist[next] == MAX_TIMESTEP {
                dist[next] = dist[cell] + 1;
                queue.push_back(next);
            }
        }
    }
    dist
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub paths: Vec<Path>,
}

impl Solution {
    /// Per-agent sanity: endpoints, continuity, obstacles. Collision
    /// accounting is the driver's job; a solution may still carry
    /// colliding pairs when the time budget ran out.
    pub fn verify(&self, map: &Map, agents: &[Agent]) -> bool {
        if self.paths.len() != agents.len() {
            error!("incomplete solution");
            return false;
        }

        for (path, agent) in self.paths.iter().zip(agents.iter()) {
            if path.first().is_none_or(|&s| s != agent.start)
                || path.last().is_none_or(|&g| g != agent.goal)
            {
                error!(
                    "start and goal failed: path start {:?} path end {:?}, but agent start {:?} agent goal {:?}",
                    path.first(),
                    path.last(),
                    agent.start,
                    agent.goal
                );
                return false;
            }

            for window in path.windows(2) {
                if let [from, to] = window {
                    if from != to && !map.get_neighbors(*from).contains(to) {
                        error!("move step failed: {from} -> {to}");
                        return false;
                    }
                }
            }

            if path.iter().any(|&cell| map.is_obstacle(cell)) {
                error!("path crosses an obstacle");
                return false;
            }
        }

        true
    }

    pub fn sum_of_costs(&self) -> usize {
        self.paths.iter().map(|p| p.len().saturating_sub(1)).sum()
    }
}
