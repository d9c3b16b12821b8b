use crate::common::{Path, MAX_TIMESTEP};

/// Time-space occupancy of all current agent paths, collisions allowed.
/// `table[cell][t]` lists the agents occupying `cell` during `[t, t + 1)`;
/// `goals[cell]` is the timestep from which an agent parks on `cell`
/// forever (`MAX_TIMESTEP` when none does).
#[derive(Debug, Clone)]
pub struct PathTableWC {
    pub(crate) table: Vec<Vec<Vec<usize>>>,
    pub(crate) goals: Vec<usize>,
    pub makespan: usize,
}

impl PathTableWC {
    pub fn new(map_size: usize) -> Self {
        PathTableWC {
            table: vec![Vec::new(); map_size],
            goals: vec![MAX_TIMESTEP; map_size],
            makespan: 0,
        }
    }

    pub fn insert_path(&mut self, agent: usize, path: &Path) {
        if path.is_empty() {
            return;
        }
        for (t, &cell) in path.iter().enumerate() {
            if self.table[cell].len() <= t {
                self.table[cell].resize(t + 1, Vec::new());
            }
            self.table[cell][t].push(agent);
        }
        debug_assert_eq!(self.goals[*path.last().unwrap()], MAX_TIMESTEP);
        self.goals[*path.last().unwrap()] = path.len() - 1;
        self.makespan = self.makespan.max(path.len() - 1);
    }

    /// Undoes exactly what `insert_path` did for this path.
    pub fn remove_path(&mut self, agent: usize, path: &Path) {
        if path.is_empty() {
            return;
        }
        for (t, &cell) in path.iter().enumerate() {
            debug_assert!(self.table[cell].len() > t);
            self.table[cell][t].retain(|&id| id != agent);
        }
        debug_assert_eq!(self.goals[*path.last().unwrap()], path.len() - 1);
        self.goals[*path.last().unwrap()] = MAX_TIMESTEP;
    }

    /// Number of occupancies of `cell` strictly after `t`; the occupancy at
    /// `t` itself is charged by the arrival interval instead.
    pub fn get_future_num_of_collisions(&self, cell: usize, t: usize) -> usize {
        self.table[cell]
            .iter()
            .skip(t + 1)
            .map(|agents| agents.len())
            .sum()
    }

    /// Earliest `t >= earliest_timestep` from which no agent ever visits
    /// `cell` again. `MAX_TIMESTEP` when an agent parks on `cell` forever.
    pub fn get_holding_time(&self, cell: usize, earliest_timestep: usize) -> usize {
        if self.goals[cell] < MAX_TIMESTEP {
            return MAX_TIMESTEP;
        }
        let last_visit = self.table[cell]
            .iter()
            .rposition(|agents| !agents.is_empty());
        match last_visit {
            Some(t) => earliest_timestep.max(t + 1),
            None => earliest_timestep,
        }
    }

    /// Whether some agent traverses `to -> from` while this agent would
    /// traverse `from -> to`, arriving at `to_timestep`.
    pub(crate) fn has_edge_collision(&self, from: usize, to: usize, to_timestep: usize) -> bool {
        debug_assert!(to_timestep >= 1);
        let at_to_before = match self.table[to].get(to_timestep - 1) {
            Some(agents) => agents,
            None => return false,
        };
        let at_from_after = match self.table[from].get(to_timestep) {
            Some(agents) => agents,
            None => return false,
        };
        at_to_before
            .iter()
            .any(|a1| at_from_after.iter().any(|a2| a1 == a2))
    }
}
