use std::collections::HashMap;

use crate::common::{Constraint, HighLevelNode, Path, MAX_TIMESTEP};
use crate::table::PathTableWC;

/// Hard constraints for one agent, plus the soft collision-avoidance view
/// of the other agents' current paths.
///
/// Soft occupancies come from either a snapshot built by [`insert_cat`]
/// (the high-level-search flavor) or a borrowed [`PathTableWC`] (the LNS
/// flavor). The borrow pins the path table for the lifetime of this table,
/// so a replan can never observe a half-updated occupancy map; a fresh
/// table is built per replan.
///
/// [`insert_cat`]: ConstraintTable::insert_cat
pub struct ConstraintTable<'a> {
    map_size: usize,
    /// Forbidden half-open time ranges, keyed by cell index or encoded edge.
    ct: HashMap<usize, Vec<(usize, usize)>>,
    ct_max_timestep: usize,
    /// Inclusive bounds on the returned path length.
    pub length_min: usize,
    pub length_max: usize,
    cat: Vec<Vec<bool>>,
    cat_goals: Vec<usize>,
    cat_max_timestep: usize,
    path_table: Option<&'a PathTableWC>,
}

impl<'a> ConstraintTable<'a> {
    pub fn new(map_size: usize) -> Self {
        ConstraintTable {
            map_size,
            ct: HashMap::new(),
            ct_max_timestep: 0,
            length_min: 0,
            length_max: MAX_TIMESTEP,
            cat: Vec::new(),
            cat_goals: Vec::new(),
            cat_max_timestep: 0,
            path_table: None,
        }
    }

    pub fn with_path_table(map_size: usize, path_table: &'a PathTableWC) -> Self {
        let mut table = Self::new(map_size);
        table.path_table = Some(path_table);
        table
    }

    pub(crate) fn map_size(&self) -> usize {
        self.map_size
    }

    fn edge_index(&self, from: usize, to: usize) -> usize {
        (1 + from) * self.map_size + to
    }

    pub(crate) fn insert(&mut self, index: usize, t_min: usize, t_max: usize) {
        debug_assert!(t_min < t_max);
        self.ct.entry(index).or_default().push((t_min, t_max));
        if t_max < MAX_TIMESTEP && t_max > self.ct_max_timestep {
            self.ct_max_timestep = t_max;
        } else if t_max >= MAX_TIMESTEP && t_min > self.ct_max_timestep {
            self.ct_max_timestep = t_min;
        }
    }

    /// Adds the constraints a high-level search node accumulated for `agent`.
    pub fn insert_hl_constraints(&mut self, node: &HighLevelNode, agent: usize) {
        for constraint in &node.constraints[agent] {
            match *constraint {
                Constraint::Vertex {
                    cell,
                    timestep,
                    is_permanent,
                } => {
                    if is_permanent {
                        self.insert(cell, timestep, MAX_TIMESTEP);
                    } else {
                        self.insert(cell, timestep, timestep + 1);
                    }
                }
                Constraint::Edge {
                    from,
                    to,
                    to_timestep,
                } => {
                    let index = self.edge_index(from, to);
                    self.insert(index, to_timestep, to_timestep + 1);
                }
                Constraint::Range { cell, first, last } => {
                    self.insert(cell, first, last);
                }
            }
        }
        self.length_min = self.length_min.max(node.path_length_constraints[agent]);
    }

    /// Registers the other agents' paths for soft-conflict accounting.
    pub fn insert_cat(&mut self, agent: usize, paths: &[Path]) {
        if self.cat.is_empty() {
            self.cat = vec![Vec::new(); self.map_size];
            self.cat_goals = vec![MAX_TIMESTEP; self.map_size];
        }
        for (id, path) in paths.iter().enumerate() {
            if id == agent || path.is_empty() {
                continue;
            }
            for (t, &cell) in path.iter().enumerate() {
                if self.cat[cell].len() <= t {
                    self.cat[cell].resize(t + 1, false);
                }
                self.cat[cell][t] = true;
            }
            self.cat_goals[*path.last().unwrap()] = path.len() - 1;
            self.cat_max_timestep = self.cat_max_timestep.max(path.len() - 1);
        }
    }

    pub fn constrained(&self, cell: usize, timestep: usize) -> bool {
        match self.ct.get(&cell) {
            Some(ranges) => ranges
                .iter()
                .any(|&(lo, hi)| lo <= timestep && timestep < hi),
            None => false,
        }
    }

    pub fn edge_constrained(&self, from: usize, to: usize, to_timestep: usize) -> bool {
        match self.ct.get(&self.edge_index(from, to)) {
            Some(ranges) => ranges
                .iter()
                .any(|&(lo, hi)| lo <= to_timestep && to_timestep < hi),
            None => false,
        }
    }

    /// Whether another agent's current path traverses `to -> from` while we
    /// would traverse `from -> to`, arriving at `to_timestep`. Soft only.
    pub(crate) fn has_edge_collision(&self, from: usize, to: usize, to_timestep: usize) -> bool {
        debug_assert!(to_timestep >= 1);
        if !self.cat.is_empty()
            && self.cat[to].get(to_timestep - 1).copied().unwrap_or(false)
            && self.cat[from].get(to_timestep).copied().unwrap_or(false)
        {
            return true;
        }
        self.path_table
            .is_some_and(|table| table.has_edge_collision(from, to, to_timestep))
    }

    /// Smallest `t >= earliest_timestep` from which the agent could occupy
    /// `cell` forever: no hard constraint forbids any time `>= t`, and no
    /// agent in the attached path table ever visits `cell` again.
    /// `MAX_TIMESTEP` when another agent parks on `cell` for good.
    pub fn get_holding_time(&self, cell: usize, earliest_timestep: usize) -> usize {
        let mut holding_time = earliest_timestep;
        if let Some(ranges) = self.ct.get(&cell) {
            for &(_, hi) in ranges {
                holding_time = holding_time.max(hi);
            }
        }
        if let Some(table) = self.path_table {
            holding_time = holding_time.max(table.get_holding_time(cell, earliest_timestep));
        }
        holding_time
    }

    /// Last timestep carrying any constraint or occupancy; the world is
    /// static beyond it.
    pub fn get_max_timestep(&self) -> usize {
        let mut max_timestep = self
            .ct_max_timestep
            .max(self.cat_max_timestep)
            .max(self.length_min);
        if self.length_max < MAX_TIMESTEP {
            max_timestep = max_timestep.max(self.length_max);
        }
        if let Some(table) = self.path_table {
            max_timestep = max_timestep.max(table.makespan);
        }
        max_timestep
    }

    /// Soft occupancies of `cell` strictly after `t`.
    pub(crate) fn get_future_num_of_collisions(&self, cell: usize, t: usize) -> usize {
        let mut count = 0;
        if !self.cat.is_empty() {
            count += self.cat[cell].iter().skip(t + 1).filter(|&&b| b).count();
        }
        if let Some(table) = self.path_table {
            count += table.get_future_num_of_collisions(cell, t);
        }
        count
    }

    pub(crate) fn hard_ranges(&self, index: usize) -> Option<&[(usize, usize)]> {
        self.ct.get(&index).map(Vec::as_slice)
    }

    pub(crate) fn cat_flags(&self, cell: usize) -> Option<&[bool]> {
        if self.cat.is_empty() {
            None
        } else {
            Some(&self.cat[cell])
        }
    }

    pub(crate) fn cat_goal(&self, cell: usize) -> usize {
        if self.cat_goals.is_empty() {
            MAX_TIMESTEP
        } else {
            self.cat_goals[cell]
        }
    }

    pub(crate) fn path_table(&self) -> Option<&PathTableWC> {
        self.path_table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_vertex_and_edge_constraints() {
        let mut node = HighLevelNode::new(1);
        node.constraints[0].insert(Constraint::Vertex {
            cell: 4,
            timestep: 3,
            is_permanent: false,
        });
        node.constraints[0].insert(Constraint::Edge {
            from: 4,
            to: 5,
            to_timestep: 2,
        });

        let mut table = ConstraintTable::new(9);
        table.insert_hl_constraints(&node, 0);

        assert!(table.constrained(4, 3));
        assert!(!table.constrained(4, 2));
        assert!(table.edge_constrained(4, 5, 2));
        assert!(!table.edge_constrained(5, 4, 2));
        assert_eq!(table.get_max_timestep(), 4);
    }

    #[test]
    fn test_permanent_and_range_constraints() {
        let mut node = HighLevelNode::new(1);
        node.constraints[0].insert(Constraint::Vertex {
            cell: 2,
            timestep: 5,
            is_permanent: true,
        });
        node.constraints[0].insert(Constraint::Range {
            cell: 3,
            first: 1,
            last: 4,
        });

        let mut table = ConstraintTable::new(9);
        table.insert_hl_constraints(&node, 0);

        assert!(!table.constrained(2, 4));
        assert!(table.constrained(2, 5));
        assert!(table.constrained(2, 1000));
        assert!(table.constrained(3, 1));
        assert!(table.constrained(3, 3));
        assert!(!table.constrained(3, 4));
        // a permanent constraint makes the world static from its start
        assert_eq!(table.get_max_timestep(), 5);
    }

    #[test]
    fn test_holding_time() {
        let mut table = ConstraintTable::new(16);
        table.insert(6, 5, 8);
        assert_eq!(table.get_holding_time(6, 4), 8);
        assert_eq!(table.get_holding_time(6, 10), 10);
        assert_eq!(table.get_holding_time(7, 4), 4);
    }

    #[test]
    fn test_holding_time_includes_path_table_traffic() {
        let mut path_table = PathTableWC::new(9);
        path_table.insert_path(0, &vec![3, 4, 5]);
        let table = ConstraintTable::with_path_table(9, &path_table);
        // cell 4 is last visited at t=1, so it can be held from t=2
        assert_eq!(table.get_holding_time(4, 0), 2);
        assert_eq!(table.get_holding_time(4, 6), 6);
        // an agent parks at cell 5 forever
        assert_eq!(table.get_holding_time(5, 0), MAX_TIMESTEP);
        // untouched cell
        assert_eq!(table.get_holding_time(8, 3), 3);
    }

    #[test]
    fn test_length_min_from_hl_node() {
        let node = HighLevelNode {
            constraints: vec![HashSet::new()],
            path_length_constraints: vec![7],
        };
        let mut table = ConstraintTable::new(9);
        table.insert_hl_constraints(&node, 0);
        assert_eq!(table.length_min, 7);
    }

    #[test]
    fn test_cat_future_collisions() {
        let mut table = ConstraintTable::new(9);
        let paths = vec![vec![0, 1, 2], vec![8, 5, 2, 2]];
        table.insert_cat(0, &paths);

        // only agent 1 is registered; it parks at cell 2 from t=3 on
        assert_eq!(table.cat_goal(2), 3);
        assert_eq!(table.get_future_num_of_collisions(2, 0), 2);
        assert_eq!(table.get_future_num_of_collisions(2, 2), 1);
        // swap with agent 1 along 5 -> 8 arriving at t=1
        assert!(table.has_edge_collision(5, 8, 1));
        assert!(!table.has_edge_collision(8, 5, 1));
    }
}
