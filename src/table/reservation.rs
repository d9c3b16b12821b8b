use crate::common::{Interval, MAX_TIMESTEP};
use crate::table::ConstraintTable;

/// Lazy safe-interval index over one [`ConstraintTable`]. Per-cell interval
/// lists are materialized on first touch: the base horizon, minus hard
/// constraint ranges, split wherever the soft occupancy count changes.
pub(crate) struct ReservationTable<'a, 'b> {
    pub(crate) constraint_table: &'a ConstraintTable<'b>,
    goal_cell: usize,
    sit: Vec<Vec<Interval>>,
    built: Vec<bool>,
}

impl<'a, 'b> ReservationTable<'a, 'b> {
    pub(crate) fn new(constraint_table: &'a ConstraintTable<'b>, goal_cell: usize) -> Self {
        let map_size = constraint_table.map_size();
        ReservationTable {
            constraint_table,
            goal_cell,
            sit: vec![Vec::new(); map_size],
            built: vec![false; map_size],
        }
    }

    pub(crate) fn get_first_safe_interval(&mut self, cell: usize) -> Interval {
        self.ensure_built(cell);
        match self.sit[cell].first() {
            Some(&interval) => interval,
            // every instant is hard-constrained
            None => Interval::new(MAX_TIMESTEP, MAX_TIMESTEP + 1, 0),
        }
    }

    /// Next safe interval at `cell` containing or following `t_min`,
    /// written into `interval`.
    pub(crate) fn find_safe_interval(
        &mut self,
        interval: &mut Interval,
        cell: usize,
        t_min: usize,
    ) -> bool {
        if t_min >= self.constraint_table.length_max.min(MAX_TIMESTEP - 1) + 1 {
            return false;
        }
        self.ensure_built(cell);
        for &candidate in &self.sit[cell] {
            if candidate.low <= t_min && t_min < candidate.high {
                *interval = Interval::new(t_min, candidate.high, candidate.num_collisions);
                return true;
            } else if t_min < candidate.low {
                *interval = candidate;
                return true;
            }
        }
        false
    }

    /// All intervals during which the transition `from -> to` is safe and
    /// whose earliest feasible arrival falls in `[lower_bound, upper_bound)`,
    /// in increasing-time order. Zero-collision intervals are split at the
    /// first arrival step free of reverse-edge conflicts.
    pub(crate) fn get_safe_intervals(
        &mut self,
        from: usize,
        to: usize,
        lower_bound: usize,
        upper_bound: usize,
    ) -> Vec<Interval> {
        let mut result = Vec::new();
        if lower_bound >= upper_bound {
            return result;
        }
        self.ensure_built(to);
        for i in 0..self.sit[to].len() {
            let interval = self.sit[to][i];
            if lower_bound >= interval.high {
                continue;
            } else if upper_bound <= interval.low {
                break;
            }
            let lo = lower_bound.max(interval.low);
            let hi = upper_bound.min(interval.high);
            let t1 = match self.earliest_arrival_time(from, to, lo, hi) {
                Some(t) => t,
                None => continue,
            };
            if interval.num_collisions > 0 {
                result.push(Interval::new(t1, interval.high, interval.num_collisions));
            } else {
                match self.earliest_no_collision_arrival_time(from, to, &interval, t1, upper_bound)
                {
                    Some(t2) if t2 == t1 => {
                        result.push(Interval::new(t1, interval.high, 0));
                    }
                    Some(t2) => {
                        result.push(Interval::new(t1, t2, 1));
                        result.push(Interval::new(t2, interval.high, 0));
                    }
                    None => {
                        result.push(Interval::new(t1, interval.high, 1));
                    }
                }
            }
        }
        result
    }

    fn earliest_arrival_time(
        &self,
        from: usize,
        to: usize,
        lower_bound: usize,
        upper_bound: usize,
    ) -> Option<usize> {
        (lower_bound..upper_bound).find(|&t| !self.constraint_table.edge_constrained(from, to, t))
    }

    fn earliest_no_collision_arrival_time(
        &self,
        from: usize,
        to: usize,
        interval: &Interval,
        lower_bound: usize,
        upper_bound: usize,
    ) -> Option<usize> {
        let lo = lower_bound.max(interval.low);
        let hi = upper_bound.min(interval.high);
        (lo..hi).find(|&t| {
            !self.constraint_table.edge_constrained(from, to, t)
                && !self.constraint_table.has_edge_collision(from, to, t)
        })
    }

    fn ensure_built(&mut self, cell: usize) {
        if self.built[cell] {
            return;
        }
        self.built[cell] = true;
        let ct = self.constraint_table;

        // base horizon; the goal cell is split at length_min so the planner
        // can tell an early arrival from an admissible final settle
        if cell == self.goal_cell {
            if ct.length_min > ct.length_max {
                self.sit[cell].push(Interval::new(0, 0, 0));
                return;
            }
            if 0 < ct.length_min {
                self.sit[cell].push(Interval::new(0, ct.length_min, 0));
            }
            self.sit[cell].push(Interval::new(
                ct.length_min,
                (ct.length_max + 1).min(MAX_TIMESTEP),
                0,
            ));
        } else {
            self.sit[cell]
                .push(Interval::new(0, ct.length_max.min(MAX_TIMESTEP - 1) + 1, 0));
        }

        // soft occupancies from the borrowed path table
        if let Some(table) = ct.path_table() {
            for t in 0..table.table[cell].len() {
                if !table.table[cell][t].is_empty() {
                    self.insert_soft(cell, t, t + 1);
                }
            }
            if table.goals[cell] < MAX_TIMESTEP {
                self.insert_soft(cell, table.goals[cell], MAX_TIMESTEP);
            }
        }

        // soft occupancies from the snapshot CAT
        if let Some(flags) = ct.cat_flags(cell) {
            for (t, &flag) in flags.iter().enumerate() {
                if flag {
                    self.insert_soft(cell, t, t + 1);
                }
            }
            if ct.cat_goal(cell) < MAX_TIMESTEP {
                self.insert_soft(cell, ct.cat_goal(cell), MAX_TIMESTEP);
            }
        }

        // hard constraint ranges carve last
        if let Some(ranges) = ct.hard_ranges(cell) {
            for &(t_min, t_max) in ranges {
                self.insert_hard(cell, t_min, t_max);
            }
        }
    }

    fn insert_hard(&mut self, cell: usize, t_min: usize, t_max: usize) {
        debug_assert!(t_min < t_max);
        let intervals = &mut self.sit[cell];
        let mut i = 0;
        while i < intervals.len() {
            let it = intervals[i];
            if t_min >= it.high {
                i += 1;
            } else if t_max <= it.low {
                break;
            } else if it.low < t_min && it.high <= t_max {
                intervals[i] = Interval::new(it.low, t_min, it.num_collisions);
                i += 1;
            } else if t_min <= it.low && t_max < it.high {
                intervals[i] = Interval::new(t_max, it.high, it.num_collisions);
                break;
            } else if it.low < t_min && t_max < it.high {
                intervals[i] = Interval::new(it.low, t_min, it.num_collisions);
                intervals.insert(i + 1, Interval::new(t_max, it.high, it.num_collisions));
                break;
            } else {
                // t_min <= low && high <= t_max
                intervals.remove(i);
            }
        }
    }

    fn insert_soft(&mut self, cell: usize, t_min: usize, t_max: usize) {
        debug_assert!(t_min < t_max);
        let intervals = &mut self.sit[cell];
        let mut i = 0;
        while i < intervals.len() {
            let it = intervals[i];
            if t_min >= it.high || it.num_collisions > 0 {
                i += 1;
                continue;
            } else if t_max <= it.low {
                break;
            }
            if it.low < t_min && it.high <= t_max {
                intervals[i] = Interval::new(it.low, t_min, 0);
                intervals.insert(i + 1, Interval::new(t_min, it.high, 1));
                i += 2;
            } else if t_min <= it.low && t_max < it.high {
                intervals[i] = Interval::new(it.low, t_max, 1);
                intervals.insert(i + 1, Interval::new(t_max, it.high, 0));
                i += 2;
            } else if it.low < t_min && t_max < it.high {
                intervals[i] = Interval::new(it.low, t_min, 0);
                intervals.insert(i + 1, Interval::new(t_min, t_max, 1));
                intervals.insert(i + 2, Interval::new(t_max, it.high, 0));
                i += 3;
            } else {
                // t_min <= low && high <= t_max
                intervals[i] = Interval::new(it.low, it.high, 1);
                i += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::PathTableWC;

    #[test]
    fn test_unconstrained_cell_is_one_interval() {
        let ct = ConstraintTable::new(9);
        let mut rt = ReservationTable::new(&ct, 8);
        let first = rt.get_first_safe_interval(0);
        assert_eq!(first, Interval::new(0, MAX_TIMESTEP, 0));
    }

    #[test]
    fn test_hard_constraint_splits_cell() {
        let mut ct = ConstraintTable::new(9);
        ct.insert(4, 3, 5);
        let mut rt = ReservationTable::new(&ct, 8);

        assert_eq!(rt.get_first_safe_interval(4), Interval::new(0, 3, 0));

        let mut interval = Interval::new(0, 0, 0);
        assert!(rt.find_safe_interval(&mut interval, 4, 3));
        assert_eq!(interval, Interval::new(5, MAX_TIMESTEP, 0));

        // unconstrained timesteps stay covered
        assert!(rt.find_safe_interval(&mut interval, 4, 2));
        assert_eq!(interval, Interval::new(2, 3, 0));
    }

    #[test]
    fn test_goal_cell_split_at_length_min() {
        let mut ct = ConstraintTable::new(9);
        ct.length_min = 3;
        let mut rt = ReservationTable::new(&ct, 4);
        assert_eq!(rt.get_first_safe_interval(4), Interval::new(0, 3, 0));
        let mut interval = Interval::new(0, 0, 0);
        assert!(rt.find_safe_interval(&mut interval, 4, 3));
        assert_eq!(interval, Interval::new(3, MAX_TIMESTEP, 0));
    }

    #[test]
    fn test_soft_occupancy_flags_interval() {
        let mut table = PathTableWC::new(9);
        table.insert_path(0, &vec![1, 4, 7]);
        let ct = ConstraintTable::with_path_table(9, &table);
        let mut rt = ReservationTable::new(&ct, 8);

        // cell 4 is occupied during [1, 2)
        assert_eq!(rt.get_first_safe_interval(4), Interval::new(0, 1, 0));
        let mut interval = Interval::new(0, 0, 0);
        assert!(rt.find_safe_interval(&mut interval, 4, 1));
        assert_eq!(interval, Interval::new(1, 2, 1));
        assert!(rt.find_safe_interval(&mut interval, 4, 2));
        assert_eq!(interval, Interval::new(2, MAX_TIMESTEP, 0));

        // cell 7 is parked on from t=2 forever
        assert!(rt.find_safe_interval(&mut interval, 7, 2));
        assert_eq!(interval, Interval::new(2, 3, 1));
        assert!(rt.find_safe_interval(&mut interval, 7, 3));
        assert_eq!(interval, Interval::new(3, MAX_TIMESTEP, 1));
    }

    #[test]
    fn test_transition_intervals_split_on_swap() {
        let mut table = PathTableWC::new(9);
        table.insert_path(0, &vec![1, 2]);
        let ct = ConstraintTable::with_path_table(9, &table);
        let mut rt = ReservationTable::new(&ct, 8);

        // moving 2 -> 1: arriving at t=1 swaps with agent 0, t=2 is clean
        let intervals = rt.get_safe_intervals(2, 1, 1, 10);
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0], Interval::new(1, 2, 1));
        assert_eq!(intervals[1].low, 2);
        assert_eq!(intervals[1].num_collisions, 0);
    }

    #[test]
    fn test_transition_respects_edge_constraint() {
        let mut ct = ConstraintTable::new(9);
        // forbid edge 0 -> 1 at arrival times 1 and 2 via the hl surface
        let mut node = crate::common::HighLevelNode::new(1);
        node.constraints[0].insert(crate::common::Constraint::Edge {
            from: 0,
            to: 1,
            to_timestep: 1,
        });
        node.constraints[0].insert(crate::common::Constraint::Edge {
            from: 0,
            to: 1,
            to_timestep: 2,
        });
        ct.insert_hl_constraints(&node, 0);

        let mut rt = ReservationTable::new(&ct, 8);
        let intervals = rt.get_safe_intervals(0, 1, 1, 10);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].low, 3);
        assert_eq!(intervals[0].num_collisions, 0);
    }

    #[test]
    fn test_fully_blocked_cell() {
        let mut ct = ConstraintTable::new(9);
        ct.insert(4, 0, MAX_TIMESTEP);
        let mut rt = ReservationTable::new(&ct, 8);
        let first = rt.get_first_safe_interval(4);
        assert!(first.low > 0);
        let mut interval = Interval::new(0, 0, 0);
        assert!(!rt.find_safe_interval(&mut interval, 4, 0));
    }
}
