use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use tracing::{debug, instrument, trace};

use crate::common::{focal_key, Agent, Interval, Path, SippNode};
use crate::map::Map;
use crate::stat::Stats;
use crate::table::{ConstraintTable, ReservationTable};

/// State shared by both search modes: the node arena, the duplicate table
/// keyed by node identity, and the two priority queues. Ordered sets stand
/// in for heaps; a key update removes the stale key and inserts the fresh
/// one, so no handles are needed.
pub(super) struct SippSearch<'a, 'b> {
    pub(super) agent: &'a Agent,
    pub(super) rt: ReservationTable<'a, 'b>,
    pub(super) nodes: Vec<SippNode>,
    pub(super) dup: HashMap<(usize, usize, bool), usize>,
    pub(super) open: BTreeSet<(usize, usize, usize)>,
    pub(super) focal: BTreeSet<(usize, usize, usize, usize)>,
    pub(super) holding_time: usize,
    pub(super) min_f_val: usize,
    pub(super) deadline: Option<Instant>,
}

impl<'a, 'b> SippSearch<'a, 'b> {
    pub(super) fn new(
        agent: &'a Agent,
        constraint_table: &'a ConstraintTable<'b>,
        deadline: Option<Instant>,
    ) -> Self {
        let holding_time =
            constraint_table.get_holding_time(agent.goal, constraint_table.length_min);
        SippSearch {
            agent,
            rt: ReservationTable::new(constraint_table, agent.goal),
            nodes: Vec::new(),
            dup: HashMap::new(),
            open: BTreeSet::new(),
            focal: BTreeSet::new(),
            holding_time,
            min_f_val: 0,
            deadline,
        }
    }

    pub(super) fn start_node(&self, first_interval: Interval) -> SippNode {
        SippNode {
            cell: self.agent.start,
            g: 0,
            h: self.agent.heuristic[self.agent.start].max(self.holding_time),
            parent: None,
            timestep: 0,
            interval: first_interval,
            num_of_conflicts: 0,
            is_goal: false,
            wait_at_goal: false,
            in_openlist: true,
        }
    }

    pub(super) fn alloc(&mut self, node: SippNode) -> usize {
        let id = self.nodes.len();
        self.dup.insert(node.identity(), id);
        self.nodes.push(node);
        id
    }

    pub(super) fn timed_out(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Walks the parent chain, filling waits between a parent's `t + 1`
    /// and a child's `t` with the parent's cell.
    pub(super) fn construct_path(&self, terminal: usize) -> Path {
        let mut path = vec![0; self.nodes[terminal].timestep + 1];
        let mut curr = terminal;
        while let Some(prev) = self.nodes[curr].parent {
            let curr_t = self.nodes[curr].timestep;
            for entry in path[self.nodes[prev].timestep + 1..curr_t].iter_mut() {
                *entry = self.nodes[prev].cell;
            }
            path[curr_t] = self.nodes[curr].cell;
            curr = prev;
        }
        debug_assert_eq!(self.nodes[curr].timestep, 0);
        path[0] = self.nodes[curr].cell;
        path
    }

    /// Builds the successor reached through `interval`. Soft collisions are
    /// charged once per step spent inside the flagged interval, waits
    /// included.
    pub(super) fn child_node(
        &self,
        interval: Interval,
        curr_id: usize,
        next_cell: usize,
    ) -> SippNode {
        let curr = &self.nodes[curr_id];
        let next_timestep = (curr.timestep + 1).max(interval.low);
        // path max keeps h consistent across the non-uniform wait costs
        let next_h = self.agent.heuristic[next_cell].max(curr.f().saturating_sub(next_timestep));
        SippNode {
            cell: next_cell,
            g: next_timestep,
            h: next_h,
            parent: Some(curr_id),
            timestep: next_timestep,
            interval,
            num_of_conflicts: curr.num_of_conflicts
                + interval.num_collisions * (next_timestep - curr.timestep),
            is_goal: false,
            wait_at_goal: next_cell == self.agent.goal && curr.cell == self.agent.goal,
            in_openlist: true,
        }
    }

    /// Insert `next` into the FOCAL-only search, or let it improve the node
    /// that already owns its identity: smaller timestep wins, fewer
    /// conflicts break ties. Closed nodes are reopened.
    pub(super) fn insert_or_improve_focal(&mut self, next: SippNode, stats: &mut Stats) {
        let identity = next.identity();
        if let Some(&id) = self.dup.get(&identity) {
            let existing = &self.nodes[id];
            if existing.timestep > next.timestep
                || (existing.timestep == next.timestep
                    && existing.num_of_conflicts > next.num_of_conflicts)
            {
                if existing.in_openlist {
                    self.focal.remove(&focal_key(id, existing));
                }
                self.nodes[id].copy_from(&next);
                self.nodes[id].in_openlist = true;
                self.focal.insert(focal_key(id, &self.nodes[id]));
            }
        } else {
            let id = self.nodes.len();
            self.dup.insert(identity, id);
            self.nodes.push(next);
            self.focal.insert(focal_key(id, &self.nodes[id]));
            stats.num_generated += 1;
        }
    }
}

/// Minimum-collision mode: repairs an agent's path under the hard
/// constraints while minimizing soft collisions with the other agents'
/// current paths. A single FOCAL queue orders nodes by
/// `(conflicts, f, h)`; every generated node is focal-eligible.
///
/// Returns the path and its conflict count, or `None` when the start is
/// blocked at time 0, the goal is unreachable, or the deadline expired.
#[instrument(skip_all, name = "sipp_find_path", fields(agent = agent.id, start = agent.start, goal = agent.goal), level = "debug")]
pub fn find_path(
    map: &Map,
    agent: &Agent,
    constraint_table: &ConstraintTable,
    deadline: Option<Instant>,
    stats: &mut Stats,
) -> Option<(Path, usize)> {
    let mut search = SippSearch::new(agent, constraint_table, deadline);

    let first_interval = search.rt.get_first_safe_interval(agent.start);
    if first_interval.low > 0 {
        debug!("start cell is blocked at time 0");
        return None;
    }

    let start = search.start_node(first_interval);
    let start_id = search.alloc(start);
    search.focal.insert(focal_key(start_id, &search.nodes[start_id]));
    stats.num_generated += 1;

    // everything is static after this timestep
    let static_timestep = constraint_table.get_max_timestep();

    while let Some(&key) = search.focal.iter().next() {
        search.focal.remove(&key);
        let curr_id = key.3;
        search.nodes[curr_id].in_openlist = false;
        stats.num_expanded += 1;

        if search.timed_out() {
            debug!("replan deadline expired");
            return None;
        }

        let curr = search.nodes[curr_id].clone();
        trace!("expand node: {curr:?}");

        if curr.is_goal {
            let path = search.construct_path(curr.parent.unwrap());
            return Some((path, curr.num_of_conflicts));
        }

        if curr.cell == agent.goal && !curr.wait_at_goal && curr.timestep >= search.holding_time {
            let future_collisions = if curr.timestep >= static_timestep {
                0
            } else {
                search
                    .rt
                    .constraint_table
                    .get_future_num_of_collisions(curr.cell, curr.timestep)
            };
            if future_collisions == 0 {
                let path = search.construct_path(curr_id);
                return Some((path, curr.num_of_conflicts));
            }
            // virtual goal node: competes in FOCAL on the conflicts a
            // settle here would eventually pay
            let mut goal = curr.clone();
            goal.is_goal = true;
            goal.parent = Some(curr_id);
            goal.num_of_conflicts += future_collisions;
            search.insert_or_improve_focal(goal, stats);
        }

        for &next_cell in map.get_neighbors(curr.cell) {
            let next_h = agent.heuristic[next_cell];
            let intervals = search.rt.get_safe_intervals(
                curr.cell,
                next_cell,
                curr.timestep + 1,
                curr.interval.high + 1,
            );
            for interval in intervals {
                let next_timestep = (curr.timestep + 1).max(interval.low);
                if next_timestep + next_h > constraint_table.length_max {
                    break;
                }
                let child = search.child_node(interval, curr_id, next_cell);
                search.insert_or_improve_focal(child, stats);
            }
        }

        // wait through to the next safe interval at the current cell
        let mut interval = curr.interval;
        if search
            .rt
            .find_safe_interval(&mut interval, curr.cell, curr.interval.high)
        {
            let child = search.child_node(interval, curr_id, curr.cell);
            search.insert_or_improve_focal(child, stats);
        }
    }

    debug!("cannot find path");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Constraint, HighLevelNode};
    use crate::map::tests::map_from_ascii;
    use crate::table::PathTableWC;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("info")
            .try_init();
    }

    #[test]
    fn test_unconstrained_shortest_path() {
        init_tracing();
        let map = map_from_ascii(&["....", "....", "....", "...."]);
        let agent = Agent::new(0, 0, map.linearize_coordinate(3, 3), &map);
        let table = ConstraintTable::new(map.map_size());
        let mut stats = Stats::default();

        let (path, num_collisions) =
            find_path(&map, &agent, &table, None, &mut stats).unwrap();
        assert_eq!(path.len(), 7); // cost 6
        assert_eq!(path[0], agent.start);
        assert_eq!(*path.last().unwrap(), agent.goal);
        assert_eq!(num_collisions, 0);
        // monotone in manhattan distance on an empty grid
        for window in path.windows(2) {
            assert_eq!(
                map.get_manhattan_distance(window[1], agent.goal) + 1,
                map.get_manhattan_distance(window[0], agent.goal)
            );
        }
    }

    #[test]
    fn test_blocked_start_is_infeasible() {
        init_tracing();
        let map = map_from_ascii(&["...", "...", "..."]);
        let agent = Agent::new(0, 0, 8, &map);
        let mut node = HighLevelNode::new(1);
        node.constraints[0].insert(Constraint::Range {
            cell: 0,
            first: 0,
            last: 1,
        });
        let mut table = ConstraintTable::new(map.map_size());
        table.insert_hl_constraints(&node, 0);
        let mut stats = Stats::default();

        assert!(find_path(&map, &agent, &table, None, &mut stats).is_none());
    }

    #[test]
    fn test_holding_time_delays_arrival() {
        init_tracing();
        // shortest distance is 4 but the goal is blocked at t in {5,6,7}
        let map = map_from_ascii(&["...", "...", "..."]);
        let goal = map.linearize_coordinate(2, 2);
        let agent = Agent::new(0, 0, goal, &map);
        let mut node = HighLevelNode::new(1);
        node.constraints[0].insert(Constraint::Range {
            cell: goal,
            first: 5,
            last: 8,
        });
        let mut table = ConstraintTable::new(map.map_size());
        table.insert_hl_constraints(&node, 0);
        let mut stats = Stats::default();

        let (path, _) = find_path(&map, &agent, &table, None, &mut stats).unwrap();
        assert_eq!(path.len(), 9); // arrives exactly at t=8
        assert_eq!(*path.last().unwrap(), goal);
        // never on the goal during the blocked window
        for t in 5..8 {
            assert_ne!(path[t], goal);
        }
    }

    #[test]
    fn test_prefers_collision_free_detour() {
        init_tracing();
        // another agent parks on the direct corridor; the detour through the
        // second row costs more but collides with nobody
        let map = map_from_ascii(&["...", "..."]);
        let agent = Agent::new(0, 0, 2, &map);
        let mut path_table = PathTableWC::new(map.map_size());
        path_table.insert_path(1, &vec![1]);
        let table = ConstraintTable::with_path_table(map.map_size(), &path_table);
        let mut stats = Stats::default();

        let (path, num_collisions) =
            find_path(&map, &agent, &table, None, &mut stats).unwrap();
        assert_eq!(num_collisions, 0);
        assert_eq!(path.len(), 5); // 0 -> 3 -> 4 -> 5 -> 2
        assert!(!path.contains(&1));
    }

    #[test]
    fn test_waits_out_future_goal_traffic() {
        init_tracing();
        // another agent crosses our goal at t=3; settling early would pay a
        // future collision, so the planner waits at the start instead
        let map = map_from_ascii(&["..."]);
        let agent = Agent::new(0, 0, 1, &map);
        let mut path_table = PathTableWC::new(map.map_size());
        path_table.insert_path(1, &vec![2, 2, 2, 1, 2]);
        let table = ConstraintTable::with_path_table(map.map_size(), &path_table);
        let mut stats = Stats::default();

        let (path, num_collisions) =
            find_path(&map, &agent, &table, None, &mut stats).unwrap();
        assert_eq!(num_collisions, 0);
        assert_eq!(path, vec![0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_parked_goal_is_unreachable_through_path_table() {
        init_tracing();
        // another agent parks on our goal forever: the holding time never
        // arrives and the planner reports failure
        let map = map_from_ascii(&[".."]);
        let agent = Agent::new(0, 0, 1, &map);
        let mut path_table = PathTableWC::new(map.map_size());
        path_table.insert_path(1, &vec![0, 1, 1]);
        let table = ConstraintTable::with_path_table(map.map_size(), &path_table);
        let mut stats = Stats::default();

        assert!(find_path(&map, &agent, &table, None, &mut stats).is_none());
    }

    #[test]
    fn test_parked_goal_reports_conflicts_through_cat() {
        init_tracing();
        // the snapshot CAT is advisory only: the same parked goal comes back
        // as a path with its collisions counted
        let map = map_from_ascii(&[".."]);
        let agent = Agent::new(0, 0, 1, &map);
        let paths = vec![Vec::new(), vec![0, 1, 1]];
        let mut table = ConstraintTable::new(map.map_size());
        table.insert_cat(0, &paths);
        let mut stats = Stats::default();

        let (path, num_collisions) =
            find_path(&map, &agent, &table, None, &mut stats).unwrap();
        assert_eq!(*path.last().unwrap(), 1);
        assert!(num_collisions >= 1);
    }

    #[test]
    fn test_wait_spanning_transition_charges_every_step() {
        init_tracing();
        // the corridor cell is hard-blocked during [1,3) and soft-occupied
        // at t=3; entering it means arriving at t=3 after two extra waits,
        // which charges the flagged interval once per elapsed step
        let map = map_from_ascii(&["..."]);
        let agent = Agent::new(0, 0, 2, &map);
        let mut path_table = PathTableWC::new(map.map_size());
        path_table.insert_path(1, &vec![2, 2, 2, 1, 0]);
        let mut table = ConstraintTable::with_path_table(map.map_size(), &path_table);
        table.insert(1, 1, 3);
        let mut stats = Stats::default();

        let (path, num_collisions) =
            find_path(&map, &agent, &table, None, &mut stats).unwrap();
        assert_eq!(path, vec![0, 0, 0, 1, 2]);
        assert_eq!(num_collisions, 3);
    }
}
