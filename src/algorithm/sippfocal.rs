use std::time::Instant;

use tracing::{debug, instrument, trace};

use super::sipp::SippSearch;
use crate::common::{focal_key, open_key, Agent, Path, SippNode};
use crate::map::Map;
use crate::stat::Stats;
use crate::table::ConstraintTable;

impl SippSearch<'_, '_> {
    fn focal_bound(&self, subopt_factor: f64) -> f64 {
        subopt_factor * self.min_f_val as f64
    }

    fn push_node(&mut self, id: usize, subopt_factor: f64) {
        self.open.insert(open_key(id, &self.nodes[id]));
        self.nodes[id].in_openlist = true;
        if self.nodes[id].f() as f64 <= self.focal_bound(subopt_factor) {
            self.focal.insert(focal_key(id, &self.nodes[id]));
        }
    }

    /// When the head of OPEN outgrows `min_f_val`, raise it and migrate the
    /// newly qualified nodes into FOCAL.
    fn update_focal_list(&mut self, subopt_factor: f64) {
        let head_f = match self.open.iter().next() {
            Some(&(f, _, _)) => f,
            None => return,
        };
        if head_f <= self.min_f_val {
            return;
        }
        let old_bound = self.focal_bound(subopt_factor);
        let new_bound = subopt_factor * head_f as f64;
        for &(f, _, id) in &self.open {
            if f as f64 > old_bound && f as f64 <= new_bound {
                self.focal.insert(focal_key(id, &self.nodes[id]));
            }
        }
        self.min_f_val = head_f;
    }

    /// Insert a successor into OPEN (and FOCAL when it qualifies), or let it
    /// improve the node that owns its identity. A surviving node's heap keys
    /// are refreshed; crossing the focal boundary adds the focal key.
    fn insert_or_improve_open(&mut self, next: SippNode, subopt_factor: f64, stats: &mut Stats) {
        let identity = next.identity();
        if let Some(&id) = self.dup.get(&identity) {
            let existing = &self.nodes[id];
            if existing.timestep > next.timestep
                || (existing.timestep == next.timestep
                    && existing.num_of_conflicts > next.num_of_conflicts)
            {
                if !existing.in_openlist {
                    // closed: reopen
                    self.nodes[id].copy_from(&next);
                    self.push_node(id, subopt_factor);
                } else {
                    let was_in_focal = existing.f() as f64 <= self.focal_bound(subopt_factor);
                    self.open.remove(&open_key(id, existing));
                    if was_in_focal {
                        self.focal.remove(&focal_key(id, existing));
                    }
                    self.nodes[id].copy_from(&next);
                    self.open.insert(open_key(id, &self.nodes[id]));
                    if self.nodes[id].f() as f64 <= self.focal_bound(subopt_factor) {
                        self.focal.insert(focal_key(id, &self.nodes[id]));
                    }
                }
            }
        } else {
            let id = self.nodes.len();
            self.dup.insert(identity, id);
            self.nodes.push(next);
            stats.num_generated += 1;
            self.push_node(id, subopt_factor);
        }
    }
}

/// Bounded-suboptimal mode: returns a shortest path under the hard
/// constraints, up to the factor `subopt_factor`, minimizing soft conflicts
/// among the qualifying nodes. The second element of the result is
/// `min_f_val`, a valid lower bound on the optimal cost:
/// `min_f_val <= cost <= subopt_factor * min_f_val`.
#[instrument(skip_all, name = "sipp_find_suboptimal_path", fields(agent = agent.id, subopt_factor = subopt_factor, lowerbound = lowerbound), level = "debug")]
pub fn find_suboptimal_path(
    map: &Map,
    agent: &Agent,
    constraint_table: &ConstraintTable,
    lowerbound: usize,
    subopt_factor: f64,
    deadline: Option<Instant>,
    stats: &mut Stats,
) -> Option<(Path, usize)> {
    debug_assert!(subopt_factor >= 1.0);
    let mut search = SippSearch::new(agent, constraint_table, deadline);

    let first_interval = search.rt.get_first_safe_interval(agent.start);
    if first_interval.low > 0 {
        debug!("start cell is blocked at time 0");
        return None;
    }

    let start = search.start_node(first_interval);
    let start_id = search.alloc(start);
    stats.num_generated += 1;
    search.min_f_val = search.nodes[start_id]
        .f()
        .max(search.holding_time)
        .max(lowerbound);
    search.push_node(start_id, subopt_factor);

    while !search.open.is_empty() {
        search.update_focal_list(subopt_factor);
        let &key = search.focal.iter().next().expect("focal tracks open");
        search.focal.remove(&key);
        let curr_id = key.3;
        search.open.remove(&open_key(curr_id, &search.nodes[curr_id]));
        search.nodes[curr_id].in_openlist = false;
        stats.num_expanded += 1;

        if search.timed_out() {
            debug!("search deadline expired");
            return None;
        }

        let curr = search.nodes[curr_id].clone();
        trace!("expand node: {curr:?}");

        if curr.cell == agent.goal && !curr.wait_at_goal && curr.timestep >= search.holding_time {
            let path = search.construct_path(curr_id);
            let min_f_val = search.min_f_val;
            debug!("find solution with min f val {min_f_val:?}");
            return Some((path, min_f_val));
        }

        for &next_cell in map.get_neighbors(curr.cell) {
            let intervals = search.rt.get_safe_intervals(
                curr.cell,
                next_cell,
                curr.timestep + 1,
                curr.interval.high + 1,
            );
            for interval in intervals {
                let child = search.child_node(interval, curr_id, next_cell);
                if child.f() > constraint_table.length_max {
                    continue;
                }
                search.insert_or_improve_open(child, subopt_factor, stats);
            }
        }

        // wait through to the next safe interval at the current cell
        let mut interval = curr.interval;
        if search
            .rt
            .find_safe_interval(&mut interval, curr.cell, curr.interval.high)
        {
            let child = search.child_node(interval, curr_id, curr.cell);
            if child.f() <= constraint_table.length_max {
                search.insert_or_improve_open(child, subopt_factor, stats);
            }
        }
    }

    debug!("cannot find path");
    None
}
