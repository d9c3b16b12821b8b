use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info};

use super::Solver;
use crate::algorithm;
use crate::common::{Agent, Path, Solution};
use crate::config::Config;
use crate::map::Map;
use crate::stat::{IterationStats, Stats};
use crate::table::{ConstraintTable, PathTableWC};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DestroyStrategy {
    Collision = 0,
    Target = 1,
    Random = 2,
}

impl DestroyStrategy {
    fn name(self) -> &'static str {
        match self {
            DestroyStrategy::Collision => "collision",
            DestroyStrategy::Target => "target",
            DestroyStrategy::Random => "random",
        }
    }
}

/// Anytime driver that owns the multi-agent plan. Builds an initial
/// prioritized solution, then destroys and repairs neighborhoods of
/// colliding agents until no colliding pair remains or the time budget is
/// exhausted.
pub struct InitLns<'a> {
    map: &'a Map,
    pub agents: Vec<Agent>,
    init_algo: String,
    replan_algo: String,
    time_limit: Duration,
    replan_time_limit: Duration,
    neighbor_size: usize,
    destroy_strategy: DestroyStrategy,
    alns: bool,
    destroy_weights: [f64; 3],
    decay_factor: f64,
    reaction_factor: f64,
    rng: StdRng,
    path_table: PathTableWC,
    collision_graph: Vec<BTreeSet<usize>>,
    pub num_of_colliding_pairs: usize,
    pub sum_of_costs: usize,
    pub initial_sum_of_costs: usize,
    pub sum_of_distances: usize,
    pub num_of_failures: usize,
    sum_of_group_sizes: usize,
    pub iteration_stats: Vec<IterationStats>,
    pub stats: Stats,
    start_time: Instant,
    pub initial_solution_runtime: f64,
    pub runtime: f64,
}

impl<'a> InitLns<'a> {
    pub fn new(map: &'a Map, agents: Vec<Agent>, config: &Config) -> Result<Self> {
        for algo in [&config.init_algo, &config.replan_algo] {
            if algo != "PP" {
                bail!("algorithm {algo:?} needs a high-level search and is not available here");
            }
        }
        let (destroy_strategy, alns) = match config.init_destroy.as_str() {
            "collision" => (DestroyStrategy::Collision, false),
            "target" => (DestroyStrategy::Target, false),
            "random" => (DestroyStrategy::Random, false),
            "adaptive" => (DestroyStrategy::Collision, true),
            other => bail!("unknown destroy heuristic {other:?}"),
        };

        let sum_of_distances = agents.iter().map(|a| a.heuristic[a.start]).sum();
        let num_of_agents = agents.len();
        Ok(InitLns {
            map,
            agents,
            init_algo: config.init_algo.clone(),
            replan_algo: config.replan_algo.clone(),
            time_limit: Duration::from_secs_f64(config.time_limit),
            replan_time_limit: Duration::from_secs_f64(config.time_limit / 100.0),
            neighbor_size: config.neighbor_size,
            destroy_strategy,
            alns,
            destroy_weights: [1.0; 3],
            decay_factor: 0.01,
            reaction_factor: 0.01,
            rng: StdRng::seed_from_u64(config.seed),
            path_table: PathTableWC::new(map.map_size()),
            collision_graph: vec![BTreeSet::new(); num_of_agents],
            num_of_colliding_pairs: 0,
            sum_of_costs: 0,
            initial_sum_of_costs: 0,
            sum_of_distances,
            num_of_failures: 0,
            sum_of_group_sizes: 0,
            iteration_stats: Vec::new(),
            stats: Stats::default(),
            start_time: Instant::now(),
            initial_solution_runtime: 0.0,
            runtime: 0.0,
        })
    }

    pub fn solver_name(&self) -> String {
        format!("InitLNS({};{})", self.init_algo, self.replan_algo)
    }

    /// Prioritized planning in input order; paths are kept regardless of
    /// residual collisions.
    fn get_initial_solution(&mut self, deadline: Instant) -> bool {
        for id in 0..self.agents.len() {
            let constraint_table =
                ConstraintTable::with_path_table(self.map.map_size(), &self.path_table);
            let result = algorithm::find_path(
                self.map,
                &self.agents[id],
                &constraint_table,
                Some(deadline),
                &mut self.stats,
            );
            let Some((path, num_collisions)) = result else {
                self.num_of_failures += 1;
                error!("agent {id} has no feasible path");
                return false;
            };

            let mut colliding_pairs = BTreeSet::new();
            if num_collisions > 0 {
                self.update_colliding_pairs(&mut colliding_pairs, id, &path);
            }
            for &(a, b) in &colliding_pairs {
                self.collision_graph[a].insert(b);
                self.collision_graph[b].insert(a);
            }
            self.sum_of_costs += path.len() - 1;
            self.path_table.insert_path(id, &path);
            self.agents[id].path = path;
        }
        self.num_of_colliding_pairs = self.count_colliding_pairs();
        true
    }

    fn count_colliding_pairs(&self) -> usize {
        self.collision_graph.iter().map(|s| s.len()).sum::<usize>() / 2
    }

    /// Collects the colliding pairs `path` produces against the current
    /// path table: shared cells, swapped edges, and traversals of another
    /// agent's parked goal (in both directions).
    fn update_colliding_pairs(
        &self,
        colliding_pairs: &mut BTreeSet<(usize, usize)>,
        agent_id: usize,
        path: &Path,
    ) {
        let table = &self.path_table;
        if path.len() < 2 {
            return;
        }
        for t in 1..path.len() {
            let from = path[t - 1];
            let to = path[t];
            // vertex conflicts
            if let Some(occupants) = table.table[to].get(t) {
                for &id in occupants {
                    colliding_pairs.insert((agent_id.min(id), agent_id.max(id)));
                }
            }
            // edge conflicts
            if from != to {
                if let (Some(at_to_before), Some(at_from_after)) =
                    (table.table[to].get(t - 1), table.table[from].get(t))
                {
                    for id in at_to_before {
                        if at_from_after.contains(id) {
                            colliding_pairs.insert((agent_id.min(*id), agent_id.max(*id)));
                        }
                    }
                }
            }
            // walking over another agent's parked goal
            if table.goals[to] < t {
                if let Some(parked) = table.table[to].get(table.goals[to]) {
                    for &id in parked {
                        colliding_pairs.insert((agent_id.min(id), agent_id.max(id)));
                    }
                }
            }
        }
        // others walking over our goal after we settle
        let goal = *path.last().unwrap();
        for occupants in table.table[goal].iter().skip(path.len()) {
            for &id in occupants {
                colliding_pairs.insert((agent_id.min(id), agent_id.max(id)));
            }
        }
    }

    fn choose_destroy_heuristic(&mut self) -> DestroyStrategy {
        let total: f64 = self.destroy_weights.iter().sum();
        let mut roll = self.rng.gen::<f64>() * total;
        for (index, weight) in self.destroy_weights.iter().enumerate() {
            if roll <= *weight {
                return match index {
                    0 => DestroyStrategy::Collision,
                    1 => DestroyStrategy::Target,
                    _ => DestroyStrategy::Random,
                };
            }
            roll -= weight;
        }
        DestroyStrategy::Random
    }

    /// A random connected component of the collision graph, up to
    /// `neighbor_size` of its vertices.
    fn generate_neighbor_by_collision_graph(&mut self) -> Vec<usize> {
        let vertices: Vec<usize> = (0..self.agents.len())
            .filter(|&a| !self.collision_graph[a].is_empty())
            .collect();
        let &seed = vertices.choose(&mut self.rng).expect("collisions remain");

        let mut visited = vec![false; self.agents.len()];
        let mut component = vec![seed];
        visited[seed] = true;
        let mut head = 0;
        while head < component.len() {
            let current = component[head];
            head += 1;
            for &next in &self.collision_graph[current] {
                if !visited[next] {
                    visited[next] = true;
                    component.push(next);
                }
            }
        }
        component.shuffle(&mut self.rng);
        component.truncate(self.neighbor_size);
        component
    }

    /// An agent colliding with many others, plus the agents it collides
    /// with.
    fn generate_neighbor_by_target(&mut self) -> Vec<usize> {
        let max_degree = self
            .collision_graph
            .iter()
            .map(|s| s.len())
            .max()
            .unwrap_or(0);
        let candidates: Vec<usize> = (0..self.agents.len())
            .filter(|&a| self.collision_graph[a].len() == max_degree)
            .collect();
        let &target = candidates.choose(&mut self.rng).expect("collisions remain");

        let mut colliders: Vec<usize> = self.collision_graph[target].iter().copied().collect();
        colliders.shuffle(&mut self.rng);
        let mut neighborhood = vec![target];
        neighborhood.extend(colliders);
        neighborhood.truncate(self.neighbor_size);
        neighborhood
    }

    fn generate_neighbor_random(&mut self) -> Vec<usize> {
        let mut ids: Vec<usize> = (0..self.agents.len()).collect();
        ids.shuffle(&mut self.rng);
        ids.truncate(self.neighbor_size.min(self.agents.len()));
        ids
    }

    fn colliding_pairs_of(&self, neighbor: &[usize]) -> BTreeSet<(usize, usize)> {
        let mut pairs = BTreeSet::new();
        for &a in neighbor {
            for &b in &self.collision_graph[a] {
                pairs.insert((a.min(b), a.max(b)));
            }
        }
        pairs
    }

    /// Destroys the neighborhood's paths and replans its agents in random
    /// order against everyone else's current paths (soft). Accepts iff every
    /// agent replanned in budget and the neighborhood's colliding-pair count
    /// strictly improved; otherwise the old paths are restored.
    fn repair_neighborhood(&mut self, neighbor: &[usize], deadline: Instant) -> bool {
        let old_pairs = self.colliding_pairs_of(neighbor);
        let old_sum: usize = neighbor
            .iter()
            .map(|&a| self.agents[a].path.len() - 1)
            .sum();
        let old_paths: Vec<Path> = neighbor
            .iter()
            .map(|&a| self.agents[a].path.clone())
            .collect();
        for (&a, path) in neighbor.iter().zip(old_paths.iter()) {
            self.path_table.remove_path(a, path);
        }

        let mut shuffled = neighbor.to_vec();
        shuffled.shuffle(&mut self.rng);

        let mut new_pairs = BTreeSet::new();
        let mut planned = Vec::new();
        let mut completed = true;
        for &id in &shuffled {
            if Instant::now() >= deadline {
                completed = false;
                break;
            }
            let replan_deadline = deadline.min(Instant::now() + self.replan_time_limit);
            let constraint_table =
                ConstraintTable::with_path_table(self.map.map_size(), &self.path_table);
            let result = algorithm::find_path(
                self.map,
                &self.agents[id],
                &constraint_table,
                Some(replan_deadline),
                &mut self.stats,
            );
            match result {
                Some((path, num_collisions)) => {
                    if num_collisions > 0 {
                        self.update_colliding_pairs(&mut new_pairs, id, &path);
                    }
                    self.path_table.insert_path(id, &path);
                    self.agents[id].path = path;
                    planned.push(id);
                    if new_pairs.len() >= old_pairs.len() {
                        completed = false;
                        break;
                    }
                }
                None => {
                    self.num_of_failures += 1;
                    completed = false;
                    break;
                }
            }
        }

        let accepted = completed && new_pairs.len() < old_pairs.len();
        if accepted {
            for &a in neighbor {
                let colliders: Vec<usize> = self.collision_graph[a].iter().copied().collect();
                for b in colliders {
                    self.collision_graph[b].remove(&a);
                }
                self.collision_graph[a].clear();
            }
            for &(a, b) in &new_pairs {
                self.collision_graph[a].insert(b);
                self.collision_graph[b].insert(a);
            }
            self.num_of_colliding_pairs = self.count_colliding_pairs();
            let new_sum: usize = neighbor
                .iter()
                .map(|&a| self.agents[a].path.len() - 1)
                .sum();
            self.sum_of_costs = self.sum_of_costs + new_sum - old_sum;
        } else {
            for &id in &planned {
                let path = std::mem::take(&mut self.agents[id].path);
                self.path_table.remove_path(id, &path);
            }
            for (&id, old_path) in neighbor.iter().zip(old_paths) {
                self.path_table.insert_path(id, &old_path);
                self.agents[id].path = old_path;
            }
        }
        accepted
    }

    fn run_iterations(&mut self, deadline: Instant) {
        while self.num_of_colliding_pairs > 0 && Instant::now() < deadline {
            for weight in &mut self.destroy_weights {
                *weight *= 1.0 - self.decay_factor;
            }
            let strategy = if self.alns {
                self.choose_destroy_heuristic()
            } else {
                self.destroy_strategy
            };
            let neighbor = match strategy {
                DestroyStrategy::Collision => self.generate_neighbor_by_collision_graph(),
                DestroyStrategy::Target => self.generate_neighbor_by_target(),
                DestroyStrategy::Random => self.generate_neighbor_random(),
            };
            self.sum_of_group_sizes += neighbor.len();

            let old_pair_count = self.num_of_colliding_pairs;
            let accepted = self.repair_neighborhood(&neighbor, deadline);
            if accepted {
                let improvement = old_pair_count - self.num_of_colliding_pairs;
                self.destroy_weights[strategy as usize] +=
                    self.reaction_factor * improvement as f64;
            }

            debug!(
                "iteration {}: {} colliding pairs, sum of costs {}, destroy {} over {:?}, accepted {}",
                self.iteration_stats.len(),
                self.num_of_colliding_pairs,
                self.sum_of_costs,
                strategy.name(),
                neighbor,
                accepted
            );
            self.iteration_stats.push(IterationStats {
                iteration: self.iteration_stats.len(),
                runtime: self.start_time.elapsed().as_secs_f64(),
                num_of_colliding_pairs: self.num_of_colliding_pairs,
                sum_of_costs: self.sum_of_costs,
                neighbor_size: neighbor.len(),
                destroy_heuristic: strategy.name(),
                neighbor_agents: neighbor,
                accepted,
            });
        }
    }

    pub fn average_group_size(&self) -> f64 {
        let iterations = self.iteration_stats.len().saturating_sub(1);
        if iterations == 0 {
            0.0
        } else {
            self.sum_of_group_sizes as f64 / iterations as f64
        }
    }

    /// Fatal-error check on the final plan: per-agent path validity plus an
    /// exact recount of colliding pairs, which must match the driver's
    /// bookkeeping.
    pub fn validate_solution(&self) -> Result<()> {
        let solution = Solution {
            paths: self.agents.iter().map(|a| a.path.clone()).collect(),
        };
        if !solution.verify(self.map, &self.agents) {
            bail!("solution failed path validation");
        }

        let mut pairs = BTreeSet::new();
        for i in 0..self.agents.len() {
            for j in i + 1..self.agents.len() {
                let p = &self.agents[i].path;
                let q = &self.agents[j].path;
                for t in 1..p.len().max(q.len()) {
                    let pi = *p.get(t).unwrap_or_else(|| p.last().unwrap());
                    let qj = *q.get(t).unwrap_or_else(|| q.last().unwrap());
                    if pi == qj {
                        pairs.insert((i, j));
                    }
                    if t < p.len() && t < q.len() && p[t - 1] == qj && q[t - 1] == pi {
                        pairs.insert((i, j));
                    }
                }
            }
        }
        if pairs.len() != self.num_of_colliding_pairs {
            bail!(
                "collision accounting mismatch: recounted {} pairs, solver reports {}",
                pairs.len(),
                self.num_of_colliding_pairs
            );
        }
        Ok(())
    }

    pub fn write_iter_stats_to_file(&self, path: &str) -> Result<()> {
        let mut out = String::from(IterationStats::CSV_HEADER);
        out.push('\n');
        for row in &self.iteration_stats {
            out.push_str(&row.to_csv_row());
            out.push('\n');
        }
        std::fs::write(path, out)?;
        Ok(())
    }

    pub fn write_result_to_file(&self, path: &str, instance: &str) -> Result<()> {
        let add_header = !std::path::Path::new(path).exists();
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if add_header {
            writeln!(
                file,
                "solver name,instance,runtime,initial sum of costs,sum of costs,sum of distances,LL generated,failures,average group size"
            )?;
        }
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{}",
            self.solver_name(),
            instance,
            self.runtime,
            self.initial_sum_of_costs,
            self.sum_of_costs,
            self.sum_of_distances,
            self.stats.num_generated,
            self.num_of_failures,
            self.average_group_size()
        )?;
        Ok(())
    }

    pub fn write_paths_to_file(&self, path: &str) -> Result<()> {
        let mut out = String::new();
        for agent in &self.agents {
            let cells: Vec<String> = agent
                .path
                .iter()
                .map(|&cell| {
                    format!(
                        "({},{})",
                        self.map.get_row_coordinate(cell),
                        self.map.get_col_coordinate(cell)
                    )
                })
                .collect();
            out.push_str(&format!("Agent {}: {}\n", agent.id, cells.join("->")));
        }
        std::fs::write(path, out)?;
        Ok(())
    }
}

impl Solver for InitLns<'_> {
    fn solve(&mut self) -> Option<Solution> {
        self.start_time = Instant::now();
        let deadline = self.start_time + self.time_limit;
        info!("{} starts with {} agents", self.solver_name(), self.agents.len());

        if !self.get_initial_solution(deadline) {
            return None;
        }
        self.initial_solution_runtime = self.start_time.elapsed().as_secs_f64();
        self.initial_sum_of_costs = self.sum_of_costs;
        self.iteration_stats.push(IterationStats {
            iteration: 0,
            runtime: self.initial_solution_runtime,
            num_of_colliding_pairs: self.num_of_colliding_pairs,
            sum_of_costs: self.sum_of_costs,
            neighbor_size: self.agents.len(),
            destroy_heuristic: "init",
            neighbor_agents: Vec::new(),
            accepted: true,
        });
        info!(
            "initial solution: {} colliding pairs, sum of costs {}",
            self.num_of_colliding_pairs, self.sum_of_costs
        );

        self.run_iterations(deadline);

        self.runtime = self.start_time.elapsed().as_secs_f64();
        self.stats.print();
        info!(
            "done in {:.3}s: {} colliding pairs, sum of costs {}, {} failures",
            self.runtime, self.num_of_colliding_pairs, self.sum_of_costs, self.num_of_failures
        );
        Some(Solution {
            paths: self.agents.iter().map(|a| a.path.clone()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::tests::map_from_ascii;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("info")
            .try_init();
    }

    fn test_config(time_limit: f64, seed: u64) -> Config {
        Config {
            time_limit,
            seed,
            neighbor_size: 4,
            ..Config::default()
        }
    }

    fn agents_on(map: &Map, routes: &[((usize, usize), (usize, usize))]) -> Vec<Agent> {
        routes
            .iter()
            .enumerate()
            .map(|(id, &(start, goal))| {
                Agent::new(
                    id,
                    map.linearize_coordinate(start.0, start.1),
                    map.linearize_coordinate(goal.0, goal.1),
                    map,
                )
            })
            .collect()
    }

    #[test]
    fn test_single_agent() {
        init_tracing();
        let map = map_from_ascii(&["....", "....", "....", "...."]);
        let agents = agents_on(&map, &[((0, 0), (3, 3))]);
        let mut lns = InitLns::new(&map, agents, &test_config(5.0, 0)).unwrap();

        let solution = lns.solve().unwrap();
        assert_eq!(lns.num_of_colliding_pairs, 0);
        assert_eq!(lns.sum_of_costs, 6);
        assert_eq!(solution.sum_of_costs(), 6);
        lns.validate_solution().unwrap();
    }

    #[test]
    fn test_independent_agents_keep_zero_pairs() {
        init_tracing();
        let map = map_from_ascii(&["...", "...", "..."]);
        let agents = agents_on(
            &map,
            &[((0, 0), (2, 0)), ((0, 1), (2, 1)), ((0, 2), (2, 2))],
        );
        let mut lns = InitLns::new(&map, agents, &test_config(5.0, 0)).unwrap();

        lns.solve().unwrap();
        assert_eq!(lns.num_of_colliding_pairs, 0);
        assert_eq!(lns.sum_of_costs, 6);
        // only the initial-solution row
        assert_eq!(lns.iteration_stats.len(), 1);
        lns.validate_solution().unwrap();
    }

    #[test]
    fn test_crossing_agents_resolve() {
        init_tracing();
        // one agent crosses the middle row, the other the middle column;
        // somebody has to dodge around the shared center cell
        let map = map_from_ascii(&["...", "...", "..."]);
        let agents = agents_on(&map, &[((1, 0), (1, 2)), ((0, 1), (2, 1))]);
        let mut lns = InitLns::new(&map, agents, &test_config(5.0, 0)).unwrap();

        lns.solve().unwrap();
        assert_eq!(lns.num_of_colliding_pairs, 0);
        assert!(lns.sum_of_costs <= 6);
        lns.validate_solution().unwrap();
    }

    #[test]
    fn test_corridor_with_alcove_resolves() {
        init_tracing();
        // head-on traffic in a one-wide corridor; the only passing bay is
        // the alcove below the fourth cell
        let map = map_from_ascii(&[
            ".....", //
            "@@@.@",
        ]);
        let agents = agents_on(&map, &[((0, 0), (0, 4)), ((0, 4), (0, 0))]);
        let mut lns = InitLns::new(&map, agents, &test_config(5.0, 0)).unwrap();

        lns.solve().unwrap();
        assert_eq!(lns.num_of_colliding_pairs, 0);
        assert!(lns.sum_of_costs <= 14);
        lns.validate_solution().unwrap();
    }

    #[test]
    fn test_swap_conflict_never_resolves() {
        init_tracing();
        // two agents must trade ends of a 1x2 strip: every repair is
        // rejected and the run ends at the time limit with the pair intact
        let map = map_from_ascii(&[".."]);
        let agents = agents_on(&map, &[((0, 0), (0, 1)), ((0, 1), (0, 0))]);
        let mut lns = InitLns::new(&map, agents, &test_config(0.3, 0)).unwrap();

        let solution = lns.solve().unwrap();
        assert_eq!(lns.num_of_colliding_pairs, 1);
        assert!(solution.verify(&map, &lns.agents));
        // no iteration was ever accepted
        assert!(lns.iteration_stats.iter().skip(1).all(|row| !row.accepted));
        assert!(lns.iteration_stats.len() > 1);
        lns.validate_solution().unwrap();
    }

    #[test]
    fn test_neighborhood_sampling_is_seeded() {
        init_tracing();
        let map = map_from_ascii(&["....", "....", "....", "...."]);
        let routes: Vec<((usize, usize), (usize, usize))> =
            (0..4).map(|i| ((0, i), (3, i))).collect();

        let mut lns_a = InitLns::new(&map, agents_on(&map, &routes), &test_config(1.0, 9)).unwrap();
        let mut lns_b = InitLns::new(&map, agents_on(&map, &routes), &test_config(1.0, 9)).unwrap();
        // fully connect the collision graph of both instances
        for lns in [&mut lns_a, &mut lns_b] {
            for a in 0..4 {
                for b in 0..4 {
                    if a != b {
                        lns.collision_graph[a].insert(b);
                    }
                }
            }
            lns.num_of_colliding_pairs = lns.count_colliding_pairs();
        }

        assert_eq!(
            lns_a.generate_neighbor_random(),
            lns_b.generate_neighbor_random()
        );
        assert_eq!(
            lns_a.generate_neighbor_by_collision_graph(),
            lns_b.generate_neighbor_by_collision_graph()
        );
        assert_eq!(
            lns_a.generate_neighbor_by_target(),
            lns_b.generate_neighbor_by_target()
        );
        assert_eq!(lns_a.choose_destroy_heuristic(), lns_b.choose_destroy_heuristic());
    }

    #[test]
    fn test_validate_catches_unreported_collisions() {
        init_tracing();
        let map = map_from_ascii(&[".."]);
        let mut lns = InitLns::new(
            &map,
            agents_on(&map, &[((0, 0), (0, 1)), ((0, 1), (0, 0))]),
            &test_config(1.0, 0),
        )
        .unwrap();
        // a swap the bookkeeping knows nothing about
        lns.agents[0].path = vec![0, 1];
        lns.agents[1].path = vec![1, 0];
        lns.num_of_colliding_pairs = 0;

        assert!(lns.validate_solution().is_err());
    }

    #[test]
    fn test_gcbs_is_rejected_at_startup() {
        init_tracing();
        let map = map_from_ascii(&[".."]);
        let config = Config {
            init_algo: "GCBS".to_string(),
            ..Config::default()
        };
        assert!(InitLns::new(&map, Vec::new(), &config).is_err());
    }
}
