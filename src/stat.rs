use tracing::info;

/// Low-level planner counters, accumulated across every search of a run.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub num_expanded: usize,
    pub num_generated: usize,
}

impl Stats {
    pub fn print(&self) {
        info!(
            "Low level expanded nodes {:?} generated nodes {:?}",
            self.num_expanded, self.num_generated
        );
    }
}

/// One row of the per-iteration CSV.
#[derive(Debug, Clone)]
pub struct IterationStats {
    pub iteration: usize,
    pub runtime: f64,
    pub num_of_colliding_pairs: usize,
    pub sum_of_costs: usize,
    pub neighbor_size: usize,
    pub destroy_heuristic: &'static str,
    pub neighbor_agents: Vec<usize>,
    pub accepted: bool,
}

impl IterationStats {
    pub const CSV_HEADER: &'static str =
        "iteration,runtime,num_of_colliding_pairs,sum_of_costs,neighbor_size,destroy_heuristic,selected_neighbor_agents,accepted";

    pub fn to_csv_row(&self) -> String {
        let agents = self
            .neighbor_agents
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{},{},{},{},{},{},{},{}",
            self.iteration,
            self.runtime,
            self.num_of_colliding_pairs,
            self.sum_of_costs,
            self.neighbor_size,
            self.destroy_heuristic,
            agents,
            self.accepted as usize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_row() {
        let row = IterationStats {
            iteration: 3,
            runtime: 0.5,
            num_of_colliding_pairs: 2,
            sum_of_costs: 40,
            neighbor_size: 4,
            destroy_heuristic: "collision",
            neighbor_agents: vec![1, 5, 7],
            accepted: true,
        };
        assert_eq!(row.to_csv_row(), "3,0.5,2,40,4,collision,1;5;7,1");
    }
}
