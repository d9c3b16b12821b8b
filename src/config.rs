use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(
    name = "mapf-lns",
    about = "Safe-interval path planning with LNS repair for MAPF.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(long, short, help = "Path to the YAML config file")]
    pub config: Option<String>,
    #[arg(long, help = "Path to the MovingAI map file")]
    pub map: Option<String>,
    #[arg(long, help = "Path to the agents YAML file")]
    pub agents: Option<String>,
    #[arg(long, help = "Path to the MovingAI scenario file")]
    pub scen: Option<String>,
    #[arg(long, help = "Number of agents sampled from the scenario")]
    pub num_agents: Option<usize>,
    #[arg(long, help = "Time limit in seconds")]
    pub time_limit: Option<f64>,
    #[arg(long, help = "Random seed")]
    pub seed: Option<u64>,
}

#[derive(Serialize, Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub map_path: String,
    pub agent_path: String,
    pub scen_path: String,
    pub num_agents: usize,
    pub init_algo: String,
    pub replan_algo: String,
    pub init_destroy: String,
    pub neighbor_size: usize,
    pub time_limit: f64,
    pub seed: u64,
    pub screen: usize,
    pub stats_output: String,
    pub result_output: String,
    pub paths_output: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_path: String::new(),
            agent_path: String::new(),
            scen_path: String::new(),
            num_agents: 0,
            init_algo: "PP".to_string(),
            replan_algo: "PP".to_string(),
            init_destroy: "adaptive".to_string(),
            neighbor_size: 8,
            time_limit: 60.0,
            seed: 0,
            screen: 0,
            stats_output: String::new(),
            result_output: String::new(),
            paths_output: String::new(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(config_str: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(config_str)?;
        config.validate()
    }

    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(map) = &cli.map {
            self.map_path = map.clone();
        }
        if let Some(agents) = &cli.agents {
            self.agent_path = agents.clone();
        }
        if let Some(scen) = &cli.scen {
            self.scen_path = scen.clone();
        }
        if let Some(num_agents) = cli.num_agents {
            self.num_agents = num_agents;
        }
        if let Some(time_limit) = cli.time_limit {
            self.time_limit = time_limit;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        self.validate()
    }

    pub fn validate(self) -> anyhow::Result<Self> {
        for algo in [&self.init_algo, &self.replan_algo] {
            if !matches!(algo.as_str(), "PP" | "GCBS" | "PBS") {
                anyhow::bail!("unknown algorithm {algo:?}");
            }
        }
        if !matches!(
            self.init_destroy.as_str(),
            "collision" | "target" | "random" | "adaptive"
        ) {
            anyhow::bail!("unknown destroy heuristic {:?}", self.init_destroy);
        }
        if self.neighbor_size < 2 {
            anyhow::bail!("neighbor size must be at least 2");
        }
        if self.time_limit <= 0.0 {
            anyhow::bail!("time limit must be positive");
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default().validate().unwrap();
        assert_eq!(config.init_algo, "PP");
        assert_eq!(config.neighbor_size, 8);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = Config::from_yaml_str(
            "init_destroy: collision\nneighbor_size: 4\ntime_limit: 10.0\nseed: 42\n",
        )
        .unwrap();
        assert_eq!(config.init_destroy, "collision");
        assert_eq!(config.neighbor_size, 4);
        assert_eq!(config.seed, 42);
        // untouched keys keep their defaults
        assert_eq!(config.replan_algo, "PP");
    }

    #[test]
    fn test_unknown_algorithm_is_fatal() {
        assert!(Config::from_yaml_str("init_algo: CBS\n").is_err());
        assert!(Config::from_yaml_str("init_destroy: nonsense\n").is_err());
    }
}
