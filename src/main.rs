use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use mapf_lns::config::{Cli, Config};
use mapf_lns::map::Map;
use mapf_lns::scenario;
use mapf_lns::solver::{InitLns, Solver};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err:#}");
            return ExitCode::from(2);
        }
    };

    let filter = match config.screen {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(&config) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read config file {path}"))?;
            Config::from_yaml_str(&text)?
        }
        None => Config::default(),
    };
    config.override_from_command_line(cli)
}

fn run(config: &Config) -> Result<u8> {
    let map = Map::from_file(&config.map_path)?;

    let specs = if !config.agent_path.is_empty() {
        scenario::load_specs_from_yaml(&config.agent_path)?
    } else if !config.scen_path.is_empty() {
        let scen = scenario::Scenario::load_from_scen(&config.scen_path)?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        scen.generate_specs_randomly(config.num_agents, &mut rng)?
    } else {
        bail!("no agent file or scenario file configured");
    };
    let agents = scenario::build_agents(&specs, &map)?;

    let mut lns = InitLns::new(&map, agents, config)?;
    let Some(solution) = lns.solve() else {
        error!("no initial solution found");
        return Ok(2);
    };
    lns.validate_solution()?;

    if !config.stats_output.is_empty() {
        lns.write_iter_stats_to_file(&config.stats_output)?;
    }
    if !config.result_output.is_empty() {
        lns.write_result_to_file(&config.result_output, &config.map_path)?;
    }
    if !config.paths_output.is_empty() {
        lns.write_paths_to_file(&config.paths_output)?;
    }

    info!(
        "{}: runtime {:.3}s, sum of costs {} (initial {}), colliding pairs {}",
        lns.solver_name(),
        lns.runtime,
        solution.sum_of_costs(),
        lns.initial_sum_of_costs,
        lns.num_of_colliding_pairs
    );

    Ok(if lns.num_of_colliding_pairs == 0 { 0 } else { 1 })
}
