use anyhow::{bail, Context, Result};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use tracing::info;

use crate::common::Agent;
use crate::map::Map;

/// A start/goal pair in `(row, col)` coordinates, before heuristic tables
/// are attached. This is the shape agent YAML files serialize.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentSpec {
    pub start: (usize, usize),
    pub goal: (usize, usize),
}

type Bucket = Vec<AgentSpec>;

#[derive(Debug)]
pub struct Scenario {
    pub map: String,
    pub map_width: usize,
    pub map_height: usize,
    pub buckets: HashMap<usize, Bucket>,
}

impl Scenario {
    pub fn load_from_scen(path: &str) -> Result<Scenario> {
        let file = File::open(path).with_context(|| format!("cannot open scenario {path}"))?;
        Self::parse(BufReader::new(file))
    }

    fn parse<R: BufRead>(reader: R) -> Result<Scenario> {
        let mut lines = reader.lines();

        // first line is "version x.x"
        let _version = lines.next().context("empty scenario file")??;

        let mut scenario = Scenario {
            map: String::new(),
            map_width: 0,
            map_height: 0,
            buckets: HashMap::new(),
        };

        for line in lines {
            let line = line?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 8 {
                bail!("malformed scenario line {line:?}");
            }
            let bucket_index: usize = parts[0].parse()?;

            // column-major in the file; we store (row, col)
            let spec = AgentSpec {
                start: (parts[5].parse()?, parts[4].parse()?),
                goal: (parts[7].parse()?, parts[6].parse()?),
            };

            if scenario.map.is_empty() {
                scenario.map = parts[1].to_string();
                scenario.map_width = parts[2].parse()?;
                scenario.map_height = parts[3].parse()?;
            }

            scenario
                .buckets
                .entry(bucket_index)
                .or_default()
                .push(spec);
        }

        Ok(scenario)
    }

    pub fn generate_specs_by_buckets<R: Rng + ?Sized>(
        &self,
        agent_buckets: &[usize],
        rng: &mut R,
    ) -> Result<Vec<AgentSpec>> {
        let mut specs = Vec::new();
        let mut used: HashMap<usize, HashSet<usize>> = HashMap::new();

        for &bucket_index in agent_buckets {
            let bucket = self
                .buckets
                .get(&bucket_index)
                .with_context(|| format!("bucket {bucket_index} not found"))?;

            let available: Vec<usize> = (0..bucket.len())
                .filter(|idx| used.get(&bucket_index).is_none_or(|u| !u.contains(idx)))
                .collect();
            let index = *available
                .choose(rng)
                .with_context(|| format!("no routes left in bucket {bucket_index}"))?;

            specs.push(bucket[index].clone());
            used.entry(bucket_index).or_default().insert(index);
        }

        info!("Generate scen: {specs:?}");
        Ok(specs)
    }

    pub fn generate_specs_randomly<R: Rng + ?Sized>(
        &self,
        num_agents: usize,
        rng: &mut R,
    ) -> Result<Vec<AgentSpec>> {
        let mut available: Vec<AgentSpec> = self
            .buckets
            .values()
            .flat_map(|bucket| bucket.iter().cloned())
            .collect();
        available.sort();

        if available.len() < num_agents {
            bail!(
                "only {} unique routes available for {} agents",
                available.len(),
                num_agents
            );
        }

        available.shuffle(rng);
        available.truncate(num_agents);

        info!("Generate scen: {available:?}");
        Ok(available)
    }
}

pub fn load_specs_from_yaml(path: &str) -> Result<Vec<AgentSpec>> {
    let file = File::open(path).with_context(|| format!("cannot open agent file {path}"))?;
    let specs = serde_yaml::from_reader(BufReader::new(file))?;
    Ok(specs)
}

pub fn write_specs_to_yaml(path: &str, specs: &[AgentSpec]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = io::BufWriter::new(file);
    writer.write_all(serde_yaml::to_string(&specs)?.as_bytes())?;
    Ok(())
}

/// Attaches ids and heuristic tables; rejects specs that sit on obstacles
/// or cannot reach their goal.
pub fn build_agents(specs: &[AgentSpec], map: &Map) -> Result<Vec<Agent>> {
    let mut agents = Vec::with_capacity(specs.len());
    for (id, spec) in specs.iter().enumerate() {
        let start = map.linearize_coordinate(spec.start.0, spec.start.1);
        let goal = map.linearize_coordinate(spec.goal.0, spec.goal.1);
        let agent = Agent::new(id, start, goal, map);
        if !agent.verify(map) {
            bail!("agent {id} has an unreachable or blocked route {spec:?}");
        }
        agents.push(agent);
    }
    Ok(agents)
}
