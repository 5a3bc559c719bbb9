//! Independent replications.  Each replication builds its own simulation
//! from the shared configuration and draws from its own generator, seeded
//! `base_seed + run`, so replications run in parallel without sharing any
//! state, and each is reproducible on its own.

use log::info;
use rayon::prelude::*;

use super::Simulation;
use crate::input_modeling::UniformRNG;
use crate::network::NetworkConfig;
use crate::output_analysis::StationTrace;
use crate::utils::errors::SimulationError;

/// Seed of replication `run`.
pub fn replication_seed(base_seed: u64, run: usize) -> u64 {
    base_seed.wrapping_add(run as u64)
}

/// Run one replication to completion, returning the per-station traces.
pub fn run_replication(
    config: &NetworkConfig,
    seed: u64,
) -> Result<Vec<StationTrace>, SimulationError> {
    let mut simulation = Simulation::post(config, UniformRNG::from_seed(seed))?;
    simulation.run()?;
    Ok(simulation.traces())
}

/// Run `runs` replications in parallel.  Results are returned in run
/// order; the first failing replication's error is returned instead.
pub fn replicate(
    config: &NetworkConfig,
    runs: usize,
    base_seed: u64,
) -> Result<Vec<Vec<StationTrace>>, SimulationError> {
    config.validate()?;
    (0..runs)
        .into_par_iter()
        .map(|run| {
            info!("Simulation number {}", run + 1);
            run_replication(config, replication_seed(base_seed, run))
        })
        .collect()
}
