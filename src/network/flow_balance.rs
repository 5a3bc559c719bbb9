//! Traffic equations of an open network.  The total arrival rate of each
//! station is its outside arrival rate plus the rates routed to it from
//! every other station,
//! `lambda_j = sum_i source[i][j] / arrival_mean_i + sum_k lambda_k P[k][j]`,
//! which lets service means be set for a target load at every station.

use std::collections::VecDeque;

use crate::utils::ensure_positive;
use crate::utils::errors::SimulationError;

const MAX_ITERATIONS: usize = 100_000;
const CONVERGENCE_TOLERANCE: f64 = 1.0e-12;

/// Stations that outside arrivals can reach, following positive-probability
/// routes.
pub fn reachable_stations(source_matrix: &[Vec<f64>], transition_matrix: &[Vec<f64>]) -> Vec<bool> {
    let mut reachable = vec![false; transition_matrix.len()];
    let mut frontier: VecDeque<usize> = VecDeque::new();
    source_matrix.iter().for_each(|row| {
        row.iter().enumerate().for_each(|(station, probability)| {
            if *probability > 0.0 && station < reachable.len() && !reachable[station] {
                reachable[station] = true;
                frontier.push_back(station);
            }
        })
    });
    while let Some(station) = frontier.pop_front() {
        transition_matrix[station]
            .iter()
            .enumerate()
            .for_each(|(next, probability)| {
                if *probability > 0.0 && next < reachable.len() && !reachable[next] {
                    reachable[next] = true;
                    frontier.push_back(next);
                }
            });
    }
    reachable
}

/// Solve the traffic equations by fixed-point iteration.  Fails with
/// `FlowBalanceDivergence` when traffic is never absorbed by exits.
pub fn arrival_rates(
    source_matrix: &[Vec<f64>],
    transition_matrix: &[Vec<f64>],
    arrival_means: &[f64],
) -> Result<Vec<f64>, SimulationError> {
    let stations = transition_matrix.len();
    let mut external = vec![0.0; stations];
    for (row, mean) in source_matrix.iter().zip(arrival_means) {
        let rate = 1.0 / ensure_positive("arrivalMean", *mean)?;
        row.iter()
            .zip(external.iter_mut())
            .for_each(|(probability, lambda)| *lambda += rate * probability);
    }
    let mut rates = external.clone();
    for _ in 0..MAX_ITERATIONS {
        let mut next = external.clone();
        transition_matrix
            .iter()
            .zip(rates.iter())
            .for_each(|(row, lambda)| {
                row.iter()
                    .zip(next.iter_mut())
                    .for_each(|(probability, target)| *target += lambda * probability)
            });
        if next.iter().any(|lambda| !lambda.is_finite()) {
            return Err(SimulationError::FlowBalanceDivergence);
        }
        let converged = next
            .iter()
            .zip(rates.iter())
            .all(|(a, b)| (a - b).abs() <= CONVERGENCE_TOLERANCE * a.abs().max(1.0));
        rates = next;
        if converged {
            return Ok(rates);
        }
    }
    Err(SimulationError::FlowBalanceDivergence)
}

/// Service means that load every station at `utilization` (arrival rate
/// times mean service time).
pub fn service_means_for_utilization(
    source_matrix: &[Vec<f64>],
    transition_matrix: &[Vec<f64>],
    arrival_means: &[f64],
    utilization: f64,
) -> Result<Vec<f64>, SimulationError> {
    let utilization = ensure_positive("utilization", utilization)?;
    arrival_rates(source_matrix, transition_matrix, arrival_means)?
        .iter()
        .enumerate()
        .map(|(station, lambda)| {
            if *lambda > 0.0 {
                Ok(utilization / lambda)
            } else {
                Err(SimulationError::UnreachableStation { station })
            }
        })
        .collect()
}
