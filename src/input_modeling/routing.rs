//! Categorical routing over a fixed probability vector, by inverse-CDF
//! selection on a single uniform draw.

use serde::{Deserialize, Serialize};

use super::UniformRNG;
use crate::utils::errors::SimulationError;
use crate::utils::PROBABILITY_TOLERANCE;

/// Select the outcome of `probabilities` whose cumulative interval contains
/// `draw`.  The probabilities may sum to less than 1, in which case a draw
/// beyond the total selects the implicit overflow outcome, returned as
/// `probabilities.len()`.
pub fn choose(probabilities: &[f64], draw: f64) -> Result<usize, SimulationError> {
    Ok(Router::new(probabilities)?.choose(draw))
}

/// A validated probability vector, with its cumulative distribution
/// precomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Router {
    probabilities: Vec<f64>,
    cumulative: Vec<f64>,
}

impl Router {
    pub fn new(probabilities: &[f64]) -> Result<Self, SimulationError> {
        if probabilities.is_empty() {
            return Err(SimulationError::EmptyProbabilities);
        }
        if let Some(value) = probabilities
            .iter()
            .find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0)
        {
            return Err(SimulationError::InvalidProbability { value: *value });
        }
        let mut cumulative: Vec<f64> = probabilities
            .iter()
            .scan(0.0, |total, p| {
                *total += p;
                Some(*total)
            })
            .collect();
        let sum = cumulative[cumulative.len() - 1];
        if sum > 1.0 + PROBABILITY_TOLERANCE {
            return Err(SimulationError::InvalidRoutingVector { sum });
        }
        // A complete distribution must never overflow on rounding error
        if (sum - 1.0).abs() <= PROBABILITY_TOLERANCE {
            let last = cumulative.len() - 1;
            cumulative[last] = 1.0;
        }
        Ok(Self {
            probabilities: probabilities.to_vec(),
            cumulative,
        })
    }

    /// Like `new`, but the probabilities must describe a complete
    /// distribution (sum to 1), with no overflow outcome.
    pub fn complete(probabilities: &[f64]) -> Result<Self, SimulationError> {
        let router = Self::new(probabilities)?;
        if router.overflow() > 0.0 {
            return Err(SimulationError::InvalidRoutingVector {
                sum: router.total(),
            });
        }
        Ok(router)
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// The number of explicit outcomes.  The overflow outcome, if any, is
    /// the index equal to this value.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Probability of the implicit overflow outcome.
    pub fn overflow(&self) -> f64 {
        (1.0 - self.total()).max(0.0)
    }

    /// The first outcome whose cumulative probability exceeds `draw`, so
    /// zero-probability outcomes are never selected.
    pub fn choose(&self, draw: f64) -> usize {
        self.cumulative.partition_point(|c| *c <= draw)
    }

    /// Draw one uniform random number and route on it.
    pub fn sample(&self, uniform_rng: &mut UniformRNG) -> usize {
        self.choose(uniform_rng.rn())
    }
}
