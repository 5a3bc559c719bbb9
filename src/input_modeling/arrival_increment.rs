//! Interarrival increments of an outside stream.  Exponential streams are
//! plain renewal processes.  Lognormal streams carry a latent standard
//! normal value between draws and correlate consecutive latents with a
//! first-order autoregression (a lag-1 Gaussian copula): the lognormal
//! marginal is reproduced exactly, and the correlation of consecutive
//! increments matches the configured `rho`.  Nothing is imposed beyond
//! lag 1.

use rand::distributions::Distribution;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use super::random_variable::{lognormal_parameters, Continuous, Family};
use super::UniformRNG;
use crate::utils::errors::SimulationError;

const RHO_NORMAL_TOLERANCE: f64 = 1.0e-12;

/// Correlation of the underlying normals that yields lag-1 correlation
/// `rho` between consecutive lognormal(mu, `sigma`) increments:
/// `ln(rho (e^{sigma^2} - 1) + 1) / sigma^2`.  `None` when `rho` is not
/// attainable for this `sigma`.
pub fn lag_one_normal_correlation(rho: f64, sigma: f64) -> Option<f64> {
    let s2 = sigma.powi(2);
    let argument = rho * (s2.exp() - 1.0) + 1.0;
    if !rho.is_finite() || !(s2 > 0.0) || !(argument > 0.0) {
        return None;
    }
    let rho_normal = argument.ln() / s2;
    // rho = 1 rounds to within a few ulps of 1, on either side
    if (rho_normal.abs() - 1.0).abs() <= RHO_NORMAL_TOLERANCE {
        Some(rho_normal.signum())
    } else if rho_normal.abs() < 1.0 {
        Some(rho_normal)
    } else {
        None
    }
}

/// Inverse of `lag_one_normal_correlation`: the lag-1 correlation of the
/// lognormal increments produced by latent correlation `rho_normal`.
pub fn implied_lognormal_correlation(rho_normal: f64, sigma: f64) -> f64 {
    let s2 = sigma.powi(2);
    ((rho_normal * s2).exp() - 1.0) / (s2.exp() - 1.0)
}

/// Anything that can produce the next interarrival increment of a stream.
pub trait IncrementProcess {
    fn sample_increment(&mut self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrivalIncrement {
    /// Independent, identically distributed increments.
    Renewal { variable: Continuous },
    /// Lognormal increments with lag-1 correlated latent normals.
    CorrelatedLogNormal {
        mu: f64,
        sigma: f64,
        rho_normal: f64,
        /// Latent standard normal of the previous draw; `None` until the
        /// first increment is drawn.
        latent: Option<f64>,
    },
}

impl ArrivalIncrement {
    /// Build the increment process of outside stream `stream`.  `cov` and
    /// `rho` are only used by the lognormal family.
    pub fn from_moments(
        stream: usize,
        family: Family,
        mean: f64,
        cov: f64,
        rho: f64,
    ) -> Result<Self, SimulationError> {
        match family {
            Family::Exponential => Ok(ArrivalIncrement::Renewal {
                variable: Continuous::from_moments(family, mean, cov)?,
            }),
            Family::Lognormal => {
                let (mu, sigma) = lognormal_parameters(mean, cov)?;
                let rho_normal = lag_one_normal_correlation(rho, sigma)
                    .ok_or(SimulationError::CorrelationDomain { stream, rho, sigma })?;
                Ok(ArrivalIncrement::CorrelatedLogNormal {
                    mu,
                    sigma,
                    rho_normal,
                    latent: None,
                })
            }
        }
    }

    pub fn latent(&self) -> Option<f64> {
        match self {
            ArrivalIncrement::Renewal { .. } => None,
            ArrivalIncrement::CorrelatedLogNormal { latent, .. } => *latent,
        }
    }
}

impl IncrementProcess for ArrivalIncrement {
    /// Exponential streams consume one variate per increment; lognormal
    /// streams consume one standard normal.
    fn sample_increment(&mut self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError> {
        match self {
            ArrivalIncrement::Renewal { variable } => variable.random_variate(uniform_rng),
            ArrivalIncrement::CorrelatedLogNormal {
                mu,
                sigma,
                rho_normal,
                latent,
            } => {
                let epsilon: f64 = StandardNormal.sample(uniform_rng.rng());
                let z = match latent {
                    None => epsilon,
                    Some(previous) => {
                        *rho_normal * *previous + (1.0 - rho_normal.powi(2)).sqrt() * epsilon
                    }
                };
                *latent = Some(z);
                Ok((*mu + z * *sigma).exp())
            }
        }
    }
}
