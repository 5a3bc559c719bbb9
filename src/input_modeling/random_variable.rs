//! Random variables for interarrival and service times.  A run uses a
//! single distribution `Family` for every process; each process is then
//! parameterized from its mean and coefficient of variation (CoV) into a
//! `Continuous` variable carrying only the parameters its family needs.

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use rand::distributions::Distribution;
use rand_distr::{Exp, LogNormal};
use serde::{Deserialize, Serialize};

use super::UniformRNG;
use crate::utils::ensure_positive;
use crate::utils::errors::SimulationError;

/// The distribution family applied uniformly to all arrival and service
/// processes of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Family {
    Exponential,
    Lognormal,
}

impl FromStr for Family {
    type Err = SimulationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "Exponential" => Ok(Family::Exponential),
            "Lognormal" => Ok(Family::Lognormal),
            other => Err(SimulationError::UnsupportedDistribution(other.to_string())),
        }
    }
}

impl TryFrom<String> for Family {
    type Error = SimulationError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<Family> for String {
    fn from(family: Family) -> Self {
        family.to_string()
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Exponential => write!(f, "Exponential"),
            Family::Lognormal => write!(f, "Lognormal"),
        }
    }
}

/// Log-space parameters `(mu, sigma)` of the lognormal distribution with
/// the given mean and coefficient of variation.
pub fn lognormal_parameters(mean: f64, cov: f64) -> Result<(f64, f64), SimulationError> {
    let mean = ensure_positive("mean", mean)?;
    let cov = ensure_positive("cov", cov)?;
    let sigma = (1.0 + cov.powi(2)).ln().sqrt();
    Ok((mean.ln() - sigma.powi(2) / 2.0, sigma))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Continuous {
    Exp { mean: f64 },
    LogNormal { mu: f64, sigma: f64 },
}

impl Continuous {
    /// Build the variable of `family` with the given mean.  The coefficient
    /// of variation is only used by the lognormal family - exponential
    /// variables always have a CoV of 1.
    pub fn from_moments(family: Family, mean: f64, cov: f64) -> Result<Self, SimulationError> {
        match family {
            Family::Exponential => Ok(Continuous::Exp {
                mean: ensure_positive("mean", mean)?,
            }),
            Family::Lognormal => {
                let (mu, sigma) = lognormal_parameters(mean, cov)?;
                Ok(Continuous::LogNormal { mu, sigma })
            }
        }
    }

    pub fn mean(&self) -> f64 {
        match self {
            Continuous::Exp { mean } => *mean,
            Continuous::LogNormal { mu, sigma } => (mu + sigma.powi(2) / 2.0).exp(),
        }
    }

    /// The generation of random variates drives stochastic behaviors during
    /// simulation execution.  Each call consumes exactly one variate from
    /// the simulation random number generator.
    pub fn random_variate(&self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError> {
        match self {
            Continuous::Exp { mean } => Ok(Exp::new(1.0 / mean)?.sample(uniform_rng.rng())),
            Continuous::LogNormal { mu, sigma } => {
                Ok(LogNormal::new(*mu, *sigma)?.sample(uniform_rng.rng()))
            }
        }
    }
}

/// Anything that can produce service times for a station.
pub trait ServiceDistribution {
    fn sample_service(&self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError>;
}

impl ServiceDistribution for Continuous {
    fn sample_service(&self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError> {
        self.random_variate(uniform_rng)
    }
}
