//! The network module holds the static configuration of a queueing
//! network run: outside streams, stations, routing, distribution family,
//! and the termination target.  Configurations are loaded from JSON or
//! YAML, validated before any simulation begins, and can have their
//! service means derived from a target load with the traffic equations in
//! `flow_balance`.

use serde::{Deserialize, Serialize};

use crate::input_modeling::{Family, Router};
use crate::utils::errors::SimulationError;
use crate::utils::{ensure_len, ensure_positive};

pub mod flow_balance;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// `source_matrix[i][j]`: probability that a job from outside stream
    /// `i` enters at station `j`.  Rows sum to 1.
    pub source_matrix: Vec<Vec<f64>>,
    /// `transition_matrix[k][j]`: probability that a job leaving station
    /// `k` moves to station `j`.  Rows sum to at most 1; the remainder is
    /// the exit probability.
    pub transition_matrix: Vec<Vec<f64>>,
    /// Mean interarrival time of each outside stream.
    pub arrival_means: Vec<f64>,
    /// Mean service time of each station.
    #[serde(default)]
    pub service_means: Vec<f64>,
    pub distribution: Family,
    /// Interarrival CoV of each stream; lognormal only, defaults to 1.
    #[serde(default)]
    pub arrival_covs: Option<Vec<f64>>,
    /// Service time CoV of each station; lognormal only, defaults to 1.
    #[serde(default)]
    pub service_covs: Option<Vec<f64>>,
    /// Lag-1 correlation of consecutive interarrival times; lognormal
    /// only, shared by all streams.
    #[serde(default)]
    pub rho: f64,
    /// Departures every station must record before the run ends.
    pub target_departures: usize,
}

impl NetworkConfig {
    pub fn from_json(config: &str) -> Result<Self, SimulationError> {
        Ok(serde_json::from_str(config)?)
    }

    pub fn from_yaml(config: &str) -> Result<Self, SimulationError> {
        Ok(serde_yaml::from_str(config)?)
    }

    pub fn to_json(&self) -> Result<String, SimulationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn streams(&self) -> usize {
        self.arrival_means.len()
    }

    pub fn stations(&self) -> usize {
        self.transition_matrix.len()
    }

    pub fn arrival_covs(&self) -> Vec<f64> {
        self.arrival_covs
            .clone()
            .unwrap_or_else(|| vec![1.0; self.streams()])
    }

    pub fn service_covs(&self) -> Vec<f64> {
        self.service_covs
            .clone()
            .unwrap_or_else(|| vec![1.0; self.stations()])
    }

    /// Replace the service means so that every station runs at
    /// `utilization`, given the outside arrival rates and routing.
    pub fn with_utilization(mut self, utilization: f64) -> Result<Self, SimulationError> {
        self.validate_routing()?;
        self.service_means = flow_balance::service_means_for_utilization(
            &self.source_matrix,
            &self.transition_matrix,
            &self.arrival_means,
            utilization,
        )?;
        Ok(self)
    }

    /// Check shapes, probability rows, parameter ranges, and that every
    /// station can receive traffic.  Correlation domain errors are reported
    /// when the source is built.
    pub fn validate(&self) -> Result<(), SimulationError> {
        self.validate_routing()?;
        ensure_len("serviceMeans", &self.service_means, self.stations())?;
        self.arrival_means
            .iter()
            .try_for_each(|mean| ensure_positive("arrivalMean", *mean).map(|_| ()))?;
        self.service_means
            .iter()
            .try_for_each(|mean| ensure_positive("serviceMean", *mean).map(|_| ()))?;
        if let Some(covs) = &self.arrival_covs {
            ensure_len("arrivalCovs", covs, self.streams())?;
            covs.iter()
                .try_for_each(|cov| ensure_positive("arrivalCov", *cov).map(|_| ()))?;
        }
        if let Some(covs) = &self.service_covs {
            ensure_len("serviceCovs", covs, self.stations())?;
            covs.iter()
                .try_for_each(|cov| ensure_positive("serviceCov", *cov).map(|_| ()))?;
        }
        if !self.rho.is_finite() {
            return Err(SimulationError::InvalidParameter {
                name: "rho",
                value: self.rho,
            });
        }
        match flow_balance::reachable_stations(&self.source_matrix, &self.transition_matrix)
            .iter()
            .position(|reachable| !reachable)
        {
            Some(station) => Err(SimulationError::UnreachableStation { station }),
            None => Ok(()),
        }
    }

    fn validate_routing(&self) -> Result<(), SimulationError> {
        if self.streams() == 0 || self.stations() == 0 {
            return Err(SimulationError::EmptyNetwork);
        }
        ensure_len("sourceMatrix", &self.source_matrix, self.streams())?;
        for row in &self.source_matrix {
            ensure_len("sourceMatrix row", row, self.stations())?;
            Router::complete(row)?;
        }
        for row in &self.transition_matrix {
            ensure_len("transitionMatrix row", row, self.stations())?;
            Router::new(row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIAMOND_YAML: &str = r#"
sourceMatrix: [[1, 0, 0, 0]]
transitionMatrix:
  - [0, 0.5, 0.5, 0]
  - [0, 0, 0, 1]
  - [0, 0, 0, 1]
  - [0, 0, 0, 0]
arrivalMeans: [1]
distribution: Lognormal
serviceCovs: [0.5, 0.5, 0.5, 0.5]
rho: 0.3
targetDepartures: 100
"#;

    fn diamond() -> NetworkConfig {
        NetworkConfig::from_yaml(DIAMOND_YAML)
            .unwrap()
            .with_utilization(0.5)
            .unwrap()
    }

    #[test]
    fn yaml_configuration_loads_with_defaults() {
        let config = NetworkConfig::from_yaml(DIAMOND_YAML).unwrap();
        assert_eq!(config.distribution, Family::Lognormal);
        assert_eq!(config.streams(), 1);
        assert_eq!(config.stations(), 4);
        assert_eq!(config.arrival_covs(), vec![1.0]);
        assert_eq!(config.service_covs(), vec![0.5; 4]);
        assert!(config.service_means.is_empty());
        // Service means are still missing
        assert!(matches!(
            config.validate(),
            Err(SimulationError::DimensionMismatch {
                name: "serviceMeans",
                ..
            })
        ));
    }

    #[test]
    fn utilization_sets_service_means() {
        let config = diamond();
        assert_eq!(config.service_means, vec![0.5, 1.0, 1.0, 0.5]);
        config.validate().unwrap();
    }

    #[test]
    fn json_round_trips() {
        let config = diamond();
        let json = config.to_json().unwrap();
        assert_eq!(NetworkConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn unsupported_distribution_is_rejected() {
        let yaml = DIAMOND_YAML.replace("Lognormal", "Pareto");
        assert!(NetworkConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn malformed_networks_are_rejected() {
        let mut config = diamond();
        config.transition_matrix[0] = vec![0.0, 0.7, 0.7, 0.0];
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidRoutingVector { .. })
        ));

        let mut config = diamond();
        config.source_matrix[0] = vec![0.5, 0.0, 0.0, 0.0];
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidRoutingVector { .. })
        ));

        let mut config = diamond();
        config.service_means[2] = -1.0;
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidParameter {
                name: "serviceMean",
                ..
            })
        ));

        let mut config = diamond();
        config.service_covs = Some(vec![0.5; 3]);
        assert!(matches!(
            config.validate(),
            Err(SimulationError::DimensionMismatch { .. })
        ));

        let mut config = diamond();
        config.arrival_means.clear();
        config.source_matrix.clear();
        assert!(matches!(
            config.validate(),
            Err(SimulationError::EmptyNetwork)
        ));
    }

    #[test]
    fn stations_without_traffic_are_rejected() {
        let mut config = diamond();
        // Station 1 no longer receives any jobs
        config.transition_matrix[0] = vec![0.0, 0.0, 1.0, 0.0];
        assert!(matches!(
            config.validate(),
            Err(SimulationError::UnreachableStation { station: 1 })
        ));
    }
}
