use std::collections::HashSet;

use qnet::input_modeling::{Family, UniformRNG};
use qnet::models::Station;
use qnet::network::NetworkConfig;
use qnet::output_analysis::{lag_one_correlation, IndependentSample, StationTrace};
use qnet::simulator::{replicate, run_replication, Simulation};
use qnet::utils::errors::SimulationError;

/// One outside stream into station 0, which splits evenly between
/// stations 1 and 2, which both feed station 3, which exits.
fn diamond(distribution: Family, utilization: f64) -> Result<NetworkConfig, SimulationError> {
    NetworkConfig {
        source_matrix: vec![vec![1.0, 0.0, 0.0, 0.0]],
        transition_matrix: vec![
            vec![0.0, 0.5, 0.5, 0.0],
            vec![0.0, 0.0, 0.0, 1.0],
            vec![0.0, 0.0, 0.0, 1.0],
            vec![0.0, 0.0, 0.0, 0.0],
        ],
        arrival_means: vec![1.0],
        service_means: Vec::new(),
        distribution,
        arrival_covs: None,
        service_covs: None,
        rho: 0.0,
        target_departures: 1000,
    }
    .with_utilization(utilization)
}

/// Waiting times observed directly from the records: service start
/// (departure minus service time) minus arrival.
fn observed_waiting_times(station: &Station) -> Vec<f64> {
    let records = station.records();
    records
        .departure_times()
        .iter()
        .zip(records.service_times())
        .zip(records.arrival_times())
        .map(|((departure, service), arrival)| departure - service - arrival)
        .collect()
}

#[test]
fn diamond_network_reaches_the_departure_target() -> Result<(), SimulationError> {
    let config = diamond(Family::Exponential, 0.5)?;
    assert_eq!(config.service_means, vec![0.5, 1.0, 1.0, 0.5]);
    let mut simulation = Simulation::post(&config, UniformRNG::from_seed(2023))?;
    simulation.run()?;
    assert!(simulation.is_complete());
    assert!(simulation.is_consistent());
    simulation.stations().iter().for_each(|station| {
        assert!(station.departures() >= 1000);
        assert_eq!(
            station.in_system(),
            station.arrivals() - station.departures()
        );
    });
    // The slowest station has exactly reached the target
    assert_eq!(simulation.min_departures(), 1000);
    let traces = simulation.traces();
    traces.iter().for_each(|trace| {
        assert!(trace.waiting_times.iter().all(|w| *w >= 0.0));
        assert_eq!(trace.waiting_times[0], 0.0);
    });
    // Every job leaving station 0 went to station 1 or 2
    let stations = simulation.stations();
    assert_eq!(
        stations[1].arrivals() + stations[2].arrivals(),
        stations[0].departures()
    );
    assert_eq!(
        stations[3].arrivals(),
        stations[1].departures() + stations[2].departures()
    );
    Ok(())
}

#[test]
fn diamond_network_is_reproducible() -> Result<(), SimulationError> {
    let config = diamond(Family::Exponential, 0.5)?;
    let first = run_replication(&config, 17)?;
    let second = run_replication(&config, 17)?;
    let other = run_replication(&config, 18)?;
    assert_eq!(first, second);
    assert_ne!(first, other);
    Ok(())
}

#[test]
fn lindley_recursion_matches_observed_waits() -> Result<(), SimulationError> {
    let mut config = diamond(Family::Lognormal, 0.8)?;
    config.rho = 0.4;
    config.service_covs = Some(vec![0.5, 1.5, 1.0, 2.0]);
    let mut simulation = Simulation::post(&config, UniformRNG::from_seed(5))?;
    simulation.run()?;
    simulation
        .stations()
        .iter()
        .zip(simulation.traces().iter())
        .for_each(|(station, trace)| {
            let observed = observed_waiting_times(station);
            assert!(observed.len() >= 1000);
            observed
                .iter()
                .zip(trace.waiting_times.iter())
                .for_each(|(observed, lindley)| {
                    assert!((observed - lindley).abs() < 1.0e-8);
                });
        });
    Ok(())
}

#[test]
fn exponential_network_matches_configured_means() -> Result<(), SimulationError> {
    let config = diamond(Family::Exponential, 0.6)?;
    let traces = run_replication(&config, 99)?;
    let interarrival = IndependentSample::post(traces[0].interarrival_times.clone())?;
    assert!((interarrival.point_estimate_mean() - 1.0).abs() < 0.15);
    config
        .service_means
        .iter()
        .zip(traces.iter())
        .for_each(|(mean, trace)| {
            let sample = IndependentSample::post(trace.service_times.clone()).unwrap();
            assert!((sample.point_estimate_mean() - mean).abs() / mean < 0.15);
        });
    // Half of station 0's departures arrive at station 1, so its arrivals
    // come at half the rate
    let branch = IndependentSample::post(traces[1].interarrival_times.clone())?;
    assert!((branch.point_estimate_mean() - 2.0).abs() / 2.0 < 0.15);
    Ok(())
}

#[test]
fn correlated_arrivals_reach_the_entry_station() -> Result<(), SimulationError> {
    let config = NetworkConfig {
        source_matrix: vec![vec![1.0]],
        transition_matrix: vec![vec![0.0]],
        arrival_means: vec![1.0],
        service_means: vec![0.1],
        distribution: Family::Lognormal,
        arrival_covs: Some(vec![1.0]),
        service_covs: Some(vec![1.0]),
        rho: 0.6,
        target_departures: 20000,
    };
    let traces = run_replication(&config, 8)?;
    // The entry station sees the outside stream's interarrival times
    let correlation = lag_one_correlation(&traces[0].interarrival_times)?;
    assert!(correlation > 0.4 && correlation < 0.8);

    let uncorrelated = NetworkConfig { rho: 0.0, ..config };
    let traces = run_replication(&uncorrelated, 8)?;
    let correlation = lag_one_correlation(&traces[0].interarrival_times)?;
    assert!(correlation.abs() < 0.05);
    Ok(())
}

#[test]
fn multiple_streams_share_unique_job_ids() -> Result<(), SimulationError> {
    let config = NetworkConfig {
        source_matrix: vec![vec![1.0, 0.0], vec![0.2, 0.8]],
        transition_matrix: vec![vec![0.0, 0.3], vec![0.1, 0.0]],
        arrival_means: vec![2.0, 1.5],
        service_means: Vec::new(),
        distribution: Family::Exponential,
        arrival_covs: None,
        service_covs: None,
        rho: 0.0,
        target_departures: 500,
    }
    .with_utilization(0.7)?;
    let mut simulation = Simulation::post(&config, UniformRNG::default())?;
    simulation.run()?;
    assert!(simulation.is_consistent());
    simulation.stations().iter().for_each(|station| {
        let departures = station.records().departure_times();
        assert!(departures.windows(2).all(|pair| pair[0] <= pair[1]));
    });
    // Outside arrivals draw from one job counter shared by both streams
    let mut seen = HashSet::new();
    simulation.stations().iter().for_each(|station| {
        station.records().job_ids().iter().for_each(|job_id| {
            seen.insert(*job_id);
        });
    });
    assert!(seen.len() >= 500);
    Ok(())
}

#[test]
fn parallel_replications_are_independent() -> Result<(), SimulationError> {
    let config = diamond(Family::Exponential, 0.5)?;
    let replications = replicate(&config, 3, 100)?;
    assert_eq!(replications.len(), 3);
    assert_eq!(replications[0], run_replication(&config, 100)?);
    assert_ne!(replications[0], replications[2]);
    let prefixes: Vec<Vec<StationTrace>> = replications
        .iter()
        .map(|traces| traces.iter().map(|trace| trace.truncated(1000)).collect())
        .collect();
    prefixes.iter().flatten().for_each(|trace| {
        assert_eq!(trace.waiting_times.len(), 1000);
        assert_eq!(trace.job_ids.len(), 1000);
    });
    Ok(())
}

#[test]
fn unreachable_station_fails_before_simulating() {
    let config = NetworkConfig {
        source_matrix: vec![vec![1.0, 0.0]],
        transition_matrix: vec![vec![0.0, 0.0], vec![0.0, 0.0]],
        arrival_means: vec![1.0],
        service_means: vec![0.5, 0.5],
        distribution: Family::Exponential,
        arrival_covs: None,
        service_covs: None,
        rho: 0.0,
        target_departures: 10,
    };
    assert!(matches!(
        Simulation::post(&config, UniformRNG::default()),
        Err(SimulationError::UnreachableStation { station: 1 })
    ));
}

#[test]
fn invalid_correlation_fails_before_simulating() -> Result<(), SimulationError> {
    let mut config = diamond(Family::Lognormal, 0.5)?;
    config.arrival_covs = Some(vec![3.0]);
    config.rho = -0.5;
    assert!(matches!(
        Simulation::post(&config, UniformRNG::default()),
        Err(SimulationError::CorrelationDomain { stream: 0, .. })
    ));
    Ok(())
}
