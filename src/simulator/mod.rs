//! The simulator module provides the mechanics to drive an open queueing
//! network through discrete event simulation: the future event list, the
//! clock and random number services, the simulation loop itself, and
//! independent replications.
//!
//! The loop repeatedly pops the earliest event, advances the clock to its
//! time, and dispatches it.  An outside arrival fires the source, which
//! schedules its next arrival, and the arriving job enters its station.  A
//! service completion departs the station, which may start serving the
//! next job in line, and the departing job moves on to its routed station
//! or leaves the network.  The run ends once every station has recorded
//! the target number of departures.

use log::{debug, trace};

use crate::input_modeling::UniformRNG;
use crate::models::{NodeRef, Route, Source, Station};
use crate::network::NetworkConfig;
use crate::output_analysis::StationTrace;
use crate::utils::errors::SimulationError;

pub mod event_queue;
pub mod replication;
pub mod services;

pub use self::event_queue::{Event, EventQueue};
pub use self::replication::{replicate, run_replication};
pub use self::services::Services;

/// The `Simulation` struct includes everything needed to run one
/// replication of a network - the source, the stations, the event queue,
/// and the clock and random number generator - so concurrent replications
/// never share state.
#[derive(Debug, Clone)]
pub struct Simulation {
    source: Source,
    stations: Vec<Station>,
    events: EventQueue,
    /// Whether each station has a service completion in the event queue.
    pending_departures: Vec<bool>,
    services: Services,
    target_departures: usize,
    events_processed: u64,
}

impl Simulation {
    /// This constructor method creates a simulation from a validated
    /// network configuration, drawing every random variate from
    /// `uniform_rng`.
    pub fn post(config: &NetworkConfig, uniform_rng: UniformRNG) -> Result<Self, SimulationError> {
        config.validate()?;
        let mut services = Services::new(uniform_rng);
        let source = Source::from_moments(
            config.distribution,
            &config.arrival_means,
            &config.arrival_covs(),
            config.rho,
            &config.source_matrix,
            &mut services,
        )?;
        let service_covs = config.service_covs();
        let stations = config
            .transition_matrix
            .iter()
            .enumerate()
            .map(|(index, destination)| {
                Station::from_moments(
                    index,
                    config.distribution,
                    config.service_means[index],
                    service_covs[index],
                    destination,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_parts(source, stations, services, config.target_departures)
    }

    /// Assemble a simulation from an already constructed source and set of
    /// stations.  Stations must be indexed by position, and route over
    /// exactly the stations given.
    pub fn from_parts(
        source: Source,
        stations: Vec<Station>,
        services: Services,
        target_departures: usize,
    ) -> Result<Self, SimulationError> {
        if source.stations() != stations.len() {
            return Err(SimulationError::DimensionMismatch {
                name: "sourceMatrix row",
                expected: stations.len(),
                actual: source.stations(),
            });
        }
        for (index, station) in stations.iter().enumerate() {
            if station.index() != index || station.destination().len() != stations.len() {
                return Err(SimulationError::DimensionMismatch {
                    name: "transitionMatrix row",
                    expected: stations.len(),
                    actual: station.destination().len(),
                });
            }
        }
        let mut events = EventQueue::new();
        events.schedule(source.next_event())?;
        Ok(Self {
            pending_departures: vec![false; stations.len()],
            source,
            stations,
            events,
            services,
            target_departures,
            events_processed: 0,
        })
    }

    /// Execute a single event: pop the earliest event, advance the clock,
    /// and dispatch it to the source or the station it belongs to.  The
    /// processed event is returned.
    pub fn step(&mut self) -> Result<Event, SimulationError> {
        let event = match self.events.pop_earliest() {
            Ok(event) => event,
            Err(SimulationError::EmptyEventQueue) => {
                debug!(
                    "Event queue drained at time {} after {} events",
                    self.services.global_time(),
                    self.events_processed
                );
                return Err(SimulationError::StalledSimulation {
                    min_departures: self.min_departures(),
                    target: self.target_departures,
                });
            }
            Err(error) => return Err(error),
        };
        self.services.set_global_time(event.time);
        trace!("{:.6}: job {} at {:?}", event.time, event.job_id, event.node);
        match event.node {
            NodeRef::SourceStream(stream) => {
                let arrival = self.source.advance(stream, &mut self.services)?;
                if arrival.job_id != event.job_id {
                    return Err(SimulationError::EventSchedulingError);
                }
                self.events.schedule(self.source.next_event())?;
                self.arrive(arrival.destination, arrival.job_id)?;
            }
            NodeRef::Station(index) => {
                let station = self
                    .stations
                    .get_mut(index)
                    .ok_or(SimulationError::EventSchedulingError)?;
                let departure = station.depart(&mut self.services)?;
                if departure.job_id != event.job_id {
                    return Err(SimulationError::EventSchedulingError);
                }
                self.pending_departures[index] = false;
                if let Some(next_event) = departure.next_event {
                    self.schedule_departure(index, next_event)?;
                }
                if let Route::Station(destination) = departure.route {
                    self.arrive(destination, departure.job_id)?;
                }
            }
        }
        self.events_processed += 1;
        Ok(event)
    }

    /// Run until every station has recorded at least the target number of
    /// departures.  Stations that reach the target early keep accumulating
    /// history.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        debug!(
            "Simulating {} stations fed by {} outside streams, until {} departures per station",
            self.stations.len(),
            self.source.streams(),
            self.target_departures
        );
        while !self.is_complete() {
            self.step()?;
        }
        debug!(
            "Reached {} departures per station at time {} after {} events",
            self.target_departures,
            self.services.global_time(),
            self.events_processed
        );
        Ok(())
    }

    fn arrive(&mut self, index: usize, job_id: u64) -> Result<(), SimulationError> {
        let station = self
            .stations
            .get_mut(index)
            .ok_or(SimulationError::EventSchedulingError)?;
        if let Some(event) = station.arrive(job_id, &mut self.services)? {
            self.schedule_departure(index, event)?;
        }
        Ok(())
    }

    fn schedule_departure(&mut self, index: usize, event: Event) -> Result<(), SimulationError> {
        if self.pending_departures[index] {
            return Err(SimulationError::EventSchedulingError);
        }
        self.pending_departures[index] = true;
        self.events.schedule(event)
    }

    /// The termination counter: the fewest departures recorded at any
    /// station.
    pub fn min_departures(&self) -> usize {
        self.stations
            .iter()
            .map(Station::departures)
            .min()
            .unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        self.min_departures() >= self.target_departures
    }

    /// Every station's job accounting is consistent, and a station has a
    /// service completion pending exactly when it holds a job.
    pub fn is_consistent(&self) -> bool {
        self.stations
            .iter()
            .zip(self.pending_departures.iter())
            .all(|(station, pending)| {
                station.is_consistent() && *pending == (station.in_system() > 0)
            })
    }

    /// An accessor method for the simulation global time.
    pub fn global_time(&self) -> f64 {
        self.services.global_time()
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    pub fn target_departures(&self) -> usize {
        self.target_departures
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Interarrival, service, waiting, and departure sequences of every
    /// station, in station order.
    pub fn traces(&self) -> Vec<StationTrace> {
        self.stations
            .iter()
            .map(|station| StationTrace::from_records(station.records()))
            .collect()
    }
}
