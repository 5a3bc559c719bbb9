use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{NodeRef, Route};
use crate::input_modeling::{ContinuousRandomVariable, Family, Router, ServiceDistribution};
use crate::simulator::{Event, Services};
use crate::utils::errors::SimulationError;
use crate::utils::{ensure_positive, PROBABILITY_TOLERANCE};

/// A single-server, first-come-first-served queueing station with an
/// infinite buffer.  Arriving jobs enter service immediately when the
/// server is idle, and otherwise wait in a FIFO queue.  Service times are
/// sampled only when a job enters service.  On departure, the job is
/// routed to another station, or out of the network, by the station's
/// fixed routing vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    index: usize,
    service_time: ContinuousRandomVariable,
    /// Routing over every station of the network, with the exit
    /// probability appended as the final outcome.
    router: Router,
    #[serde(default)]
    state: State,
    #[serde(default)]
    records: Records,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct State {
    /// Jobs waiting behind the server, not yet in service.
    queue: VecDeque<u64>,
    /// Queued jobs plus the job in service.
    in_system: usize,
    in_service: Option<InService>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InService {
    job_id: u64,
    finish_time: f64,
}

/// Per-job history of a station, retained for output analysis.  Job ids
/// and arrival times are in arrival order; service and departure times
/// are in service order, which is the same order under FCFS.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Records {
    job_ids: Vec<u64>,
    arrival_times: Vec<f64>,
    service_times: Vec<f64>,
    departure_times: Vec<f64>,
}

impl Records {
    pub fn job_ids(&self) -> &[u64] {
        &self.job_ids
    }

    pub fn arrival_times(&self) -> &[f64] {
        &self.arrival_times
    }

    pub fn service_times(&self) -> &[f64] {
        &self.service_times
    }

    pub fn departure_times(&self) -> &[f64] {
        &self.departure_times
    }
}

/// The outcome of a service completion: the departing job, the completion
/// event of the next job in line (if one was waiting), and where the
/// departing job goes next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Departure {
    pub job_id: u64,
    pub next_event: Option<Event>,
    pub route: Route,
}

impl Station {
    /// `destination[j]` is the probability that a job leaving this station
    /// moves to station `j`; the remainder `1 - sum(destination)` is the
    /// probability of leaving the network.
    pub fn new(
        index: usize,
        service_time: ContinuousRandomVariable,
        destination: &[f64],
    ) -> Result<Self, SimulationError> {
        match service_time {
            ContinuousRandomVariable::Exp { mean } => {
                ensure_positive("serviceMean", mean)?;
            }
            ContinuousRandomVariable::LogNormal { mu, sigma } => {
                if !mu.is_finite() {
                    return Err(SimulationError::InvalidParameter {
                        name: "mu",
                        value: mu,
                    });
                }
                ensure_positive("sigma", sigma)?;
            }
        }
        let sum: f64 = destination.iter().sum();
        if sum > 1.0 + PROBABILITY_TOLERANCE {
            return Err(SimulationError::InvalidRoutingVector { sum });
        }
        let mut outcomes = destination.to_vec();
        outcomes.push((1.0 - sum).max(0.0));
        Ok(Self {
            index,
            service_time,
            router: Router::new(&outcomes)?,
            state: State::default(),
            records: Records::default(),
        })
    }

    /// Build a station whose service times have the given mean and
    /// coefficient of variation, in distribution family `family`.
    pub fn from_moments(
        index: usize,
        family: Family,
        service_mean: f64,
        cov: f64,
        destination: &[f64],
    ) -> Result<Self, SimulationError> {
        Self::new(
            index,
            ContinuousRandomVariable::from_moments(family, service_mean, cov)?,
            destination,
        )
    }

    /// A job arrives at the current simulation time.  If the server is idle
    /// the job enters service, and its completion event is returned.
    /// Otherwise the job joins the queue and no event is produced.
    pub fn arrive(
        &mut self,
        job_id: u64,
        services: &mut Services,
    ) -> Result<Option<Event>, SimulationError> {
        self.state.in_system += 1;
        self.records.job_ids.push(job_id);
        self.records.arrival_times.push(services.global_time());
        if self.state.in_service.is_some() {
            self.state.queue.push_back(job_id);
            Ok(None)
        } else {
            self.begin_service(job_id, services).map(Some)
        }
    }

    /// The job in service completes at the current simulation time.  The
    /// head of the queue, if any, enters service.  Then the departing job
    /// is routed, with exactly one routing draw.
    pub fn depart(&mut self, services: &mut Services) -> Result<Departure, SimulationError> {
        let finished = self
            .state
            .in_service
            .ok_or(SimulationError::InvalidModelState)?;
        if finished.finish_time != services.global_time() {
            return Err(SimulationError::EventSchedulingError);
        }
        self.state.in_service = None;
        self.state.in_system -= 1;
        self.records.departure_times.push(services.global_time());
        let next_event = match self.state.queue.pop_front() {
            Some(job_id) => Some(self.begin_service(job_id, services)?),
            None => None,
        };
        let route = match self.router.sample(services.uniform_rng()) {
            station if station < self.router.len() - 1 => Route::Station(station),
            _ => Route::Exit,
        };
        Ok(Departure {
            job_id: finished.job_id,
            next_event,
            route,
        })
    }

    fn begin_service(
        &mut self,
        job_id: u64,
        services: &mut Services,
    ) -> Result<Event, SimulationError> {
        let service_time = self.service_time.sample_service(services.uniform_rng())?;
        let finish_time = services.global_time() + service_time;
        self.records.service_times.push(service_time);
        self.state.in_service = Some(InService {
            job_id,
            finish_time,
        });
        Ok(Event::new(finish_time, job_id, NodeRef::Station(self.index)))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn service_time(&self) -> &ContinuousRandomVariable {
        &self.service_time
    }

    /// Routing probabilities to each station of the network.
    pub fn destination(&self) -> &[f64] {
        let probabilities = self.router.probabilities();
        &probabilities[..probabilities.len() - 1]
    }

    /// Probability of leaving the network after service here.
    pub fn p_out(&self) -> f64 {
        let probabilities = self.router.probabilities();
        probabilities[probabilities.len() - 1]
    }

    pub fn in_system(&self) -> usize {
        self.state.in_system
    }

    pub fn queue_len(&self) -> usize {
        self.state.queue.len()
    }

    /// The job in service and its scheduled completion time.
    pub fn in_service(&self) -> Option<(u64, f64)> {
        self.state
            .in_service
            .map(|in_service| (in_service.job_id, in_service.finish_time))
    }

    pub fn arrivals(&self) -> usize {
        self.records.arrival_times.len()
    }

    pub fn departures(&self) -> usize {
        self.records.departure_times.len()
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn status(&self) -> String {
        match self.state.in_service {
            Some(_) => format!["Serving, {} waiting", self.state.queue.len()],
            None => String::from("Idle"),
        }
    }

    /// Job accounting is consistent: the station holds its queue plus at
    /// most one job in service, serves whenever it holds any job, and holds
    /// exactly the jobs that arrived but have not departed.
    pub fn is_consistent(&self) -> bool {
        let serving = usize::from(self.state.in_service.is_some());
        self.state.in_system == self.state.queue.len() + serving
            && (self.state.in_system > 0) == self.state.in_service.is_some()
            && self.arrivals() == self.departures() + self.state.in_system
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exponential_station(destination: &[f64]) -> Station {
        Station::from_moments(0, Family::Exponential, 1.0, 1.0, destination).unwrap()
    }

    #[test]
    fn exit_probability_is_the_routing_remainder() {
        let station = exponential_station(&[0.25, 0.5]);
        assert_eq!(station.destination(), &[0.25, 0.5]);
        assert!((station.p_out() - 0.25).abs() < 1.0e-12);
        assert_eq!(exponential_station(&[0.0, 1.0]).p_out(), 0.0);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        assert!(matches!(
            Station::from_moments(0, Family::Exponential, 1.0, 1.0, &[0.7, 0.4]),
            Err(SimulationError::InvalidRoutingVector { .. })
        ));
        assert!(matches!(
            Station::from_moments(0, Family::Exponential, 1.0, 1.0, &[-0.1, 0.4]),
            Err(SimulationError::InvalidProbability { .. })
        ));
        assert!(Station::from_moments(0, Family::Exponential, 0.0, 1.0, &[0.5]).is_err());
        assert!(Station::new(0, ContinuousRandomVariable::Exp { mean: -1.0 }, &[0.5]).is_err());
        assert!(Station::new(
            0,
            ContinuousRandomVariable::LogNormal {
                mu: 0.0,
                sigma: 0.0
            },
            &[0.5]
        )
        .is_err());
    }

    #[test]
    fn idle_station_serves_arrivals_immediately() {
        let mut station = exponential_station(&[]);
        let mut services = Services::default();
        services.set_global_time(2.0);
        let event = station.arrive(7, &mut services).unwrap().unwrap();
        assert_eq!(event.job_id, 7);
        assert_eq!(event.node, NodeRef::Station(0));
        assert!(event.time > 2.0);
        assert_eq!(station.in_service(), Some((7, event.time)));
        assert_eq!(station.records().service_times().len(), 1);
        assert!((event.time - 2.0 - station.records().service_times()[0]).abs() < 1.0e-12);
        assert!(station.is_consistent());
    }

    #[test]
    fn busy_station_queues_without_sampling() {
        let mut station = exponential_station(&[]);
        let mut services = Services::default();
        let first = station.arrive(1, &mut services).unwrap().unwrap();
        services.set_global_time(first.time / 2.0);
        assert!(station.arrive(2, &mut services).unwrap().is_none());
        assert!(station.arrive(3, &mut services).unwrap().is_none());
        assert_eq!(station.in_system(), 3);
        assert_eq!(station.queue_len(), 2);
        // Only the job in service has a sampled service time
        assert_eq!(station.records().service_times().len(), 1);
        assert!(station.is_consistent());
    }

    #[test]
    fn departures_pull_the_queue_head_in_fcfs_order() {
        let mut station = exponential_station(&[]);
        let mut services = Services::default();
        let mut pending = station.arrive(10, &mut services).unwrap();
        station.arrive(11, &mut services).unwrap();
        station.arrive(12, &mut services).unwrap();
        let mut departed = Vec::new();
        while let Some(event) = pending {
            services.set_global_time(event.time);
            let departure = station.depart(&mut services).unwrap();
            assert_eq!(departure.job_id, event.job_id);
            // A station with no outgoing routes always exits
            assert_eq!(departure.route, Route::Exit);
            departed.push(departure.job_id);
            pending = departure.next_event;
            assert!(station.is_consistent());
        }
        assert_eq!(departed, vec![10, 11, 12]);
        assert_eq!(station.in_system(), 0);
        assert_eq!(station.in_service(), None);
        assert_eq!(station.departures(), 3);
        assert_eq!(station.status(), "Idle");
    }

    #[test]
    fn departure_from_idle_station_is_invalid() {
        let mut station = exponential_station(&[]);
        let mut services = Services::default();
        assert!(matches!(
            station.depart(&mut services),
            Err(SimulationError::InvalidModelState)
        ));
    }

    #[test]
    fn departure_off_schedule_is_invalid() {
        let mut station = exponential_station(&[]);
        let mut services = Services::default();
        let event = station.arrive(0, &mut services).unwrap().unwrap();
        services.set_global_time(event.time + 1.0);
        assert!(matches!(
            station.depart(&mut services),
            Err(SimulationError::EventSchedulingError)
        ));
        // The rejected completion leaves the job in service
        assert_eq!(station.in_service(), Some((0, event.time)));
        assert_eq!(station.in_system(), 1);
        assert!(station.is_consistent());
        services.set_global_time(event.time);
        assert_eq!(station.depart(&mut services).unwrap().job_id, 0);
        assert!(station.is_consistent());
    }

    #[test]
    fn departures_route_by_destination_probabilities() {
        let mut station = exponential_station(&[0.0, 0.5, 0.2]);
        let mut services = Services::default();
        let mut counts = [0usize; 4];
        (0..10000u64).for_each(|job_id| {
            let event = station.arrive(job_id, &mut services).unwrap().unwrap();
            services.set_global_time(event.time);
            match station.depart(&mut services).unwrap().route {
                Route::Station(destination) => counts[destination] += 1,
                Route::Exit => counts[3] += 1,
            }
        });
        assert_eq!(counts[0], 0);
        assert!((counts[1] as f64 / 10000.0 - 0.5).abs() < 0.03);
        assert!((counts[2] as f64 / 10000.0 - 0.2).abs() < 0.03);
        assert!((counts[3] as f64 / 10000.0 - 0.3).abs() < 0.03);
    }
}
