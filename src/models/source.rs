use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::NodeRef;
use crate::input_modeling::{ArrivalIncrement, Family, IncrementProcess, Router};
use crate::simulator::{Event, Services};
use crate::utils::errors::SimulationError;
use crate::utils::ensure_len;

/// The next job to enter the network from outside: when, from which
/// stream, with which id, and at which station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrival {
    pub time: f64,
    pub stream: usize,
    pub job_id: u64,
    pub destination: usize,
}

impl Arrival {
    pub fn event(&self) -> Event {
        Event::new(self.time, self.job_id, NodeRef::SourceStream(self.stream))
    }
}

#[derive(Debug, Clone)]
struct Stream {
    increment: ArrivalIncrement,
    /// Entry station probabilities (a row of the source matrix).
    router: Router,
    next_arrival: f64,
}

/// Heap entry for a stream's next arrival.  Simultaneous arrivals fire in
/// stream index order.
#[derive(Debug, Clone, Copy)]
struct Due {
    time: f64,
    stream: usize,
}

impl Ord for Due {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.stream.cmp(&other.stream))
    }
}

impl PartialOrd for Due {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Due {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Due {}

/// The source generates jobs from one or more independent outside
/// streams.  Each stream is a renewal process (or, for lognormal streams,
/// a lag-1 correlated process) with exactly one next arrival materialized
/// at any time.  Only the globally earliest arrival is exposed; it is kept
/// at the top of a heap and its job id and entry station are drawn as
/// soon as it becomes due.  Job ids are shared across streams, so they
/// are unique within the network.
#[derive(Debug, Clone)]
pub struct Source {
    streams: Vec<Stream>,
    schedule: BinaryHeap<Reverse<Due>>,
    next_job: u64,
    due: Arrival,
}

impl Source {
    /// `source_matrix[i][j]` is the probability that a job from stream `i`
    /// enters the network at station `j`; every row must sum to 1.  The
    /// first arrival of every stream is drawn (in stream order) from time
    /// zero, then the entry station of the earliest one.
    pub fn new(
        increments: Vec<ArrivalIncrement>,
        source_matrix: &[Vec<f64>],
        services: &mut Services,
    ) -> Result<Self, SimulationError> {
        if increments.is_empty() {
            return Err(SimulationError::EmptyNetwork);
        }
        ensure_len("sourceMatrix", source_matrix, increments.len())?;
        let stations = source_matrix[0].len();
        let mut streams = Vec::with_capacity(increments.len());
        let mut schedule = BinaryHeap::with_capacity(increments.len());
        for (stream, (mut increment, row)) in increments.into_iter().zip(source_matrix).enumerate() {
            ensure_len("sourceMatrix row", row, stations)?;
            let router = Router::complete(row)?;
            let next_arrival = services.global_time()
                + increment.sample_increment(services.uniform_rng())?;
            schedule.push(Reverse(Due {
                time: next_arrival,
                stream,
            }));
            streams.push(Stream {
                increment,
                router,
                next_arrival,
            });
        }
        let Reverse(head) = *schedule.peek().ok_or(SimulationError::EventSchedulingError)?;
        let destination = streams[head.stream].router.sample(services.uniform_rng());
        Ok(Self {
            streams,
            schedule,
            next_job: 0,
            due: Arrival {
                time: head.time,
                stream: head.stream,
                job_id: 0,
                destination,
            },
        })
    }

    /// Build a source whose streams have the given interarrival means
    /// (and, for the lognormal family, coefficients of variation and the
    /// shared lag-1 correlation `rho`).
    pub fn from_moments(
        family: Family,
        arrival_means: &[f64],
        covs: &[f64],
        rho: f64,
        source_matrix: &[Vec<f64>],
        services: &mut Services,
    ) -> Result<Self, SimulationError> {
        ensure_len("arrivalCovs", covs, arrival_means.len())?;
        let increments = arrival_means
            .iter()
            .zip(covs)
            .enumerate()
            .map(|(stream, (mean, cov))| {
                ArrivalIncrement::from_moments(stream, family, *mean, *cov, rho)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(increments, source_matrix, services)
    }

    /// The currently-due arrival.
    pub fn next_arrival(&self) -> Arrival {
        self.due
    }

    pub fn next_event(&self) -> Event {
        self.due.event()
    }

    /// Fire the due arrival of `stream` at the current simulation time, and
    /// return it.  The stream's following arrival is drawn from the current
    /// time, then the entry station of the new earliest arrival is drawn.
    pub fn advance(
        &mut self,
        stream: usize,
        services: &mut Services,
    ) -> Result<Arrival, SimulationError> {
        let fired = self.due;
        if fired.stream != stream || fired.time != services.global_time() {
            return Err(SimulationError::EventSchedulingError);
        }
        self.schedule.pop();
        let increment = self.streams[stream]
            .increment
            .sample_increment(services.uniform_rng())?;
        let next_arrival = services.global_time() + increment;
        self.streams[stream].next_arrival = next_arrival;
        self.schedule.push(Reverse(Due {
            time: next_arrival,
            stream,
        }));
        let Reverse(head) = *self
            .schedule
            .peek()
            .ok_or(SimulationError::EventSchedulingError)?;
        self.next_job += 1;
        self.due = Arrival {
            time: head.time,
            stream: head.stream,
            job_id: self.next_job,
            destination: self.streams[head.stream].router.sample(services.uniform_rng()),
        };
        Ok(fired)
    }

    pub fn streams(&self) -> usize {
        self.streams.len()
    }

    /// Number of stations the source feeds.
    pub fn stations(&self) -> usize {
        self.streams[0].router.len()
    }

    /// Absolute time of the next arrival of `stream`.
    pub fn next_arrival_of(&self, stream: usize) -> Option<f64> {
        self.streams.get(stream).map(|s| s.next_arrival)
    }

    pub fn increment(&self, stream: usize) -> Option<&ArrivalIncrement> {
        self.streams.get(stream).map(|s| &s.increment)
    }
}
