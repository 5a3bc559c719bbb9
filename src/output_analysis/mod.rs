//! The output analysis module turns station records into the sequences
//! studied downstream - interarrival, service, waiting, and departure
//! times - and provides the basic statistics used to check them.  Waiting
//! times follow the Lindley recursion for a single-server FCFS queue.

use num_traits::Float;
use serde::{Deserialize, Serialize};

pub mod export;

use crate::models::Records;
use crate::utils::errors::SimulationError;

fn sum<T: Float>(points: &[T]) -> T
where
    f64: Into<T>,
{
    points.iter().fold(0.0.into(), |sum, point| sum + *point)
}

/// This function calculates the sample mean from a set of points - a simple
/// arithmetic mean.
fn sample_mean<T: Float>(points: &[T]) -> Result<T, SimulationError>
where
    f64: Into<T>,
{
    Ok(sum(points) / usize_to_float(points.len())?)
}

/// This function calculates sample variance, given a set of points and the
/// sample mean.
fn sample_variance<T: Float>(points: &[T], mean: &T) -> Result<T, SimulationError>
where
    f64: Into<T>,
{
    Ok(points
        .iter()
        .fold(0.0.into(), |acc, point| acc + (*point - *mean).powi(2))
        / usize_to_float(points.len())?)
}

/// This function converts a usize to a Float, with an associated
/// `SimulationError` returned for failed conversions
fn usize_to_float<T: Float>(unconv: usize) -> Result<T, SimulationError> {
    T::from(unconv).ok_or(SimulationError::FloatConvError)
}

/// Lag-1 sample autocorrelation of a series: the correlation between each
/// point and its successor.  Requires at least two points with nonzero
/// variance.
pub fn lag_one_correlation<T: Float>(points: &[T]) -> Result<T, SimulationError>
where
    f64: Into<T>,
{
    if points.len() < 2 {
        return Err(SimulationError::InsufficientData {
            points: points.len(),
        });
    }
    let mean = sample_mean(points)?;
    let denominator = points
        .iter()
        .fold(0.0.into(), |acc: T, point| acc + (*point - mean).powi(2));
    let numerator = points
        .windows(2)
        .fold(0.0.into(), |acc: T, pair| acc + (pair[0] - mean) * (pair[1] - mean));
    let correlation = numerator / denominator;
    if correlation.is_finite() {
        Ok(correlation)
    } else {
        Err(SimulationError::InsufficientData {
            points: points.len(),
        })
    }
}

/// The independent sample is for independent, identically-distributed
/// (IID) samples, or where treating the data as an IID sample is
/// determined to be reasonable - for example, one statistic per
/// replication.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct IndependentSample<T> {
    points: Vec<T>,
    mean: T,
    variance: T,
}

impl<T: Float> IndependentSample<T>
where
    f64: Into<T>,
{
    /// This constructor method creates an `IndependentSample` from a vector
    /// of floating point values.
    pub fn post(points: Vec<T>) -> Result<IndependentSample<T>, SimulationError> {
        let mean = sample_mean(&points)?;
        let variance = sample_variance(&points, &mean)?;
        Ok(IndependentSample {
            points,
            mean,
            variance,
        })
    }

    /// Return the sample mean.
    pub fn point_estimate_mean(&self) -> T {
        self.mean
    }

    /// Return the sample variance.
    pub fn variance(&self) -> T {
        self.variance
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Interarrival times from absolute arrival times.  The first interarrival
/// time is measured from time zero.
pub fn interarrival_times(arrival_times: &[f64]) -> Vec<f64> {
    arrival_times
        .iter()
        .scan(0.0, |previous, time| {
            let interarrival = time - *previous;
            *previous = *time;
            Some(interarrival)
        })
        .collect()
}

/// Waiting times of the served jobs of a single-server FCFS queue, by the
/// Lindley recursion `w_0 = 0`, `w_k = max(0, w_{k-1} + s_{k-1} - a_k)`.
/// `interarrival_times` must cover at least every served job.
pub fn lindley_waiting_times(interarrival_times: &[f64], service_times: &[f64]) -> Vec<f64> {
    let mut waiting_times = Vec::with_capacity(service_times.len());
    if service_times.is_empty() {
        return waiting_times;
    }
    waiting_times.push(0.0);
    (1..service_times.len().min(interarrival_times.len())).for_each(|k| {
        let previous = waiting_times[k - 1];
        waiting_times.push(f64::max(
            0.0,
            previous + service_times[k - 1] - interarrival_times[k],
        ));
    });
    waiting_times
}

/// Everything recorded at one station during a replication, as the
/// sequences handed to downstream statistical study.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationTrace {
    pub interarrival_times: Vec<f64>,
    pub service_times: Vec<f64>,
    pub waiting_times: Vec<f64>,
    pub departure_times: Vec<f64>,
    pub job_ids: Vec<u64>,
}

impl StationTrace {
    pub fn from_records(records: &Records) -> Self {
        let interarrival_times = interarrival_times(records.arrival_times());
        let waiting_times = lindley_waiting_times(&interarrival_times, records.service_times());
        Self {
            interarrival_times,
            service_times: records.service_times().to_vec(),
            waiting_times,
            departure_times: records.departure_times().to_vec(),
            job_ids: records.job_ids().to_vec(),
        }
    }

    /// Keep at most the first `len` entries of every sequence.
    pub fn truncate(&mut self, len: usize) {
        self.interarrival_times.truncate(len);
        self.service_times.truncate(len);
        self.waiting_times.truncate(len);
        self.departure_times.truncate(len);
        self.job_ids.truncate(len);
    }

    pub fn truncated(&self, len: usize) -> Self {
        let mut trace = self.clone();
        trace.truncate(len);
        trace
    }

    pub fn departures(&self) -> usize {
        self.departure_times.len()
    }
}
