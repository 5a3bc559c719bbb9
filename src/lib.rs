//! # Overview
//! qnet simulates open queueing networks: jobs arrive from one or more
//! outside streams, move probabilistically between single-server
//! first-come-first-served stations with infinite buffers, and eventually
//! leave.  Runs generate interarrival, service, and waiting time traces
//! for statistical study of queueing behavior, including networks fed by
//! correlated arrival processes.
//!
//! This crate contains:
//!
//! * Input modeling, for exponential and lognormal processes, lag-1
//! correlated lognormal arrival streams, and categorical routing.
//! * Models of the outside source and of FCFS stations.
//! * Network configuration, with validation and service means derived
//! from a target load.
//! * Simulator engine, for running one replication or many in parallel.
//! * Output analysis, for Lindley waiting times, basic statistics, and
//! tabular export.
//!
//! Every random variate of a run comes from one explicitly seeded
//! generator, so a seed reproduces a trace exactly.
pub mod input_modeling;
pub mod models;
pub mod network;
pub mod output_analysis;
pub mod simulator;
pub mod utils;
