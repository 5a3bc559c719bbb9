//! The input modeling module provides the stochastic primitives of a
//! queueing network run: the seeded uniform random number generator,
//! exponential and lognormal random variables, the (optionally lag-1
//! correlated) interarrival increment processes of outside streams, and
//! categorical routing.

pub mod arrival_increment;
pub mod random_variable;
pub mod routing;
pub mod uniform_rng;

pub use arrival_increment::{ArrivalIncrement, IncrementProcess};
pub use random_variable::{Continuous as ContinuousRandomVariable, Family, ServiceDistribution};
pub use routing::Router;
pub use uniform_rng::UniformRNG;
