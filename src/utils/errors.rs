use thiserror::Error;

/// `SimulationError` enumerates all possible errors returned by qnet
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Represents a routing or source probability vector with no outcomes
    #[error("A probability vector must contain at least one outcome")]
    EmptyProbabilities,

    /// Represents a negative or non-finite routing probability
    #[error("Probability {value} is not a finite value in [0, 1]")]
    InvalidProbability { value: f64 },

    /// Represents a routing row whose probabilities exceed (or, for an
    /// outside source, do not reach) a total of 1
    #[error("Routing vector sums to {sum}, which is not a valid probability total")]
    InvalidRoutingVector { sum: f64 },

    /// Represents a non-positive mean, coefficient of variation, or other
    /// out-of-range model parameter
    #[error("Parameter `{name}` has invalid value {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Represents a distribution family name other than `Exponential` or
    /// `Lognormal`
    #[error("Unsupported distribution family `{0}`")]
    UnsupportedDistribution(String),

    /// Represents a network without outside streams or without stations
    #[error("A network needs at least one outside stream and one station")]
    EmptyNetwork,

    /// Represents configuration vectors/matrices of inconsistent shape
    #[error("`{name}` has length {actual}, expected {expected}")]
    DimensionMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Represents a station that receives no traffic, and so can never
    /// reach the departure target
    #[error("Station {station} cannot be reached by any outside arrival")]
    UnreachableStation { station: usize },

    /// Represents a transition matrix under which traffic never leaves the
    /// network
    #[error("The traffic equations did not converge; the network is not open")]
    FlowBalanceDivergence,

    /// Represents an invalid (rho, sigma) pair for the lag-1 correlated
    /// lognormal arrival process of an outside stream
    #[error("Outside stream {stream} has no valid lag-1 normal correlation for rho = {rho}, sigma = {sigma}")]
    CorrelationDomain { stream: usize, rho: f64, sigma: f64 },

    /// Represents a pop from an empty event queue
    #[error("The event queue is empty")]
    EmptyEventQueue,

    /// Represents an event queue that drained before every station reached
    /// the departure target
    #[error("The simulation stalled with {min_departures} of {target} departures at the slowest station")]
    StalledSimulation { min_departures: usize, target: usize },

    /// Represents an invalid model state, such as a departure from an idle
    /// station
    #[error("An invalid model state was encountered")]
    InvalidModelState,

    /// Represents an invalid state of event scheduling
    #[error("An invalid state was encountered, with respect to event scheduling")]
    EventSchedulingError,

    /// Represents a series too short, or too constant, for a sample
    /// statistic such as the lag-1 correlation
    #[error("A sample of {points} points is insufficient; at least two points with nonzero variance are required")]
    InsufficientData { points: usize },

    /// Represents a failed conversion to num-traits Float
    #[error("Failed to convert to a Float value")]
    FloatConvError,

    /// Transparent serde_json errors
    #[error(transparent)]
    JSONError(#[from] serde_json::error::Error),

    /// Transparent serde_yaml errors
    #[error(transparent)]
    YAMLError(#[from] serde_yaml::Error),

    /// Transparent I/O errors
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent Exponential distribution errors
    #[error(transparent)]
    ExpError(#[from] rand_distr::ExpError),

    /// Transparent Normal (and LogNormal) distribution errors
    #[error(transparent)]
    NormalError(#[from] rand_distr::NormalError),
}
