//! The models module provides the two kinds of node in an open queueing
//! network: the `Source`, which generates jobs from one or more outside
//! streams, and the single-server FCFS `Station`.

use serde::{Deserialize, Serialize};

pub mod source;
pub mod station;

pub use self::source::{Arrival, Source};
pub use self::station::{Departure, Records, Station};

/// Identifies the node an event belongs to.  Variant order matters: on a
/// tie in time and job id, outside streams fire before stations, and
/// lower indices before higher ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeRef {
    SourceStream(usize),
    Station(usize),
}

/// Where a job goes after leaving a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Route {
    Station(usize),
    Exit,
}
