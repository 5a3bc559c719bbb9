//! The utilities module provides general capabilities, that may span the
//! input modeling, models, network, output analysis, and simulator modules.
//! The utilities are centered around errors and parameter validation.

pub mod errors;

use errors::SimulationError;

/// Probability rows are compared against their nominal total (1.0) with
/// this absolute tolerance, to absorb floating point error in configured
/// values such as `0.1 + 0.2 + 0.7`.
pub const PROBABILITY_TOLERANCE: f64 = 1.0e-9;

/// Validate that a model parameter (mean, coefficient of variation) is a
/// finite, strictly positive value.
pub fn ensure_positive(name: &'static str, value: f64) -> Result<f64, SimulationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::InvalidParameter { name, value })
    }
}

/// Validate that a vector has the length implied by the network shape.
pub fn ensure_len<T>(
    name: &'static str,
    values: &[T],
    expected: usize,
) -> Result<(), SimulationError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(SimulationError::DimensionMismatch {
            name,
            expected,
            actual: values.len(),
        })
    }
}
