use serde::{Deserialize, Serialize};

use crate::input_modeling::UniformRNG;

/// The simulation loop provides a uniform random number generator and the
/// simulation clock to the source and stations during event dispatch.  The
/// loop owns its `Services` exclusively, and only the loop advances the
/// clock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Services {
    uniform_rng: UniformRNG,
    global_time: f64,
}

impl Services {
    pub fn new(uniform_rng: UniformRNG) -> Self {
        Self {
            uniform_rng,
            global_time: 0.0,
        }
    }

    pub fn uniform_rng(&mut self) -> &mut UniformRNG {
        &mut self.uniform_rng
    }

    pub fn global_time(&self) -> f64 {
        self.global_time
    }

    pub fn set_global_time(&mut self, time: f64) {
        self.global_time = time;
    }
}
