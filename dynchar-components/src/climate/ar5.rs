//! Temperature impulse response of IPCC AR5 (WG1 Table 8.SM.9).
//!
//! $$ R(t) = \sum_j \frac{c_j}{d_j} e^{-t / d_j} $$
//!
//! with a fast and a slow mode. See Olivié and Peters (2013)
//! <https://doi.org/10.5194/esd-4-267-2013>.

use super::TemperatureResponse;
use dynchar_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Two-mode temperature response `c_j / d_j * exp(-t / d_j)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ar5Response {
    /// Climate sensitivity of the fast and slow mode
    /// unit: K/(W/m^2)
    pub sensitivities: [FloatValue; 2],
    /// Time scales of the fast and slow mode
    /// unit: yr
    pub timescales: [FloatValue; 2],
}

/// The AR5 parameter set
pub static AR5_RESPONSE: Ar5Response = Ar5Response::ar5();

impl Ar5Response {
    pub const fn ar5() -> Self {
        Self {
            sensitivities: [0.631, 0.429],
            timescales: [8.4, 409.5],
        }
    }
}

impl Default for Ar5Response {
    fn default() -> Self {
        Self::ar5()
    }
}

impl TemperatureResponse for Ar5Response {
    fn response(&self, t: FloatValue) -> FloatValue {
        if t < 0.0 {
            return 0.0;
        }
        self.sensitivities
            .iter()
            .zip(self.timescales.iter())
            .map(|(c, d)| c / d * (-t / d).exp())
            .sum()
    }
}
