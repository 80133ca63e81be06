//! Static radiative forcing kernels based on IPCC AR6.
//!
//! Each kernel gives the cumulative radiative forcing (W yr/m^2) caused by
//! one kg of gas emitted at year 0, evaluated at integer years after the
//! emission. Values for year `t` do not depend on the requested period, which
//! is what allows [`super::cache`] to extend cached prefixes.
//!
//! See Joos et al. (2013) <https://doi.org/10.5194/acp-13-2793-2013> and
//! Schivley et al. (2015) <https://doi.org/10.1021/acs.est.5b01118>.

use super::cache::MULTIPLIER_CACHE;
use crate::constants::{
    radiative_efficiency_per_kg, CO2_A, CO2_A0, CO2_TAU, M_CH4, M_CO, M_CO2, M_N2O, RE_CH4_PPB,
    RE_CO2_PPB, RE_N2O_PPB, TAU_CH4, TAU_N2O,
};
use dynchar_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Gases with a closed-form static kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaticGas {
    Co2,
    Co,
    Ch4,
    N2o,
}

/// Time integral of the CO2 impulse response function from 0 to `t` years
pub fn co2_integrated_response(t: FloatValue) -> FloatValue {
    CO2_A0 * t
        + CO2_A
            .iter()
            .zip(CO2_TAU.iter())
            .map(|(a, tau)| a * tau * (1.0 - (-t / tau).exp()))
            .sum::<FloatValue>()
}

/// Time integral of a single exponential decay with lifetime `tau`
fn exponential_integrated_response(t: FloatValue, tau: FloatValue) -> FloatValue {
    tau * (1.0 - (-t / tau).exp())
}

impl StaticGas {
    /// Cumulative forcing per kg at `year` after emission
    pub fn multiplier(&self, year: usize) -> FloatValue {
        let t = year as FloatValue;
        match self {
            StaticGas::Co2 => radiative_efficiency_per_kg(RE_CO2_PPB, M_CO2) * co2_integrated_response(t),
            // CO oxidises to CO2 within months, so it is treated as the
            // equivalent mass of CO2
            StaticGas::Co => {
                M_CO2 / M_CO * radiative_efficiency_per_kg(RE_CO2_PPB, M_CO2) * co2_integrated_response(t)
            }
            StaticGas::Ch4 => {
                radiative_efficiency_per_kg(RE_CH4_PPB, M_CH4)
                    * exponential_integrated_response(t, TAU_CH4)
            }
            StaticGas::N2o => {
                radiative_efficiency_per_kg(RE_N2O_PPB, M_N2O)
                    * exponential_integrated_response(t, TAU_N2O)
            }
        }
    }

    /// Multipliers for years `0..period` without consulting the cache
    pub fn compute_multipliers(&self, period: usize) -> Vec<FloatValue> {
        (0..period).map(|year| self.multiplier(year)).collect()
    }

    /// Multipliers for years `0..period`, memoized process-wide
    pub fn multipliers(&self, period: usize) -> Arc<[FloatValue]> {
        MULTIPLIER_CACHE.get_or_compute(*self, period)
    }
}
