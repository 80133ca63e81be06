//! Scenario-dependent (prospective) metrics.
//!
//! Radiative efficiencies and CO2 impulse responses depend on the
//! IAM-SSP-RCP scenario, following Barbosa Watanabe et al. (2026). All
//! functions take a [`ProspectiveContext`], which binds a data provider to a
//! scenario snapshot so that one characterization run never observes two
//! different scenarios.

mod agtp;
mod agwp;
mod forcing;

pub use agtp::agtp;
pub(crate) use agtp::convolve_at_horizon;
pub use agwp::agwp;
pub use forcing::radiative_forcing;

use crate::constants::kg_per_ppb;
use dynchar_core::data::{ProspectiveGas, ScenarioDataProvider};
use dynchar_core::errors::{DynCharError, DynCharResult};
use dynchar_core::scenario::{year_index, Scenario};
use dynchar_core::timeseries::FloatValue;

/// Scenario data bound to one scenario
#[derive(Clone, Copy)]
pub struct ProspectiveContext<'a> {
    data: &'a dyn ScenarioDataProvider,
    scenario: Scenario,
    time_varying_re: bool,
}

impl<'a> ProspectiveContext<'a> {
    pub fn new(data: &'a dyn ScenarioDataProvider, scenario: Scenario, time_varying_re: bool) -> Self {
        Self {
            data,
            scenario,
            time_varying_re,
        }
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn time_varying_re(&self) -> bool {
        self.time_varying_re
    }

    /// Forcing per kg of `gas` in each year `t` after an emission in `emission_year`.
    ///
    /// The series covers `t < min(horizon, irf.len())`. The radiative
    /// efficiency is taken at the emission year, or at `emission_year + t`
    /// (capped at the end of the data) when the efficiency varies in time.
    pub(crate) fn yearly_forcing(
        &self,
        gas: ProspectiveGas,
        emission_year: i32,
        horizon: usize,
    ) -> DynCharResult<Vec<FloatValue>> {
        let years = self.data.years(gas, self.scenario.iam())?;
        let efficiencies = self.data.radiative_efficiency(gas, &self.scenario)?;
        let irf = self.data.impulse_response(gas, self.scenario.rcp())?;

        let last = efficiencies.len().checked_sub(1).ok_or_else(|| {
            DynCharError::MissingData(format!(
                "empty radiative efficiency series for {} under {}",
                gas, self.scenario
            ))
        })?;
        let start = year_index(emission_year, years).min(last);
        let ppb_per_kg = 1.0 / kg_per_ppb(gas.molar_mass());

        let forcing = irf
            .iter()
            .take(horizon)
            .enumerate()
            .map(|(t, irf_t)| {
                let re_t = if self.time_varying_re {
                    efficiencies[(start + t).min(last)]
                } else {
                    efficiencies[start]
                };
                re_t * irf_t * ppb_per_kg
            })
            .collect();
        Ok(forcing)
    }
}

impl std::fmt::Debug for ProspectiveContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProspectiveContext")
            .field("scenario", &self.scenario)
            .field("time_varying_re", &self.time_varying_re)
            .finish_non_exhaustive()
    }
}

/// Synthetic scenario tables shaped like the published data, for tests
#[cfg(test)]
pub(crate) mod fixtures {
    use dynchar_core::data::{ProspectiveGas, ScenarioTables};
    use dynchar_core::scenario::{Rcp, Scenario};

    pub fn co2_irf(rcp_offset: f64) -> Vec<f64> {
        (0..101)
            .map(|t| {
                let t = t as f64;
                0.2173 + rcp_offset
                    + 0.2240 * (-t / 394.4).exp()
                    + 0.2824 * (-t / 36.54).exp()
                    + (0.2763 - rcp_offset) * (-t / 4.304).exp()
            })
            .collect()
    }

    pub fn tables() -> ScenarioTables {
        let years: Vec<i32> = (2020..=2150).collect();
        let n = years.len();
        let mut tables = ScenarioTables::new(years);
        tables
            .with_impulse_response(
                ProspectiveGas::Ch4,
                (0..101).map(|t| (-(t as f64) / 11.8).exp()).collect(),
            )
            .with_impulse_response(
                ProspectiveGas::N2o,
                (0..100).map(|t| (-(t as f64) / 109.0).exp()).collect(),
            );
        for (i, rcp) in Rcp::ALL.into_iter().enumerate() {
            tables.with_rcp_impulse_response(ProspectiveGas::Co2, rcp, co2_irf(0.01 * i as f64));
        }
        for scenario in Scenario::all() {
            // Efficiencies decline slowly as background concentrations rise
            let decline = |base: f64, rate: f64| -> Vec<f64> {
                (0..n).map(|k| base * (1.0 - rate * k as f64)).collect()
            };
            tables
                .with_radiative_efficiency(ProspectiveGas::Co2, scenario, decline(1.33e-5, 0.002))
                .with_radiative_efficiency(ProspectiveGas::Ch4, scenario, decline(5.7e-4, 0.001))
                .with_radiative_efficiency(ProspectiveGas::N2o, scenario, decline(2.8e-3, 0.0005));
        }
        tables
    }
}
