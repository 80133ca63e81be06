//! Characterization of single emissions.
//!
//! A [`Characterizer`] holds everything that is shared by the emissions of one
//! characterization run: the metric, horizon settings, the CO2 reference, the
//! scenario snapshot and the temperature response. It is immutable and
//! `Sync`, so one instance serves all execution strategies.

use crate::climate::{TemperatureResponse, AR5_RESPONSE};
use crate::kernels::Kernel;
use crate::prospective::{self, ProspectiveContext};
use chrono::NaiveDateTime;
use dynchar_core::config::{CharacterizationConfig, Metric, TemperatureModel};
use dynchar_core::data::ProspectiveGas;
use dynchar_core::errors::{DynCharError, DynCharResult};
use dynchar_core::horizon::resolve_horizon;
use dynchar_core::timeseries::{CharacterizedSeries, EmissionRecord, FloatValue, FlowId, ForcingMode};

#[derive(Debug, Clone)]
pub struct Characterizer<'a> {
    metric: Metric,
    time_horizon: usize,
    fixed_time_horizon: bool,
    horizon_start: NaiveDateTime,
    fallback_to_ipcc: bool,
    co2_reference: Kernel,
    prospective: Option<ProspectiveContext<'a>>,
    response: &'a dyn TemperatureResponse,
    /// Response for pGTP with static kernels
    static_response: &'a dyn TemperatureResponse,
}

/// Error for a static kernel under a prospective metric without `fallback_to_ipcc`
pub(crate) fn fallback_required(kernel: &Kernel, flow: FlowId, metric: Metric) -> DynCharError {
    DynCharError::Configuration(format!(
        "{} kernel for flow {} has no scenario data for {}; enable fallback_to_ipcc to use static kernels",
        kernel.kind(),
        flow,
        metric
    ))
}

impl<'a> Characterizer<'a> {
    /// `horizon_start` is only used for fixed time horizons.
    pub fn new(
        config: &CharacterizationConfig,
        horizon_start: NaiveDateTime,
        co2_reference: Kernel,
        prospective: Option<ProspectiveContext<'a>>,
        response: &'a dyn TemperatureResponse,
    ) -> Self {
        let static_response: &'a dyn TemperatureResponse = match config.static_temperature_response {
            TemperatureModel::TwoBox => response,
            TemperatureModel::Ar5 => &AR5_RESPONSE,
        };
        Self {
            metric: config.metric,
            time_horizon: config.time_horizon,
            fixed_time_horizon: config.fixed_time_horizon,
            horizon_start,
            fallback_to_ipcc: config.fallback_to_ipcc,
            co2_reference,
            prospective,
            response,
            static_response,
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Number of years `record` is evaluated for
    pub fn horizon(&self, record: &EmissionRecord) -> usize {
        resolve_horizon(
            record.date,
            self.horizon_start,
            self.time_horizon,
            self.fixed_time_horizon,
        )
    }

    /// Characterize one emission with `kernel`.
    ///
    /// Forcing metrics give a marginal series starting at the emission date,
    /// equivalence metrics a single value at the emission date.
    pub fn characterize(&self, record: &EmissionRecord, kernel: &Kernel) -> DynCharResult<CharacterizedSeries> {
        let horizon = self.horizon(record);
        match self.metric {
            Metric::ProspectiveRadiativeForcing if !kernel.is_prospective() && !self.fallback_to_ipcc => {
                Err(fallback_required(kernel, record.flow, self.metric))
            }
            Metric::RadiativeForcing | Metric::ProspectiveRadiativeForcing => {
                kernel.evaluate(record, horizon, ForcingMode::Marginal, self.prospective.as_ref())
            }
            Metric::Gwp => {
                let ratio = self.gwp(record, kernel, horizon, &self.co2_reference)?;
                Ok(CharacterizedSeries::single(record, ratio))
            }
            Metric::Pgwp | Metric::Pgtp => {
                let value = match kernel.prospective_gas() {
                    Some(gas) => self.prospective_ratio(record, gas, horizon)? * self.sign(kernel),
                    None if self.fallback_to_ipcc => self.static_ratio(record, kernel, horizon)?,
                    None => return Err(fallback_required(kernel, record.flow, self.metric)),
                };
                Ok(CharacterizedSeries::single(record, value))
            }
        }
    }

    fn sign(&self, kernel: &Kernel) -> FloatValue {
        if kernel.is_uptake() {
            -1.0
        } else {
            1.0
        }
    }

    fn context(&self) -> DynCharResult<&ProspectiveContext<'a>> {
        self.prospective
            .as_ref()
            .ok_or(DynCharError::ScenarioNotConfigured)
    }

    /// Integrated forcing of the emission relative to that of 1 kg of CO2
    fn gwp(
        &self,
        record: &EmissionRecord,
        kernel: &Kernel,
        horizon: usize,
        reference: &Kernel,
    ) -> DynCharResult<FloatValue> {
        let context = self.prospective.as_ref();
        let forcing = kernel
            .evaluate(record, horizon, ForcingMode::Marginal, context)?
            .total();
        let reference_forcing = reference
            .evaluate(&record.with_amount(1.0), self.time_horizon, ForcingMode::Marginal, context)?
            .total();
        Self::ratio(forcing, reference_forcing, self.time_horizon)
    }

    /// Scenario-based metric of `gas` relative to CO2, scaled by the emitted amount
    fn prospective_ratio(&self, record: &EmissionRecord, gas: ProspectiveGas, horizon: usize) -> DynCharResult<FloatValue> {
        let context = self.context()?;
        let year = record.year();
        let (absolute, reference) = match self.metric {
            Metric::Pgtp => (
                prospective::agtp(context, gas, year, horizon, self.response)?,
                prospective::agtp(context, ProspectiveGas::Co2, year, self.time_horizon, self.response)?,
            ),
            _ => (
                prospective::agwp(context, gas, year, horizon)?,
                prospective::agwp(context, ProspectiveGas::Co2, year, self.time_horizon)?,
            ),
        };
        Ok(record.amount * Self::ratio(absolute, reference, self.time_horizon)?)
    }

    /// Static IPCC kernels in place of scenario data
    fn static_ratio(&self, record: &EmissionRecord, kernel: &Kernel, horizon: usize) -> DynCharResult<FloatValue> {
        match self.metric {
            Metric::Pgtp => {
                let context = self.prospective.as_ref();
                let forcing = kernel.evaluate(record, horizon, ForcingMode::Marginal, context)?;
                let reference = Kernel::Co2.evaluate(
                    &record.with_amount(1.0),
                    self.time_horizon,
                    ForcingMode::Marginal,
                    None,
                )?;
                let temperature =
                    prospective::convolve_at_horizon(forcing.amounts(), horizon, self.static_response);
                let reference_temperature = prospective::convolve_at_horizon(
                    reference.amounts(),
                    self.time_horizon,
                    self.static_response,
                );
                Self::ratio(temperature, reference_temperature, self.time_horizon)
            }
            _ => self.gwp(record, kernel, horizon, &Kernel::Co2),
        }
    }

    fn ratio(value: FloatValue, reference: FloatValue, time_horizon: usize) -> DynCharResult<FloatValue> {
        if reference == 0.0 {
            return Err(DynCharError::Configuration(format!(
                "CO2 reference is zero for a time horizon of {} years",
                time_horizon
            )));
        }
        Ok(value / reference)
    }
}
