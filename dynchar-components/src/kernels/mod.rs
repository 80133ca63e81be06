//! Impulse-response kernels.
//!
//! A kernel turns one [`EmissionRecord`] into the radiative forcing series it
//! causes over a number of years. The set of kernels is closed apart from
//! [`Kernel::Custom`], which wraps any [`CharacterizationFunction`].

mod cache;
mod generic;
mod ipcc;

pub use cache::{MultiplierCache, MULTIPLIER_CACHE};
pub use generic::DecaySeries;
pub use ipcc::{co2_integrated_response, StaticGas};

use crate::prospective::{self, ProspectiveContext};
use dynchar_core::data::ProspectiveGas;
use dynchar_core::errors::{DynCharError, DynCharResult};
use dynchar_core::timeseries::{CharacterizedSeries, EmissionRecord, FloatValue, ForcingMode};
use ndarray::Array1;
use std::fmt;
use std::sync::Arc;

/// A user-supplied characterization function.
///
/// The returned series is used as is; implementations decide whether their
/// amounts are marginal or cumulative.
pub trait CharacterizationFunction: Send + Sync {
    fn characterize(&self, record: &EmissionRecord, period: usize) -> DynCharResult<CharacterizedSeries>;
}

impl<F> CharacterizationFunction for F
where
    F: Fn(&EmissionRecord, usize) -> DynCharResult<CharacterizedSeries> + Send + Sync,
{
    fn characterize(&self, record: &EmissionRecord, period: usize) -> DynCharResult<CharacterizedSeries> {
        self(record, period)
    }
}

/// Identity of a kernel without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    Co2,
    Co2Uptake,
    Co,
    Ch4,
    N2o,
    Generic,
    ProspectiveCo2,
    ProspectiveCo2Uptake,
    ProspectiveCh4,
    ProspectiveN2o,
    Custom,
}

impl KernelKind {
    pub const ALL: [KernelKind; 11] = [
        KernelKind::Co2,
        KernelKind::Co2Uptake,
        KernelKind::Co,
        KernelKind::Ch4,
        KernelKind::N2o,
        KernelKind::Generic,
        KernelKind::ProspectiveCo2,
        KernelKind::ProspectiveCo2Uptake,
        KernelKind::ProspectiveCh4,
        KernelKind::ProspectiveN2o,
        KernelKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KernelKind::Co2 => "CO2",
            KernelKind::Co2Uptake => "CO2 uptake",
            KernelKind::Co => "CO",
            KernelKind::Ch4 => "CH4",
            KernelKind::N2o => "N2O",
            KernelKind::Generic => "generic",
            KernelKind::ProspectiveCo2 => "prospective CO2",
            KernelKind::ProspectiveCo2Uptake => "prospective CO2 uptake",
            KernelKind::ProspectiveCh4 => "prospective CH4",
            KernelKind::ProspectiveN2o => "prospective N2O",
            KernelKind::Custom => "custom",
        }
    }

    pub fn from_name(name: &str) -> Option<KernelKind> {
        KernelKind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone)]
pub enum Kernel {
    Co2,
    Co2Uptake,
    Co,
    Ch4,
    N2o,
    Generic(DecaySeries),
    ProspectiveCo2,
    ProspectiveCo2Uptake,
    ProspectiveCh4,
    ProspectiveN2o,
    Custom(Arc<dyn CharacterizationFunction>),
}

impl Kernel {
    pub fn custom<F: CharacterizationFunction + 'static>(function: F) -> Self {
        Kernel::Custom(Arc::new(function))
    }

    pub fn generic(multipliers: &[FloatValue]) -> Self {
        Kernel::Generic(DecaySeries::new(multipliers))
    }

    /// Built-in kernel of `kind`; `None` for kinds that carry a payload
    pub fn from_kind(kind: KernelKind) -> Option<Kernel> {
        let kernel = match kind {
            KernelKind::Co2 => Kernel::Co2,
            KernelKind::Co2Uptake => Kernel::Co2Uptake,
            KernelKind::Co => Kernel::Co,
            KernelKind::Ch4 => Kernel::Ch4,
            KernelKind::N2o => Kernel::N2o,
            KernelKind::ProspectiveCo2 => Kernel::ProspectiveCo2,
            KernelKind::ProspectiveCo2Uptake => Kernel::ProspectiveCo2Uptake,
            KernelKind::ProspectiveCh4 => Kernel::ProspectiveCh4,
            KernelKind::ProspectiveN2o => Kernel::ProspectiveN2o,
            KernelKind::Generic | KernelKind::Custom => return None,
        };
        Some(kernel)
    }

    pub fn kind(&self) -> KernelKind {
        match self {
            Kernel::Co2 => KernelKind::Co2,
            Kernel::Co2Uptake => KernelKind::Co2Uptake,
            Kernel::Co => KernelKind::Co,
            Kernel::Ch4 => KernelKind::Ch4,
            Kernel::N2o => KernelKind::N2o,
            Kernel::Generic(_) => KernelKind::Generic,
            Kernel::ProspectiveCo2 => KernelKind::ProspectiveCo2,
            Kernel::ProspectiveCo2Uptake => KernelKind::ProspectiveCo2Uptake,
            Kernel::ProspectiveCh4 => KernelKind::ProspectiveCh4,
            Kernel::ProspectiveN2o => KernelKind::ProspectiveN2o,
            Kernel::Custom(_) => KernelKind::Custom,
        }
    }

    /// Whether the kernel needs scenario data
    pub fn is_prospective(&self) -> bool {
        self.prospective_gas().is_some()
    }

    /// Whether the kernel describes removal of CO2 from the atmosphere
    pub fn is_uptake(&self) -> bool {
        matches!(self, Kernel::Co2Uptake | Kernel::ProspectiveCo2Uptake)
    }

    /// Gas whose scenario data a prospective kernel uses
    pub fn prospective_gas(&self) -> Option<ProspectiveGas> {
        match self {
            Kernel::ProspectiveCo2 | Kernel::ProspectiveCo2Uptake => Some(ProspectiveGas::Co2),
            Kernel::ProspectiveCh4 => Some(ProspectiveGas::Ch4),
            Kernel::ProspectiveN2o => Some(ProspectiveGas::N2o),
            _ => None,
        }
    }

    /// Scenario-dependent version of a static kernel, if one exists
    pub fn prospective_counterpart(&self) -> Option<Kernel> {
        match self {
            Kernel::Co2 => Some(Kernel::ProspectiveCo2),
            Kernel::Co2Uptake => Some(Kernel::ProspectiveCo2Uptake),
            Kernel::Ch4 => Some(Kernel::ProspectiveCh4),
            Kernel::N2o => Some(Kernel::ProspectiveN2o),
            Kernel::ProspectiveCo2
            | Kernel::ProspectiveCo2Uptake
            | Kernel::ProspectiveCh4
            | Kernel::ProspectiveN2o => Some(self.clone()),
            _ => None,
        }
    }

    fn static_gas(&self) -> Option<StaticGas> {
        match self {
            Kernel::Co2 | Kernel::Co2Uptake => Some(StaticGas::Co2),
            Kernel::Co => Some(StaticGas::Co),
            Kernel::Ch4 => Some(StaticGas::Ch4),
            Kernel::N2o => Some(StaticGas::N2o),
            _ => None,
        }
    }

    /// Forcing series of `record` over `period` years.
    ///
    /// Prospective kernels need a `prospective` context and fail with
    /// [`DynCharError::ScenarioNotConfigured`] without one.
    pub fn evaluate(
        &self,
        record: &EmissionRecord,
        period: usize,
        mode: ForcingMode,
        prospective: Option<&ProspectiveContext>,
    ) -> DynCharResult<CharacterizedSeries> {
        if let Some(gas) = self.static_gas() {
            let multipliers = gas.multipliers(period);
            return self.scale(record, &multipliers, mode);
        }

        match self {
            Kernel::Generic(series) => self.scale(record, series.truncated(period), mode),
            Kernel::Custom(function) => function.characterize(record, period),
            _ => {
                let gas = self.prospective_gas().ok_or_else(|| {
                    DynCharError::Error(format!("{} kernel cannot be evaluated", self.kind()))
                })?;
                let context = prospective.ok_or(DynCharError::ScenarioNotConfigured)?;
                let series = prospective::radiative_forcing(context, gas, record, period, mode)?;
                Ok(if self.is_uptake() { series.negated() } else { series })
            }
        }
    }

    fn scale(
        &self,
        record: &EmissionRecord,
        multipliers: &[FloatValue],
        mode: ForcingMode,
    ) -> DynCharResult<CharacterizedSeries> {
        let mut cumulative: Array1<FloatValue> =
            multipliers.iter().map(|m| record.amount * m).collect();
        if self.is_uptake() {
            cumulative.mapv_inplace(|v| -v);
        }
        CharacterizedSeries::from_cumulative(record, cumulative, mode)
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kernel::Generic(series) => f.debug_tuple("Generic").field(&series.len()).finish(),
            Kernel::Custom(_) => f.write_str("Custom(..)"),
            _ => write!(f, "{:?}", self.kind()),
        }
    }
}

impl PartialEq for Kernel {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Kernel::Generic(a), Kernel::Generic(b)) => a == b,
            (Kernel::Custom(a), Kernel::Custom(b)) => Arc::ptr_eq(a, b),
            _ => self.kind() == other.kind(),
        }
    }
}
