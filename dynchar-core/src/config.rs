//! Characterization settings.
//!
//! All fields have defaults, so a configuration file only needs to contain the
//! values that differ:
//!
//! ```toml
//! metric = "pGWP"
//! time_horizon = 100
//! fixed_time_horizon = true
//! time_horizon_start = "2030-01-01T00:00:00"
//!
//! [scenario]
//! iam = "IMAGE"
//! ssp = "SSP1"
//! rcp = "2.6"
//! ```

use crate::errors::{DynCharError, DynCharResult};
use crate::scenario::Scenario;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quantity the inventory is characterized into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Yearly radiative forcing in W/m^2
    #[default]
    #[serde(rename = "radiative_forcing")]
    RadiativeForcing,
    /// Global warming potential, as kg CO2-eq
    #[serde(rename = "GWP")]
    Gwp,
    /// Prospective global warming potential, as kg CO2-eq
    #[serde(rename = "pGWP")]
    Pgwp,
    /// Prospective global temperature change potential, as kg CO2-eq
    #[serde(rename = "pGTP")]
    Pgtp,
    /// Yearly radiative forcing in W/m^2 using scenario-dependent data
    #[serde(rename = "prospective_radiative_forcing")]
    ProspectiveRadiativeForcing,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::RadiativeForcing,
        Metric::Gwp,
        Metric::Pgwp,
        Metric::Pgtp,
        Metric::ProspectiveRadiativeForcing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::RadiativeForcing => "radiative_forcing",
            Metric::Gwp => "GWP",
            Metric::Pgwp => "pGWP",
            Metric::Pgtp => "pGTP",
            Metric::ProspectiveRadiativeForcing => "prospective_radiative_forcing",
        }
    }

    /// Whether the metric depends on the selected scenario
    pub fn is_prospective(&self) -> bool {
        matches!(
            self,
            Metric::Pgwp | Metric::Pgtp | Metric::ProspectiveRadiativeForcing
        )
    }

    /// Whether the metric yields one CO2-equivalent value per emission instead of a series
    pub fn is_equivalence(&self) -> bool {
        matches!(self, Metric::Gwp | Metric::Pgwp | Metric::Pgtp)
    }
}

impl FromStr for Metric {
    type Err = DynCharError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.as_str() == s)
            .ok_or_else(|| DynCharError::InvalidMetric(s.to_string()))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to return when no emission could be characterized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyResultPolicy {
    /// Fail with [`DynCharError::NoCharacterizedFlows`]
    #[default]
    Error,
    /// Return an empty inventory
    Empty,
}

/// How the rows of an inventory are dispatched to the characterizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// One row after the other
    #[default]
    RowWise,
    /// Rows grouped by flow so each kernel is resolved once
    Batched,
    /// Rows characterized on the rayon thread pool
    Parallel,
}

/// Temperature impulse response used when pGTP falls back to static kernels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureModel {
    /// The configured two-box energy balance model
    #[default]
    TwoBox,
    /// Two-exponential fit of IPCC AR5
    Ar5,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterizationConfig {
    pub metric: Metric,
    /// Length of the time horizon in years
    pub time_horizon: usize,
    /// Evaluate every emission up to the same end date (Levasseur et al. 2010)
    pub fixed_time_horizon: bool,
    /// Start of a fixed time horizon. Defaults to the time of the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_horizon_start: Option<NaiveDateTime>,
    /// Let the radiative efficiency evolve with the scenario after the emission year
    pub time_varying_re: bool,
    /// Use static IPCC kernels for flows without prospective data
    pub fallback_to_ipcc: bool,
    pub static_temperature_response: TemperatureModel,
    pub empty_result: EmptyResultPolicy,
    pub execution: ExecutionStrategy,
    /// Scenario for prospective metrics. Takes precedence over the process-wide store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<Scenario>,
}

impl Default for CharacterizationConfig {
    fn default() -> Self {
        Self {
            metric: Metric::RadiativeForcing,
            time_horizon: 100,
            fixed_time_horizon: false,
            time_horizon_start: None,
            time_varying_re: false,
            fallback_to_ipcc: false,
            static_temperature_response: TemperatureModel::TwoBox,
            empty_result: EmptyResultPolicy::Error,
            execution: ExecutionStrategy::RowWise,
            scenario: None,
        }
    }
}

impl CharacterizationConfig {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            ..Default::default()
        }
    }

    pub fn from_toml(contents: &str) -> DynCharResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> DynCharResult<String> {
        toml::to_string(self).map_err(|e| DynCharError::Configuration(e.to_string()))
    }

    /// Start of the horizon, falling back to `now` when none was configured
    pub fn horizon_start(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.time_horizon_start.unwrap_or(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{Iam, Rcp};
    use chrono::NaiveDate;

    #[test]
    fn metric_from_str() {
        assert_eq!("GWP".parse::<Metric>().unwrap(), Metric::Gwp);
        assert_eq!("pGTP".parse::<Metric>().unwrap(), Metric::Pgtp);
        assert_eq!(
            "prospective_radiative_forcing".parse::<Metric>().unwrap(),
            Metric::ProspectiveRadiativeForcing
        );
        assert_eq!(
            "GTP".parse::<Metric>(),
            Err(DynCharError::InvalidMetric("GTP".to_string()))
        );
        // Names are case sensitive
        assert!("gwp".parse::<Metric>().is_err());
    }

    #[test]
    fn metric_classification() {
        assert!(!Metric::RadiativeForcing.is_prospective());
        assert!(!Metric::Gwp.is_prospective());
        assert!(Metric::ProspectiveRadiativeForcing.is_prospective());
        assert!(Metric::Gwp.is_equivalence());
        assert!(!Metric::ProspectiveRadiativeForcing.is_equivalence());
    }

    #[test]
    fn defaults_from_empty_toml() {
        let config = CharacterizationConfig::from_toml("").unwrap();
        assert_eq!(config, CharacterizationConfig::default());
        assert_eq!(config.time_horizon, 100);
        assert_eq!(config.empty_result, EmptyResultPolicy::Error);
        assert_eq!(config.static_temperature_response, TemperatureModel::TwoBox);
    }

    #[test]
    fn partial_toml() {
        let config = CharacterizationConfig::from_toml(
            r#"
metric = "pGWP"
fixed_time_horizon = true
time_horizon_start = "2030-01-01T00:00:00"
execution = "parallel"
static_temperature_response = "ar5"

[scenario]
iam = "IMAGE"
ssp = "SSP1"
rcp = "2.6"
"#,
        )
        .unwrap();

        assert_eq!(config.metric, Metric::Pgwp);
        assert!(config.fixed_time_horizon);
        assert_eq!(config.execution, ExecutionStrategy::Parallel);
        assert_eq!(config.static_temperature_response, TemperatureModel::Ar5);
        assert_eq!(
            config.time_horizon_start,
            NaiveDate::from_ymd_opt(2030, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
        );
        let scenario = config.scenario.unwrap();
        assert_eq!(scenario.iam(), Iam::Image);
        assert_eq!(scenario.rcp(), Rcp::Rcp26);
    }

    #[test]
    fn invalid_scenario_in_toml_is_a_configuration_error() {
        let err = CharacterizationConfig::from_toml(
            r#"
[scenario]
iam = "IMAGE"
ssp = "SSP2"
rcp = "2.6"
"#,
        )
        .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn toml_round_trip() {
        let mut config = CharacterizationConfig::new(Metric::Pgtp);
        config.time_horizon = 20;
        config.time_varying_re = true;
        config.scenario = Some(Scenario::parse("REMIND", "SSP5", "8.5").unwrap());

        let serialised = config.to_toml().unwrap();
        let deserialised = CharacterizationConfig::from_toml(&serialised).unwrap();
        assert_eq!(config, deserialised);
    }

    #[test]
    fn horizon_start_defaults_to_now() {
        let now = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let config = CharacterizationConfig::default();
        assert_eq!(config.horizon_start(now), now);
    }
}
