use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DynCharError {
    #[error("{0}")]
    Error(String),
    #[error("Metric must be one of 'radiative_forcing', 'GWP', 'pGWP', 'pGTP' or 'prospective_radiative_forcing', not '{0}'")]
    InvalidMetric(String),
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Invalid scenario combination: ({iam}, {ssp}, {rcp}). Each IAM is associated with a specific SSP. Valid combinations: IMAGE-SSP1, MESSAGE-SSP2, AIM-SSP3, GCAM4-SSP4, REMIND-SSP5")]
    InvalidScenario {
        iam: String,
        ssp: String,
        rcp: String,
    },
    #[error("No scenario set. Call set_scenario(iam, ssp, rcp) first or provide one in the configuration.")]
    ScenarioNotConfigured,
    #[error("There are no flows to characterize. Please make sure your time horizon matches the timing of emissions and make sure there are characterization functions for the flows in the dynamic inventory.")]
    NoCharacterizedFlows,
    #[error("Unknown object: {0}")]
    UnknownObject(String),
    #[error("Missing data: {0}")]
    MissingData(String),
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

impl DynCharError {
    /// Whether the error stems from how the characterization was configured,
    /// as opposed to a failure of an external data provider.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DynCharError::InvalidMetric(_)
                | DynCharError::Configuration(_)
                | DynCharError::InvalidScenario { .. }
                | DynCharError::ScenarioNotConfigured
                | DynCharError::NoCharacterizedFlows
                | DynCharError::InvalidParameters(_)
        )
    }
}

impl From<toml::de::Error> for DynCharError {
    fn from(value: toml::de::Error) -> Self {
        DynCharError::Configuration(value.to_string())
    }
}

/// Convenience type for `Result<T, DynCharError>`.
pub type DynCharResult<T> = Result<T, DynCharError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_distinguished_from_data_errors() {
        assert!(DynCharError::InvalidMetric("foo".to_string()).is_configuration_error());
        assert!(DynCharError::ScenarioNotConfigured.is_configuration_error());
        assert!(!DynCharError::UnknownObject("flow 1".to_string()).is_configuration_error());
        assert!(!DynCharError::MissingData("RE CO2".to_string()).is_configuration_error());
    }

    #[test]
    fn invalid_metric_message_names_metric() {
        let err = DynCharError::InvalidMetric("GTP".to_string());
        assert!(err.to_string().contains("'GTP'"));
    }
}
