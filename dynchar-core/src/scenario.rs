//! Prospective scenario configuration.
//!
//! Prospective metrics depend on an Integrated Assessment Model (IAM),
//! Shared Socioeconomic Pathway (SSP) and Representative Concentration
//! Pathway (RCP). Each IAM is run for exactly one SSP and a subset of the RCPs,
//! so only the combinations listed in [`VALID_SCENARIOS`] are accepted.
//!
//! A [`Scenario`] is a small `Copy` value. Characterization takes a snapshot
//! of it once per call, either from the configuration or from a
//! [`ScenarioStore`]. The process-wide [`SCENARIO_STORE`] backs the
//! [`set_scenario`], [`get_scenario`] and [`reset_scenario`] functions.

use crate::errors::{DynCharError, DynCharResult};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{LazyLock, PoisonError, RwLock};

/// First emission year with scenario-specific radiative efficiencies
pub const MIN_SCENARIO_YEAR: i32 = 2030;
/// Last emission year with scenario-specific radiative efficiencies
pub const MAX_SCENARIO_YEAR: i32 = 2100;

/// Integrated Assessment Model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Iam {
    #[serde(rename = "AIM")]
    Aim,
    #[serde(rename = "GCAM4")]
    Gcam4,
    #[serde(rename = "IMAGE")]
    Image,
    #[serde(rename = "MESSAGE")]
    Message,
    #[serde(rename = "REMIND")]
    Remind,
}

impl Iam {
    pub const ALL: [Iam; 5] = [Iam::Aim, Iam::Gcam4, Iam::Image, Iam::Message, Iam::Remind];

    pub fn as_str(&self) -> &'static str {
        match self {
            Iam::Aim => "AIM",
            Iam::Gcam4 => "GCAM4",
            Iam::Image => "IMAGE",
            Iam::Message => "MESSAGE",
            Iam::Remind => "REMIND",
        }
    }

    /// The SSP this IAM was run for
    pub fn ssp(&self) -> Ssp {
        match self {
            Iam::Image => Ssp::Ssp1,
            Iam::Message => Ssp::Ssp2,
            Iam::Aim => Ssp::Ssp3,
            Iam::Gcam4 => Ssp::Ssp4,
            Iam::Remind => Ssp::Ssp5,
        }
    }
}

impl FromStr for Iam {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Iam::ALL
            .into_iter()
            .find(|iam| iam.as_str() == s)
            .ok_or_else(|| format!("Unknown IAM: {}", s))
    }
}

impl fmt::Display for Iam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared Socioeconomic Pathway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ssp {
    #[serde(rename = "SSP1")]
    Ssp1,
    #[serde(rename = "SSP2")]
    Ssp2,
    #[serde(rename = "SSP3")]
    Ssp3,
    #[serde(rename = "SSP4")]
    Ssp4,
    #[serde(rename = "SSP5")]
    Ssp5,
}

impl Ssp {
    pub const ALL: [Ssp; 5] = [Ssp::Ssp1, Ssp::Ssp2, Ssp::Ssp3, Ssp::Ssp4, Ssp::Ssp5];

    pub fn as_str(&self) -> &'static str {
        match self {
            Ssp::Ssp1 => "SSP1",
            Ssp::Ssp2 => "SSP2",
            Ssp::Ssp3 => "SSP3",
            Ssp::Ssp4 => "SSP4",
            Ssp::Ssp5 => "SSP5",
        }
    }
}

impl FromStr for Ssp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ssp::ALL
            .into_iter()
            .find(|ssp| ssp.as_str() == s)
            .ok_or_else(|| format!("Unknown SSP: {}", s))
    }
}

impl fmt::Display for Ssp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Representative Concentration Pathway, named by its 2100 forcing level in W/m^2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rcp {
    #[serde(rename = "2.6")]
    Rcp26,
    #[serde(rename = "4.5")]
    Rcp45,
    #[serde(rename = "6.0")]
    Rcp60,
    #[serde(rename = "8.5")]
    Rcp85,
}

impl Rcp {
    pub const ALL: [Rcp; 4] = [Rcp::Rcp26, Rcp::Rcp45, Rcp::Rcp60, Rcp::Rcp85];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rcp::Rcp26 => "2.6",
            Rcp::Rcp45 => "4.5",
            Rcp::Rcp60 => "6.0",
            Rcp::Rcp85 => "8.5",
        }
    }

    /// Key used for the CO2 impulse response tables, e.g. `RCP26`
    pub fn irf_key(&self) -> String {
        format!("RCP{}", self.as_str().replace('.', ""))
    }
}

impl FromStr for Rcp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().trim_start_matches("RCP");
        Rcp::ALL
            .into_iter()
            .find(|rcp| rcp.as_str() == normalised || rcp.as_str().replace('.', "") == normalised)
            .ok_or_else(|| format!("Unknown RCP: {}", s))
    }
}

impl fmt::Display for Rcp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Valid IAM-SSP-RCP combinations
pub const VALID_SCENARIOS: [(Iam, Ssp, Rcp); 18] = [
    // AIM - SSP3
    (Iam::Aim, Ssp::Ssp3, Rcp::Rcp45),
    (Iam::Aim, Ssp::Ssp3, Rcp::Rcp60),
    (Iam::Aim, Ssp::Ssp3, Rcp::Rcp85),
    // GCAM4 - SSP4
    (Iam::Gcam4, Ssp::Ssp4, Rcp::Rcp26),
    (Iam::Gcam4, Ssp::Ssp4, Rcp::Rcp45),
    (Iam::Gcam4, Ssp::Ssp4, Rcp::Rcp60),
    (Iam::Gcam4, Ssp::Ssp4, Rcp::Rcp85),
    // IMAGE - SSP1
    (Iam::Image, Ssp::Ssp1, Rcp::Rcp26),
    (Iam::Image, Ssp::Ssp1, Rcp::Rcp45),
    (Iam::Image, Ssp::Ssp1, Rcp::Rcp85),
    // MESSAGE - SSP2
    (Iam::Message, Ssp::Ssp2, Rcp::Rcp26),
    (Iam::Message, Ssp::Ssp2, Rcp::Rcp45),
    (Iam::Message, Ssp::Ssp2, Rcp::Rcp60),
    (Iam::Message, Ssp::Ssp2, Rcp::Rcp85),
    // REMIND - SSP5
    (Iam::Remind, Ssp::Ssp5, Rcp::Rcp26),
    (Iam::Remind, Ssp::Ssp5, Rcp::Rcp45),
    (Iam::Remind, Ssp::Ssp5, Rcp::Rcp60),
    (Iam::Remind, Ssp::Ssp5, Rcp::Rcp85),
];

/// A validated IAM-SSP-RCP combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawScenario", into = "RawScenario")]
pub struct Scenario {
    iam: Iam,
    ssp: Ssp,
    rcp: Rcp,
}

impl Scenario {
    /// Create a scenario, failing unless the combination is in [`VALID_SCENARIOS`]
    pub fn new(iam: Iam, ssp: Ssp, rcp: Rcp) -> DynCharResult<Self> {
        if !VALID_SCENARIOS.contains(&(iam, ssp, rcp)) {
            return Err(DynCharError::InvalidScenario {
                iam: iam.to_string(),
                ssp: ssp.to_string(),
                rcp: rcp.to_string(),
            });
        }
        Ok(Self { iam, ssp, rcp })
    }

    /// Parse and validate a scenario from its string names, e.g. `("IMAGE", "SSP1", "2.6")`
    pub fn parse(iam: &str, ssp: &str, rcp: &str) -> DynCharResult<Self> {
        let invalid = || DynCharError::InvalidScenario {
            iam: iam.to_string(),
            ssp: ssp.to_string(),
            rcp: rcp.to_string(),
        };
        let iam_value = iam.parse::<Iam>().map_err(|_| invalid())?;
        let ssp_value = ssp.parse::<Ssp>().map_err(|_| invalid())?;
        let rcp_value = rcp.parse::<Rcp>().map_err(|_| invalid())?;
        Self::new(iam_value, ssp_value, rcp_value)
    }

    pub fn iam(&self) -> Iam {
        self.iam
    }

    pub fn ssp(&self) -> Ssp {
        self.ssp
    }

    pub fn rcp(&self) -> Rcp {
        self.rcp
    }

    /// All valid scenarios
    pub fn all() -> impl Iterator<Item = Scenario> {
        VALID_SCENARIOS
            .into_iter()
            .map(|(iam, ssp, rcp)| Scenario { iam, ssp, rcp })
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.iam, self.ssp, self.rcp)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawScenario {
    iam: String,
    ssp: String,
    rcp: String,
}

impl TryFrom<RawScenario> for Scenario {
    type Error = DynCharError;

    fn try_from(value: RawScenario) -> Result<Self, Self::Error> {
        Scenario::parse(&value.iam, &value.ssp, &value.rcp)
    }
}

impl From<Scenario> for RawScenario {
    fn from(value: Scenario) -> Self {
        RawScenario {
            iam: value.iam.to_string(),
            ssp: value.ssp.to_string(),
            rcp: value.rcp.to_string(),
        }
    }
}

/// Holder of the currently selected scenario.
///
/// The store is only written through [`ScenarioStore::set`] and
/// [`ScenarioStore::reset`]; readers receive a copy.
#[derive(Debug, Default)]
pub struct ScenarioStore {
    current: RwLock<Option<Scenario>>,
}

impl ScenarioStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Validate and store a scenario given by its string names
    pub fn set(&self, iam: &str, ssp: &str, rcp: &str) -> DynCharResult<Scenario> {
        let scenario = Scenario::parse(iam, ssp, rcp)?;
        self.set_scenario(scenario);
        Ok(scenario)
    }

    pub fn set_scenario(&self, scenario: Scenario) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Some(scenario);
    }

    /// Copy of the current scenario
    pub fn get(&self) -> DynCharResult<Scenario> {
        let current = *self.current.read().unwrap_or_else(PoisonError::into_inner);
        current.ok_or(DynCharError::ScenarioNotConfigured)
    }

    pub fn reset(&self) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = None;
    }
}

/// Process-wide scenario store
pub static SCENARIO_STORE: LazyLock<ScenarioStore> = LazyLock::new(ScenarioStore::new);

/// Set the process-wide scenario, e.g. `set_scenario("IMAGE", "SSP1", "2.6")`.
pub fn set_scenario(iam: &str, ssp: &str, rcp: &str) -> DynCharResult<Scenario> {
    SCENARIO_STORE.set(iam, ssp, rcp)
}

/// Get a copy of the process-wide scenario.
pub fn get_scenario() -> DynCharResult<Scenario> {
    SCENARIO_STORE.get()
}

/// Clear the process-wide scenario.
pub fn reset_scenario() {
    SCENARIO_STORE.reset()
}

/// Index of `emission_year` in an ascending year axis.
///
/// Years outside [`MIN_SCENARIO_YEAR`, `MAX_SCENARIO_YEAR`] are clamped to the
/// nearest bound with a warning. The result is the left insertion index, so a
/// year missing from the axis maps to the next larger year.
pub fn year_index(emission_year: i32, years: &[i32]) -> usize {
    let year = if emission_year < MIN_SCENARIO_YEAR {
        warn!(
            "Emission year {} < {}, clamping to {}",
            emission_year, MIN_SCENARIO_YEAR, MIN_SCENARIO_YEAR
        );
        MIN_SCENARIO_YEAR
    } else if emission_year > MAX_SCENARIO_YEAR {
        warn!(
            "Emission year {} > {}, clamping to {}",
            emission_year, MAX_SCENARIO_YEAR, MAX_SCENARIO_YEAR
        );
        MAX_SCENARIO_YEAR
    } else {
        emission_year
    };

    years.partition_point(|&y| y < year)
}
