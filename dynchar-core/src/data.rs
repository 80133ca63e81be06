//! Interfaces to external data.
//!
//! The characterization core never reads files. Everything it needs beyond its
//! built-in constants is handed to it through the types in this module:
//!
//! - [`ScenarioDataProvider`]: per-scenario radiative efficiencies and impulse
//!   response functions for prospective metrics. [`ScenarioTables`] is an
//!   in-memory implementation which can be deserialized from any serde format.
//! - [`DecayMultiplierTable`]: integrated forcing multipliers for additional
//!   greenhouse gases keyed by CAS number.
//! - [`BiosphereDatabase`]: the LCA database that knows which flows an LCIA
//!   method characterizes and what those flows are.

use crate::errors::{DynCharError, DynCharResult};
use crate::scenario::{Iam, Rcp, Scenario};
use crate::timeseries::{FloatValue, FlowId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Gases for which scenario-dependent data exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProspectiveGas {
    #[serde(rename = "CO2")]
    Co2,
    #[serde(rename = "CH4")]
    Ch4,
    #[serde(rename = "N2O")]
    N2o,
}

impl ProspectiveGas {
    pub const ALL: [ProspectiveGas; 3] = [ProspectiveGas::Co2, ProspectiveGas::Ch4, ProspectiveGas::N2o];

    /// Molar mass in g/mol
    pub fn molar_mass(&self) -> FloatValue {
        match self {
            ProspectiveGas::Co2 => 44.01,
            ProspectiveGas::Ch4 => 16.04,
            ProspectiveGas::N2o => 44.01,
        }
    }
}

impl fmt::Display for ProspectiveGas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProspectiveGas::Co2 => write!(f, "CO2"),
            ProspectiveGas::Ch4 => write!(f, "CH4"),
            ProspectiveGas::N2o => write!(f, "N2O"),
        }
    }
}

/// Source of the scenario-dependent series used by prospective metrics.
pub trait ScenarioDataProvider: Send + Sync {
    /// Ascending year axis of the radiative efficiency series of `gas` for `iam`
    fn years(&self, gas: ProspectiveGas, iam: Iam) -> DynCharResult<&[i32]>;

    /// Radiative efficiency in W/m^2/ppb for each year of [`ScenarioDataProvider::years`]
    fn radiative_efficiency(&self, gas: ProspectiveGas, scenario: &Scenario) -> DynCharResult<&[FloatValue]>;

    /// Fraction of a pulse remaining in the atmosphere for each year after emission
    fn impulse_response(&self, gas: ProspectiveGas, rcp: Rcp) -> DynCharResult<&[FloatValue]>;
}

/// In-memory scenario data.
///
/// Radiative efficiencies are stored per gas, IAM and RCP; the SSP is implied
/// by the IAM. Impulse responses are stored per gas and RCP.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioTables {
    /// Years covered by the radiative efficiency series
    pub years: Vec<i32>,
    pub radiative_efficiency: BTreeMap<ProspectiveGas, BTreeMap<Iam, BTreeMap<Rcp, Vec<FloatValue>>>>,
    pub impulse_response: BTreeMap<ProspectiveGas, BTreeMap<Rcp, Vec<FloatValue>>>,
}

impl ScenarioTables {
    pub fn new(years: Vec<i32>) -> Self {
        Self {
            years,
            ..Default::default()
        }
    }

    /// Set the radiative efficiency series of `gas` for `scenario`
    pub fn with_radiative_efficiency(
        &mut self,
        gas: ProspectiveGas,
        scenario: Scenario,
        values: Vec<FloatValue>,
    ) -> &mut Self {
        self.radiative_efficiency
            .entry(gas)
            .or_default()
            .entry(scenario.iam())
            .or_default()
            .insert(scenario.rcp(), values);
        self
    }

    /// Use the same impulse response of `gas` for every RCP
    pub fn with_impulse_response(&mut self, gas: ProspectiveGas, values: Vec<FloatValue>) -> &mut Self {
        let by_rcp = self.impulse_response.entry(gas).or_default();
        for rcp in Rcp::ALL {
            by_rcp.insert(rcp, values.clone());
        }
        self
    }

    /// Set the impulse response of `gas` under one RCP
    pub fn with_rcp_impulse_response(
        &mut self,
        gas: ProspectiveGas,
        rcp: Rcp,
        values: Vec<FloatValue>,
    ) -> &mut Self {
        self.impulse_response.entry(gas).or_default().insert(rcp, values);
        self
    }
}

impl ScenarioDataProvider for ScenarioTables {
    fn years(&self, _gas: ProspectiveGas, _iam: Iam) -> DynCharResult<&[i32]> {
        if self.years.is_empty() {
            return Err(DynCharError::MissingData(
                "scenario tables have no year axis".to_string(),
            ));
        }
        Ok(&self.years)
    }

    fn radiative_efficiency(&self, gas: ProspectiveGas, scenario: &Scenario) -> DynCharResult<&[FloatValue]> {
        let values = self
            .radiative_efficiency
            .get(&gas)
            .and_then(|by_iam| by_iam.get(&scenario.iam()))
            .and_then(|by_rcp| by_rcp.get(&scenario.rcp()))
            .ok_or_else(|| {
                DynCharError::MissingData(format!(
                    "no radiative efficiency for {} under {}",
                    gas, scenario
                ))
            })?;

        if values.len() != self.years.len() {
            return Err(DynCharError::MissingData(format!(
                "radiative efficiency for {} under {} has {} values but the year axis has {}",
                gas,
                scenario,
                values.len(),
                self.years.len()
            )));
        }
        Ok(values)
    }

    fn impulse_response(&self, gas: ProspectiveGas, rcp: Rcp) -> DynCharResult<&[FloatValue]> {
        self.impulse_response
            .get(&gas)
            .and_then(|by_rcp| by_rcp.get(&rcp))
            .map(|values| values.as_slice())
            .ok_or_else(|| {
                DynCharError::MissingData(format!(
                    "no impulse response for {} under RCP{}",
                    gas, rcp
                ))
            })
    }
}

/// Integrated forcing multipliers (W yr/m^2/kg) per year after emission, keyed by CAS number
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecayMultiplierTable(BTreeMap<String, Vec<FloatValue>>);

impl DecayMultiplierTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cas_number: &str, multipliers: Vec<FloatValue>) -> &mut Self {
        self.0.insert(cas_number.to_string(), multipliers);
        self
    }

    pub fn get(&self, cas_number: &str) -> Option<&[FloatValue]> {
        self.0.get(cas_number).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Name of an LCIA method, e.g. `("EF v3.1", "climate change", "global warming potential (GWP100)")`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LciaMethod(pub Vec<String>);

impl LciaMethod {
    pub fn new<S: AsRef<str>>(parts: &[S]) -> Self {
        Self(parts.iter().map(|p| p.as_ref().to_string()).collect())
    }
}

impl fmt::Display for LciaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

/// How a method refers to a biosphere flow
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlowIdentifier {
    Id(FlowId),
    Key { database: String, code: String },
}

impl fmt::Display for FlowIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowIdentifier::Id(id) => write!(f, "{}", id),
            FlowIdentifier::Key { database, code } => write!(f, "({}, {})", database, code),
        }
    }
}

/// Metadata of a biosphere flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiosphereNode {
    pub id: FlowId,
    pub database: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub cas_number: Option<String>,
}

/// The LCA database holding LCIA methods and biosphere flows.
pub trait BiosphereDatabase {
    /// Identifiers of all flows that `method` assigns a characterization factor to
    fn method_flows(&self, method: &LciaMethod) -> DynCharResult<Vec<FlowIdentifier>>;

    /// Resolve a flow identifier, failing with [`DynCharError::UnknownObject`] if it does not exist
    fn node(&self, identifier: &FlowIdentifier) -> DynCharResult<BiosphereNode>;
}

/// A [`BiosphereDatabase`] held in memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryBiosphere {
    pub nodes: Vec<BiosphereNode>,
    pub methods: HashMap<String, Vec<FlowIdentifier>>,
}

impl InMemoryBiosphere {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(&mut self, node: BiosphereNode) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn with_method(&mut self, method: &LciaMethod, flows: Vec<FlowIdentifier>) -> &mut Self {
        self.methods.insert(method.to_string(), flows);
        self
    }
}

impl BiosphereDatabase for InMemoryBiosphere {
    fn method_flows(&self, method: &LciaMethod) -> DynCharResult<Vec<FlowIdentifier>> {
        self.methods
            .get(&method.to_string())
            .cloned()
            .ok_or_else(|| DynCharError::UnknownObject(format!("LCIA method {}", method)))
    }

    fn node(&self, identifier: &FlowIdentifier) -> DynCharResult<BiosphereNode> {
        self.nodes
            .iter()
            .find(|node| match identifier {
                FlowIdentifier::Id(id) => node.id == *id,
                FlowIdentifier::Key { database, code } => {
                    &node.database == database && &node.code == code
                }
            })
            .cloned()
            .ok_or_else(|| DynCharError::UnknownObject(format!("biosphere flow {}", identifier)))
    }
}
