//! Characterization of whole dynamic inventories.
//!
//! Every emission with a kernel is characterized, the resulting series are
//! exploded into rows, rows with a zero amount are dropped and the remaining
//! rows are sorted by date and then amount. The sort is stable, so ties keep
//! the order of the inventory and, within one emission, the order of its
//! series.

use crate::characterizer::{fallback_required, Characterizer};
use crate::climate::{default_response, TemperatureResponse};
use crate::kernels::Kernel;
use crate::method::{default_flow_kernels, FlowKernelMap};
use crate::prospective::ProspectiveContext;
use chrono::{Local, NaiveDateTime};
use dynchar_core::config::{CharacterizationConfig, EmptyResultPolicy, ExecutionStrategy};
use dynchar_core::data::{BiosphereDatabase, DecayMultiplierTable, LciaMethod, ScenarioDataProvider};
use dynchar_core::errors::{DynCharError, DynCharResult};
use dynchar_core::scenario::{Scenario, ScenarioStore, SCENARIO_STORE};
use dynchar_core::timeseries::{
    CharacterizedInventory, CharacterizedRow, CharacterizedSeries, EmissionRecord, FlowId,
};
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;

struct BaseMethod<'a> {
    database: &'a dyn BiosphereDatabase,
    method: LciaMethod,
    decay_table: &'a DecayMultiplierTable,
}

/// Build a [`Characterization`] from a configuration and either explicit
/// kernels or an LCIA method to derive default kernels from.
pub struct CharacterizationBuilder<'a> {
    config: CharacterizationConfig,
    flow_kernels: Option<FlowKernelMap>,
    base_method: Option<BaseMethod<'a>>,
    scenario_data: Option<&'a dyn ScenarioDataProvider>,
    scenario_store: &'a ScenarioStore,
    co2_reference: Kernel,
    response: Option<&'a dyn TemperatureResponse>,
    now: Option<NaiveDateTime>,
}

impl<'a> CharacterizationBuilder<'a> {
    pub fn new(config: CharacterizationConfig) -> Self {
        Self {
            config,
            flow_kernels: None,
            base_method: None,
            scenario_data: None,
            scenario_store: &SCENARIO_STORE,
            co2_reference: Kernel::Co2,
            response: None,
            now: None,
        }
    }

    /// Characterize exactly these flows with these kernels
    pub fn with_flow_kernels(&mut self, flow_kernels: FlowKernelMap) -> &mut Self {
        self.flow_kernels = Some(flow_kernels);
        self
    }

    /// Derive kernels from the flows of a static LCIA method.
    ///
    /// Ignored if kernels were given with [`CharacterizationBuilder::with_flow_kernels`].
    pub fn with_base_method(
        &mut self,
        database: &'a dyn BiosphereDatabase,
        method: LciaMethod,
        decay_table: &'a DecayMultiplierTable,
    ) -> &mut Self {
        self.base_method = Some(BaseMethod {
            database,
            method,
            decay_table,
        });
        self
    }

    pub fn with_scenario_data(&mut self, scenario_data: &'a dyn ScenarioDataProvider) -> &mut Self {
        self.scenario_data = Some(scenario_data);
        self
    }

    /// Read the scenario from `store` instead of the process-wide store
    /// when the configuration has none
    pub fn with_scenario_store(&mut self, store: &'a ScenarioStore) -> &mut Self {
        self.scenario_store = store;
        self
    }

    /// Kernel of the 1 kg CO2 reference emission for GWP
    pub fn with_co2_reference(&mut self, kernel: Kernel) -> &mut Self {
        self.co2_reference = kernel;
        self
    }

    /// Temperature response used by pGTP
    pub fn with_temperature_response(&mut self, response: &'a dyn TemperatureResponse) -> &mut Self {
        self.response = Some(response);
        self
    }

    /// Time used as the start of a fixed horizon when the configuration has none
    pub fn with_now(&mut self, now: NaiveDateTime) -> &mut Self {
        self.now = Some(now);
        self
    }

    pub fn build(&self) -> DynCharResult<Characterization<'a>> {
        let metric = self.config.metric;

        let scenario = match self.config.scenario {
            Some(scenario) => Some(scenario),
            None if metric.is_prospective() => Some(self.scenario_store.get()?),
            None => self.scenario_store.get().ok(),
        };
        if metric.is_prospective() && self.scenario_data.is_none() {
            return Err(DynCharError::Configuration(format!(
                "{} needs scenario data",
                metric
            )));
        }

        let flow_kernels = match (&self.flow_kernels, &self.base_method) {
            (Some(kernels), _) => {
                self.check_kernels(kernels, scenario)?;
                kernels.clone()
            }
            (None, Some(base)) => {
                warn!(
                    "No kernels provided. Using default kernels for the flows of {}",
                    base.method
                );
                default_flow_kernels(
                    base.database,
                    &base.method,
                    base.decay_table,
                    metric,
                    self.config.fallback_to_ipcc,
                )?
            }
            (None, None) => {
                return Err(DynCharError::Configuration(
                    "Please provide either kernels for the flows or an LCIA method to base the default kernels on".to_string(),
                ))
            }
        };

        let response: &'a dyn TemperatureResponse = match self.response {
            Some(response) => response,
            None => default_response()?,
        };

        let horizon_start = self
            .config
            .horizon_start(self.now.unwrap_or_else(|| Local::now().naive_local()));

        Ok(Characterization {
            config: self.config.clone(),
            flow_kernels,
            co2_reference: self.co2_reference.clone(),
            scenario,
            scenario_data: self.scenario_data,
            response,
            horizon_start,
        })
    }

    /// Static kernels need `fallback_to_ipcc` under prospective metrics and
    /// prospective kernels need a scenario under any metric
    fn check_kernels(&self, kernels: &FlowKernelMap, scenario: Option<Scenario>) -> DynCharResult<()> {
        let metric = self.config.metric;
        if metric.is_prospective() && !self.config.fallback_to_ipcc {
            if let Some((flow, kernel)) = kernels.iter().find(|(_, kernel)| !kernel.is_prospective()) {
                return Err(fallback_required(kernel, *flow, metric));
            }
        }

        if let Some((flow, kernel)) = kernels.iter().find(|(_, kernel)| kernel.is_prospective()) {
            if self.scenario_data.is_none() {
                return Err(DynCharError::Configuration(format!(
                    "{} kernel for flow {} needs scenario data",
                    kernel.kind(),
                    flow
                )));
            }
            if scenario.is_none() {
                return Err(DynCharError::ScenarioNotConfigured);
            }
        }
        Ok(())
    }
}

/// A configured characterization with a fixed kernel map and scenario snapshot
pub struct Characterization<'a> {
    config: CharacterizationConfig,
    flow_kernels: FlowKernelMap,
    co2_reference: Kernel,
    scenario: Option<Scenario>,
    scenario_data: Option<&'a dyn ScenarioDataProvider>,
    response: &'a dyn TemperatureResponse,
    horizon_start: NaiveDateTime,
}

impl<'a> Characterization<'a> {
    pub fn config(&self) -> &CharacterizationConfig {
        &self.config
    }

    pub fn flow_kernels(&self) -> &FlowKernelMap {
        &self.flow_kernels
    }

    /// Scenario captured when the characterization was built
    pub fn scenario(&self) -> Option<Scenario> {
        self.scenario
    }

    pub fn horizon_start(&self) -> NaiveDateTime {
        self.horizon_start
    }

    fn characterizer(&self) -> Characterizer<'_> {
        let prospective = match (self.scenario, self.scenario_data) {
            (Some(scenario), Some(data)) => Some(ProspectiveContext::new(
                data,
                scenario,
                self.config.time_varying_re,
            )),
            _ => None,
        };
        Characterizer::new(
            &self.config,
            self.horizon_start,
            self.co2_reference.clone(),
            prospective,
            self.response,
        )
    }

    /// Characterize a dynamic inventory.
    pub fn characterize(&self, inventory: &[EmissionRecord]) -> DynCharResult<CharacterizedInventory> {
        let characterizer = self.characterizer();

        let series = match self.config.execution {
            ExecutionStrategy::RowWise => self.row_wise(&characterizer, inventory)?,
            ExecutionStrategy::Batched => self.batched(&characterizer, inventory)?,
            ExecutionStrategy::Parallel => self.parallel(&characterizer, inventory)?,
        };

        if series.is_empty() {
            return match self.config.empty_result {
                EmptyResultPolicy::Error => Err(DynCharError::NoCharacterizedFlows),
                EmptyResultPolicy::Empty => {
                    warn!("None of the {} emissions could be characterized", inventory.len());
                    Ok(CharacterizedInventory::default())
                }
            };
        }

        Ok(aggregate(&series))
    }

    fn kernel(&self, flow: FlowId) -> Option<&Kernel> {
        let kernel = self.flow_kernels.get(&flow);
        if kernel.is_none() {
            debug!("Skipping flow {} without kernel", flow);
        }
        kernel
    }

    fn row_wise(
        &self,
        characterizer: &Characterizer,
        inventory: &[EmissionRecord],
    ) -> DynCharResult<Vec<CharacterizedSeries>> {
        let mut series = Vec::with_capacity(inventory.len());
        for record in inventory {
            if let Some(kernel) = self.kernel(record.flow) {
                series.push(characterizer.characterize(record, kernel)?);
            }
        }
        Ok(series)
    }

    fn batched(
        &self,
        characterizer: &Characterizer,
        inventory: &[EmissionRecord],
    ) -> DynCharResult<Vec<CharacterizedSeries>> {
        let mut groups: BTreeMap<FlowId, Vec<usize>> = BTreeMap::new();
        for (index, record) in inventory.iter().enumerate() {
            groups.entry(record.flow).or_default().push(index);
        }

        let mut slots: Vec<Option<CharacterizedSeries>> = vec![None; inventory.len()];
        for (flow, indices) in groups {
            let Some(kernel) = self.kernel(flow) else {
                continue;
            };
            for index in indices {
                slots[index] = Some(characterizer.characterize(&inventory[index], kernel)?);
            }
        }
        Ok(slots.into_iter().flatten().collect())
    }

    fn parallel(
        &self,
        characterizer: &Characterizer,
        inventory: &[EmissionRecord],
    ) -> DynCharResult<Vec<CharacterizedSeries>> {
        let slots = inventory
            .par_iter()
            .map(|record| {
                self.kernel(record.flow)
                    .map(|kernel| characterizer.characterize(record, kernel))
                    .transpose()
            })
            .collect::<DynCharResult<Vec<Option<CharacterizedSeries>>>>()?;
        Ok(slots.into_iter().flatten().collect())
    }
}

/// Explode, filter and sort characterized series into an inventory
pub fn aggregate(series: &[CharacterizedSeries]) -> CharacterizedInventory {
    let mut rows: Vec<CharacterizedRow> = series
        .iter()
        .flat_map(|s| s.rows())
        .filter(|row| row.amount != 0.0)
        .collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.amount.total_cmp(&b.amount)));
    CharacterizedInventory::from_rows(rows)
}
