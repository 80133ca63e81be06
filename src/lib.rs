//! Dynamic and prospective climate characterization of time-explicit life
//! cycle inventories.
//!
//! This crate re-exports [`dynchar_core`] and [`dynchar_components`] and, with
//! the `python` feature, provides the Python extension module.

pub use dynchar_components;
pub use dynchar_core;

pub use dynchar_components::aggregator::{Characterization, CharacterizationBuilder};
pub use dynchar_components::kernels::Kernel;
pub use dynchar_components::method::FlowKernelMap;
pub use dynchar_core::config::{
    CharacterizationConfig, EmptyResultPolicy, ExecutionStrategy, Metric, TemperatureModel,
};
pub use dynchar_core::errors::{DynCharError, DynCharResult};
pub use dynchar_core::scenario::{get_scenario, reset_scenario, set_scenario, Scenario};
pub use dynchar_core::timeseries::{CharacterizedInventory, CharacterizedRow, EmissionRecord};

#[cfg(feature = "python")]
mod python;
