//! Python extension module
//!
//! Dates cross the boundary as ISO 8601 strings (`2024-01-01T00:00:00`).
//! Kernels are given per flow either by name (see [`kernel_from_name`]) or as
//! a list of generic decay multipliers.

use chrono::NaiveDateTime;
use dynchar_components::aggregator::CharacterizationBuilder;
use dynchar_components::kernels::{Kernel, KernelKind};
use dynchar_components::method::FlowKernelMap;
use dynchar_core::config::CharacterizationConfig;
use dynchar_core::data::ScenarioTables;
use dynchar_core::errors::DynCharError;
use dynchar_core::scenario;
use dynchar_core::timeseries::{ActivityId, EmissionRecord, FlowId};
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use pythonize::depythonize_bound;
use std::collections::HashMap;

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn to_py_err(error: DynCharError) -> PyErr {
    PyValueError::new_err(error.to_string())
}

/// Built-in kernel named as in [`KernelKind`]'s display form, e.g. `"prospective CH4"`
fn kernel_from_name(name: &str) -> PyResult<Kernel> {
    KernelKind::from_name(name)
        .and_then(Kernel::from_kind)
        .ok_or_else(|| PyValueError::new_err(format!("Unknown kernel: {}", name)))
}

fn kernel_from_py(value: &Bound<'_, PyAny>) -> PyResult<Kernel> {
    match value.extract::<String>() {
        Ok(name) => kernel_from_name(&name),
        Err(_) => Ok(Kernel::generic(&value.extract::<Vec<f64>>()?)),
    }
}

fn parse_date(date: &str) -> PyResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(date, DATE_FORMAT)
        .map_err(|e| PyValueError::new_err(format!("Invalid date {:?}: {}", date, e)))
}

/// Set the process-wide scenario
#[pyfunction]
fn set_scenario(iam: &str, ssp: &str, rcp: &str) -> PyResult<String> {
    scenario::set_scenario(iam, ssp, rcp)
        .map(|s| s.to_string())
        .map_err(to_py_err)
}

/// Current process-wide scenario as `(iam, ssp, rcp)`
#[pyfunction]
fn get_scenario() -> PyResult<(String, String, String)> {
    let current = scenario::get_scenario().map_err(to_py_err)?;
    Ok((
        current.iam().to_string(),
        current.ssp().to_string(),
        current.rcp().to_string(),
    ))
}

#[pyfunction]
fn reset_scenario() {
    scenario::reset_scenario()
}

/// Characterize a dynamic inventory given as parallel columns.
///
/// `config` and `scenario_data` are dicts with the same layout as the TOML
/// configuration and the JSON scenario tables. The result is a dict of
/// columns sorted by date and amount.
#[pyfunction]
#[pyo3(signature = (dates, amounts, flows, activities, flow_kernels, config=None, scenario_data=None))]
#[allow(clippy::too_many_arguments)]
fn characterize<'py>(
    py: Python<'py>,
    dates: Vec<String>,
    amounts: PyReadonlyArray1<'py, f64>,
    flows: Vec<FlowId>,
    activities: Vec<ActivityId>,
    flow_kernels: HashMap<FlowId, Bound<'py, PyAny>>,
    config: Option<Bound<'py, PyAny>>,
    scenario_data: Option<Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyDict>> {
    let amounts = amounts.as_array();
    let n = dates.len();
    if amounts.len() != n || flows.len() != n || activities.len() != n {
        return Err(PyValueError::new_err(
            "dates, amounts, flows and activities must have the same length",
        ));
    }

    let inventory = dates
        .iter()
        .zip(amounts.iter())
        .zip(flows.iter().zip(activities.iter()))
        .map(|((date, amount), (flow, activity))| {
            Ok(EmissionRecord::new(parse_date(date)?, *amount, *flow, *activity))
        })
        .collect::<PyResult<Vec<_>>>()?;

    let kernels = flow_kernels
        .iter()
        .map(|(flow, value)| Ok((*flow, kernel_from_py(value)?)))
        .collect::<PyResult<FlowKernelMap>>()?;

    let config: CharacterizationConfig = match config {
        Some(config) => depythonize_bound(config)?,
        None => CharacterizationConfig::default(),
    };
    let tables: Option<ScenarioTables> = match scenario_data {
        Some(data) => Some(depythonize_bound(data)?),
        None => None,
    };

    let mut builder = CharacterizationBuilder::new(config);
    builder.with_flow_kernels(kernels);
    if let Some(tables) = &tables {
        builder.with_scenario_data(tables);
    }
    let result = builder
        .build()
        .and_then(|characterization| characterization.characterize(&inventory))
        .map_err(to_py_err)?;

    let rows = result.into_rows();
    let columns = PyDict::new_bound(py);
    columns.set_item(
        "date",
        rows.iter()
            .map(|row| row.date.format(DATE_FORMAT).to_string())
            .collect::<Vec<_>>(),
    )?;
    columns.set_item(
        "amount",
        PyArray1::from_vec_bound(py, rows.iter().map(|row| row.amount).collect()),
    )?;
    columns.set_item("flow", rows.iter().map(|row| row.flow).collect::<Vec<_>>())?;
    columns.set_item(
        "activity",
        rows.iter().map(|row| row.activity).collect::<Vec<_>>(),
    )?;
    Ok(columns)
}

#[pymodule]
#[pyo3(name = "_lib")]
fn dynchar(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_function(wrap_pyfunction!(set_scenario, m)?)?;
    m.add_function(wrap_pyfunction!(get_scenario, m)?)?;
    m.add_function(wrap_pyfunction!(reset_scenario, m)?)?;
    m.add_function(wrap_pyfunction!(characterize, m)?)?;
    Ok(())
}
