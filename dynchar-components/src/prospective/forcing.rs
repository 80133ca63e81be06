use super::ProspectiveContext;
use dynchar_core::data::ProspectiveGas;
use dynchar_core::errors::DynCharResult;
use dynchar_core::timeseries::{CharacterizedSeries, EmissionRecord, FloatValue, ForcingMode};
use ndarray::Array1;

/// Radiative forcing series of one emission using scenario-dependent data.
///
/// The cumulative forcing is zero in the emission year and accumulates the
/// yearly forcing from the following year on. The series has
/// `min(period, irf.len())` entries.
pub fn radiative_forcing(
    context: &ProspectiveContext,
    gas: ProspectiveGas,
    record: &EmissionRecord,
    period: usize,
    mode: ForcingMode,
) -> DynCharResult<CharacterizedSeries> {
    let yearly = context.yearly_forcing(gas, record.year(), period)?;

    let mut total = 0.0;
    let cumulative: Array1<FloatValue> = yearly
        .iter()
        .enumerate()
        .map(|(t, forcing)| {
            if t > 0 {
                total += forcing;
            }
            total * record.amount
        })
        .collect();

    CharacterizedSeries::from_cumulative(record, cumulative, mode)
}
