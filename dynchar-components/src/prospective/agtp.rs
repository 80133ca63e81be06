use super::ProspectiveContext;
use crate::climate::TemperatureResponse;
use dynchar_core::data::ProspectiveGas;
use dynchar_core::errors::DynCharResult;
use dynchar_core::timeseries::FloatValue;

/// Absolute global temperature change potential of 1 kg of `gas` emitted in `emission_year`.
///
/// The yearly forcing is convolved with the temperature response so that
/// forcing in year `t` contributes `R(horizon - t - 1)` at the end of the
/// horizon.
pub fn agtp(
    context: &ProspectiveContext,
    gas: ProspectiveGas,
    emission_year: i32,
    horizon: usize,
    response: &dyn TemperatureResponse,
) -> DynCharResult<FloatValue> {
    let forcing = context.yearly_forcing(gas, emission_year, horizon)?;
    Ok(convolve_at_horizon(&forcing, horizon, response))
}

/// Temperature at `horizon` caused by a yearly forcing series
pub(crate) fn convolve_at_horizon<'f>(
    forcing: impl IntoIterator<Item = &'f FloatValue>,
    horizon: usize,
    response: &dyn TemperatureResponse,
) -> FloatValue {
    forcing
        .into_iter()
        .take(horizon)
        .enumerate()
        .map(|(t, rf_t)| rf_t * response.response_at_year(horizon - t - 1))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::default_response;
    use crate::prospective::{agwp, fixtures};
    use dynchar_core::scenario::Scenario;

    #[test]
    fn agtp_is_positive() {
        let tables = fixtures::tables();
        let context =
            ProspectiveContext::new(&tables, Scenario::parse("AIM", "SSP3", "8.5").unwrap(), false);
        let response = default_response().unwrap();
        for gas in ProspectiveGas::ALL {
            assert!(agtp(&context, gas, 2060, 100, response).unwrap() > 0.0);
        }
    }

    #[test]
    fn methane_temperature_ratio_is_below_warming_ratio() {
        let tables = fixtures::tables();
        let context =
            ProspectiveContext::new(&tables, Scenario::parse("IMAGE", "SSP1", "4.5").unwrap(), false);
        let response = default_response().unwrap();

        let gwp = agwp(&context, ProspectiveGas::Ch4, 2050, 100).unwrap()
            / agwp(&context, ProspectiveGas::Co2, 2050, 100).unwrap();
        let gtp = agtp(&context, ProspectiveGas::Ch4, 2050, 100, response).unwrap()
            / agtp(&context, ProspectiveGas::Co2, 2050, 100, response).unwrap();
        assert!(gtp < gwp, "GTP {} >= GWP {}", gtp, gwp);
    }

    #[test]
    fn single_year_forcing_uses_immediate_response() {
        let response = default_response().unwrap();
        let value = convolve_at_horizon(&[2.0, 5.0], 1, response);
        assert_eq!(value, 2.0 * response.response_at_year(0));
    }
}
