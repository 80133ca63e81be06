use super::ProspectiveContext;
use dynchar_core::data::ProspectiveGas;
use dynchar_core::errors::DynCharResult;
use dynchar_core::timeseries::FloatValue;

/// Absolute global warming potential of 1 kg of `gas` emitted in `emission_year`.
///
/// Sum of the yearly forcing over `min(horizon, irf.len())` years, in W yr/m^2/kg.
pub fn agwp(
    context: &ProspectiveContext,
    gas: ProspectiveGas,
    emission_year: i32,
    horizon: usize,
) -> DynCharResult<FloatValue> {
    let forcing = context.yearly_forcing(gas, emission_year, horizon)?;
    Ok(forcing.iter().sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prospective::fixtures;
    use dynchar_core::scenario::Scenario;

    fn context(tables: &dynchar_core::data::ScenarioTables, time_varying_re: bool) -> ProspectiveContext<'_> {
        ProspectiveContext::new(tables, Scenario::parse("GCAM4", "SSP4", "6.0").unwrap(), time_varying_re)
    }

    #[test]
    fn agwp_is_positive_and_grows_with_horizon() {
        let tables = fixtures::tables();
        let context = context(&tables, false);
        for gas in ProspectiveGas::ALL {
            let short = agwp(&context, gas, 2050, 20).unwrap();
            let long = agwp(&context, gas, 2050, 100).unwrap();
            assert!(short > 0.0, "{}", gas);
            assert!(long > short, "{}", gas);
        }
    }

    #[test]
    fn agwp_saturates_at_irf_length() {
        let tables = fixtures::tables();
        let context = context(&tables, false);
        let at_length = agwp(&context, ProspectiveGas::N2o, 2050, 100).unwrap();
        let beyond = agwp(&context, ProspectiveGas::N2o, 2050, 300).unwrap();
        assert_eq!(at_length, beyond);
    }

    #[test]
    fn zero_horizon_is_zero() {
        let tables = fixtures::tables();
        assert_eq!(agwp(&context(&tables, false), ProspectiveGas::Co2, 2050, 0).unwrap(), 0.0);
    }

    #[test]
    fn declining_efficiency_lowers_agwp() {
        let tables = fixtures::tables();
        let fixed = agwp(&context(&tables, false), ProspectiveGas::Co2, 2050, 100).unwrap();
        let varying = agwp(&context(&tables, true), ProspectiveGas::Co2, 2050, 100).unwrap();
        assert!(varying < fixed);
    }

    #[test]
    fn years_outside_scenario_range_are_clamped() {
        let tables = fixtures::tables();
        let context = context(&tables, false);
        assert_eq!(
            agwp(&context, ProspectiveGas::Ch4, 2000, 100).unwrap(),
            agwp(&context, ProspectiveGas::Ch4, 2030, 100).unwrap()
        );
        assert_eq!(
            agwp(&context, ProspectiveGas::Ch4, 2140, 100).unwrap(),
            agwp(&context, ProspectiveGas::Ch4, 2100, 100).unwrap()
        );
    }
}
