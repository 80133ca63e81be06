//! Physical constants used by the static kernels.
//!
//! Radiative efficiencies and lifetimes are from IPCC AR6 WG1 Table 7.15
//! (<https://doi.org/10.1017/9781009157896.009>), the atmospheric mass from
//! Trenberth and Smith (2005).

use dynchar_core::timeseries::FloatValue;

/// Molar mass of dry air, g/mol
pub const M_AIR: FloatValue = 28.97;
/// Mass of the atmosphere, kg
pub const M_ATMOSPHERE: FloatValue = 5.135e18;
/// Mass of the atmosphere used with scenario-dependent data, kg
pub const M_ATMOSPHERE_PROSPECTIVE: FloatValue = 5.13252e18;

pub const M_CO2: FloatValue = 44.01;
pub const M_CO: FloatValue = 28.01;
pub const M_CH4: FloatValue = 16.04;
pub const M_N2O: FloatValue = 44.01;

/// W/m^2/ppb at 2019 background concentration
pub const RE_CO2_PPB: FloatValue = 1.33e-5;
/// W/m^2/ppb, including indirect effects on ozone and stratospheric water vapour
pub const RE_CH4_PPB: FloatValue = 5.7e-4;
/// W/m^2/ppb
pub const RE_N2O_PPB: FloatValue = 2.8e-3;

/// Perturbation lifetime, years
pub const TAU_CH4: FloatValue = 11.8;
/// Perturbation lifetime, years
pub const TAU_N2O: FloatValue = 109.0;

/// Joos et al. (2013) CO2 impulse response: constant fraction
pub const CO2_A0: FloatValue = 0.2173;
/// Joos et al. (2013) CO2 impulse response: amplitudes of the decaying fractions
pub const CO2_A: [FloatValue; 3] = [0.2240, 0.2824, 0.2763];
/// Joos et al. (2013) CO2 impulse response: time constants in years
pub const CO2_TAU: [FloatValue; 3] = [394.4, 36.54, 4.304];

/// Convert a radiative efficiency from W/m^2/ppb to W/m^2/kg
pub fn radiative_efficiency_per_kg(re_ppb: FloatValue, molar_mass: FloatValue) -> FloatValue {
    re_ppb * M_AIR / molar_mass * 1e9 / M_ATMOSPHERE
}

/// kg of gas per ppb of atmospheric mixing ratio, for scenario-dependent data
pub fn kg_per_ppb(molar_mass: FloatValue) -> FloatValue {
    1e-9 * M_ATMOSPHERE_PROSPECTIVE / M_AIR * molar_mass
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn co2_radiative_efficiency_per_kg() {
        // ~1.7e-15 W/m^2/kg
        let re = radiative_efficiency_per_kg(RE_CO2_PPB, M_CO2);
        assert!(is_close!(re, 1.33e-5 * 28.97 / 44.01 * 1e9 / 5.135e18));
        assert!(re > 1.6e-15 && re < 1.8e-15);
    }

    #[test]
    fn impulse_response_fractions_sum_to_one() {
        let total: FloatValue = CO2_A0 + CO2_A.iter().sum::<FloatValue>();
        assert!(is_close!(total, 1.0));
    }

    #[test]
    fn kg_per_ppb_is_inverse_conversion() {
        let re_ppb = 1.0;
        let via_kg = re_ppb / kg_per_ppb(M_CH4);
        assert!(is_close!(
            via_kg,
            re_ppb * M_AIR / M_CH4 * 1e9 / M_ATMOSPHERE_PROSPECTIVE,
            rel_tol = 1e-12
        ));
    }
}
