//! Two-box energy balance model of the surface temperature response.
//!
//! A surface layer with heat capacity `C_s` exchanges heat with a deep ocean
//! layer with heat capacity `C_d`:
//!
//! $$ C_s \frac{dT_s}{dt} = F - \lambda T_s - \gamma (T_s - T_d) $$
//! $$ C_d \frac{dT_d}{dt} = \gamma (T_s - T_d) $$
//!
//! Without forcing the temperatures decay as `T(t) = exp(-A t) T(0)` with
//!
//! $$ A = \begin{pmatrix} (\lambda + \gamma)/C_s & -\gamma/C_s \\ -\gamma/C_d & \gamma/C_d \end{pmatrix} $$
//!
//! The eigenvalues of `A` give a fast (surface) and a slow (deep ocean) mode.
//! The impulse response is the surface component of a unit surface
//! perturbation, scaled by the forcing efficacy:
//!
//! $$ R(t) = \epsilon (q_1 e^{-\lambda_1 t} + q_2 e^{-\lambda_2 t}) $$
//!
//! See Geoffroy et al. (2013) <https://doi.org/10.1175/JCLI-D-12-00195.1>.

use super::TemperatureResponse;
use dynchar_core::errors::{DynCharError, DynCharResult};
use dynchar_core::timeseries::FloatValue;
use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};
use std::sync::{LazyLock, PoisonError, RwLock};

/// Parameters of the two-box model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoBoxParameters {
    /// Heat capacity of the surface layer
    /// unit: W yr/m^2/K
    /// default: 7.7
    pub heat_capacity_surface: FloatValue,

    /// Heat capacity of the deep ocean
    /// unit: W yr/m^2/K
    /// default: 147.0
    pub heat_capacity_deep: FloatValue,

    /// Climate feedback parameter (magnitude)
    /// unit: W/m^2/K
    /// default: 1.31
    pub feedback: FloatValue,

    /// Heat exchange coefficient between the layers
    /// unit: W/m^2/K
    /// default: 0.88
    pub heat_exchange: FloatValue,

    /// Forcing efficacy
    /// unit: dimensionless
    /// default: 1.03
    pub efficacy: FloatValue,
}

impl Default for TwoBoxParameters {
    fn default() -> Self {
        Self {
            heat_capacity_surface: 7.7,
            heat_capacity_deep: 147.0,
            feedback: 1.31,
            heat_exchange: 0.88,
            efficacy: 1.03,
        }
    }
}

impl TwoBoxParameters {
    /// Decay-rate matrix `A` of the unforced system
    pub fn system_matrix(&self) -> Matrix2<FloatValue> {
        let c_s = self.heat_capacity_surface;
        let c_d = self.heat_capacity_deep;
        let gamma = self.heat_exchange;
        Matrix2::new(
            (self.feedback + gamma) / c_s,
            -gamma / c_s,
            -gamma / c_d,
            gamma / c_d,
        )
    }

    fn validate(&self) -> DynCharResult<()> {
        let positive = [
            ("heat_capacity_surface", self.heat_capacity_surface),
            ("heat_capacity_deep", self.heat_capacity_deep),
            ("feedback", self.feedback),
            ("heat_exchange", self.heat_exchange),
            ("efficacy", self.efficacy),
        ];
        match positive
            .iter()
            .find(|(_, value)| !(value.is_finite() && *value > 0.0))
        {
            Some((name, value)) => Err(DynCharError::InvalidParameters(format!(
                "{} must be positive and finite, got {}",
                name, value
            ))),
            None => Ok(()),
        }
    }
}

/// Temperature impulse response of the two-box model.
///
/// Values at integer years are memoized; the memo only ever grows.
#[derive(Debug)]
pub struct TwoBoxResponse {
    parameters: TwoBoxParameters,
    /// Decay rates of the fast and slow mode, 1/yr
    rates: [FloatValue; 2],
    /// Surface amplitudes of the fast and slow mode, summing to one
    amplitudes: [FloatValue; 2],
    yearly: RwLock<Vec<FloatValue>>,
}

impl TwoBoxResponse {
    pub fn from_parameters(parameters: TwoBoxParameters) -> DynCharResult<Self> {
        parameters.validate()?;

        let a = parameters.system_matrix();
        let b = a.trace();
        let c = a.determinant();
        let discriminant = b * b - 4.0 * c;
        if discriminant <= 0.0 {
            return Err(DynCharError::InvalidParameters(format!(
                "two-box system has no distinct real decay modes (discriminant {})",
                discriminant
            )));
        }

        let sqrt_discriminant = discriminant.sqrt();
        let fast = (b + sqrt_discriminant) / 2.0;
        let slow = (b - sqrt_discriminant) / 2.0;
        if slow <= 0.0 {
            return Err(DynCharError::InvalidParameters(format!(
                "two-box system has a non-decaying mode (rate {})",
                slow
            )));
        }

        // Surface entries of the spectral projectors of A
        let a11 = a[(0, 0)];
        let amplitudes = [(a11 - slow) / (fast - slow), (fast - a11) / (fast - slow)];

        Ok(Self {
            parameters,
            rates: [fast, slow],
            amplitudes,
            yearly: RwLock::new(Vec::new()),
        })
    }

    pub fn parameters(&self) -> &TwoBoxParameters {
        &self.parameters
    }

    /// Decay rates `(lambda_1, lambda_2)` of the fast and slow mode in 1/yr
    pub fn rates(&self) -> (FloatValue, FloatValue) {
        (self.rates[0], self.rates[1])
    }

    /// Time scales of the fast and slow mode in years
    pub fn timescales(&self) -> (FloatValue, FloatValue) {
        (1.0 / self.rates[0], 1.0 / self.rates[1])
    }

    pub fn amplitudes(&self) -> (FloatValue, FloatValue) {
        (self.amplitudes[0], self.amplitudes[1])
    }

    /// Response `t` years after a unit forcing pulse; zero for negative `t`
    pub fn response(&self, t: FloatValue) -> FloatValue {
        if t < 0.0 {
            return 0.0;
        }
        self.parameters.efficacy
            * (self.amplitudes[0] * (-self.rates[0] * t).exp()
                + self.amplitudes[1] * (-self.rates[1] * t).exp())
    }

    /// [`TwoBoxResponse::response`] at an integer number of years, memoized
    pub fn response_at_year(&self, year: usize) -> FloatValue {
        {
            let yearly = self.yearly.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(value) = yearly.get(year) {
                return *value;
            }
        }

        let mut yearly = self.yearly.write().unwrap_or_else(PoisonError::into_inner);
        while yearly.len() <= year {
            let t = yearly.len() as FloatValue;
            yearly.push(self.response(t));
        }
        yearly[year]
    }

    /// Number of memoized yearly values
    pub fn memoized_years(&self) -> usize {
        self.yearly.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl TemperatureResponse for TwoBoxResponse {
    fn response(&self, t: FloatValue) -> FloatValue {
        TwoBoxResponse::response(self, t)
    }

    fn response_at_year(&self, year: usize) -> FloatValue {
        TwoBoxResponse::response_at_year(self, year)
    }
}

static DEFAULT_RESPONSE: LazyLock<DynCharResult<TwoBoxResponse>> =
    LazyLock::new(|| TwoBoxResponse::from_parameters(TwoBoxParameters::default()));

/// Shared response with the default parameters
pub fn default_response() -> DynCharResult<&'static TwoBoxResponse> {
    DEFAULT_RESPONSE.as_ref().map_err(Clone::clone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;
    use ode_solvers::{Rk4, System, Vector2};

    struct FreeDecay {
        a: Matrix2<FloatValue>,
    }

    impl System<FloatValue, Vector2<FloatValue>> for FreeDecay {
        fn system(&self, _t: FloatValue, y: &Vector2<FloatValue>, dy: &mut Vector2<FloatValue>) {
            dy[0] = -(self.a[(0, 0)] * y[0] + self.a[(0, 1)] * y[1]);
            dy[1] = -(self.a[(1, 0)] * y[0] + self.a[(1, 1)] * y[1]);
        }
    }

    #[test]
    fn default_parameters_give_fast_and_slow_modes() {
        let response = default_response().unwrap();
        let (fast, slow) = response.timescales();
        assert!(fast > 2.0 && fast < 8.0, "fast timescale {}", fast);
        assert!(slow > 150.0 && slow < 500.0, "slow timescale {}", slow);
    }

    #[test]
    fn amplitudes_sum_to_one() {
        let response = default_response().unwrap();
        let (q1, q2) = response.amplitudes();
        assert!(is_close!(q1 + q2, 1.0));
        assert!(q1 > 0.0 && q2 > 0.0);
        assert!(is_close!(response.response(0.0), 1.03));
    }

    #[test]
    fn eigenvalues_match_nalgebra() {
        let parameters = TwoBoxParameters::default();
        let response = TwoBoxResponse::from_parameters(parameters).unwrap();
        let mut eigenvalues: Vec<FloatValue> = parameters
            .system_matrix()
            .complex_eigenvalues()
            .iter()
            .map(|value| value.re)
            .collect();
        eigenvalues.sort_by(|a, b| b.total_cmp(a));
        let (fast, slow) = response.rates();
        assert!(is_close!(eigenvalues[0], fast, rel_tol = 1e-9));
        assert!(is_close!(eigenvalues[1], slow, rel_tol = 1e-9));
    }

    #[test]
    fn response_matches_numerical_integration() {
        let parameters = TwoBoxParameters::default();
        let response = TwoBoxResponse::from_parameters(parameters).unwrap();
        let system = FreeDecay {
            a: parameters.system_matrix(),
        };

        let mut stepper = Rk4::new(system, 0.0, Vector2::new(1.0, 0.0), 50.0, 0.01);
        stepper.integrate().unwrap();
        let (times, states) = stepper.results().get();

        for (t, state) in times.iter().zip(states.iter()).step_by(250) {
            let expected = response.response(*t) / parameters.efficacy;
            assert!(
                is_close!(state[0], expected, rel_tol = 1e-6),
                "t = {}: {} != {}",
                t,
                state[0],
                expected
            );
        }
    }

    #[test]
    fn response_is_zero_before_pulse() {
        let response = default_response().unwrap();
        assert_eq!(response.response(-1.0), 0.0);
        assert!(response.response(0.0) > response.response(10.0));
    }

    #[test]
    fn yearly_values_are_memoized() {
        let response = TwoBoxResponse::from_parameters(TwoBoxParameters::default()).unwrap();
        assert_eq!(response.memoized_years(), 0);
        let value = response.response_at_year(20);
        assert_eq!(response.memoized_years(), 21);
        assert_eq!(value.to_bits(), response.response(20.0).to_bits());
        response.response_at_year(5);
        assert_eq!(response.memoized_years(), 21);
    }

    #[test]
    fn non_physical_parameters_are_rejected() {
        let parameters = TwoBoxParameters {
            feedback: -1.31,
            ..Default::default()
        };
        let err = TwoBoxResponse::from_parameters(parameters).unwrap_err();
        assert!(matches!(err, DynCharError::InvalidParameters(_)));

        let parameters = TwoBoxParameters {
            heat_capacity_deep: 0.0,
            ..Default::default()
        };
        assert!(TwoBoxResponse::from_parameters(parameters).is_err());
    }

    #[test]
    fn partial_parameters_from_toml() {
        let parameters: TwoBoxParameters = toml::from_str("feedback = 1.5").unwrap();
        assert_eq!(parameters.feedback, 1.5);
        assert_eq!(parameters.heat_capacity_surface, 7.7);
    }
}
