//! Climate response to radiative forcing
//!
//! - [`TwoBoxResponse`]: temperature impulse response of a two-layer energy balance model
//! - [`Ar5Response`]: the two-exponential fit of IPCC AR5 used for static GTP

mod ar5;
mod two_box;

pub use ar5::{Ar5Response, AR5_RESPONSE};
pub use two_box::{default_response, TwoBoxParameters, TwoBoxResponse};

use dynchar_core::timeseries::FloatValue;
use std::fmt::Debug;

/// Surface temperature change after a unit radiative forcing pulse
pub trait TemperatureResponse: Debug + Send + Sync {
    /// Response `t` years after the pulse; zero for negative `t`
    fn response(&self, t: FloatValue) -> FloatValue;

    /// Response at an integer number of years after the pulse
    fn response_at_year(&self, year: usize) -> FloatValue {
        self.response(year as FloatValue)
    }
}
