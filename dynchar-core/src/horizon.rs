//! Resolution of the number of years each emission is evaluated for.
//!
//! Two conventions are supported:
//!
//! - **Conventional** (`fixed = false`): every emission is characterized for
//!   `horizon_years`, starting at its own date.
//! - **Levasseur** (`fixed = true`): the horizon ends at
//!   `horizon_start + horizon_years` for all emissions, so an emission that
//!   happens `n` years before `horizon_start` is characterized for
//!   `horizon_years + n` years and emissions at or after the end are not
//!   characterized at all. See <https://doi.org/10.1021/es9030003>.

use chrono::{Months, NaiveDateTime};

/// Mean length of a year in days used to convert the remaining time to years
pub const DAYS_PER_YEAR: f64 = 365.25;

const SECONDS_PER_DAY: i64 = 86_400;

/// End of a fixed time horizon: `horizon_start` shifted by whole calendar years.
///
/// A start on February 29th ends on February 28th if the end year is not a leap year.
pub fn horizon_end(horizon_start: NaiveDateTime, horizon_years: usize) -> NaiveDateTime {
    u32::try_from(horizon_years)
        .ok()
        .and_then(|years| years.checked_mul(12))
        .and_then(|months| horizon_start.checked_add_months(Months::new(months)))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Number of years to characterize an emission occurring at `emission_date`.
pub fn resolve_horizon(
    emission_date: NaiveDateTime,
    horizon_start: NaiveDateTime,
    horizon_years: usize,
    fixed: bool,
) -> usize {
    if !fixed {
        return horizon_years;
    }

    let end = horizon_end(horizon_start, horizon_years);
    // Whole days, rounded towards negative infinity
    let days = (end - emission_date)
        .num_seconds()
        .div_euclid(SECONDS_PER_DAY);
    let years = (days as f64 / DAYS_PER_YEAR).round_ties_even();

    if years <= 0.0 {
        0
    } else {
        years as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn conventional_horizon_is_unchanged() {
        let start = date(2024, 1, 1);
        assert_eq!(resolve_horizon(date(1990, 3, 1), start, 100, false), 100);
        assert_eq!(resolve_horizon(date(2300, 3, 1), start, 100, false), 100);
    }

    #[test]
    fn emission_at_horizon_end_resolves_to_zero() {
        let start = date(2024, 1, 1);
        assert_eq!(resolve_horizon(date(2124, 1, 1), start, 100, true), 0);
        assert_eq!(resolve_horizon(date(2150, 1, 1), start, 100, true), 0);
    }

    #[test]
    fn emission_at_horizon_start_resolves_to_full_horizon() {
        let start = date(2024, 1, 1);
        assert_eq!(resolve_horizon(start, start, 100, true), 100);
    }

    #[test]
    fn earlier_emissions_get_longer_horizons() {
        let start = date(2024, 1, 1);
        let before = resolve_horizon(date(2019, 1, 1), start, 100, true);
        let at = resolve_horizon(date(2020, 1, 1), start, 100, true);
        let after = resolve_horizon(date(2021, 1, 1), start, 100, true);
        assert_eq!(before, 105);
        assert_eq!(at, 104);
        assert_eq!(after, 103);
        assert_eq!(before, after + 2);
    }

    #[test]
    fn one_year_before_end_resolves_to_one() {
        let start = date(2024, 1, 1);
        assert_eq!(resolve_horizon(date(2123, 1, 1), start, 100, true), 1);
    }

    #[test]
    fn leap_day_start_is_clamped() {
        assert_eq!(horizon_end(date(2024, 2, 29), 1), date(2025, 2, 28));
        assert_eq!(horizon_end(date(2024, 2, 29), 4), date(2028, 2, 29));
    }

    #[test]
    fn partial_days_round_down() {
        let start = date(2024, 1, 1);
        // half a day before the end
        let emission = date(2123, 12, 31) + chrono::TimeDelta::hours(12);
        assert_eq!(resolve_horizon(emission, start, 100, true), 0);
        // just under half a year before the end
        let emission = date(2123, 7, 3) + chrono::TimeDelta::hours(12);
        assert_eq!(resolve_horizon(emission, start, 100, true), 0);
    }
}
