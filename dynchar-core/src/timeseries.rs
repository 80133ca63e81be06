//! Emission records and the characterized series produced from them.
//!
//! A [`CharacterizedSeries`] always carries equally long date and amount
//! vectors and is tagged with the [`ForcingMode`] its amounts are expressed in,
//! so marginal and cumulative values are never mixed in the same series.

use crate::errors::{DynCharError, DynCharResult};
use chrono::{Datelike, NaiveDateTime, TimeDelta};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

pub type FloatValue = f64;
/// Identifier of a biosphere flow
pub type FlowId = u64;
/// Identifier of the emitting activity
pub type ActivityId = u64;

/// Length of a mean Gregorian year (365.2425 days) in seconds.
///
/// Characterized series advance by this amount per step.
pub const SECONDS_PER_YEAR: i64 = 31_556_952;

/// A single emission (or uptake) event of a dynamic inventory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub date: NaiveDateTime,
    pub amount: FloatValue,
    pub flow: FlowId,
    pub activity: ActivityId,
}

impl EmissionRecord {
    pub fn new(date: NaiveDateTime, amount: FloatValue, flow: FlowId, activity: ActivityId) -> Self {
        Self {
            date,
            amount,
            flow,
            activity,
        }
    }

    /// Copy of this record with a different amount
    pub fn with_amount(&self, amount: FloatValue) -> Self {
        Self { amount, ..*self }
    }

    /// Calendar year in which the emission occurs
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// Whether the amounts of a series are year-over-year values or running totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcingMode {
    /// Forcing added in each year; the first entry is conventionally 0
    #[default]
    Marginal,
    /// Running total of the marginal values
    Cumulative,
}

impl ForcingMode {
    pub fn from_cumulative(cumulative: bool) -> Self {
        if cumulative {
            ForcingMode::Cumulative
        } else {
            ForcingMode::Marginal
        }
    }
}

/// Dates `start + k` mean years for `k` in `0..n`.
///
/// Fails with [`DynCharError::InvalidParameters`] if a date falls outside the
/// range representable by [`NaiveDateTime`].
pub fn annual_dates(start: NaiveDateTime, n: usize) -> DynCharResult<Vec<NaiveDateTime>> {
    (0..n)
        .map(|k| {
            i64::try_from(k)
                .ok()
                .and_then(|k| k.checked_mul(SECONDS_PER_YEAR))
                .and_then(TimeDelta::try_seconds)
                .and_then(|offset| start.checked_add_signed(offset))
                .ok_or_else(|| {
                    DynCharError::InvalidParameters(format!(
                        "{} years after {} is outside the supported date range",
                        k, start
                    ))
                })
        })
        .collect()
}

/// First difference of a cumulative series with a zero prepended.
pub fn marginal_from_cumulative(cumulative: &Array1<FloatValue>) -> Array1<FloatValue> {
    let mut previous = 0.0;
    cumulative.mapv(|value| {
        let delta = value - previous;
        previous = value;
        delta
    })
}

/// Running sum of a marginal series.
pub fn cumulative_from_marginal(marginal: &Array1<FloatValue>) -> Array1<FloatValue> {
    let mut total = 0.0;
    marginal.mapv(|value| {
        total += value;
        total
    })
}

/// Time series resulting from characterizing one [`EmissionRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterizedSeries {
    dates: Vec<NaiveDateTime>,
    amounts: Array1<FloatValue>,
    flow: FlowId,
    activity: ActivityId,
    mode: ForcingMode,
}

impl CharacterizedSeries {
    pub fn new(
        dates: Vec<NaiveDateTime>,
        amounts: Array1<FloatValue>,
        flow: FlowId,
        activity: ActivityId,
        mode: ForcingMode,
    ) -> DynCharResult<Self> {
        if dates.len() != amounts.len() {
            return Err(DynCharError::Error(format!(
                "Characterized series for flow {} has {} dates but {} amounts",
                flow,
                dates.len(),
                amounts.len()
            )));
        }
        Ok(Self {
            dates,
            amounts,
            flow,
            activity,
            mode,
        })
    }

    /// Build a series for `record` from amount-scaled cumulative values on an annual date axis.
    ///
    /// The values are converted to `mode` before being stored. Fails if the
    /// date axis leaves the representable date range.
    pub fn from_cumulative(
        record: &EmissionRecord,
        cumulative: Array1<FloatValue>,
        mode: ForcingMode,
    ) -> DynCharResult<Self> {
        let dates = annual_dates(record.date, cumulative.len())?;
        let amounts = match mode {
            ForcingMode::Cumulative => cumulative,
            ForcingMode::Marginal => marginal_from_cumulative(&cumulative),
        };
        Ok(Self {
            dates,
            amounts,
            flow: record.flow,
            activity: record.activity,
            mode,
        })
    }

    /// A single-valued series, used for equivalence metrics
    pub fn single(record: &EmissionRecord, amount: FloatValue) -> Self {
        Self {
            dates: vec![record.date],
            amounts: Array1::from_elem(1, amount),
            flow: record.flow,
            activity: record.activity,
            mode: ForcingMode::Cumulative,
        }
    }

    pub fn dates(&self) -> &[NaiveDateTime] {
        &self.dates
    }

    pub fn amounts(&self) -> &Array1<FloatValue> {
        &self.amounts
    }

    pub fn flow(&self) -> FlowId {
        self.flow
    }

    pub fn activity(&self) -> ActivityId {
        self.activity
    }

    pub fn mode(&self) -> ForcingMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Sum of all amounts in the series
    pub fn total(&self) -> FloatValue {
        self.amounts.sum()
    }

    /// Integrated value over the whole series, independent of the mode
    pub fn integral(&self) -> FloatValue {
        match self.mode {
            ForcingMode::Marginal => self.total(),
            ForcingMode::Cumulative => self.amounts.last().copied().unwrap_or(0.0),
        }
    }

    /// The same series expressed as year-over-year values
    pub fn to_marginal(&self) -> Self {
        match self.mode {
            ForcingMode::Marginal => self.clone(),
            ForcingMode::Cumulative => Self {
                amounts: marginal_from_cumulative(&self.amounts),
                mode: ForcingMode::Marginal,
                ..self.clone()
            },
        }
    }

    /// The same series expressed as running totals
    pub fn to_cumulative(&self) -> Self {
        match self.mode {
            ForcingMode::Cumulative => self.clone(),
            ForcingMode::Marginal => Self {
                amounts: cumulative_from_marginal(&self.amounts),
                mode: ForcingMode::Cumulative,
                ..self.clone()
            },
        }
    }

    /// Element-wise negation, used for uptake
    pub fn negated(mut self) -> Self {
        self.amounts.mapv_inplace(|v| -v);
        self
    }

    /// Explode the series into one row per (date, amount) pair.
    pub fn rows(&self) -> impl Iterator<Item = CharacterizedRow> + '_ {
        self.dates
            .iter()
            .zip(self.amounts.iter())
            .map(move |(date, amount)| CharacterizedRow {
                date: *date,
                amount: *amount,
                flow: self.flow,
                activity: self.activity,
            })
    }
}

/// One row of a characterized inventory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacterizedRow {
    pub date: NaiveDateTime,
    pub amount: FloatValue,
    pub flow: FlowId,
    pub activity: ActivityId,
}

/// Characterized inventory: rows sorted by date, then amount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterizedInventory {
    rows: Vec<CharacterizedRow>,
}

impl CharacterizedInventory {
    /// Wrap rows which are already in output order
    pub fn from_rows(rows: Vec<CharacterizedRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CharacterizedRow> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[CharacterizedRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<CharacterizedRow> {
        self.rows
    }

    /// Sum of all amounts
    pub fn total(&self) -> FloatValue {
        self.rows.iter().map(|row| row.amount).sum()
    }

    pub fn rows_for_flow(&self, flow: FlowId) -> impl Iterator<Item = &CharacterizedRow> + '_ {
        self.rows.iter().filter(move |row| row.flow == flow)
    }
}

impl<'a> IntoIterator for &'a CharacterizedInventory {
    type Item = &'a CharacterizedRow;
    type IntoIter = std::slice::Iter<'a, CharacterizedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for CharacterizedInventory {
    type Item = CharacterizedRow;
    type IntoIter = std::vec::IntoIter<CharacterizedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use is_close::is_close;
    use ndarray::array;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn annual_dates_use_mean_year() {
        let dates = annual_dates(date(2030, 6, 15), 3).unwrap();
        assert_eq!(dates[0], date(2030, 6, 15));
        assert_eq!((dates[1] - dates[0]).num_seconds(), SECONDS_PER_YEAR);
        assert_eq!((dates[2] - dates[0]).num_seconds(), 2 * SECONDS_PER_YEAR);
    }

    #[test]
    fn dates_beyond_calendar_range_are_an_error() {
        let err = annual_dates(date(2030, 6, 15), 300_000).unwrap_err();
        assert!(matches!(err, DynCharError::InvalidParameters(_)));

        let record = EmissionRecord::new(date(2030, 6, 15), 1.0, 1, 2);
        let cumulative = Array1::from_elem(300_000, 1.0);
        assert!(CharacterizedSeries::from_cumulative(&record, cumulative, ForcingMode::Marginal).is_err());
    }

    #[test]
    fn marginal_and_cumulative_are_dual() {
        let cumulative = array![0.0, 1.5, 2.25, 4.0];
        let marginal = marginal_from_cumulative(&cumulative);
        assert_eq!(marginal, array![0.0, 1.5, 0.75, 1.75]);
        let back = cumulative_from_marginal(&marginal);
        back.iter()
            .zip(cumulative.iter())
            .for_each(|(a, b)| assert!(is_close!(*a, *b)));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let result = CharacterizedSeries::new(
            vec![date(2020, 1, 1)],
            array![1.0, 2.0],
            1,
            2,
            ForcingMode::Marginal,
        );
        assert!(result.is_err());
    }

    #[test]
    fn series_starts_at_record_date() {
        let record = EmissionRecord::new(date(2022, 5, 25), 2.0, 3, 4);
        let series =
            CharacterizedSeries::from_cumulative(&record, array![0.0, 2.0, 3.0], ForcingMode::Marginal)
                .unwrap();
        assert_eq!(series.dates()[0], record.date);
        assert_eq!(series.amounts(), &array![0.0, 2.0, 1.0]);
        assert!(is_close!(series.integral(), 3.0));
        assert!(is_close!(series.to_cumulative().integral(), 3.0));
    }

    #[test]
    fn rows_carry_flow_and_activity() {
        let record = EmissionRecord::new(date(2022, 5, 25), 1.0, 3, 4);
        let series = CharacterizedSeries::single(&record, 7.0);
        let rows: Vec<_> = series.rows().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].flow, 3);
        assert_eq!(rows[0].activity, 4);
        assert_eq!(rows[0].amount, 7.0);
    }

    #[test]
    fn inventory_helpers() {
        let first = EmissionRecord::new(date(2020, 1, 1), 1.0, 1, 10);
        let second = EmissionRecord::new(date(2021, 1, 1), 1.0, 2, 10);
        let rows = CharacterizedSeries::single(&first, 2.0)
            .rows()
            .chain(CharacterizedSeries::single(&second, 3.0).rows())
            .collect();
        let inventory = CharacterizedInventory::from_rows(rows);

        assert_eq!(inventory.len(), 2);
        assert!(is_close!(inventory.total(), 5.0));
        assert_eq!(inventory.rows_for_flow(2).count(), 1);
        assert_eq!(inventory.iter().next().unwrap().flow, 1);
    }
}
