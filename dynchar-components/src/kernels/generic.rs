use dynchar_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cumulative forcing multipliers per kg for years `0..len` after emission.
///
/// Used for greenhouse gases without a closed-form kernel, e.g. from a
/// [`dynchar_core::data::DecayMultiplierTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecaySeries(Arc<[FloatValue]>);

impl DecaySeries {
    pub fn new(multipliers: &[FloatValue]) -> Self {
        Self(Arc::from(multipliers))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Multipliers truncated to `period` years
    pub fn truncated(&self, period: usize) -> &[FloatValue] {
        &self.0[..period.min(self.0.len())]
    }
}

impl From<Vec<FloatValue>> for DecaySeries {
    fn from(value: Vec<FloatValue>) -> Self {
        Self(Arc::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation() {
        let series = DecaySeries::from(vec![0.0, 1.0, 2.0]);
        assert_eq!(series.truncated(2), &[0.0, 1.0]);
        assert_eq!(series.truncated(10).len(), 3);
        assert!(series.truncated(0).is_empty());
    }
}
