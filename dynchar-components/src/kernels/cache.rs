//! Process-wide memo of static kernel multipliers.
//!
//! Entries are keyed by gas and period and are never removed. A request for a
//! period that is not cached yet starts from the longest cached shorter period
//! of the same gas and computes only the missing years, so the result is
//! identical to computing every year from scratch.

use super::ipcc::StaticGas;
use dynchar_core::timeseries::FloatValue;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct MultiplierCache {
    entries: RwLock<HashMap<(StaticGas, usize), Arc<[FloatValue]>>>,
}

impl MultiplierCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Multipliers of `gas` for years `0..period`
    pub fn get_or_compute(&self, gas: StaticGas, period: usize) -> Arc<[FloatValue]> {
        let prefix = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(values) = entries.get(&(gas, period)) {
                return Arc::clone(values);
            }
            entries
                .iter()
                .filter(|((cached_gas, cached_period), _)| *cached_gas == gas && *cached_period < period)
                .max_by_key(|((_, cached_period), _)| *cached_period)
                .map(|(_, values)| Arc::clone(values))
        };

        let mut values = Vec::with_capacity(period);
        if let Some(prefix) = prefix {
            values.extend_from_slice(&prefix);
        }
        let start = values.len();
        values.extend((start..period).map(|year| gas.multiplier(year)));

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have inserted the same entry in the meantime; keep the first
        Arc::clone(
            entries
                .entry((gas, period))
                .or_insert_with(|| Arc::from(values)),
        )
    }

    /// Number of cached (gas, period) entries
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, gas: StaticGas, period: usize) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(gas, period))
    }
}

pub static MULTIPLIER_CACHE: LazyLock<MultiplierCache> = LazyLock::new(MultiplierCache::new);
