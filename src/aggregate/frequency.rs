//! Item-frequency accumulator
//!
//! Per-label counts plus the summary statistics reported alongside them:
//! total rows, distinct labels, and non-null rows. Backs
//! both the item-frequency table and categorical bar data.

use std::collections::HashMap;

use crate::source::FlexValue;
use crate::transform::Aggregator;

/// Emitted frequency table, sorted by descending count with ties broken by
/// ascending label
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencySummary {
    pub items: Vec<(String, u64)>,
    pub num_rows: u64,
    pub num_unique: u64,
    pub num_missing: u64,
}

#[derive(Debug, Clone, Default)]
pub struct FrequencyCount {
    counts: HashMap<String, u64>,
    num_rows: u64,
    non_null: u64,
}

impl Aggregator for FrequencyCount {
    type Row = FlexValue;
    type Output = FrequencySummary;

    fn fresh(&self) -> Self {
        FrequencyCount::default()
    }

    fn add_element(&mut self, row: &FlexValue) {
        self.num_rows += 1;
        if let Some(label) = row.as_label() {
            *self.counts.entry(label).or_insert(0) += 1;
            self.non_null += 1;
        }
    }

    fn combine(&mut self, other: Self) {
        self.num_rows += other.num_rows;
        self.non_null += other.non_null;
        for (label, count) in other.counts {
            *self.counts.entry(label).or_insert(0) += count;
        }
    }

    fn emit(&self) -> FrequencySummary {
        let mut items: Vec<(String, u64)> =
            self.counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
        items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        FrequencySummary {
            num_unique: items.len() as u64,
            items,
            num_rows: self.num_rows,
            num_missing: self.num_rows - self.non_null,
        }
    }
}
