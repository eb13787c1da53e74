//! Box-and-whisker accumulator: per-category numeric values, with the
//! five-number summary computed at emit time from the collected values.
//! Merge is concatenation, so the summary never depends on how the input
//! was partitioned.

use std::collections::HashMap;

use crate::source::FlexValue;
use crate::transform::Aggregator;

/// Five-number summary for one category
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub label: String,
    pub min: f64,
    pub lower_quartile: f64,
    pub median: f64,
    pub upper_quartile: f64,
    pub max: f64,
}

/// Emitted box set, sorted by label
#[derive(Debug, Clone, PartialEq)]
pub struct BoxesSummary {
    pub series: Vec<BoxSummary>,
    pub num_rows: u64,
    pub num_missing: u64,
}

#[derive(Debug, Clone, Default)]
pub struct BoxesAndWhiskers {
    groups: HashMap<String, Vec<f64>>,
    num_rows: u64,
    num_missing: u64,
}

/// Quantile by linear interpolation over the sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

impl Aggregator for BoxesAndWhiskers {
    type Row = (FlexValue, FlexValue);
    type Output = BoxesSummary;

    fn fresh(&self) -> Self {
        BoxesAndWhiskers::default()
    }

    fn add_element(&mut self, row: &(FlexValue, FlexValue)) {
        self.num_rows += 1;
        match (row.0.as_label(), row.1.as_finite_f64()) {
            (Some(label), Some(value)) => {
                self.groups.entry(label).or_default().push(value);
            }
            _ => self.num_missing += 1,
        }
    }

    fn combine(&mut self, other: Self) {
        self.num_rows += other.num_rows;
        self.num_missing += other.num_missing;
        for (label, values) in other.groups {
            self.groups.entry(label).or_default().extend(values);
        }
    }

    fn emit(&self) -> BoxesSummary {
        let mut series: Vec<BoxSummary> = self
            .groups
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(label, values)| {
                let mut sorted = values.clone();
                sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
                BoxSummary {
                    label: label.clone(),
                    min: sorted[0],
                    lower_quartile: quantile(&sorted, 0.25),
                    median: quantile(&sorted, 0.5),
                    upper_quartile: quantile(&sorted, 0.75),
                    max: sorted[sorted.len() - 1],
                }
            })
            .collect();
        series.sort_by(|a, b| a.label.cmp(&b.label));
        BoxesSummary {
            series,
            num_rows: self.num_rows,
            num_missing: self.num_missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, v: f64) -> (FlexValue, FlexValue) {
        (FlexValue::from(label), FlexValue::Float(v))
    }

    #[test]
    fn test_five_number_summary() {
        let mut b = BoxesAndWhiskers::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            b.add_element(&row("g", v));
        }
        let summary = b.emit();
        assert_eq!(summary.series.len(), 1);
        let s = &summary.series[0];
        assert_eq!(s.min, 1.0);
        assert_eq!(s.lower_quartile, 2.0);
        assert_eq!(s.median, 3.0);
        assert_eq!(s.upper_quartile, 4.0);
        assert_eq!(s.max, 5.0);
    }

    #[test]
    fn test_skips_nonfinite_and_missing() {
        let mut b = BoxesAndWhiskers::default();
        b.add_element(&row("g", 1.0));
        b.add_element(&row("g", f64::NAN));
        b.add_element(&(FlexValue::Undefined, FlexValue::Float(2.0)));
        let summary = b.emit();
        assert_eq!(summary.num_rows, 3);
        assert_eq!(summary.num_missing, 2);
        assert_eq!(summary.series[0].min, 1.0);
        assert_eq!(summary.series[0].max, 1.0);
    }

    #[test]
    fn test_combine_matches_sequential() {
        let rows: Vec<_> = (0..40)
            .map(|i| row(if i % 2 == 0 { "even" } else { "odd" }, i as f64))
            .collect();
        let mut sequential = BoxesAndWhiskers::default();
        for r in &rows {
            sequential.add_element(r);
        }
        let mut left = BoxesAndWhiskers::default();
        let mut right = BoxesAndWhiskers::default();
        for r in &rows[..17] {
            left.add_element(r);
        }
        for r in &rows[17..] {
            right.add_element(r);
        }
        left.combine(right);
        assert_eq!(left.emit(), sequential.emit());
    }
}
