//! Mergeable streaming histogram
//!
//! Bins cover a zero-anchored symmetric range `[-half * width, half * width)`
//! whose width only ever doubles. Because every scale is a power of two of
//! the initial width and all ranges share the anchor, bin edges at a narrow
//! scale always align with bin edges at any wider scale; rescaling moves
//! whole bins, never splits them. The final scale is a function of the
//! global value extremes alone, so merged counts are identical for every
//! partitioning of the input.

use crate::config::DEFAULT_HISTOGRAM_BINS;
use crate::source::FlexValue;
use crate::transform::Aggregator;

/// One emitted bin: `[left, right)` with its count
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub left: f64,
    pub right: f64,
    pub count: u64,
}

/// Emitted histogram snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSummary {
    /// Non-empty span of bins, zero-count gaps included
    pub bins: Vec<HistogramBin>,
    /// Rows seen, including missing ones
    pub num_rows: u64,
    /// Undefined or non-finite rows (not binnable)
    pub num_missing: u64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone)]
pub struct StreamingHistogram {
    counts: Vec<u64>,
    /// Bin width; a power-of-two multiple of 1.0 once initialized
    width: f64,
    initialized: bool,
    num_rows: u64,
    num_missing: u64,
    min: f64,
    max: f64,
}

impl Default for StreamingHistogram {
    fn default() -> Self {
        StreamingHistogram::new(DEFAULT_HISTOGRAM_BINS)
    }
}

impl StreamingHistogram {
    pub fn new(n_bins: usize) -> Self {
        // an even bin count keeps the range symmetric around zero
        let n_bins = n_bins.max(2) & !1;
        StreamingHistogram {
            counts: vec![0; n_bins],
            width: 1.0,
            initialized: false,
            num_rows: 0,
            num_missing: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn half(&self) -> usize {
        self.counts.len() / 2
    }

    fn fits(&self, value: f64) -> bool {
        let bound = self.half() as f64 * self.width;
        value >= -bound && value < bound
    }

    /// Double the scale: adjacent bin pairs collapse toward the anchor
    fn widen(&mut self) {
        let n = self.counts.len();
        let half = self.half();
        let mut merged = vec![0u64; n];
        for (i, &c) in self.counts.iter().enumerate() {
            if c == 0 {
                continue;
            }
            // signed bin index at the old scale, floor-halved to the new one
            let signed = i as i64 - half as i64;
            let new_signed = signed.div_euclid(2);
            merged[(new_signed + half as i64) as usize] += c;
        }
        self.counts = merged;
        self.width *= 2.0;
    }

    fn bin_index(&self, value: f64) -> usize {
        ((value / self.width).floor() as i64 + self.half() as i64) as usize
    }

    fn insert(&mut self, value: f64) {
        self.initialized = true;
        while !self.fits(value) {
            self.widen();
        }
        let idx = self.bin_index(value);
        self.counts[idx] += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

impl Aggregator for StreamingHistogram {
    type Row = FlexValue;
    type Output = HistogramSummary;

    fn fresh(&self) -> Self {
        StreamingHistogram::new(self.counts.len())
    }

    fn add_element(&mut self, row: &FlexValue) {
        self.num_rows += 1;
        match row.as_finite_f64() {
            Some(v) => self.insert(v),
            None => self.num_missing += 1,
        }
    }

    fn combine(&mut self, mut other: Self) {
        self.num_rows += other.num_rows;
        self.num_missing += other.num_missing;
        if !other.initialized {
            return;
        }
        if !self.initialized {
            self.counts = other.counts;
            self.width = other.width;
            self.initialized = true;
            self.min = other.min;
            self.max = other.max;
            return;
        }
        // bring both sides to the common coarser scale, then add counts
        while self.width < other.width {
            self.widen();
        }
        while other.width < self.width {
            other.widen();
        }
        for (dst, src) in self.counts.iter_mut().zip(other.counts.iter()) {
            *dst += src;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    fn emit(&self) -> HistogramSummary {
        let half = self.half() as f64;
        let first = self.counts.iter().position(|&c| c > 0);
        let bins = match first {
            None => Vec::new(),
            Some(first) => {
                let last = self.counts.iter().rposition(|&c| c > 0).unwrap_or(first);
                (first..=last)
                    .map(|i| HistogramBin {
                        left: (i as f64 - half) * self.width,
                        right: (i as f64 - half + 1.0) * self.width,
                        count: self.counts[i],
                    })
                    .collect()
            }
        };
        HistogramSummary {
            bins,
            num_rows: self.num_rows,
            num_missing: self.num_missing,
            min: if self.initialized { self.min } else { f64::NAN },
            max: if self.initialized { self.max } else { f64::NAN },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn accumulate(values: &[f64], n_bins: usize) -> StreamingHistogram {
        let mut h = StreamingHistogram::new(n_bins);
        for &v in values {
            h.add_element(&FlexValue::Float(v));
        }
        h
    }

    #[test]
    fn test_total_count_preserved() {
        let h = accumulate(&[0.5, 1.5, -3.0, 100.0, 7.25], 8);
        let summary = h.emit();
        let total: u64 = summary.bins.iter().map(|b| b.count).sum();
        assert_eq!(total, 5);
        assert_eq!(summary.num_rows, 5);
        assert_eq!(summary.num_missing, 0);
    }

    #[test]
    fn test_missing_values_counted_not_binned() {
        let mut h = StreamingHistogram::new(8);
        h.add_element(&FlexValue::Float(1.0));
        h.add_element(&FlexValue::Undefined);
        h.add_element(&FlexValue::Float(f64::NAN));
        h.add_element(&FlexValue::Float(f64::INFINITY));
        let summary = h.emit();
        assert_eq!(summary.num_rows, 4);
        assert_eq!(summary.num_missing, 3);
        let total: u64 = summary.bins.iter().map(|b| b.count).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_bin_edges_contiguous() {
        let summary = accumulate(&[-10.0, -1.0, 0.0, 3.5, 90.0], 16).emit();
        for pair in summary.bins.windows(2) {
            assert_eq!(pair[0].right, pair[1].left);
        }
        assert!(summary.bins.first().unwrap().left <= -10.0);
        assert!(summary.bins.last().unwrap().right > 90.0);
    }

    #[test]
    fn test_combine_matches_sequential() {
        let values: Vec<f64> = (0..500).map(|i| (i as f64) * 0.37 - 90.0).collect();
        let sequential = accumulate(&values, 32).emit();
        for split in [1, 13, 250, 499] {
            let mut a = accumulate(&values[..split], 32);
            let b = accumulate(&values[split..], 32);
            a.combine(b);
            assert_eq!(a.emit(), sequential, "split at {}", split);
        }
    }

    #[test]
    fn test_combine_with_empty() {
        let values = [1.0, 2.0, 3.0];
        let mut a = accumulate(&values, 8);
        a.combine(StreamingHistogram::new(8));
        assert_eq!(a.emit(), accumulate(&values, 8).emit());

        let mut empty = StreamingHistogram::new(8);
        empty.combine(accumulate(&values, 8));
        assert_eq!(empty.emit(), accumulate(&values, 8).emit());
    }

    proptest! {
        #[test]
        fn prop_partition_invariant(
            values in proptest::collection::vec(-1e6f64..1e6, 1..200),
            split in 0usize..200,
        ) {
            let split = split % values.len();
            let sequential = accumulate(&values, 16).emit();
            let mut a = accumulate(&values[..split], 16);
            a.combine(accumulate(&values[split..], 16));
            prop_assert_eq!(a.emit(), sequential);
        }
    }
}
