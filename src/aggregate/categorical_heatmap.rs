//! Categorical heatmap accumulator: co-occurrence counts over two
//! label columns. Rows with a missing label on either axis are tracked
//! but not counted in any cell.

use std::collections::HashMap;

use crate::source::FlexValue;
use crate::transform::Aggregator;

/// Emitted cell grid, sorted by (x, y) label
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapSummary {
    pub cells: Vec<(String, String, u64)>,
    pub num_rows: u64,
    pub num_missing: u64,
}

#[derive(Debug, Clone, Default)]
pub struct CategoricalHeatmap {
    cells: HashMap<(String, String), u64>,
    num_rows: u64,
    num_missing: u64,
}

impl Aggregator for CategoricalHeatmap {
    type Row = (FlexValue, FlexValue);
    type Output = HeatmapSummary;

    fn fresh(&self) -> Self {
        CategoricalHeatmap::default()
    }

    fn add_element(&mut self, row: &(FlexValue, FlexValue)) {
        self.num_rows += 1;
        match (row.0.as_label(), row.1.as_label()) {
            (Some(x), Some(y)) => {
                *self.cells.entry((x, y)).or_insert(0) += 1;
            }
            _ => self.num_missing += 1,
        }
    }

    fn combine(&mut self, other: Self) {
        self.num_rows += other.num_rows;
        self.num_missing += other.num_missing;
        for (key, count) in other.cells {
            *self.cells.entry(key).or_insert(0) += count;
        }
    }

    fn emit(&self) -> HeatmapSummary {
        let mut cells: Vec<(String, String, u64)> = self
            .cells
            .iter()
            .map(|((x, y), c)| (x.clone(), y.clone(), *c))
            .collect();
        cells.sort();
        HeatmapSummary {
            cells,
            num_rows: self.num_rows,
            num_missing: self.num_missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(x: &str, y: &str) -> (FlexValue, FlexValue) {
        (FlexValue::from(x), FlexValue::from(y))
    }

    #[test]
    fn test_cell_counts() {
        let mut h = CategoricalHeatmap::default();
        h.add_element(&pair("a", "p"));
        h.add_element(&pair("a", "p"));
        h.add_element(&pair("b", "q"));
        h.add_element(&(FlexValue::Undefined, FlexValue::from("q")));
        let summary = h.emit();
        assert_eq!(
            summary.cells,
            vec![
                ("a".to_string(), "p".to_string(), 2),
                ("b".to_string(), "q".to_string(), 1)
            ]
        );
        assert_eq!(summary.num_missing, 1);
        assert_eq!(summary.num_rows, 4);
    }

    #[test]
    fn test_combine_matches_sequential() {
        let rows = [pair("a", "p"), pair("b", "q"), pair("a", "q"), pair("a", "p")];
        let mut sequential = CategoricalHeatmap::default();
        for r in &rows {
            sequential.add_element(r);
        }
        let mut left = CategoricalHeatmap::default();
        let mut right = CategoricalHeatmap::default();
        left.add_element(&rows[0]);
        left.add_element(&rows[1]);
        right.add_element(&rows[2]);
        right.add_element(&rows[3]);
        left.combine(right);
        assert_eq!(left.emit(), sequential.emit());
    }
}
