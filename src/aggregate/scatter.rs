//! Scatter point accumulator
//!
//! Collects raw (x, y) pairs in source order. The skip rules for missing
//! and non-finite values are applied by the serializer, never here, so the
//! accumulated state always reflects the full input.

use crate::source::FlexValue;
use crate::transform::Aggregator;

#[derive(Debug, Clone, Default)]
pub struct ScatterPoints {
    points: Vec<(FlexValue, FlexValue)>,
}

impl ScatterPoints {
    pub fn points(&self) -> &[(FlexValue, FlexValue)] {
        &self.points
    }
}

impl Aggregator for ScatterPoints {
    type Row = (FlexValue, FlexValue);
    type Output = Vec<(FlexValue, FlexValue)>;

    fn fresh(&self) -> Self {
        ScatterPoints::default()
    }

    fn add_element(&mut self, row: &(FlexValue, FlexValue)) {
        self.points.push(row.clone());
    }

    fn combine(&mut self, other: Self) {
        // partials arrive in sub-range order, so append preserves
        // source order
        self.points.extend(other.points);
    }

    fn emit(&self) -> Vec<(FlexValue, FlexValue)> {
        self.points.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_preserved_across_combine() {
        let mut a = ScatterPoints::default();
        let mut b = ScatterPoints::default();
        for i in 0..3 {
            a.add_element(&(FlexValue::Integer(i), FlexValue::Integer(i * 10)));
        }
        for i in 3..5 {
            b.add_element(&(FlexValue::Integer(i), FlexValue::Integer(i * 10)));
        }
        a.combine(b);
        let xs: Vec<i64> = a
            .emit()
            .iter()
            .map(|(x, _)| match x {
                FlexValue::Integer(v) => *v,
                _ => panic!("unexpected type"),
            })
            .collect();
        assert_eq!(xs, vec![0, 1, 2, 3, 4]);
    }
}
