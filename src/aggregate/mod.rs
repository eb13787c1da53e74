//! Concrete accumulators for each chart kind
//!
//! Every type here satisfies the [`Aggregator`](crate::transform::Aggregator)
//! combine contract: merging partial states from any partition of the input
//! yields the same emitted result as sequential accumulation.

pub mod boxes_and_whiskers;
pub mod categorical_heatmap;
pub mod frequency;
pub mod histogram;
pub mod scatter;

pub use boxes_and_whiskers::{BoxSummary, BoxesAndWhiskers, BoxesSummary};
pub use categorical_heatmap::{CategoricalHeatmap, HeatmapSummary};
pub use frequency::{FrequencyCount, FrequencySummary};
pub use histogram::{HistogramBin, HistogramSummary, StreamingHistogram};
pub use scatter::ScatterPoints;
