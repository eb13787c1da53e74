//! Chunked transformation engine
//!
//! Drives an [`Aggregator`] over a [`RowSource`] one bounded chunk at a
//! time. Each `get()` call consumes at most one chunk, fans the rows out to
//! a fixed-size worker pool, and folds the per-worker partials back into the
//! running state in a deterministic order, so the merged result never
//! depends on worker completion order or thread count.

use rayon::prelude::*;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::source::RowSource;

/// Per-chunk aggregation state.
///
/// `combine` must be associative and commutative: merging partials from any
/// partition of the input has to produce the same logical result as
/// sequential accumulation.
pub trait Aggregator: Send + Sync {
    type Row;
    type Output;

    /// Empty state carrying the same parameters as `self`; one is created
    /// per worker for every chunk
    fn fresh(&self) -> Self;

    /// Fold one row into this state
    fn add_element(&mut self, row: &Self::Row);

    /// Merge another partial state into this one
    fn combine(&mut self, other: Self);

    /// Snapshot the aggregate for serialization
    fn emit(&self) -> Self::Output;
}

/// Incremental, chunk-at-a-time driver for one aggregator over one source.
///
/// Owns both exclusively; all mutation happens inside `get()`, which is why
/// the progress accessors can be plain reads.
pub struct ChunkedTransformer<S, A>
where
    S: RowSource,
    A: Aggregator<Row = S::Row>,
{
    source: S,
    state: A,
    total_rows: usize,
    rows_processed: usize,
    chunk_size: usize,
    num_workers: usize,
}

impl<S, A> ChunkedTransformer<S, A>
where
    S: RowSource,
    A: Aggregator<Row = S::Row>,
{
    /// Bind a source. The row count is fixed here; a source whose length
    /// changes afterwards is out of contract.
    pub fn new(source: S, state: A, config: &EngineConfig) -> Self {
        let total_rows = source.row_count();
        ChunkedTransformer {
            source,
            state,
            total_rows,
            rows_processed: 0,
            chunk_size: config.chunk_size.max(1),
            num_workers: config.effective_workers(),
        }
    }

    /// Consume up to one chunk and return the merged running state.
    ///
    /// At end-of-stream this is a pure read of the final state. Source
    /// iterator failures propagate unchanged; nothing is retried.
    pub fn get(&mut self) -> Result<&A> {
        if !self.eof() {
            let start = self.rows_processed;
            let end = (start + self.chunk_size).min(self.total_rows);
            let rows = self.source.rows(start..end)?;
            debug_assert_eq!(rows.len(), end - start, "source row count changed after init");

            // One contiguous sub-range per worker; fold partials back in
            // sub-range order so the merge is deterministic.
            let stride = rows.len().div_ceil(self.num_workers).max(1);
            let seed = &self.state;
            let partials: Vec<A> = rows
                .par_chunks(stride)
                .map(|slice| {
                    let mut acc = seed.fresh();
                    for row in slice {
                        acc.add_element(row);
                    }
                    acc
                })
                .collect();
            for partial in partials {
                self.state.combine(partial);
            }

            self.rows_processed = end;
            debug!(
                rows = end - start,
                processed = self.rows_processed,
                total = self.total_rows,
                "consumed chunk"
            );
        }
        Ok(&self.state)
    }

    /// True once the entire source has been consumed
    pub fn eof(&self) -> bool {
        self.rows_processed >= self.total_rows
    }

    /// Monotonically non-decreasing count of rows consumed so far
    pub fn rows_processed(&self) -> usize {
        self.rows_processed
    }

    /// Total row count recorded at init
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Fraction of the source consumed, in [0, 1]; exactly 1.0 only at eof.
    /// An empty source is complete from the start.
    pub fn percent_complete(&self) -> f64 {
        if self.total_rows == 0 {
            return 1.0;
        }
        (self.rows_processed as f64 / self.total_rows as f64).clamp(0.0, 1.0)
    }

    /// Drain to completion
    pub fn materialize(&mut self) -> Result<()> {
        while !self.eof() {
            self.get()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FlexValue, SArray};

    /// Sums integer cells; trivially associative and commutative
    #[derive(Default)]
    struct SumAgg {
        sum: i64,
        seen: usize,
    }

    impl Aggregator for SumAgg {
        type Row = FlexValue;
        type Output = (i64, usize);

        fn fresh(&self) -> Self {
            SumAgg::default()
        }

        fn add_element(&mut self, row: &FlexValue) {
            if let FlexValue::Integer(v) = row {
                self.sum += v;
            }
            self.seen += 1;
        }

        fn combine(&mut self, other: Self) {
            self.sum += other.sum;
            self.seen += other.seen;
        }

        fn emit(&self) -> (i64, usize) {
            (self.sum, self.seen)
        }
    }

    fn engine(chunk: usize, n: i64) -> ChunkedTransformer<SArray, SumAgg> {
        ChunkedTransformer::new(
            SArray::from_ints(0..n),
            SumAgg::default(),
            &EngineConfig::with_chunk_size(chunk),
        )
    }

    #[test]
    fn test_eof_within_expected_polls() {
        // 6 rows, chunk 4: eof after ceil(6/4) = 2 get() calls
        let mut t = engine(4, 6);
        assert!(!t.eof());
        t.get().unwrap();
        assert_eq!(t.rows_processed(), 4);
        assert!(!t.eof());
        t.get().unwrap();
        assert_eq!(t.rows_processed(), 6);
        assert!(t.eof());
        assert_eq!(t.percent_complete(), 1.0);
    }

    #[test]
    fn test_progress_monotonic() {
        let mut t = engine(2, 9);
        let mut last = 0;
        while !t.eof() {
            t.get().unwrap();
            assert!(t.rows_processed() >= last);
            last = t.rows_processed();
        }
        assert_eq!(last, 9);
    }

    #[test]
    fn test_get_at_eof_is_noop() {
        let mut t = engine(100, 5);
        t.get().unwrap();
        assert!(t.eof());
        let (sum, seen) = t.get().unwrap().emit();
        assert_eq!(seen, 5);
        assert_eq!(sum, 10);
        assert_eq!(t.rows_processed(), 5);
    }

    #[test]
    fn test_empty_source_is_complete() {
        let mut t = engine(10, 0);
        assert!(t.eof());
        assert_eq!(t.percent_complete(), 1.0);
        assert_eq!(t.get().unwrap().emit(), (0, 0));
    }

    #[test]
    fn test_chunk_size_invariance() {
        let full = {
            let mut t = engine(1_000, 257);
            t.materialize().unwrap();
            t.get().unwrap().emit()
        };
        for chunk in [1, 2, 3, 7, 64, 256, 257, 300] {
            let mut t = engine(chunk, 257);
            t.materialize().unwrap();
            assert_eq!(t.get().unwrap().emit(), full, "chunk_size {}", chunk);
        }
    }

    #[test]
    fn test_worker_count_invariance() {
        let mut expected = None;
        for workers in [1, 2, 3, 8] {
            let mut cfg = EngineConfig::with_chunk_size(50);
            cfg.num_workers = workers;
            let mut t: ChunkedTransformer<SArray, SumAgg> =
                ChunkedTransformer::new(SArray::from_ints(0..123), SumAgg::default(), &cfg);
            t.materialize().unwrap();
            let out = t.get().unwrap().emit();
            if let Some(prev) = expected {
                assert_eq!(out, prev, "workers {}", workers);
            }
            expected = Some(out);
        }
    }

    #[test]
    fn test_materialize_postconditions() {
        let mut t = engine(4, 11);
        t.materialize().unwrap();
        assert!(t.eof());
        assert_eq!(t.percent_complete(), 1.0);
        assert_eq!(t.rows_processed(), 11);
    }
}
