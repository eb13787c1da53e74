//! Columnar source abstraction
//!
//! The storage engine itself is an external collaborator; this module models
//! the slice of it the streaming engine needs: a typed, sliceable sequence
//! with a known row count. Out-of-core sources implement [`RowSource`]; the
//! in-memory [`SArray`] and [`SFrameSlice`] cover tests and small data.

use chrono::{DateTime, Utc};
use std::ops::Range;

use crate::error::{Result, VizError};

/// An 8-bit interleaved raster image carried in a column.
#[derive(Debug, Clone, PartialEq)]
pub struct FlexImage {
    pub width: usize,
    pub height: usize,
    /// Samples per pixel (1 = gray, 3 = RGB, 4 = RGBA)
    pub channels: usize,
    /// Row-major interleaved samples, `width * height * channels` bytes
    pub data: Vec<u8>,
}

impl FlexImage {
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height * channels);
        FlexImage {
            width,
            height,
            channels,
            data,
        }
    }

    /// Nearest-neighbor down-sample to `target_height` rows, aspect ratio
    /// preserved. Images already at or below the target are returned as-is.
    pub fn thumbnail(&self, target_height: usize) -> FlexImage {
        if self.height <= target_height || self.height == 0 || self.width == 0 {
            return self.clone();
        }
        let scale = target_height as f64 / self.height as f64;
        let out_w = ((self.width as f64 * scale).round() as usize).max(1);
        let out_h = target_height;
        let mut data = Vec::with_capacity(out_w * out_h * self.channels);
        for oy in 0..out_h {
            let sy = (oy * self.height) / out_h;
            for ox in 0..out_w {
                let sx = (ox * self.width) / out_w;
                let base = (sy * self.width + sx) * self.channels;
                data.extend_from_slice(&self.data[base..base + self.channels]);
            }
        }
        FlexImage {
            width: out_w,
            height: out_h,
            channels: self.channels,
            data,
        }
    }
}

/// One typed cell value from a column.
///
/// Closed over the field types the wire protocol understands; anything else
/// the storage engine holds must be mapped into one of these by the source.
#[derive(Debug, Clone, PartialEq)]
pub enum FlexValue {
    Integer(i64),
    Float(f64),
    Str(String),
    Vector(Vec<f64>),
    DateTime(DateTime<Utc>),
    Image(FlexImage),
    List(Vec<FlexValue>),
    Dict(Vec<(String, FlexValue)>),
    Undefined,
}

impl FlexValue {
    /// True for `Undefined` (the storage engine's missing-value marker)
    pub fn is_undefined(&self) -> bool {
        matches!(self, FlexValue::Undefined)
    }

    /// Numeric view: integers widen to f64, everything else is None
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FlexValue::Integer(v) => Some(*v as f64),
            FlexValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Finite numeric view: NaN and infinities are treated as absent
    pub fn as_finite_f64(&self) -> Option<f64> {
        self.as_f64().filter(|v| v.is_finite())
    }

    /// Label view used by categorical charts: strings pass through,
    /// numbers are formatted, missing values are None
    pub fn as_label(&self) -> Option<String> {
        match self {
            FlexValue::Str(s) => Some(s.clone()),
            FlexValue::Integer(v) => Some(v.to_string()),
            FlexValue::Float(v) => Some(v.to_string()),
            FlexValue::Undefined => None,
            _ => None,
        }
    }
}

impl From<i64> for FlexValue {
    fn from(v: i64) -> Self {
        FlexValue::Integer(v)
    }
}

impl From<f64> for FlexValue {
    fn from(v: f64) -> Self {
        FlexValue::Float(v)
    }
}

impl From<&str> for FlexValue {
    fn from(v: &str) -> Self {
        FlexValue::Str(v.to_string())
    }
}

/// A typed, sliceable row sequence with a known length.
///
/// `rows` is fallible so that out-of-core sources can surface iterator
/// failures; the engine propagates them to the `get()` caller unchanged.
/// The row count must not change after the engine binds the source.
pub trait RowSource: Send {
    type Row: Send + Sync;

    fn row_count(&self) -> usize;

    /// Materialize the rows in `range` (callers never pass an out-of-bounds
    /// range; the engine clamps to `row_count()`).
    fn rows(&self, range: Range<usize>) -> Result<Vec<Self::Row>>;
}

/// In-memory single column
#[derive(Debug, Clone, Default)]
pub struct SArray {
    values: Vec<FlexValue>,
}

impl SArray {
    pub fn new(values: Vec<FlexValue>) -> Self {
        SArray { values }
    }

    pub fn from_ints(values: impl IntoIterator<Item = i64>) -> Self {
        SArray::new(values.into_iter().map(FlexValue::Integer).collect())
    }

    pub fn from_floats(values: impl IntoIterator<Item = f64>) -> Self {
        SArray::new(values.into_iter().map(FlexValue::Float).collect())
    }

    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        SArray::new(
            values
                .into_iter()
                .map(|s| FlexValue::Str(s.into()))
                .collect(),
        )
    }

    pub fn values(&self) -> &[FlexValue] {
        &self.values
    }

    /// Best-effort dtype probe: the first defined value decides
    pub fn is_numeric(&self) -> bool {
        self.values
            .iter()
            .find(|v| !v.is_undefined())
            .map(|v| v.as_f64().is_some())
            .unwrap_or(false)
    }
}

impl RowSource for SArray {
    type Row = FlexValue;

    fn row_count(&self) -> usize {
        self.values.len()
    }

    fn rows(&self, range: Range<usize>) -> Result<Vec<FlexValue>> {
        Ok(self.values[range].to_vec())
    }
}

/// In-memory pair of columns of equal length, the row being `(x, y)`.
/// This is what scatter, heatmap, and box-and-whisker charts consume.
#[derive(Debug, Clone)]
pub struct SFrameSlice {
    x: Vec<FlexValue>,
    y: Vec<FlexValue>,
}

impl SFrameSlice {
    /// Pair two columns. Fails if the lengths differ.
    pub fn new(x: SArray, y: SArray) -> Result<Self> {
        if x.row_count() != y.row_count() {
            return Err(VizError::Source(format!(
                "column lengths differ: {} vs {}",
                x.row_count(),
                y.row_count()
            )));
        }
        Ok(SFrameSlice {
            x: x.values,
            y: y.values,
        })
    }
}

impl RowSource for SFrameSlice {
    type Row = (FlexValue, FlexValue);

    fn row_count(&self) -> usize {
        self.x.len()
    }

    fn rows(&self, range: Range<usize>) -> Result<Vec<(FlexValue, FlexValue)>> {
        Ok(range
            .map(|i| (self.x[i].clone(), self.y[i].clone()))
            .collect())
    }
}
