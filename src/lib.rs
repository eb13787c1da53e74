//! Streaming visualization engine
//!
//! Incremental, chunked aggregation of columnar data into chart summaries,
//! delivered either as pull-based JSON envelopes or streamed over a framed
//! binary protocol to an external rendering client.

pub mod aggregate;
pub mod bridge;
pub mod config;
pub mod error;
pub mod io_buffer;
pub mod plot;
pub mod protocol;
pub mod registry;
pub mod serialize;
pub mod source;
pub mod transform;

pub use config::EngineConfig;
pub use error::{Result, VizError};
pub use plot::{create_plot, Plot, PlotStream};
pub use registry::PlotRegistry;
pub use source::{FlexValue, RowSource, SArray, SFrameSlice};
pub use transform::{Aggregator, ChunkedTransformer};
