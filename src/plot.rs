//! Plot facade
//!
//! The caller-facing handle binding a static Vega spec to a running chunked
//! aggregation engine. Supports pull-based delivery (`get_next_data`),
//! one-shot materialization (`get_data`), and fire-and-forget streaming to
//! an external rendering client (`show`).

use serde_json::json;
use std::thread::JoinHandle;
use tracing::{debug, error};

use crate::aggregate::{
    BoxesAndWhiskers, CategoricalHeatmap, FrequencyCount, ScatterPoints, StreamingHistogram,
};
use crate::bridge::ProcessBridge;
use crate::config::EngineConfig;
use crate::error::{Result, VizError};
use crate::protocol::messages::{data_message::Payload, WireMessage};
use crate::serialize;
use crate::source::{RowSource, SArray, SFrameSlice};
use crate::transform::{Aggregator, ChunkedTransformer};

/// Data source name referenced by the generated Vega specs
const DATA_SOURCE_NAME: &str = "source_2";

/// Closed set of chart kinds, each carrying its own typed engine.
/// Dispatch is a match, never a vtable; the kind set is fixed.
pub enum ChartData {
    Histogram(ChunkedTransformer<SArray, StreamingHistogram>),
    Scatter(ChunkedTransformer<SFrameSlice, ScatterPoints>),
    Categorical(ChunkedTransformer<SArray, FrequencyCount>),
    ItemFrequency(ChunkedTransformer<SArray, FrequencyCount>),
    CategoricalHeatmap(ChunkedTransformer<SFrameSlice, CategoricalHeatmap>),
    BoxesAndWhiskers(ChunkedTransformer<SFrameSlice, BoxesAndWhiskers>),
}

impl ChartData {
    /// Advance by at most one chunk and serialize the merged state
    fn next_payload(&mut self, config: &EngineConfig) -> Result<Payload> {
        match self {
            ChartData::Histogram(t) => Ok(serialize::histogram_payload(&t.get()?.emit())),
            ChartData::Scatter(t) => Ok(serialize::scatter_payload(&t.get()?.emit())),
            ChartData::Categorical(t) => {
                Ok(serialize::categorical_payload(&t.get()?.emit(), config))
            }
            ChartData::ItemFrequency(t) => {
                Ok(serialize::item_frequency_payload(&t.get()?.emit(), config))
            }
            ChartData::CategoricalHeatmap(t) => {
                Ok(serialize::heatmap_payload(&t.get()?.emit(), config))
            }
            ChartData::BoxesAndWhiskers(t) => Ok(serialize::boxes_payload(&t.get()?.emit(), config)),
        }
    }

    fn eof(&self) -> bool {
        match self {
            ChartData::Histogram(t) => t.eof(),
            ChartData::Scatter(t) => t.eof(),
            ChartData::Categorical(t) => t.eof(),
            ChartData::ItemFrequency(t) => t.eof(),
            ChartData::CategoricalHeatmap(t) => t.eof(),
            ChartData::BoxesAndWhiskers(t) => t.eof(),
        }
    }

    fn rows_processed(&self) -> usize {
        match self {
            ChartData::Histogram(t) => t.rows_processed(),
            ChartData::Scatter(t) => t.rows_processed(),
            ChartData::Categorical(t) => t.rows_processed(),
            ChartData::ItemFrequency(t) => t.rows_processed(),
            ChartData::CategoricalHeatmap(t) => t.rows_processed(),
            ChartData::BoxesAndWhiskers(t) => t.rows_processed(),
        }
    }

    fn percent_complete(&self) -> f64 {
        match self {
            ChartData::Histogram(t) => t.percent_complete(),
            ChartData::Scatter(t) => t.percent_complete(),
            ChartData::Categorical(t) => t.percent_complete(),
            ChartData::ItemFrequency(t) => t.percent_complete(),
            ChartData::CategoricalHeatmap(t) => t.percent_complete(),
            ChartData::BoxesAndWhiskers(t) => t.percent_complete(),
        }
    }

    fn materialize(&mut self) -> Result<()> {
        match self {
            ChartData::Histogram(t) => t.materialize(),
            ChartData::Scatter(t) => t.materialize(),
            ChartData::Categorical(t) => t.materialize(),
            ChartData::ItemFrequency(t) => t.materialize(),
            ChartData::CategoricalHeatmap(t) => t.materialize(),
            ChartData::BoxesAndWhiskers(t) => t.materialize(),
        }
    }
}

/// Handle on the background thread started by [`Plot::show`].
/// Dropping it detaches the stream; `wait` joins it.
#[derive(Debug)]
pub struct PlotStream {
    handle: Option<JoinHandle<()>>,
}

impl PlotStream {
    /// Block until streaming completes (eof reached or the bridge died)
    pub fn wait(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| h.is_finished())
            .unwrap_or(true)
    }
}

pub struct Plot {
    name: String,
    vega_spec: String,
    config: EngineConfig,
    data: ChartData,
}

fn minimal_spec(mark: &str, title: &str, xlabel: &str, ylabel: &str) -> String {
    json!({
        "$schema": "https://vega.github.io/schema/vega-lite/v4.json",
        "title": title,
        "mark": mark,
        "data": {"name": DATA_SOURCE_NAME},
        "encoding": {
            "x": {"title": xlabel},
            "y": {"title": ylabel},
        },
    })
    .to_string()
}

impl Plot {
    /// 1D histogram over a numeric column
    pub fn histogram(
        column: SArray,
        title: &str,
        xlabel: &str,
        ylabel: &str,
        config: EngineConfig,
    ) -> Plot {
        let state = StreamingHistogram::new(config.histogram_bins);
        let engine = ChunkedTransformer::new(column, state, &config);
        Plot {
            name: DATA_SOURCE_NAME.to_string(),
            vega_spec: minimal_spec("bar", title, xlabel, ylabel),
            config,
            data: ChartData::Histogram(engine),
        }
    }

    /// Scatter plot over two numeric columns of equal length
    pub fn scatter(
        x: SArray,
        y: SArray,
        title: &str,
        xlabel: &str,
        ylabel: &str,
        config: EngineConfig,
    ) -> Result<Plot> {
        let source = SFrameSlice::new(x, y)?;
        let engine = ChunkedTransformer::new(source, ScatterPoints::default(), &config);
        Ok(Plot {
            name: DATA_SOURCE_NAME.to_string(),
            vega_spec: minimal_spec("point", title, xlabel, ylabel),
            config,
            data: ChartData::Scatter(engine),
        })
    }

    /// Item-frequency table over a label column
    pub fn item_frequency(
        column: SArray,
        title: &str,
        xlabel: &str,
        ylabel: &str,
        config: EngineConfig,
    ) -> Plot {
        let engine = ChunkedTransformer::new(column, FrequencyCount::default(), &config);
        Plot {
            name: DATA_SOURCE_NAME.to_string(),
            vega_spec: minimal_spec("bar", title, xlabel, ylabel),
            config,
            data: ChartData::ItemFrequency(engine),
        }
    }

    /// Categorical bar data over a label column
    pub fn categorical(
        column: SArray,
        title: &str,
        xlabel: &str,
        ylabel: &str,
        config: EngineConfig,
    ) -> Plot {
        let engine = ChunkedTransformer::new(column, FrequencyCount::default(), &config);
        Plot {
            name: DATA_SOURCE_NAME.to_string(),
            vega_spec: minimal_spec("bar", title, xlabel, ylabel),
            config,
            data: ChartData::Categorical(engine),
        }
    }

    /// Co-occurrence heatmap over two label columns
    pub fn categorical_heatmap(
        x: SArray,
        y: SArray,
        title: &str,
        xlabel: &str,
        ylabel: &str,
        config: EngineConfig,
    ) -> Result<Plot> {
        let source = SFrameSlice::new(x, y)?;
        let engine = ChunkedTransformer::new(source, CategoricalHeatmap::default(), &config);
        Ok(Plot {
            name: DATA_SOURCE_NAME.to_string(),
            vega_spec: minimal_spec("rect", title, xlabel, ylabel),
            config,
            data: ChartData::CategoricalHeatmap(engine),
        })
    }

    /// Box-and-whisker summaries of a numeric column grouped by a label
    /// column
    pub fn boxes_and_whiskers(
        category: SArray,
        value: SArray,
        title: &str,
        xlabel: &str,
        ylabel: &str,
        config: EngineConfig,
    ) -> Result<Plot> {
        let source = SFrameSlice::new(category, value)?;
        let engine = ChunkedTransformer::new(source, BoxesAndWhiskers::default(), &config);
        Ok(Plot {
            name: DATA_SOURCE_NAME.to_string(),
            vega_spec: minimal_spec("boxplot", title, xlabel, ylabel),
            config,
            data: ChartData::BoxesAndWhiskers(engine),
        })
    }

    /// The static chart spec bound at construction, as a
    /// `{"vega_spec": ...}` envelope
    pub fn get_spec(&self) -> String {
        serialize::message_to_json(&WireMessage::spec(self.vega_spec.clone()))
    }

    /// Advance the engine by exactly one chunk and return the wire message
    /// for the merged partial result
    pub fn get_next_message(&mut self) -> Result<WireMessage> {
        let payload = self.data.next_payload(&self.config)?;
        Ok(WireMessage::data(
            &self.name,
            self.data.percent_complete(),
            payload,
        ))
    }

    /// Single poll: one chunk of work, serialized as a JSON data envelope.
    /// Never blocks on anything but the chunk itself; no process involved.
    pub fn get_next_data(&mut self) -> Result<String> {
        Ok(serialize::message_to_json(&self.get_next_message()?))
    }

    /// Drain the engine to completion
    pub fn materialize(&mut self) -> Result<()> {
        self.data.materialize()?;
        debug_assert_eq!(self.percent_complete(), 1.0);
        Ok(())
    }

    /// Materialize, then serialize the final result at 100% progress
    pub fn get_data(&mut self) -> Result<String> {
        self.materialize()?;
        self.get_next_data()
    }

    pub fn finished_streaming(&self) -> bool {
        self.data.eof()
    }

    pub fn rows_processed(&self) -> usize {
        self.data.rows_processed()
    }

    pub fn percent_complete(&self) -> f64 {
        self.data.percent_complete()
    }

    /// Stream this plot to an external rendering client.
    ///
    /// The client is launched in the calling thread so launch failures
    /// surface synchronously; the streaming loop then runs on one
    /// background thread: spec message once, then one data message per
    /// chunk until eof or the bridge dies. A dead bridge only stops the
    /// stream; it never invalidates data already materialized elsewhere.
    pub fn show(mut self, path_to_client: &str) -> Result<PlotStream> {
        let mut bridge = ProcessBridge::launch(path_to_client, &self.config)?;
        let handle = std::thread::Builder::new()
            .name("viz-plot-stream".to_string())
            .spawn(move || {
                bridge.send(WireMessage::spec(self.vega_spec.clone()));
                loop {
                    if !bridge.good() {
                        debug!("bridge went down; streaming stopped");
                        break;
                    }
                    match self.get_next_message() {
                        Ok(msg) => bridge.send(msg),
                        Err(e) => {
                            error!("streaming aborted: {e}");
                            break;
                        }
                    }
                    if self.finished_streaming() {
                        break;
                    }
                }
                bridge.close();
            })
            .map_err(VizError::Spawn)?;
        Ok(PlotStream {
            handle: Some(handle),
        })
    }
}

/// Construct a plot from one or two columns, dispatching on dtype the way
/// the high-level plotting entry point does: numeric/numeric is a scatter,
/// label/numeric is a box plot, label/label is a heatmap, a lone numeric
/// column is a histogram, and a lone label column is an item-frequency
/// table.
pub fn create_plot(
    x: SArray,
    y: Option<SArray>,
    title: &str,
    xlabel: &str,
    ylabel: &str,
    config: EngineConfig,
) -> Result<Plot> {
    match y {
        None => {
            if x.is_numeric() {
                Ok(Plot::histogram(x, title, xlabel, ylabel, config))
            } else {
                Ok(Plot::item_frequency(x, title, xlabel, ylabel, config))
            }
        }
        Some(y) => match (x.is_numeric(), y.is_numeric()) {
            (true, true) => Plot::scatter(x, y, title, xlabel, ylabel, config),
            (false, true) => Plot::boxes_and_whiskers(x, y, title, xlabel, ylabel, config),
            (false, false) => Plot::categorical_heatmap(x, y, title, xlabel, ylabel, config),
            (true, false) => Err(VizError::Source(
                "numeric x with categorical y is not a supported chart".to_string(),
            )),
        },
    }
}
