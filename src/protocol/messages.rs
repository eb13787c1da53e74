//! Wire message types
//!
//! Hand-written `prost` derives for the renderer protocol; the schema is
//! fixed, so there is no build-time codegen. One discriminated record per
//! frame: either a chart spec or a data payload, and a data payload carries
//! exactly one of the chart-kind variants.

/// Top-level frame content
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireMessage {
    #[prost(oneof = "wire_message::Content", tags = "1, 2")]
    pub content: ::core::option::Option<wire_message::Content>,
}

pub mod wire_message {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Content {
        #[prost(message, tag = "1")]
        Spec(super::SpecMessage),
        #[prost(message, tag = "2")]
        Data(super::DataMessage),
    }
}

impl WireMessage {
    pub fn spec(vega_spec: impl Into<String>) -> Self {
        WireMessage {
            content: Some(wire_message::Content::Spec(SpecMessage {
                vega_spec: vega_spec.into(),
            })),
        }
    }

    pub fn data(name: impl Into<String>, progress: f64, payload: data_message::Payload) -> Self {
        WireMessage {
            content: Some(wire_message::Content::Data(DataMessage {
                name: name.into(),
                progress,
                payload: Some(payload),
            })),
        }
    }
}

/// Static chart layout/style description
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SpecMessage {
    #[prost(string, tag = "1")]
    pub vega_spec: ::prost::alloc::string::String,
}

/// One partial-result delivery, tagged with its source name and progress
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DataMessage {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,

    /// Fraction of the source aggregated into this payload, in [0, 1]
    #[prost(double, tag = "2")]
    pub progress: f64,

    #[prost(oneof = "data_message::Payload", tags = "3, 4, 5, 6, 7, 8, 9")]
    pub payload: ::core::option::Option<data_message::Payload>,
}

pub mod data_message {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "3")]
        Histogram(super::HistogramData),
        #[prost(message, tag = "4")]
        Scatter(super::ScatterData),
        #[prost(message, tag = "5")]
        Categorical(super::CategoricalData),
        #[prost(message, tag = "6")]
        CategoricalHeatmap(super::CategoricalHeatmapData),
        #[prost(message, tag = "7")]
        BoxesAndWhiskers(super::BoxesAndWhiskersData),
        #[prost(message, tag = "8")]
        ItemFrequency(super::ItemFrequencyData),
        #[prost(message, tag = "9")]
        TableCell(super::TableCellData),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HistogramBinData {
    #[prost(double, tag = "1")]
    pub left: f64,
    #[prost(double, tag = "2")]
    pub right: f64,
    #[prost(uint64, tag = "3")]
    pub count: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HistogramData {
    #[prost(message, repeated, tag = "1")]
    pub bins: ::prost::alloc::vec::Vec<HistogramBinData>,
    #[prost(uint64, tag = "2")]
    pub num_rows: u64,
    #[prost(uint64, tag = "3")]
    pub num_missing: u64,
    /// Smallest binned value; NaN when no value has been binned yet
    #[prost(double, tag = "4")]
    pub min: f64,
    /// Largest binned value; NaN when no value has been binned yet
    #[prost(double, tag = "5")]
    pub max: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ScatterPointData {
    #[prost(double, tag = "1")]
    pub x: f64,
    #[prost(double, tag = "2")]
    pub y: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ScatterData {
    #[prost(message, repeated, tag = "1")]
    pub points: ::prost::alloc::vec::Vec<ScatterPointData>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CategoryCountData {
    #[prost(string, tag = "1")]
    pub label: ::prost::alloc::string::String,
    #[prost(uint64, tag = "2")]
    pub label_idx: u64,
    #[prost(uint64, tag = "3")]
    pub count: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CategoricalData {
    #[prost(message, repeated, tag = "1")]
    pub counts: ::prost::alloc::vec::Vec<CategoryCountData>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HeatmapCellData {
    #[prost(string, tag = "1")]
    pub x: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub y: ::prost::alloc::string::String,
    #[prost(uint64, tag = "3")]
    pub count: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CategoricalHeatmapData {
    #[prost(message, repeated, tag = "1")]
    pub cells: ::prost::alloc::vec::Vec<HeatmapCellData>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BoxSummaryData {
    #[prost(string, tag = "1")]
    pub label: ::prost::alloc::string::String,
    #[prost(double, tag = "2")]
    pub min: f64,
    #[prost(double, tag = "3")]
    pub lower_quartile: f64,
    #[prost(double, tag = "4")]
    pub median: f64,
    #[prost(double, tag = "5")]
    pub upper_quartile: f64,
    #[prost(double, tag = "6")]
    pub max: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BoxesAndWhiskersData {
    #[prost(message, repeated, tag = "1")]
    pub series: ::prost::alloc::vec::Vec<BoxSummaryData>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ItemFrequencyData {
    #[prost(message, repeated, tag = "1")]
    pub items: ::prost::alloc::vec::Vec<CategoryCountData>,
    #[prost(uint64, tag = "2")]
    pub num_rows: u64,
    #[prost(uint64, tag = "3")]
    pub num_unique: u64,
    #[prost(uint64, tag = "4")]
    pub num_missing: u64,
}

/// Image thumbnail embedded in a table cell
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ImageData {
    #[prost(uint32, tag = "1")]
    pub width: u32,
    #[prost(uint32, tag = "2")]
    pub height: u32,
    #[prost(uint32, tag = "3")]
    pub channels: u32,
    #[prost(bytes = "vec", tag = "4")]
    pub data: ::prost::alloc::vec::Vec<u8>,
}

/// One raw table cell; an unset value means the cell is undefined
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableCellData {
    #[prost(string, tag = "1")]
    pub column: ::prost::alloc::string::String,
    #[prost(uint64, tag = "2")]
    pub row_index: u64,
    #[prost(oneof = "table_cell_data::Value", tags = "3, 4, 5, 6, 7, 8")]
    pub value: ::core::option::Option<table_cell_data::Value>,
}

pub mod table_cell_data {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(int64, tag = "3")]
        Integer(i64),
        #[prost(double, tag = "4")]
        Float(f64),
        #[prost(string, tag = "5")]
        Str(::prost::alloc::string::String),
        /// Microseconds since the Unix epoch, UTC
        #[prost(int64, tag = "6")]
        DatetimeUs(i64),
        #[prost(message, tag = "7")]
        Image(super::ImageData),
        /// Nested list/dict values, rendered as JSON text
        #[prost(string, tag = "8")]
        Json(::prost::alloc::string::String),
    }
}
