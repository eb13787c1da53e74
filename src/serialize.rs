//! Result serialization
//!
//! Converts emitted aggregates into wire payloads, one function per chart
//! kind, and renders wire messages as the JSON envelopes the pull-based
//! facade returns. Skip rules live here: undefined values and non-finite
//! numerics are omitted (they are "not yet supported for rendering", not
//! errors), strings are truncated to the display cap at this point only,
//! and images are down-sampled to thumbnails to bound message size.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;

use crate::aggregate::{BoxesSummary, FrequencySummary, HeatmapSummary, HistogramSummary};
use crate::config::EngineConfig;
use crate::protocol::messages::{
    data_message::Payload, table_cell_data, wire_message::Content, BoxSummaryData,
    BoxesAndWhiskersData, CategoricalData, CategoricalHeatmapData, CategoryCountData,
    HeatmapCellData, HistogramBinData, HistogramData, ImageData, ItemFrequencyData, ScatterData,
    ScatterPointData, TableCellData, WireMessage,
};
use crate::source::FlexValue;

/// Truncate to the display cap on a character boundary. Applied at
/// serialization only, never before aggregation.
pub fn truncate_label(label: &str, cap: usize) -> String {
    if label.chars().count() <= cap {
        label.to_string()
    } else {
        label.chars().take(cap).collect()
    }
}

pub fn histogram_payload(summary: &HistogramSummary) -> Payload {
    Payload::Histogram(HistogramData {
        bins: summary
            .bins
            .iter()
            .map(|b| HistogramBinData {
                left: b.left,
                right: b.right,
                count: b.count,
            })
            .collect(),
        num_rows: summary.num_rows,
        num_missing: summary.num_missing,
        min: summary.min,
        max: summary.max,
    })
}

/// Scatter points: exactly the finite-and-defined pairs, in source order
pub fn scatter_payload(points: &[(FlexValue, FlexValue)]) -> Payload {
    Payload::Scatter(ScatterData {
        points: points
            .iter()
            .filter_map(|(x, y)| match (x.as_finite_f64(), y.as_finite_f64()) {
                (Some(x), Some(y)) => Some(ScatterPointData { x, y }),
                _ => None,
            })
            .collect(),
    })
}

fn category_counts(summary: &FrequencySummary, config: &EngineConfig) -> Vec<CategoryCountData> {
    summary
        .items
        .iter()
        .take(config.frequency_item_limit)
        .enumerate()
        .map(|(idx, (label, count))| CategoryCountData {
            label: truncate_label(label, config.display_cap),
            label_idx: idx as u64,
            count: *count,
        })
        .collect()
}

pub fn categorical_payload(summary: &FrequencySummary, config: &EngineConfig) -> Payload {
    Payload::Categorical(CategoricalData {
        counts: category_counts(summary, config),
    })
}

pub fn item_frequency_payload(summary: &FrequencySummary, config: &EngineConfig) -> Payload {
    Payload::ItemFrequency(ItemFrequencyData {
        items: category_counts(summary, config),
        num_rows: summary.num_rows,
        num_unique: summary.num_unique,
        num_missing: summary.num_missing,
    })
}

pub fn heatmap_payload(summary: &HeatmapSummary, config: &EngineConfig) -> Payload {
    Payload::CategoricalHeatmap(CategoricalHeatmapData {
        cells: summary
            .cells
            .iter()
            .map(|(x, y, count)| HeatmapCellData {
                x: truncate_label(x, config.display_cap),
                y: truncate_label(y, config.display_cap),
                count: *count,
            })
            .collect(),
    })
}

pub fn boxes_payload(summary: &BoxesSummary, config: &EngineConfig) -> Payload {
    Payload::BoxesAndWhiskers(BoxesAndWhiskersData {
        series: summary
            .series
            .iter()
            .map(|s| BoxSummaryData {
                label: truncate_label(&s.label, config.display_cap),
                min: s.min,
                lower_quartile: s.lower_quartile,
                median: s.median,
                upper_quartile: s.upper_quartile,
                max: s.max,
            })
            .collect(),
    })
}

/// One raw table cell. Undefined cells and non-finite floats serialize with
/// no value set; images are thumbnailed first.
pub fn table_cell(
    column: &str,
    row_index: u64,
    value: &FlexValue,
    config: &EngineConfig,
) -> TableCellData {
    let cell_value = match value {
        FlexValue::Integer(v) => Some(table_cell_data::Value::Integer(*v)),
        FlexValue::Float(v) if v.is_finite() => Some(table_cell_data::Value::Float(*v)),
        FlexValue::Float(_) => None,
        FlexValue::Str(s) => Some(table_cell_data::Value::Str(truncate_label(
            s,
            config.display_cap,
        ))),
        FlexValue::DateTime(dt) => Some(table_cell_data::Value::DatetimeUs(
            dt.timestamp_micros(),
        )),
        FlexValue::Image(img) => {
            let thumb = img.thumbnail(config.thumbnail_height);
            Some(table_cell_data::Value::Image(ImageData {
                width: thumb.width as u32,
                height: thumb.height as u32,
                channels: thumb.channels as u32,
                data: thumb.data,
            }))
        }
        FlexValue::Vector(v) => Some(table_cell_data::Value::Json(
            serde_json::to_string(v).unwrap_or_default(),
        )),
        FlexValue::List(_) | FlexValue::Dict(_) => {
            Some(table_cell_data::Value::Json(flex_to_json(value).to_string()))
        }
        FlexValue::Undefined => None,
    };
    TableCellData {
        column: column.to_string(),
        row_index,
        value: cell_value,
    }
}

fn flex_to_json(value: &FlexValue) -> serde_json::Value {
    match value {
        FlexValue::Integer(v) => json!(v),
        FlexValue::Float(v) if v.is_finite() => json!(v),
        FlexValue::Float(_) | FlexValue::Undefined => serde_json::Value::Null,
        FlexValue::Str(s) => json!(s),
        FlexValue::Vector(v) => json!(v),
        FlexValue::DateTime(dt) => json!(dt.to_rfc3339()),
        FlexValue::Image(img) => json!({
            "width": img.width,
            "height": img.height,
            "channels": img.channels,
            "data": BASE64.encode(&img.data),
        }),
        FlexValue::List(items) => {
            serde_json::Value::Array(items.iter().map(flex_to_json).collect())
        }
        FlexValue::Dict(pairs) => serde_json::Value::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.clone(), flex_to_json(v)))
                .collect(),
        ),
    }
}

/// Render a wire message as the JSON envelope the string-returning facade
/// operations produce: `{"vega_spec": ...}` or `{"data_spec": {...}}`.
pub fn message_to_json(msg: &WireMessage) -> String {
    let value = match &msg.content {
        Some(Content::Spec(spec)) => {
            // embed the spec as structured JSON when it parses, raw otherwise
            let spec_value = serde_json::from_str::<serde_json::Value>(&spec.vega_spec)
                .unwrap_or_else(|_| json!(spec.vega_spec));
            json!({ "vega_spec": spec_value })
        }
        Some(Content::Data(data)) => {
            let mut body = serde_json::Map::new();
            body.insert("name".into(), json!(data.name));
            body.insert("progress".into(), json!(data.progress));
            body.insert("values".into(), payload_values(data.payload.as_ref()));
            if let Some(Payload::ItemFrequency(f)) = &data.payload {
                body.insert("num_rows".into(), json!(f.num_rows));
                body.insert("num_unique".into(), json!(f.num_unique));
                body.insert("num_missing".into(), json!(f.num_missing));
            }
            if let Some(Payload::Histogram(h)) = &data.payload {
                body.insert("num_rows".into(), json!(h.num_rows));
                body.insert("num_missing".into(), json!(h.num_missing));
                // non-finite extremes (nothing binned yet) render as null
                body.insert("min".into(), json!(h.min));
                body.insert("max".into(), json!(h.max));
            }
            json!({ "data_spec": serde_json::Value::Object(body) })
        }
        None => json!({}),
    };
    value.to_string()
}

fn payload_values(payload: Option<&Payload>) -> serde_json::Value {
    match payload {
        Some(Payload::Histogram(h)) => h
            .bins
            .iter()
            .map(|b| json!({"left": b.left, "right": b.right, "count": b.count}))
            .collect(),
        Some(Payload::Scatter(s)) => s
            .points
            .iter()
            .map(|p| json!({"x": p.x, "y": p.y}))
            .collect(),
        Some(Payload::Categorical(c)) => c
            .counts
            .iter()
            .map(|c| json!({"label": c.label, "label_idx": c.label_idx, "count": c.count}))
            .collect(),
        Some(Payload::ItemFrequency(f)) => f
            .items
            .iter()
            .map(|c| json!({"label": c.label, "label_idx": c.label_idx, "count": c.count}))
            .collect(),
        Some(Payload::CategoricalHeatmap(h)) => h
            .cells
            .iter()
            .map(|c| json!({"x": c.x, "y": c.y, "count": c.count}))
            .collect(),
        Some(Payload::BoxesAndWhiskers(b)) => b
            .series
            .iter()
            .map(|s| {
                json!({
                    "label": s.label,
                    "min": s.min,
                    "lower_quartile": s.lower_quartile,
                    "median": s.median,
                    "upper_quartile": s.upper_quartile,
                    "max": s.max,
                })
            })
            .collect(),
        Some(Payload::TableCell(cell)) => {
            let value = match &cell.value {
                Some(table_cell_data::Value::Integer(v)) => json!(v),
                Some(table_cell_data::Value::Float(v)) => json!(v),
                Some(table_cell_data::Value::Str(s)) => json!(s),
                Some(table_cell_data::Value::DatetimeUs(us)) => json!(us),
                Some(table_cell_data::Value::Image(img)) => json!({
                    "width": img.width,
                    "height": img.height,
                    "channels": img.channels,
                    "data": BASE64.encode(&img.data),
                }),
                Some(table_cell_data::Value::Json(text)) => {
                    serde_json::from_str(text).unwrap_or(serde_json::Value::Null)
                }
                None => serde_json::Value::Null,
            };
            json!([{"column": cell.column, "row_index": cell.row_index, "value": value}])
        }
        None => json!([]),
    }
}
