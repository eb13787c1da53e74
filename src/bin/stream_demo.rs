//! Streaming demo
//!
//! Builds a few sample plots over synthetic columns and either streams one
//! to a rendering client or drains them poll by poll, printing the JSON
//! envelopes.
//!
//! Usage:
//! ```bash
//! # pull-based: print one envelope per chunk
//! cargo run --bin stream_demo
//!
//! # push-based: stream frames to a client process reading stdin
//! cargo run --bin stream_demo -- /path/to/render-client
//! ```

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vizstream::{create_plot, EngineConfig, SArray};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = EngineConfig::with_chunk_size(25_000);

    // synthetic columns: a noisy ramp and a label cycle
    let n = 100_000;
    let values = SArray::from_floats((0..n).map(|i| {
        let x = i as f64 / n as f64;
        x * x * 40.0 - 10.0 + ((i * 2_654_435_761_usize) % 1000) as f64 / 500.0
    }));
    let labels = SArray::from_strings((0..n).map(|i| format!("group-{}", i % 7)));

    let client = std::env::args().nth(1);
    match client {
        Some(path) => {
            info!(client = %path, "streaming histogram to rendering client");
            let plot = create_plot(values, None, "ramp", "value", "count", config)?;
            let stream = plot.show(&path)?;
            stream.wait();
            info!("stream finished");
        }
        None => {
            info!("no client given; draining plots poll by poll");
            let mut histogram =
                create_plot(values, None, "ramp", "value", "count", config.clone())?;
            while !histogram.finished_streaming() {
                println!("{}", histogram.get_next_data()?);
            }

            let mut frequency = create_plot(labels, None, "groups", "label", "count", config)?;
            println!("{}", frequency.get_data()?);
        }
    }
    Ok(())
}
