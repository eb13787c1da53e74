//! Engine configuration
//!
//! All tunables for the chunked aggregation engine and the serializers live
//! here. Defaults match the constants observed in production; every one of
//! them is a knob, not a correctness requirement.

use serde::{Deserialize, Serialize};

/// Default rows consumed per `get()` call.
pub const DEFAULT_CHUNK_SIZE: usize = 5_000_000;

/// Default display cap for string values in serialized output.
pub const DEFAULT_DISPLAY_CAP: usize = 200;

/// Default number of item-frequency rows emitted per message.
pub const DEFAULT_FREQUENCY_ITEM_LIMIT: usize = 200;

/// Default thumbnail height (pixels) for images embedded in messages.
pub const DEFAULT_THUMBNAIL_HEIGHT: usize = 100;

/// Default histogram bin count.
pub const DEFAULT_HISTOGRAM_BINS: usize = 64;

/// Largest frame payload the bridge will accept before treating the stream
/// as misframed (256 MiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 256 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of rows per chunk; one chunk is consumed per `get()` call
    pub chunk_size: usize,

    /// Worker count for per-chunk parallel accumulation.
    /// 0 = use the rayon pool's current thread count.
    pub num_workers: usize,

    /// Bin count for streaming histograms
    pub histogram_bins: usize,

    /// Strings longer than this are truncated at serialization time
    pub display_cap: usize,

    /// Thumbnail height for images embedded in messages (aspect preserved)
    pub thumbnail_height: usize,

    /// Maximum number of item-frequency rows per emitted message
    pub frequency_item_limit: usize,

    /// Frames longer than this are rejected as protocol violations
    pub max_frame_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
            num_workers: 0,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            display_cap: DEFAULT_DISPLAY_CAP,
            thumbnail_height: DEFAULT_THUMBNAIL_HEIGHT,
            frequency_item_limit: DEFAULT_FREQUENCY_ITEM_LIMIT,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl EngineConfig {
    /// Config with a specific chunk size, other settings at defaults
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        EngineConfig {
            chunk_size: chunk_size.max(1),
            ..Default::default()
        }
    }

    /// Resolve the effective worker count
    pub fn effective_workers(&self) -> usize {
        if self.num_workers == 0 {
            rayon::current_num_threads().max(1)
        } else {
            self.num_workers
        }
    }
}
