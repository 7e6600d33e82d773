use serde::{Serialize, Deserialize};

/// Arena usage snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub used_bytes: usize,
    pub capacity_bytes: usize,
    pub chunk_count: usize,
    pub utilization_percent: f32,
}

impl MemoryStats {
    pub fn new(used_bytes: usize, capacity_bytes: usize, chunk_count: usize) -> Self {
        let utilization_percent = if capacity_bytes == 0 {
            0.0
        } else {
            used_bytes as f32 * 100.0 / capacity_bytes as f32
        };
        MemoryStats {
            used_bytes,
            capacity_bytes,
            chunk_count,
            utilization_percent,
        }
    }
}

/// Per-query counters, reset by `rewind`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryStats {
    pub contributions: u64,      // add_rsv calls with a non-zero delta
    pub blocks_cleaned: usize,   // Accumulator blocks zeroed on first touch
    pub heap_insertions: u64,    // Documents that entered the top-k after it filled
    pub heap_updates: u64,       // Sift-downs of documents already in the top-k
    pub tracked: usize,          // Documents currently in the top-k buffer
    pub memory: MemoryStats,
}

/// Scorer pool counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    pub checkouts: u64,
    pub created: u64,      // Scorers built because none were idle
    pub returned: u64,
    pub discarded: u64,    // Returned while the idle queue was full
}
