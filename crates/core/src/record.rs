use crate::state::{CpuCapacity, HealthState, MemorySnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every line the probe writes to its output stream.
///
/// Lines are tagged by `"type"` so a trace reader can pick out the samples:
/// - startup          → `Meta`
/// - each sample tick → `Sample`
/// - after shutdown   → `End`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Record {
    Meta(MetaRecord),
    Sample(SampleRecord),
    End(EndRecord),
}

/// Capacity banner and initial memory snapshot, emitted once before the loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaRecord {
    pub version:        String,
    pub started_at:     DateTime<Utc>,
    pub interval_ms:    u64,
    pub window:         usize,
    pub cores:          usize,
    /// `None` serializes as `null`: the frequency is unknown, not zero.
    pub max_freq_khz:   Option<u64>,
    pub mem_total:      f64,
    pub mem_avail:      f64,
    pub mem_swap_total: f64,
    pub mem_swap_avail: f64,
}

impl MetaRecord {
    pub fn new(
        capacity: CpuCapacity,
        memory: &MemorySnapshot,
        interval_ms: u64,
        window: usize,
    ) -> Self {
        Self {
            version:        env!("CARGO_PKG_VERSION").to_string(),
            started_at:     Utc::now(),
            interval_ms,
            window,
            cores:          capacity.cores,
            max_freq_khz:   capacity.max_freq_khz,
            mem_total:      memory.total_gb(),
            mem_avail:      memory.available_gb(),
            mem_swap_total: memory.swap_total_gb(),
            mem_swap_avail: memory.swap_free_gb(),
        }
    }
}

/// One observation per tick. Memory figures are in GB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Seconds since the sampling loop started.
    pub ts: f64,
    /// Instantaneous CPU utilization in percent.
    pub cpu: f64,
    /// Windowed average CPU utilization in percent.
    pub cpu_avg: f64,
    pub mem_used: f64,
    pub mem_avail: f64,
    pub mem_swap_used: f64,
    pub mem_swap_avail: f64,
    #[serde(rename = "CPU_STATE")]
    pub cpu_state: HealthState,
    #[serde(rename = "MEM_STATE")]
    pub mem_state: HealthState,
}

/// Emitted once after the loop stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndRecord {
    pub samples:   u64,
    /// Ticks dropped because the CPU counters could not be read.
    pub skipped:   u64,
    pub runtime_s: f64,
}
