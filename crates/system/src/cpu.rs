use probe_core::{CpuTickSnapshot, ProbeError, Result};
use std::path::Path;

/// Number of utilization samples averaged by [`CpuWindow`].
pub const CPU_WINDOW: usize = 10;

/// Utilization percentage between two cumulative tick snapshots.
///
/// Returns `0.0` when no ticks elapsed. The result is not clamped: counters
/// that wrap or go backwards can yield values below 0 or above 100.
pub fn usage(prev: &CpuTickSnapshot, curr: &CpuTickSnapshot) -> f64 {
    let delta_total = curr.total().wrapping_sub(prev.total()) as i64;
    let delta_idle  = curr.idle.wrapping_sub(prev.idle) as i64;

    if delta_total == 0 {
        return 0.0;
    }
    100.0 * delta_total.wrapping_sub(delta_idle) as f64 / delta_total as f64
}

/// Fixed-capacity ring of recent CPU usage samples.
///
/// Array-backed, so adding a sample never allocates. Once full, each new
/// sample overwrites the oldest one.
#[derive(Debug, Clone)]
pub struct CpuWindow {
    samples: [f64; CPU_WINDOW],
    cursor:  usize,
    count:   usize,
}

impl CpuWindow {
    pub fn new() -> Self {
        Self {
            samples: [0.0; CPU_WINDOW],
            cursor:  0,
            count:   0,
        }
    }

    /// Push a new sample, evicting the oldest if at capacity.
    pub fn add(&mut self, value: f64) {
        self.samples[self.cursor] = value;
        self.cursor = (self.cursor + 1) % CPU_WINDOW;
        self.count = (self.count + 1).min(CPU_WINDOW);
    }

    /// Mean of the valid samples, `0.0` when empty.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.samples[..self.count].iter().sum::<f64>() / self.count as f64
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub const fn capacity(&self) -> usize {
        CPU_WINDOW
    }
}

impl Default for CpuWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the aggregate `cpu` line of `/proc/stat`.
///
/// Only the first four counters (user, nice, system, idle) are used.
pub fn parse_cpu_stat(text: &str) -> Result<CpuTickSnapshot> {
    let incomplete = |found| ProbeError::ParseIncomplete {
        source_name: "stat",
        expected: 4,
        found,
    };

    let line = text
        .lines()
        .find(|l| l.split_whitespace().next() == Some("cpu"))
        .ok_or(incomplete(0))?;

    let mut fields = [0u64; 4];
    let mut found = 0;
    for token in line.split_whitespace().skip(1).take(4) {
        match token.parse() {
            Ok(v) => {
                fields[found] = v;
                found += 1;
            }
            Err(_) => break,
        }
    }
    if found < 4 {
        return Err(incomplete(found));
    }

    let [user, nice, system, idle] = fields;
    Ok(CpuTickSnapshot::new(user, nice, system, idle))
}

/// Read and parse a `/proc/stat`-format file.
pub fn read_cpu_stat(path: &Path) -> Result<CpuTickSnapshot> {
    let text = std::fs::read_to_string(path).map_err(|e| ProbeError::unavailable(path, e))?;
    parse_cpu_stat(&text)
}
