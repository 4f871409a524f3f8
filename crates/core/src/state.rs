use serde::{Deserialize, Serialize};
use std::fmt;

/// Kilobytes per gigabyte, as reported by `/proc/meminfo` (1 GB = 1024 * 1024 kB).
pub const KB_PER_GB: f64 = 1024.0 * 1024.0;

/// Cumulative CPU time-category counters at one instant, in clock ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTickSnapshot {
    pub user:   u64,
    pub nice:   u64,
    pub system: u64,
    pub idle:   u64,
}

impl CpuTickSnapshot {
    pub fn new(user: u64, nice: u64, system: u64, idle: u64) -> Self {
        Self { user, nice, system, idle }
    }

    /// Sum of all four counters.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.user
            .wrapping_add(self.nice)
            .wrapping_add(self.system)
            .wrapping_add(self.idle)
    }
}

/// Memory and swap capacity figures, in kilobytes.
///
/// A zero field means the key was absent from the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub total_kb:      u64,
    pub available_kb:  u64,
    pub swap_total_kb: u64,
    pub swap_free_kb:  u64,
}

impl MemorySnapshot {
    #[must_use]
    pub fn used_gb(&self) -> f64 {
        kb_to_gb(self.total_kb.saturating_sub(self.available_kb))
    }

    #[must_use]
    pub fn available_gb(&self) -> f64 {
        kb_to_gb(self.available_kb)
    }

    #[must_use]
    pub fn total_gb(&self) -> f64 {
        kb_to_gb(self.total_kb)
    }

    #[must_use]
    pub fn swap_used_gb(&self) -> f64 {
        kb_to_gb(self.swap_total_kb.saturating_sub(self.swap_free_kb))
    }

    #[must_use]
    pub fn swap_free_gb(&self) -> f64 {
        kb_to_gb(self.swap_free_kb)
    }

    #[must_use]
    pub fn swap_total_gb(&self) -> f64 {
        kb_to_gb(self.swap_total_kb)
    }
}

/// Convert a kilobyte count to gigabytes.
pub fn kb_to_gb(kb: u64) -> f64 {
    kb as f64 / KB_PER_GB
}

/// Processor capacity reported once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuCapacity {
    /// Online processor count, never less than 1.
    pub cores: usize,
    /// Maximum frequency of cpu0 in kHz. `None` when the kernel does not expose it.
    pub max_freq_khz: Option<u64>,
}

impl Default for CpuCapacity {
    fn default() -> Self {
        Self {
            cores: 1,
            max_freq_khz: None,
        }
    }
}

/// Coarse three-level health classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    #[default]
    Ok,
    Warn,
    Danger,
}

impl HealthState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok     => "ok",
            Self::Warn   => "warn",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
