use probe_core::{ProbeError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure parsed from `sysprobe.toml`.
///
/// Health thresholds and the averaging window are deliberately absent:
/// they are fixed constants in `probe-system`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub sampling: SamplingConfig,
    pub sources:  SourcesConfig,
    pub output:   OutputConfig,
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sampling.interval_ms == 0 {
            return Err(ProbeError::Config(
                "sampling.interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Sampling cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Sleep between ticks in milliseconds.
    pub interval_ms: u64,
}

impl SamplingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { interval_ms: 1_000 }
    }
}

/// Locations of the kernel pseudo-filesystems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Root holding `stat` and `meminfo`.
    pub proc_root: PathBuf,
    /// Root holding `devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq`.
    pub sys_root:  PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            sys_root:  PathBuf::from("/sys"),
        }
    }
}

/// Record output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Append records to this file instead of stdout.
    pub path: Option<PathBuf>,
    /// Emit the `meta` and `end` lifecycle records.
    pub meta: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            meta: true,
        }
    }
}
