use probe_core::CpuCapacity;
use std::path::Path;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

/// Path of cpu0's maximum frequency, relative to the sysfs root.
const MAX_FREQ_FILE: &str = "devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq";

/// Read processor capacity: online core count plus cpu0's maximum frequency
/// from the sysfs cpufreq interface under `sys_root`.
///
/// Never fails. The core count falls back to 1 and the frequency to `None`
/// (common in VMs and containers without cpufreq).
pub fn read_capacity(sys_root: &Path) -> CpuCapacity {
    CpuCapacity {
        cores:        online_cores(),
        max_freq_khz: read_max_freq_khz(sys_root),
    }
}

/// Number of online processors as seen by `sysinfo`, never less than 1.
pub fn online_cores() -> usize {
    let sys = System::new_with_specifics(
        RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()),
    );
    match sys.cpus().len() {
        0 => std::thread::available_parallelism().map_or(1, |n| n.get()),
        n => n,
    }
}

/// cpu0's `cpuinfo_max_freq` in kHz, or `None` if absent or unparsable.
pub fn read_max_freq_khz(sys_root: &Path) -> Option<u64> {
    let raw = std::fs::read_to_string(sys_root.join(MAX_FREQ_FILE)).ok()?;
    raw.split_whitespace()
        .next()?
        .parse::<u64>()
        .ok()
        .filter(|&khz| khz > 0)
}
