//! Threshold classification of CPU and memory readings into [`HealthState`].

use probe_core::{HealthState, MemorySnapshot};

/// Windowed CPU average (percent) above which the state is `Danger`.
pub const CPU_DANGER_PERCENT: f64 = 95.0;
/// Windowed CPU average (percent) above which the state is `Warn`.
pub const CPU_WARN_PERCENT: f64 = 85.0;
/// Available/total memory ratio below which the state is `Danger`.
pub const MEM_DANGER_RATIO: f64 = 0.05;
/// Available/total memory ratio below which the state is `Warn`.
pub const MEM_WARN_RATIO: f64 = 0.10;
/// Swap usage (percent) above which the state is at least `Warn`.
pub const SWAP_WARN_PERCENT: f64 = 80.0;

/// Classify a windowed CPU average. Boundaries fall to the lower state.
pub fn cpu_state(avg_percent: f64) -> HealthState {
    if avg_percent > CPU_DANGER_PERCENT {
        HealthState::Danger
    } else if avg_percent > CPU_WARN_PERCENT {
        HealthState::Warn
    } else {
        HealthState::Ok
    }
}

/// Classify a memory snapshot.
///
/// A snapshot with zero total memory is treated as unreadable and reports
/// `Ok`. Low available memory and high swap usage are independent `Warn`
/// triggers.
pub fn mem_state(mem: &MemorySnapshot) -> HealthState {
    if mem.total_kb == 0 {
        return HealthState::Ok;
    }

    let avail_ratio = mem.available_kb as f64 / mem.total_kb as f64;
    let swap_used   = swap_used_percent(mem);

    if avail_ratio < MEM_DANGER_RATIO {
        HealthState::Danger
    } else if avail_ratio < MEM_WARN_RATIO || swap_used > SWAP_WARN_PERCENT {
        HealthState::Warn
    } else {
        HealthState::Ok
    }
}

/// Percentage of swap in use, `0.0` when there is no swap.
pub fn swap_used_percent(mem: &MemorySnapshot) -> f64 {
    if mem.swap_total_kb == 0 {
        return 0.0;
    }
    let used = mem.swap_total_kb.saturating_sub(mem.swap_free_kb);
    100.0 * used as f64 / mem.swap_total_kb as f64
}
