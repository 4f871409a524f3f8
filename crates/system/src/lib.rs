pub mod capacity;
pub mod classify;
pub mod cpu;
pub mod memory;
pub mod monitor;

pub use monitor::SampleLoop;

use probe_core::{CpuCapacity, CpuTickSnapshot, MemorySnapshot, Result, StatSource};
use std::path::PathBuf;

/// [`StatSource`] backed by the Linux `/proc` and `/sys` pseudo-filesystems.
///
/// Both roots are configurable so a fixture tree can stand in for the kernel.
#[derive(Debug, Clone)]
pub struct ProcSource {
    proc_root: PathBuf,
    sys_root:  PathBuf,
}

impl ProcSource {
    pub fn new(proc_root: impl Into<PathBuf>, sys_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            sys_root:  sys_root.into(),
        }
    }
}

impl Default for ProcSource {
    fn default() -> Self {
        Self::new("/proc", "/sys")
    }
}

impl StatSource for ProcSource {
    fn read_cpu(&mut self) -> Result<CpuTickSnapshot> {
        cpu::read_cpu_stat(&self.proc_root.join("stat"))
    }

    fn read_mem(&mut self) -> Result<MemorySnapshot> {
        memory::read_meminfo(&self.proc_root.join("meminfo"))
    }

    fn read_capacity(&mut self) -> CpuCapacity {
        capacity::read_capacity(&self.sys_root)
    }
}
