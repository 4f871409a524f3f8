use crate::{
    record::Record,
    state::{CpuCapacity, CpuTickSnapshot, MemorySnapshot},
    Result,
};

/// Where raw OS counters come from.
///
/// The sampling loop only ever talks to this trait, so tests can script the
/// counters and non-procfs platforms can supply their own reader.
pub trait StatSource {
    /// Read the aggregate CPU tick counters (user, nice, system, idle).
    fn read_cpu(&mut self) -> Result<CpuTickSnapshot>;

    /// Read memory and swap capacity. Keys that are missing stay at zero.
    fn read_mem(&mut self) -> Result<MemorySnapshot>;

    /// Processor count and maximum frequency. Never fails; unknown values
    /// fall back to [`CpuCapacity::default`].
    fn read_capacity(&mut self) -> CpuCapacity;
}

/// Consumer of output records.
///
/// Implementations must make each record visible downstream before
/// returning (no buffering across calls).
pub trait Reporter {
    fn emit(&mut self, record: &Record) -> Result<()>;
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn emit(&mut self, record: &Record) -> Result<()> {
        (**self).emit(record)
    }
}
