use crate::{
    classify::{cpu_state, mem_state},
    cpu::{usage, CpuWindow, CPU_WINDOW},
};
use probe_core::{
    CpuTickSnapshot, EndRecord, MemorySnapshot, MetaRecord, Record, Reporter, Result,
    SampleRecord, StatSource,
};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// The per-tick sampling loop.
///
/// Owns the previous CPU snapshot, the averaging window and the last good
/// memory snapshot for its whole lifetime.
pub struct SampleLoop<S, R> {
    source:    S,
    reporter:  R,
    interval:  Duration,
    lifecycle: bool,
    window:    CpuWindow,
    prev_cpu:  CpuTickSnapshot,
    memory:    MemorySnapshot,
    started:   Instant,
    samples:   u64,
    skipped:   u64,
}

impl<S: StatSource, R: Reporter> SampleLoop<S, R> {
    pub fn new(source: S, reporter: R, interval: Duration) -> Self {
        Self {
            source,
            reporter,
            interval,
            lifecycle: true,
            window:    CpuWindow::new(),
            prev_cpu:  CpuTickSnapshot::default(),
            memory:    MemorySnapshot::default(),
            started:   Instant::now(),
            samples:   0,
            skipped:   0,
        }
    }

    /// Whether to emit the `meta` and `end` records around the samples.
    #[must_use]
    pub fn with_lifecycle_records(mut self, enabled: bool) -> Self {
        self.lifecycle = enabled;
        self
    }

    /// Run until `shutdown` carries `true`.
    ///
    /// The flag is only checked between ticks: a tick that has started always
    /// completes and reports before the loop exits.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<EndRecord> {
        self.start()?;

        while !*shutdown.borrow_and_update() {
            tokio::time::sleep(self.interval).await;
            self.tick()?;
        }

        info!(samples = self.samples, skipped = self.skipped, "Sampling stopped");
        self.finish()
    }

    /// Read capacity, the initial memory snapshot and the baseline CPU
    /// counters, and emit the `meta` record.
    ///
    /// Unreadable sources degrade to zero values rather than failing.
    pub fn start(&mut self) -> Result<()> {
        let capacity = self.source.read_capacity();
        match capacity.max_freq_khz {
            Some(khz) => info!(
                "CPU: {} cores, max freq {:.2} GHz",
                capacity.cores,
                khz as f64 / 1_000_000.0
            ),
            None => info!("CPU: {} cores, frequency info is not exposed", capacity.cores),
        }

        self.memory = self.source.read_mem().unwrap_or_else(|e| {
            warn!("Initial memory read failed: {e}");
            MemorySnapshot::default()
        });
        info!(
            "Memory: total {:.2} GB, available {:.2} GB, swap {:.2} GB ({:.2} GB free)",
            self.memory.total_gb(),
            self.memory.available_gb(),
            self.memory.swap_total_gb(),
            self.memory.swap_free_gb(),
        );

        self.prev_cpu = self.source.read_cpu().unwrap_or_else(|e| {
            warn!("Initial CPU read failed: {e}");
            CpuTickSnapshot::default()
        });

        self.started = Instant::now();

        if self.lifecycle {
            let interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX);
            let meta = MetaRecord::new(capacity, &self.memory, interval_ms, CPU_WINDOW);
            self.reporter.emit(&Record::Meta(meta))?;
        }
        Ok(())
    }

    /// Take one sample and report it.
    ///
    /// Returns `Ok(None)` when the CPU counters could not be read; the tick is
    /// skipped without touching the window or the stored snapshot.
    pub fn tick(&mut self) -> Result<Option<SampleRecord>> {
        let curr = match self.source.read_cpu() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Skipping tick: {e}");
                self.skipped += 1;
                return Ok(None);
            }
        };

        let cpu = usage(&self.prev_cpu, &curr);
        self.window.add(cpu);

        match self.source.read_mem() {
            Ok(memory) => self.memory = memory,
            Err(e) => debug!("Keeping previous memory snapshot: {e}"),
        }

        let cpu_avg = self.window.average();
        let record = SampleRecord {
            ts:             self.started.elapsed().as_secs_f64(),
            cpu,
            cpu_avg,
            mem_used:       self.memory.used_gb(),
            mem_avail:      self.memory.available_gb(),
            mem_swap_used:  self.memory.swap_used_gb(),
            mem_swap_avail: self.memory.swap_free_gb(),
            cpu_state:      cpu_state(cpu_avg),
            mem_state:      mem_state(&self.memory),
        };
        self.reporter.emit(&Record::Sample(record.clone()))?;

        self.prev_cpu = curr;
        self.samples += 1;
        Ok(Some(record))
    }

    /// Emit the `end` record (when enabled) and return it.
    pub fn finish(&mut self) -> Result<EndRecord> {
        let end = EndRecord {
            samples:   self.samples,
            skipped:   self.skipped,
            runtime_s: self.started.elapsed().as_secs_f64(),
        };
        if self.lifecycle {
            self.reporter.emit(&Record::End(end.clone()))?;
        }
        Ok(end)
    }

    pub fn window(&self) -> &CpuWindow {
        &self.window
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }
}
