use probe_core::{
    CpuCapacity, CpuTickSnapshot, HealthState, MemorySnapshot, ProbeError, Record, Reporter,
    Result, StatSource,
};
use probe_system::SampleLoop;
use std::collections::VecDeque;
use std::ops::Deref;
use std::time::Duration;
use tokio::sync::watch;

/// Keeps every emitted record in memory.
#[derive(Default)]
struct Collected(Vec<Record>);

impl Reporter for Collected {
    fn emit(&mut self, record: &Record) -> Result<()> {
        self.0.push(record.clone());
        Ok(())
    }
}

impl Deref for Collected {
    type Target = Vec<Record>;

    fn deref(&self) -> &Vec<Record> {
        &self.0
    }
}

/// Replays scripted readings; an exhausted script reads as unavailable.
#[derive(Default)]
struct ScriptedSource {
    cpu:       VecDeque<Option<CpuTickSnapshot>>,
    mem:       VecDeque<Option<MemorySnapshot>>,
    cpu_reads: usize,
    /// Raise shutdown once this many CPU reads have happened.
    stop_after: Option<(usize, watch::Sender<bool>)>,
}

impl ScriptedSource {
    fn unavailable() -> ProbeError {
        ProbeError::unavailable(
            "/scripted",
            std::io::Error::new(std::io::ErrorKind::NotFound, "scripted failure"),
        )
    }
}

impl StatSource for ScriptedSource {
    fn read_cpu(&mut self) -> Result<CpuTickSnapshot> {
        self.cpu_reads += 1;
        if let Some((after, tx)) = &self.stop_after {
            if self.cpu_reads >= *after {
                let _ = tx.send(true);
            }
        }
        self.cpu.pop_front().flatten().ok_or_else(Self::unavailable)
    }

    fn read_mem(&mut self) -> Result<MemorySnapshot> {
        self.mem.pop_front().flatten().ok_or_else(Self::unavailable)
    }

    fn read_capacity(&mut self) -> CpuCapacity {
        CpuCapacity { cores: 4, max_freq_khz: None }
    }
}

fn healthy_memory() -> MemorySnapshot {
    MemorySnapshot {
        total_kb:      8 * 1024 * 1024,
        available_kb:  4 * 1024 * 1024,
        swap_total_kb: 0,
        swap_free_kb:  0,
    }
}

/// Baseline plus three ticks with (delta_total, delta_idle) of
/// (100, 20), (100, 50), (100, 96).
fn scripted_ticks() -> Vec<CpuTickSnapshot> {
    vec![
        CpuTickSnapshot::new(0, 0, 0, 0),
        CpuTickSnapshot::new(80, 0, 0, 20),
        CpuTickSnapshot::new(130, 0, 0, 70),
        CpuTickSnapshot::new(134, 0, 0, 166),
    ]
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_scripted_ticks_produce_expected_usage_and_average() {
    let source = ScriptedSource {
        cpu: scripted_ticks().into_iter().map(Some).collect(),
        mem: std::iter::repeat(Some(healthy_memory())).take(4).collect(),
        ..Default::default()
    };
    let mut sampler = SampleLoop::new(source, Collected::default(), Duration::ZERO);
    sampler.start().unwrap();

    let cpu: Vec<f64> = (0..3)
        .map(|_| sampler.tick().unwrap().expect("tick emitted").cpu)
        .collect();
    assert!(approx(cpu[0], 80.0));
    assert!(approx(cpu[1], 50.0));
    assert!(approx(cpu[2], 4.0));

    let average = sampler.window().average();
    assert!(approx(average, (80.0 + 50.0 + 4.0) / 3.0));
    assert!((average - 44.67).abs() < 0.01);

    let records = sampler.reporter();
    assert!(matches!(records[0], Record::Meta(ref m) if m.cores == 4 && m.window == 10));
    let Record::Sample(last) = &records[3] else {
        panic!("expected a sample record");
    };
    assert!(approx(last.cpu_avg, average));
    assert_eq!(last.cpu_state, HealthState::Ok);
    assert_eq!(last.mem_state, HealthState::Ok);
}

#[test]
fn test_failed_cpu_read_skips_tick_without_touching_window() {
    let source = ScriptedSource {
        cpu: vec![
            Some(CpuTickSnapshot::new(0, 0, 0, 0)),
            Some(CpuTickSnapshot::new(90, 0, 0, 10)),
            None,
            Some(CpuTickSnapshot::new(140, 0, 0, 60)),
        ]
        .into(),
        mem: std::iter::repeat(Some(healthy_memory())).take(4).collect(),
        ..Default::default()
    };
    let mut sampler = SampleLoop::new(source, Collected::default(), Duration::ZERO)
        .with_lifecycle_records(false);
    sampler.start().unwrap();

    assert!(approx(sampler.tick().unwrap().unwrap().cpu, 90.0));
    assert!(sampler.tick().unwrap().is_none());
    assert_eq!(sampler.window().len(), 1);

    // Compared against the last good snapshot, not the failed read.
    assert!(approx(sampler.tick().unwrap().unwrap().cpu, 50.0));
    assert_eq!(sampler.reporter().len(), 2);

    let end = sampler.finish().unwrap();
    assert_eq!((end.samples, end.skipped), (2, 1));
    assert_eq!(sampler.reporter().len(), 2);
}

#[test]
fn test_failed_memory_read_keeps_previous_snapshot() {
    let tight = MemorySnapshot {
        total_kb:      100,
        available_kb:  4,
        swap_total_kb: 0,
        swap_free_kb:  0,
    };
    let source = ScriptedSource {
        cpu: scripted_ticks().into_iter().map(Some).collect(),
        mem: vec![Some(healthy_memory()), Some(tight), None].into(),
        ..Default::default()
    };
    let mut sampler = SampleLoop::new(source, Collected::default(), Duration::ZERO);
    sampler.start().unwrap();

    let first = sampler.tick().unwrap().unwrap();
    let second = sampler.tick().unwrap().unwrap();
    assert_eq!(first.mem_state, HealthState::Danger);
    assert_eq!(second.mem_state, HealthState::Danger);
    assert_eq!(second.mem_avail, first.mem_avail);
}

#[test]
fn test_unreadable_sources_at_startup_degrade_to_zero() {
    let source = ScriptedSource {
        cpu: vec![None, Some(CpuTickSnapshot::new(30, 0, 10, 60))].into(),
        ..Default::default()
    };
    let mut sampler = SampleLoop::new(source, Collected::default(), Duration::ZERO);
    sampler.start().unwrap();

    let Record::Meta(meta) = &sampler.reporter()[0] else {
        panic!("expected a meta record");
    };
    assert_eq!(meta.mem_total, 0.0);

    // Baseline fell back to zero counters.
    let sample = sampler.tick().unwrap().unwrap();
    assert!(approx(sample.cpu, 40.0));
    assert_eq!(sample.mem_state, HealthState::Ok);
}

#[tokio::test]
async fn test_run_finishes_current_tick_after_shutdown() {
    let (tx, rx) = watch::channel(false);
    let source = ScriptedSource {
        cpu: scripted_ticks().into_iter().map(Some).collect(),
        mem: std::iter::repeat(Some(healthy_memory())).take(4).collect(),
        // Baseline read plus two ticks; shutdown is raised during the second.
        stop_after: Some((3, tx)),
        ..Default::default()
    };
    let mut records = Collected::default();

    let end = SampleLoop::new(source, &mut records, Duration::from_millis(1))
        .run(rx)
        .await
        .unwrap();

    assert_eq!(end.samples, 2);
    assert_eq!(records.len(), 4);
    assert!(matches!(records[0], Record::Meta(_)));
    assert!(matches!(records[2], Record::Sample(ref s) if approx(s.cpu, 50.0)));
    assert!(matches!(records[3], Record::End(ref e) if e.samples == 2));
}

#[tokio::test]
async fn test_run_with_shutdown_already_raised_takes_no_samples() {
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let source = ScriptedSource {
        cpu: scripted_ticks().into_iter().map(Some).collect(),
        ..Default::default()
    };
    let mut records = Collected::default();
    let end = SampleLoop::new(source, &mut records, Duration::from_secs(3600))
        .run(rx)
        .await
        .unwrap();

    assert_eq!(end.samples, 0);
    assert!(matches!(records.as_slice(), [Record::Meta(_), Record::End(_)]));
}
