use probe_core::{HealthState, ProbeError, Result};
use serde::Serialize;
use serde_json::Value;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// File name used by [`write_summary`].
pub const SUMMARY_FILE: &str = "summary.json";

/// Condensed view of a captured JSON Lines trace.
///
/// Statistics that have no finite input serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub runtime_s:     f64,
    pub n_samples:     usize,
    pub cpu_mean:      f64,
    pub cpu_p95:       Option<f64>,
    pub cpu_max:       Option<f64>,
    pub mem_avail_min: Option<f64>,
    pub mem_used_max:  Option<f64>,
    pub swap_used_max: Option<f64>,
    pub cpu_warn_s:    f64,
    pub cpu_danger_s:  f64,
    pub mem_warn_s:    f64,
    pub mem_danger_s:  f64,
    /// The first `meta` record of the trace, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta:          Option<Value>,
}

/// One `sample` line, with unreadable fields as NaN.
struct Row {
    ts:        f64,
    cpu:       f64,
    mem_used:  f64,
    mem_avail: f64,
    swap_used: f64,
    cpu_state: Option<HealthState>,
    mem_state: Option<HealthState>,
}

impl Row {
    fn from_value(v: &Value) -> Self {
        let num = |key: &str| v.get(key).and_then(Value::as_f64).unwrap_or(f64::NAN);
        let state = |key: &str| {
            v.get(key)
                .and_then(|s| serde_json::from_value::<HealthState>(s.clone()).ok())
        };
        Self {
            ts:        num("ts"),
            cpu:       num("cpu"),
            mem_used:  num("mem_used"),
            mem_avail: num("mem_avail"),
            swap_used: num("mem_swap_used"),
            cpu_state: state("CPU_STATE"),
            mem_state: state("MEM_STATE"),
        }
    }
}

/// Summarize the trace stored at `path`.
pub fn summarize_file(path: &Path) -> Result<Summary> {
    let file = std::fs::File::open(path).map_err(|e| ProbeError::unavailable(path, e))?;
    summarize(std::io::BufReader::new(file))
}

/// Write `summary` as pretty JSON to `<dir>/summary.json`, creating `dir`
/// if needed. Returns the written path.
pub fn write_summary(dir: &Path, summary: &Summary) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| ProbeError::Report(format!("cannot encode summary: {e}")))?;
    std::fs::write(&path, json + "\n")?;
    tracing::info!(path = %path.display(), "Wrote summary");
    Ok(path)
}

/// Summarize a JSON Lines trace.
///
/// Blank lines, lines that are not JSON, unknown record types and samples
/// without a `ts` are skipped. A trace with no samples is an error.
pub fn summarize(input: impl BufRead) -> Result<Summary> {
    let mut meta = None;
    let mut rows = Vec::new();

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(line) else {
            tracing::debug!("Skipping non-JSON line");
            continue;
        };
        let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
        if kind == "sample" && value.get("ts").is_some() {
            rows.push(Row::from_value(&value));
        } else if kind == "meta" && meta.is_none() {
            meta = Some(value);
        }
    }

    if rows.is_empty() {
        return Err(ProbeError::Report(
            "no sample records found; expected JSON Lines with type=sample and a ts field".into(),
        ));
    }

    let ts: Vec<f64> = rows.iter().map(|r| r.ts).collect();
    let cpu: Vec<f64> = rows.iter().map(|r| r.cpu).collect();
    let cpu_states: Vec<_> = rows.iter().map(|r| r.cpu_state).collect();
    let mem_states: Vec<_> = rows.iter().map(|r| r.mem_state).collect();

    let runtime_s = if ts.len() > 1 { ts[ts.len() - 1] - ts[0] } else { 0.0 };

    let finite_cpu: Vec<f64> = cpu.iter().copied().filter(|v| !v.is_nan()).collect();
    let cpu_mean = finite_cpu.iter().sum::<f64>() / finite_cpu.len().max(1) as f64;

    Ok(Summary {
        runtime_s,
        n_samples: rows.len(),
        cpu_mean,
        cpu_p95: percentile(&cpu, 95.0),
        cpu_max: max(rows.iter().map(|r| r.cpu)),
        mem_avail_min: min(rows.iter().map(|r| r.mem_avail)),
        mem_used_max: max(rows.iter().map(|r| r.mem_used)),
        swap_used_max: max(rows.iter().map(|r| r.swap_used)),
        cpu_warn_s: time_in_state(&ts, &cpu_states, HealthState::Warn),
        cpu_danger_s: time_in_state(&ts, &cpu_states, HealthState::Danger),
        mem_warn_s: time_in_state(&ts, &mem_states, HealthState::Warn),
        mem_danger_s: time_in_state(&ts, &mem_states, HealthState::Danger),
        meta,
    })
}

/// Percentile `p` in `[0, 100]` with linear interpolation between closest
/// ranks. Non-finite values are ignored.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    let mut clean: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if clean.is_empty() {
        return None;
    }
    clean.sort_by(f64::total_cmp);

    if p <= 0.0 {
        return clean.first().copied();
    }
    if p >= 100.0 {
        return clean.last().copied();
    }

    let k = (clean.len() - 1) as f64 * (p / 100.0);
    let lo = k.floor() as usize;
    let hi = k.ceil() as usize;
    if lo == hi {
        return Some(clean[lo]);
    }
    Some(clean[lo] * (hi as f64 - k) + clean[hi] * (k - lo as f64))
}

/// Seconds attributed to `target`: each sample-to-sample gap counts toward
/// the earlier sample's state. Negative gaps count as zero.
pub fn time_in_state(ts: &[f64], states: &[Option<HealthState>], target: HealthState) -> f64 {
    ts.windows(2)
        .zip(states)
        .filter(|(_, state)| **state == Some(target))
        .map(|(pair, _)| (pair[1] - pair[0]).max(0.0))
        .sum()
}

fn max(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.filter(|v| !v.is_nan()).reduce(f64::max)
}

fn min(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.filter(|v| !v.is_nan()).reduce(f64::min)
}
