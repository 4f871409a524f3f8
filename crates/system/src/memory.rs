use probe_core::{MemorySnapshot, ProbeError, Result};
use std::path::Path;

/// Extract `MemTotal`, `MemAvailable`, `SwapTotal` and `SwapFree` from
/// `/proc/meminfo` text.
///
/// Keys match exactly (including the trailing colon). Missing or unparsable
/// entries leave their field at zero; scanning stops once all four are found.
pub fn parse_meminfo(text: &str) -> MemorySnapshot {
    let mut mem   = MemorySnapshot::default();
    let mut found = 0;

    for line in text.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let slot = match key {
            "MemTotal:"     => &mut mem.total_kb,
            "MemAvailable:" => &mut mem.available_kb,
            "SwapTotal:"    => &mut mem.swap_total_kb,
            "SwapFree:"     => &mut mem.swap_free_kb,
            _ => continue,
        };
        let Ok(value) = value.parse() else {
            continue;
        };
        *slot = value;
        found += 1;
        if found == 4 {
            break;
        }
    }
    mem
}

/// Read and parse a `/proc/meminfo`-format file. Fails only if the file
/// cannot be read.
pub fn read_meminfo(path: &Path) -> Result<MemorySnapshot> {
    let text = std::fs::read_to_string(path).map_err(|e| ProbeError::unavailable(path, e))?;
    Ok(parse_meminfo(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "\
MemTotal:       16314148 kB
MemFree:         1050720 kB
MemAvailable:    9142312 kB
Buffers:          502548 kB
Cached:          7446556 kB
SwapCached:          412 kB
SwapTotal:       2097148 kB
SwapFree:        2090492 kB
HugePages_Total:       0
";

    #[test]
    fn parses_the_four_keys() {
        let mem = parse_meminfo(MEMINFO);
        assert_eq!(mem.total_kb, 16_314_148);
        assert_eq!(mem.available_kb, 9_142_312);
        assert_eq!(mem.swap_total_kb, 2_097_148);
        assert_eq!(mem.swap_free_kb, 2_090_492);
    }

    #[test]
    fn missing_keys_stay_zero() {
        let mem = parse_meminfo("MemTotal: 1000 kB\nMemFree: 10 kB\n");
        assert_eq!(mem.total_kb, 1000);
        assert_eq!(mem.available_kb, 0);
        assert_eq!(mem.swap_total_kb, 0);
        assert_eq!(mem.swap_free_kb, 0);
    }

    #[test]
    fn prefix_keys_do_not_match() {
        let mem = parse_meminfo("MemTotalX: 5 kB\nMemTotal 7 kB\n");
        assert_eq!(mem, MemorySnapshot::default());
    }

    #[test]
    fn stops_after_all_keys_found() {
        let text = "MemTotal: 1 kB\nMemAvailable: 2 kB\nSwapTotal: 3 kB\nSwapFree: 4 kB\nMemTotal: 99 kB\n";
        assert_eq!(parse_meminfo(text).total_kb, 1);
    }

    #[test]
    fn garbage_is_tolerated() {
        assert_eq!(parse_meminfo("not meminfo at all"), MemorySnapshot::default());
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = read_meminfo(Path::new("/nonexistent/proc/meminfo")).unwrap_err();
        assert!(matches!(err, ProbeError::SourceUnavailable { .. }));
    }
}
