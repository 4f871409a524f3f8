use probe_core::{ProbeError, Record, Reporter, Result};
use std::io::Write;

/// Writes each record as one line of JSON and flushes immediately.
#[derive(Debug)]
pub struct JsonLinesReporter<W> {
    out: W,
}

impl<W: Write> JsonLinesReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonLinesReporter<W> {
    fn emit(&mut self, record: &Record) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)
            .map_err(|e| ProbeError::Report(format!("cannot encode record: {e}")))?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}
