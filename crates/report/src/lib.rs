//! Output side of the probe.
//!
//! - [`JsonLinesReporter`] writes records as they are produced.
//! - [`summary`] reads a captured trace back and condenses it.

pub mod summary;
pub mod writer;

pub use summary::{summarize, summarize_file, write_summary, Summary};
pub use writer::JsonLinesReporter;
