pub mod error;
pub mod record;
pub mod source;
pub mod state;

pub use error::{ProbeError, Result};
pub use record::{EndRecord, MetaRecord, Record, SampleRecord};
pub use source::{Reporter, StatSource};
pub use state::{CpuCapacity, CpuTickSnapshot, HealthState, MemorySnapshot};
