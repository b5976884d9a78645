//! Reading processing: the bounded window, thresholds and alert evaluation.
//!
//! ## Submodules
//!
//! - [`alerts`]: Threshold comparison ([`evaluate`]) and per-parameter gauge levels
//! - [`buffer`]: The time-ordered sliding window of recent readings ([`ReadingBuffer`])
//! - [`stats`]: Window statistics and time-range filtering for trend charts
//! - [`thresholds`]: The session's mutable threshold configuration ([`ThresholdStore`])
//! - [`timestamp`]: Lenient ISO-8601 parsing and display formatting
//!
//! ## Data Flow
//!
//! ```text
//! Reading (from a source)
//!        │
//!        ▼
//! ReadingBuffer::push()  ── sorted by timestamp, capped at capacity
//!        │
//!        ▼
//! latest() ──▶ evaluate(reading, ThresholdStore::current()) ──▶ AlertState
//! ```

pub mod alerts;
pub mod buffer;
pub mod stats;
pub mod thresholds;
pub mod timestamp;

pub use alerts::{evaluate, GaugeLevel};
pub use buffer::{ReadingBuffer, DEFAULT_CAPACITY};
pub use stats::{ParameterStats, TimeRange};
pub use thresholds::ThresholdStore;
