//! # rigwatch
//!
//! Real-time condition monitoring for industrial equipment.
//!
//! A monitoring session follows one piece of equipment: its metadata
//! document (status, health, maintenance dates) and a sliding window of
//! recent sensor readings. Each reading is checked against configurable
//! thresholds and the resulting alert flags are published together with the
//! window, ready for a dashboard to render.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                                                              │
//! │  ┌─────────┐  Envelope  ┌──────────┐          ┌───────────┐  │
//! │  │ source  │───────────▶│   feed   │─────────▶│ watch /   │  │
//! │  │ (input) │  (mpsc)    │ (state)  │ Snapshot │ consumers │  │
//! │  └────┬────┘            └────┬─────┘          └───────────┘  │
//! │       │                      │                               │
//! │       │                      ▼                               │
//! │       │                 ┌──────────┐                         │
//! │       │                 │   data   │ buffer, thresholds,     │
//! │       │                 │          │ evaluate, stats         │
//! │       │                 └──────────┘                         │
//! │       ▼                                                      │
//! │  SimulatedSource | LiveSource ◀── StreamIngest (TCP, bus)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) with a
//!   timer-driven simulated source and a live source fed by network ingest
//! - **[`feed`]**: The session state machine ([`EquipmentFeed`]) publishing
//!   [`FeedSnapshot`]s
//! - **[`data`]**: The reading window, threshold store, alert evaluation,
//!   statistics and timestamp handling
//! - **[`config`]**: Layered configuration for the binary
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Simulated readings every 3 seconds
//! rigwatch --equipment mock-equipment-1
//!
//! # Live records from a TCP ingest stream
//! rigwatch --connect plant-gateway:7000 --equipment press-3
//! ```
//!
//! ### As a library with a simulated source
//!
//! ```
//! use std::sync::Arc;
//! use rigwatch::{EquipmentFeed, SimulatedSource};
//!
//! # tokio_test::block_on(async {
//! let mut feed = EquipmentFeed::new(Arc::new(SimulatedSource::random()));
//! feed.start("mock-equipment-1");
//!
//! // The first update after start carries either the equipment document or
//! // the prefilled window.
//! let snapshot = feed.next_update().await;
//! assert_eq!(snapshot.equipment_id.as_deref(), Some("mock-equipment-1"));
//! # });
//! ```
//!
//! ### As a library with a live source
//!
//! ```no_run
//! use std::sync::Arc;
//! use rigwatch::{EquipmentFeed, LiveSource, StreamIngest};
//!
//! # tokio_test::block_on(async {
//! let live = LiveSource::new("plant-gateway:7000");
//! let stream = tokio::net::TcpStream::connect("plant-gateway:7000").await.unwrap();
//! StreamIngest::spawn(stream, live.clone());
//!
//! let mut feed = EquipmentFeed::new(Arc::new(live));
//! feed.start("press-3");
//! # });
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod feed;
pub mod source;

// Re-export main types for convenience
pub use config::{RigwatchConfig, SourceMode};
pub use data::{evaluate, GaugeLevel, ParameterStats, ReadingBuffer, ThresholdStore, TimeRange};
pub use error::{FeedError, SourceError};
pub use feed::{EquipmentFeed, FeedSnapshot, FeedState};
pub use source::{
    DataSource, EventSink, LiveSource, SampleGenerator, Sampler, SimulatedSource, StreamIngest,
    Subscription,
};
