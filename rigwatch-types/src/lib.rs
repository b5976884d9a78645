//! # rigwatch-types
//!
//! Core types for equipment monitoring. This crate defines the shapes that
//! flow between a sensor data source, the rigwatch feed and whatever renders
//! its published state.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature for JSON and friends
//! - **Wire compatible**: Field names follow the camelCase documents produced by
//!   the equipment backend (`accelerationX`, `lastMaintenance`, ...)
//! - **Always complete**: Threshold configurations are fully populated; partial
//!   updates are a separate type
//!
//! ## Features
//!
//! - `serde`: JSON/MessagePack/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use rigwatch_types::{Parameter, Reading, ThresholdConfig};
//!
//! let reading = Reading::builder("2025-03-01T12:00:00Z")
//!     .voltage(17.2)
//!     .rpm(1520.0)
//!     .acceleration(16384.0, 0.0, 0.0)
//!     .build();
//!
//! // Vibration is derived from acceleration when not supplied.
//! assert_eq!(reading.vibration, 1.0);
//!
//! let thresholds = ThresholdConfig::default();
//! assert!(reading.value(Parameter::Voltage) > thresholds.get(Parameter::Voltage));
//! ```

mod alert;
mod equipment;
mod reading;
mod thresholds;
mod vibration;

pub use alert::*;
pub use equipment::*;
pub use reading::*;
pub use thresholds::*;
pub use vibration::*;
