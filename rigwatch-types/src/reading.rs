//! Sensor readings and the parameters they carry.

use core::fmt;

use crate::derive_vibration;

/// A monitored sensor parameter.
///
/// Every threshold, alert flag and chart is keyed by one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Parameter {
    Voltage,
    Rpm,
    Temperature,
    Humidity,
    Vibration,
}

impl Parameter {
    /// All monitored parameters, in display order.
    pub const ALL: [Parameter; 5] = [
        Parameter::Voltage,
        Parameter::Rpm,
        Parameter::Temperature,
        Parameter::Humidity,
        Parameter::Vibration,
    ];

    /// Field name used in documents and threshold maps.
    pub fn key(&self) -> &'static str {
        match self {
            Parameter::Voltage => "voltage",
            Parameter::Rpm => "rpm",
            Parameter::Temperature => "temperature",
            Parameter::Humidity => "humidity",
            Parameter::Vibration => "vibration",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Parameter::Voltage => "Voltage",
            Parameter::Rpm => "RPM",
            Parameter::Temperature => "Temperature",
            Parameter::Humidity => "Humidity",
            Parameter::Vibration => "Vibration",
        }
    }

    /// Display unit. RPM is unitless.
    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::Voltage => "V",
            Parameter::Rpm => "",
            Parameter::Temperature => "°C",
            Parameter::Humidity => "%",
            Parameter::Vibration => "g",
        }
    }

    /// Look up a parameter by its field name (case-insensitive).
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(key.trim()))
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One timestamped multi-sensor sample.
///
/// `timestamp` is kept as the ISO-8601 text the source supplied. Parsing is
/// left to consumers so a malformed value never prevents a reading from
/// being shown.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(rename_all = "camelCase", from = "RawReading")
)]
pub struct Reading {
    pub rpm: f64,
    pub voltage: f64,
    pub temperature: f64,
    pub humidity: f64,
    /// Vibration magnitude in g.
    pub vibration: f64,
    pub acceleration_x: f64,
    pub acceleration_y: f64,
    pub acceleration_z: f64,
    pub timestamp: String,
}

impl Reading {
    /// Create a builder for a reading taken at `timestamp`.
    pub fn builder(timestamp: impl Into<String>) -> ReadingBuilder {
        ReadingBuilder::new(timestamp)
    }

    /// Value of a single parameter.
    pub fn value(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Voltage => self.voltage,
            Parameter::Rpm => self.rpm,
            Parameter::Temperature => self.temperature,
            Parameter::Humidity => self.humidity,
            Parameter::Vibration => self.vibration,
        }
    }
}

/// A reading as delivered by a source, before normalization.
///
/// Every field is required except `vibration`, which sources may omit;
/// converting into a [`Reading`] derives it from the acceleration axes. A
/// stored vibration of exactly zero is treated the same as a missing one.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RawReading {
    pub rpm: f64,
    pub voltage: f64,
    pub temperature: f64,
    pub humidity: f64,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub vibration: Option<f64>,
    pub acceleration_x: f64,
    pub acceleration_y: f64,
    pub acceleration_z: f64,
    pub timestamp: String,
}

impl From<RawReading> for Reading {
    fn from(raw: RawReading) -> Self {
        let vibration = match raw.vibration {
            Some(v) if v != 0.0 && !v.is_nan() => v,
            _ => derive_vibration(raw.acceleration_x, raw.acceleration_y, raw.acceleration_z),
        };
        Self {
            rpm: raw.rpm,
            voltage: raw.voltage,
            temperature: raw.temperature,
            humidity: raw.humidity,
            vibration,
            acceleration_x: raw.acceleration_x,
            acceleration_y: raw.acceleration_y,
            acceleration_z: raw.acceleration_z,
            timestamp: raw.timestamp,
        }
    }
}

/// Builder for [`Reading`].
#[derive(Debug, Clone)]
pub struct ReadingBuilder {
    raw: RawReading,
}

impl ReadingBuilder {
    /// Create a builder with every sensor value at zero.
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            raw: RawReading {
                timestamp: timestamp.into(),
                ..Default::default()
            },
        }
    }

    pub fn rpm(mut self, rpm: f64) -> Self {
        self.raw.rpm = rpm;
        self
    }

    pub fn voltage(mut self, voltage: f64) -> Self {
        self.raw.voltage = voltage;
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.raw.temperature = temperature;
        self
    }

    pub fn humidity(mut self, humidity: f64) -> Self {
        self.raw.humidity = humidity;
        self
    }

    /// Set vibration explicitly instead of deriving it from acceleration.
    pub fn vibration(mut self, vibration: f64) -> Self {
        self.raw.vibration = Some(vibration);
        self
    }

    /// Set the raw accelerometer counts for the three axes.
    pub fn acceleration(mut self, x: f64, y: f64, z: f64) -> Self {
        self.raw.acceleration_x = x;
        self.raw.acceleration_y = y;
        self.raw.acceleration_z = z;
        self
    }

    /// Set a parameter by key.
    pub fn value(self, parameter: Parameter, value: f64) -> Self {
        match parameter {
            Parameter::Voltage => self.voltage(value),
            Parameter::Rpm => self.rpm(value),
            Parameter::Temperature => self.temperature(value),
            Parameter::Humidity => self.humidity(value),
            Parameter::Vibration => self.vibration(value),
        }
    }

    pub fn build(self) -> Reading {
        Reading::from(self.raw)
    }
}
