//! Per-parameter alert thresholds.

use crate::Parameter;

/// Alert limits, one per monitored parameter.
///
/// Always fully populated: deserializing a document that omits a key fills it
/// from [`ThresholdConfig::DEFAULT`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThresholdConfig {
    pub voltage: f64,
    pub rpm: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub vibration: f64,
}

impl ThresholdConfig {
    /// Baseline limits used at the start of every session.
    pub const DEFAULT: ThresholdConfig = ThresholdConfig {
        voltage: 16.0,
        rpm: 1600.0,
        temperature: 85.0,
        humidity: 70.0,
        vibration: 0.8,
    };

    /// Limit for a single parameter.
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Voltage => self.voltage,
            Parameter::Rpm => self.rpm,
            Parameter::Temperature => self.temperature,
            Parameter::Humidity => self.humidity,
            Parameter::Vibration => self.vibration,
        }
    }

    /// Set the limit for a single parameter.
    pub fn set(&mut self, parameter: Parameter, limit: f64) {
        match parameter {
            Parameter::Voltage => self.voltage = limit,
            Parameter::Rpm => self.rpm = limit,
            Parameter::Temperature => self.temperature = limit,
            Parameter::Humidity => self.humidity = limit,
            Parameter::Vibration => self.vibration = limit,
        }
    }

    /// Overlay the fields present in `partial`, keeping the rest.
    pub fn merged(mut self, partial: &PartialThresholdConfig) -> Self {
        for parameter in Parameter::ALL {
            if let Some(limit) = partial.get(parameter) {
                self.set(parameter, limit);
            }
        }
        self
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A threshold update where any subset of limits may be given.
///
/// No validation is applied; zero and negative limits are accepted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PartialThresholdConfig {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub voltage: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub rpm: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub temperature: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub humidity: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub vibration: Option<f64>,
}

impl PartialThresholdConfig {
    /// An update that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a limit for `parameter` to this update.
    pub fn with(mut self, parameter: Parameter, limit: f64) -> Self {
        let slot = match parameter {
            Parameter::Voltage => &mut self.voltage,
            Parameter::Rpm => &mut self.rpm,
            Parameter::Temperature => &mut self.temperature,
            Parameter::Humidity => &mut self.humidity,
            Parameter::Vibration => &mut self.vibration,
        };
        *slot = Some(limit);
        self
    }

    pub fn get(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Voltage => self.voltage,
            Parameter::Rpm => self.rpm,
            Parameter::Temperature => self.temperature,
            Parameter::Humidity => self.humidity,
            Parameter::Vibration => self.vibration,
        }
    }

    /// Check if the update carries no limits.
    pub fn is_empty(&self) -> bool {
        Parameter::ALL.iter().all(|p| self.get(*p).is_none())
    }
}

impl From<ThresholdConfig> for PartialThresholdConfig {
    fn from(config: ThresholdConfig) -> Self {
        Parameter::ALL
            .into_iter()
            .fold(Self::new(), |acc, p| acc.with(p, config.get(p)))
    }
}
