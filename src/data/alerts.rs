//! Threshold evaluation and gauge levels.

use rigwatch_types::{AlertState, Parameter, Reading, ThresholdConfig};

/// Compare a reading against thresholds.
///
/// Each parameter is flagged independently when its value is strictly
/// greater than its limit. There is no hysteresis: the result depends only
/// on the two arguments.
pub fn evaluate(reading: &Reading, thresholds: &ThresholdConfig) -> AlertState {
    let mut alerts = AlertState::clear();
    for parameter in Parameter::ALL {
        alerts.set(parameter, reading.value(parameter) > thresholds.get(parameter));
    }
    alerts
}

/// Severity bucket for a single parameter gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GaugeLevel {
    Normal,
    Attention,
    Warning,
    Critical,
}

impl GaugeLevel {
    /// Classify a parameter value.
    ///
    /// An active alert is always critical. Otherwise the gauge fill decides:
    /// above 80% is a warning, above 60% needs attention.
    pub fn classify(
        parameter: Parameter,
        value: f64,
        thresholds: &ThresholdConfig,
        alerts: &AlertState,
    ) -> Self {
        if alerts.get(parameter) {
            return GaugeLevel::Critical;
        }
        let fill = gauge_percentage(parameter, value, thresholds);
        if fill > 80.0 {
            GaugeLevel::Warning
        } else if fill > 60.0 {
            GaugeLevel::Attention
        } else {
            GaugeLevel::Normal
        }
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            GaugeLevel::Normal => "Normal",
            GaugeLevel::Attention => "Attention",
            GaugeLevel::Warning => "Warning",
            GaugeLevel::Critical => "Critical",
        }
    }
}

/// Gauge fill in percent, capped at 100.
///
/// Voltage and RPM are scaled against 1.5x their threshold, temperature
/// against 1.2x. Humidity uses a fixed 100% scale and vibration a 1 g scale.
pub fn gauge_percentage(parameter: Parameter, value: f64, thresholds: &ThresholdConfig) -> f64 {
    let scale = match parameter {
        Parameter::Voltage | Parameter::Rpm => thresholds.get(parameter) * 1.5,
        Parameter::Temperature => thresholds.temperature * 1.2,
        Parameter::Humidity => 100.0,
        Parameter::Vibration => 1.0,
    };
    (value / scale * 100.0).min(100.0)
}
