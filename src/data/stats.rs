//! Window statistics and time-range filtering for trend views.

use std::str::FromStr;

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, Utc};

use super::timestamp::parse_timestamp;
use rigwatch_types::{Parameter, Reading, ThresholdConfig};

/// Summary of one parameter across a set of readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Value in the last reading.
    pub current: f64,
}

impl ParameterStats {
    /// Compute statistics over readings (oldest first).
    ///
    /// Returns `None` when there are no readings.
    pub fn compute<'a, I>(readings: I, parameter: Parameter) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Reading>,
    {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut current = 0.0;

        for reading in readings {
            let value = reading.value(parameter);
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
            current = value;
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            min,
            max,
            avg: sum / count as f64,
            current,
        })
    }
}

/// Whether any reading exceeded the parameter's threshold.
pub fn exceeded<'a, I>(readings: I, parameter: Parameter, thresholds: &ThresholdConfig) -> bool
where
    I: IntoIterator<Item = &'a Reading>,
{
    let limit = thresholds.get(parameter);
    readings.into_iter().any(|r| r.value(parameter) > limit)
}

/// How far back a trend view looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    #[default]
    All,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
}

impl TimeRange {
    /// Length of the window, or `None` for everything.
    pub fn window(&self) -> Option<Duration> {
        match self {
            TimeRange::All => None,
            TimeRange::FiveMinutes => Some(Duration::minutes(5)),
            TimeRange::FifteenMinutes => Some(Duration::minutes(15)),
            TimeRange::ThirtyMinutes => Some(Duration::minutes(30)),
        }
    }

    /// Returns the short label used for selection.
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::All => "all",
            TimeRange::FiveMinutes => "5min",
            TimeRange::FifteenMinutes => "15min",
            TimeRange::ThirtyMinutes => "30min",
        }
    }

    /// Keep readings newer than `now - window`.
    ///
    /// Readings whose timestamps cannot be parsed are kept.
    pub fn filter<'a>(&self, readings: &'a [Reading], now: DateTime<Utc>) -> Vec<&'a Reading> {
        let Some(window) = self.window() else {
            return readings.iter().collect();
        };
        let cutoff = now - window;

        readings
            .iter()
            .filter(|r| parse_timestamp(&r.timestamp).map_or(true, |at| at > cutoff))
            .collect()
    }
}

impl FromStr for TimeRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TimeRange::All),
            "5min" => Ok(TimeRange::FiveMinutes),
            "15min" => Ok(TimeRange::FifteenMinutes),
            "30min" => Ok(TimeRange::ThirtyMinutes),
            other => bail!("Unknown time range: {}", other),
        }
    }
}
