//! Session-scoped threshold configuration.

use rigwatch_types::{PartialThresholdConfig, ThresholdConfig};

/// Holds the active alert thresholds for a monitoring session.
///
/// Starts from [`ThresholdStore::defaults`]. Updates are merged field by
/// field and are not validated. Callers that cache alert state must
/// re-evaluate with the returned configuration.
#[derive(Debug, Clone, Default)]
pub struct ThresholdStore {
    current: ThresholdConfig,
}

impl ThresholdStore {
    /// Create a store seeded with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed baseline configuration.
    pub fn defaults() -> ThresholdConfig {
        ThresholdConfig::DEFAULT
    }

    /// The active configuration.
    pub fn current(&self) -> ThresholdConfig {
        self.current
    }

    /// Merge `partial` over the active configuration and return the result.
    pub fn update(&mut self, partial: &PartialThresholdConfig) -> ThresholdConfig {
        self.current = self.current.merged(partial);
        self.current
    }

    /// Restore the defaults.
    pub fn reset(&mut self) -> ThresholdConfig {
        self.current = Self::defaults();
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigwatch_types::Parameter;

    #[test]
    fn test_starts_at_defaults() {
        let store = ThresholdStore::new();
        assert_eq!(store.current(), ThresholdStore::defaults());
    }

    #[test]
    fn test_update_changes_only_voltage() {
        let mut store = ThresholdStore::new();
        let before = store.current();
        let after = store.update(&PartialThresholdConfig::new().with(Parameter::Voltage, 20.0));

        assert_eq!(after.voltage, 20.0);
        assert_eq!(after.rpm, before.rpm);
        assert_eq!(after.temperature, before.temperature);
        assert_eq!(after.humidity, before.humidity);
        assert_eq!(after.vibration, before.vibration);
        assert_eq!(store.current(), after);
    }

    #[test]
    fn test_updates_accumulate() {
        let mut store = ThresholdStore::new();
        store.update(&PartialThresholdConfig::new().with(Parameter::Rpm, 1700.0));
        let t = store.update(&PartialThresholdConfig::new().with(Parameter::Humidity, 65.0));

        assert_eq!(t.rpm, 1700.0);
        assert_eq!(t.humidity, 65.0);
    }

    #[test]
    fn test_accepts_unvalidated_values() {
        let mut store = ThresholdStore::new();
        let t = store.update(
            &PartialThresholdConfig::new()
                .with(Parameter::Temperature, -40.0)
                .with(Parameter::Vibration, 0.0),
        );
        assert_eq!(t.temperature, -40.0);
        assert_eq!(t.vibration, 0.0);
    }

    #[test]
    fn test_reset() {
        let mut store = ThresholdStore::new();
        store.update(&PartialThresholdConfig::new().with(Parameter::Voltage, 1.0));
        assert_eq!(store.reset(), ThresholdStore::defaults());
    }
}
