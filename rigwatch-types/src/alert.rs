//! Per-parameter alert flags.

use crate::Parameter;

/// Alert flags derived from one reading and one threshold configuration.
///
/// Recomputed in full whenever either input changes; flags are never carried
/// over from a previous evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlertState {
    pub voltage: bool,
    pub rpm: bool,
    pub temperature: bool,
    pub humidity: bool,
    pub vibration: bool,
}

impl AlertState {
    /// No parameter in alert.
    pub fn clear() -> Self {
        Self::default()
    }

    pub fn get(&self, parameter: Parameter) -> bool {
        match parameter {
            Parameter::Voltage => self.voltage,
            Parameter::Rpm => self.rpm,
            Parameter::Temperature => self.temperature,
            Parameter::Humidity => self.humidity,
            Parameter::Vibration => self.vibration,
        }
    }

    pub fn set(&mut self, parameter: Parameter, active: bool) {
        match parameter {
            Parameter::Voltage => self.voltage = active,
            Parameter::Rpm => self.rpm = active,
            Parameter::Temperature => self.temperature = active,
            Parameter::Humidity => self.humidity = active,
            Parameter::Vibration => self.vibration = active,
        }
    }

    /// Parameters currently in alert, in display order.
    pub fn active(&self) -> impl Iterator<Item = Parameter> + '_ {
        Parameter::ALL.into_iter().filter(|p| self.get(*p))
    }

    /// Number of parameters currently in alert.
    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn any(&self) -> bool {
        self.active_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_has_no_alerts() {
        let a = AlertState::clear();
        assert!(!a.any());
        assert_eq!(a.active_count(), 0);
    }

    #[test]
    fn active_lists_flagged_parameters() {
        let mut a = AlertState::clear();
        a.set(Parameter::Humidity, true);
        a.set(Parameter::Voltage, true);

        let active: Vec<_> = a.active().collect();
        assert_eq!(active, vec![Parameter::Voltage, Parameter::Humidity]);
        assert_eq!(a.active_count(), 2);
        assert!(a.get(Parameter::Humidity));
        assert!(!a.get(Parameter::Rpm));
    }
}
