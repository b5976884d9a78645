//! Equipment metadata documents.

use core::fmt;

/// Operational status reported for a piece of equipment.
///
/// Matching is case-insensitive. Statuses outside the known set are kept
/// verbatim in [`EquipmentStatus::Other`] and carry no meaning of their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum EquipmentStatus {
    Operational,
    NeedsAttention,
    Critical,
    Maintenance,
    Other(String),
}

impl EquipmentStatus {
    /// Parse a status string. Never fails.
    pub fn parse(status: &str) -> Self {
        match status.to_lowercase().as_str() {
            "operational" => EquipmentStatus::Operational,
            "needs attention" => EquipmentStatus::NeedsAttention,
            "critical" => EquipmentStatus::Critical,
            "maintenance" => EquipmentStatus::Maintenance,
            _ => EquipmentStatus::Other(status.to_string()),
        }
    }

    /// The status text for display.
    pub fn as_str(&self) -> &str {
        match self {
            EquipmentStatus::Operational => "Operational",
            EquipmentStatus::NeedsAttention => "Needs Attention",
            EquipmentStatus::Critical => "Critical",
            EquipmentStatus::Maintenance => "Maintenance",
            EquipmentStatus::Other(s) => s,
        }
    }

    /// Whether this is one of the known statuses.
    pub fn is_known(&self) -> bool {
        !matches!(self, EquipmentStatus::Other(_))
    }
}

impl From<String> for EquipmentStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<EquipmentStatus> for String {
    fn from(status: EquipmentStatus) -> Self {
        match status {
            EquipmentStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse bucket for the health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthTier {
    Poor,
    Fair,
    Good,
}

impl HealthTier {
    /// Bucket a health score in `[0, 1]`: above 0.7 is good, above 0.4 fair.
    pub fn from_score(health: f64) -> Self {
        if health > 0.7 {
            HealthTier::Good
        } else if health > 0.4 {
            HealthTier::Fair
        } else {
            HealthTier::Poor
        }
    }
}

/// Metadata for one monitored unit.
///
/// Replaced wholesale whenever the metadata subscription delivers a new
/// document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Equipment {
    pub id: String,
    pub name: String,
    pub status: EquipmentStatus,
    /// Health score in `[0, 1]`.
    pub health: f64,
    /// ISO-8601 timestamp of the last maintenance.
    pub last_maintenance: String,
    /// ISO-8601 timestamp of the next scheduled maintenance.
    pub next_maintenance: String,
    /// Carried with the document; not consulted by alert evaluation.
    pub anomaly_threshold: f64,
}

impl Equipment {
    pub fn health_tier(&self) -> HealthTier {
        HealthTier::from_score(self.health)
    }

    /// Health as a whole percentage, rounded to nearest.
    pub fn health_percent(&self) -> u32 {
        (self.health * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equipment(health: f64) -> Equipment {
        Equipment {
            id: "pump-7".to_string(),
            name: "Coolant Pump".to_string(),
            status: EquipmentStatus::Operational,
            health,
            last_maintenance: "2025-01-10T08:00:00Z".to_string(),
            next_maintenance: "2025-04-10T08:00:00Z".to_string(),
            anomaly_threshold: 0.75,
        }
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(EquipmentStatus::parse("OPERATIONAL"), EquipmentStatus::Operational);
        assert_eq!(
            EquipmentStatus::parse("needs attention"),
            EquipmentStatus::NeedsAttention
        );
        assert_eq!(EquipmentStatus::parse("Critical"), EquipmentStatus::Critical);
        assert_eq!(EquipmentStatus::parse("mainTenance"), EquipmentStatus::Maintenance);
    }

    #[test]
    fn unknown_status_passes_through() {
        let status = EquipmentStatus::parse("Decommissioned");
        assert!(!status.is_known());
        assert_eq!(status.as_str(), "Decommissioned");
        assert_eq!(String::from(status), "Decommissioned");
    }

    #[test]
    fn health_tiers() {
        assert_eq!(equipment(0.95).health_tier(), HealthTier::Good);
        assert_eq!(equipment(0.7).health_tier(), HealthTier::Fair);
        assert_eq!(equipment(0.41).health_tier(), HealthTier::Fair);
        assert_eq!(equipment(0.4).health_tier(), HealthTier::Poor);
    }

    #[test]
    fn health_percent_rounds() {
        assert_eq!(equipment(0.876).health_percent(), 88);
        assert_eq!(equipment(0.0).health_percent(), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_document() {
        let json = r#"{
            "id": "mock-equipment-1",
            "name": "Main Motor",
            "status": "needs attention",
            "health": 0.62,
            "lastMaintenance": "2025-01-10T08:00:00Z",
            "nextMaintenance": "2025-04-10T08:00:00Z",
            "anomalyThreshold": 0.8
        }"#;

        let e: Equipment = serde_json::from_str(json).unwrap();
        assert_eq!(e.status, EquipmentStatus::NeedsAttention);
        assert_eq!(e.anomaly_threshold, 0.8);

        let out = serde_json::to_value(&e).unwrap();
        assert_eq!(out["status"], "Needs Attention");
        assert_eq!(out["lastMaintenance"], "2025-01-10T08:00:00Z");
    }
}
