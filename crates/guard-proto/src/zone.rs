use serde::{Deserialize, Serialize};

/// A WGS-84 point, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Risk classification carried by the zone directory. Serialized exactly as
/// the directory API spells it ("Low" | "Medium" | "High").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

/// A flood-prone area as published by the zone directory: a named point with
/// an implicit proximity radius. Zones marked resolved stay on the map but
/// never trigger alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardZone {
    pub id: String,
    pub name: String,
    pub coordinate: Coordinate,
    pub address: Option<String>,
    pub risk_level: RiskLevel,
    pub resolved: bool,
}
