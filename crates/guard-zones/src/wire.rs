//! Serde shapes for the directory's JSON, kept private so callers only ever
//! see `HazardZone`. Coordinates arrive `[lat, lon]`; `resolved` may be
//! absent on older records and defaults to false.

use guard_proto::{Coordinate, HazardZone, RiskLevel};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ZonesResponse {
    flood: Vec<WireZone>,
}

#[derive(Debug, Deserialize)]
struct WireZone {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    location: WireLocation,
    #[serde(rename = "riskLevel")]
    risk_level: RiskLevel,
    #[serde(default)]
    resolved: bool,
}

#[derive(Debug, Deserialize)]
struct WireLocation {
    coordinates: [f64; 2],
    address: Option<String>,
}

impl ZonesResponse {
    pub(crate) fn into_zones(self) -> Vec<HazardZone> {
        self.flood
            .into_iter()
            .map(|z| HazardZone {
                id: z.id,
                name: z.name,
                coordinate: Coordinate {
                    lat: z.location.coordinates[0],
                    lon: z.location.coordinates[1],
                },
                address: z.location.address,
                risk_level: z.risk_level,
                resolved: z.resolved,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_directory_payload() {
        let body = r#"{
            "flood": [
                {
                    "_id": "66f0a1",
                    "name": "Teku",
                    "location": {
                        "coordinates": [27.6945, 85.3091],
                        "address": "Teku, Kathmandu"
                    },
                    "riskLevel": "High",
                    "resolved": false,
                    "description": "Riverbank settlement",
                    "createdAt": "2024-09-22T08:11:00.000Z"
                },
                {
                    "_id": "66f0a2",
                    "name": "Balkhu",
                    "location": { "coordinates": [27.6840, 85.2970] },
                    "riskLevel": "Medium"
                }
            ]
        }"#;

        let parsed: ZonesResponse = serde_json::from_str(body).unwrap();
        let zones = parsed.into_zones();
        assert_eq!(zones.len(), 2);

        assert_eq!(zones[0].id, "66f0a1");
        assert_eq!(zones[0].risk_level, RiskLevel::High);
        assert_eq!(zones[0].coordinate.lat, 27.6945);
        assert_eq!(zones[0].coordinate.lon, 85.3091);
        assert_eq!(zones[0].address.as_deref(), Some("Teku, Kathmandu"));
        assert!(!zones[0].resolved);

        // resolved and address absent on older records
        assert_eq!(zones[1].risk_level, RiskLevel::Medium);
        assert!(zones[1].address.is_none());
        assert!(!zones[1].resolved);
    }

    #[test]
    fn rejects_malformed_payload() {
        assert!(serde_json::from_str::<ZonesResponse>(r#"{"flood": [{"name": 3}]}"#).is_err());
        assert!(serde_json::from_str::<ZonesResponse>(r#"{"zones": []}"#).is_err());
    }
}
