use guard_proto::HazardZone;

use crate::geo;
use crate::position::Position;

/// The selected zone and how far away it is.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneHit<'a> {
    pub zone: &'a HazardZone,
    pub distance_m: f64,
}

/// Selects the nearest unresolved zone strictly within `threshold_m` of
/// `position`, or `None` if no zone qualifies. Ties keep the first-seen zone,
/// so selection is deterministic for a given snapshot order.
///
/// Pure function of its inputs; the threshold is configuration, never a
/// built-in constant.
pub fn nearest_hazard<'a>(
    position: &Position,
    zones: &'a [HazardZone],
    threshold_m: f64,
) -> Option<ZoneHit<'a>> {
    let mut best: Option<ZoneHit<'a>> = None;
    for zone in zones.iter().filter(|z| !z.resolved) {
        let distance_m = geo::distance_m(position.coordinate, zone.coordinate);
        if distance_m >= threshold_m {
            continue;
        }
        if best.as_ref().map_or(true, |b| distance_m < b.distance_m) {
            best = Some(ZoneHit { zone, distance_m });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use guard_proto::{Coordinate, RiskLevel};
    use time::OffsetDateTime;

    use super::*;

    fn zone(id: &str, lat: f64, lon: f64, resolved: bool) -> HazardZone {
        HazardZone {
            id: id.to_string(),
            name: format!("zone {id}"),
            coordinate: Coordinate { lat, lon },
            address: None,
            risk_level: RiskLevel::Medium,
            resolved,
        }
    }

    fn at(lat: f64, lon: f64) -> Position {
        Position {
            coordinate: Coordinate { lat, lon },
            ts: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn resolved_zones_never_qualify() {
        let zones = vec![zone("a", 27.7000, 85.3000, true)];
        let pos = at(27.7000, 85.3000);
        assert!(nearest_hazard(&pos, &zones, 1000.0).is_none());
    }

    #[test]
    fn nearest_qualifying_zone_wins() {
        // ~55 m and ~220 m north of the position
        let zones = vec![
            zone("far", 27.7020, 85.3000, false),
            zone("near", 27.7005, 85.3000, false),
        ];
        let pos = at(27.7000, 85.3000);
        let hit = nearest_hazard(&pos, &zones, 300.0).unwrap();
        assert_eq!(hit.zone.id, "near");
        assert!(hit.distance_m < 60.0);
    }

    #[test]
    fn tie_keeps_first_seen_order() {
        // co-located zones are exactly equidistant
        let zones = vec![
            zone("first", 27.7005, 85.3000, false),
            zone("second", 27.7005, 85.3000, false),
        ];
        let pos = at(27.7000, 85.3000);
        let hit = nearest_hazard(&pos, &zones, 300.0).unwrap();
        assert_eq!(hit.zone.id, "first");
    }

    #[test]
    fn threshold_is_strict() {
        let zones = vec![zone("a", 27.7005, 85.3000, false)];
        let pos = at(27.7000, 85.3000);
        let d = crate::geo::distance_m(pos.coordinate, zones[0].coordinate);
        assert!(nearest_hazard(&pos, &zones, d).is_none());
        assert!(nearest_hazard(&pos, &zones, d + 0.1).is_some());
    }

    #[test]
    fn repeated_evaluation_is_identical() {
        let zones = vec![
            zone("a", 27.7005, 85.3000, false),
            zone("b", 27.7020, 85.3000, false),
        ];
        let pos = at(27.7000, 85.3000);
        let a = nearest_hazard(&pos, &zones, 300.0);
        let b = nearest_hazard(&pos, &zones, 300.0);
        assert_eq!(a, b);
    }
}
