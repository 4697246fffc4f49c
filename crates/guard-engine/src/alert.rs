use std::time::{Duration, Instant};

use guard_proto::{AlertNotice, AlertPriority, HazardZone, RiskLevel, Vibration};

use crate::proximity::ZoneHit;

#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Minimum time between alerts for the same zone at the same risk.
    pub re_alert_interval: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlertState {
    Idle,
    Alerting {
        zone_id: String,
        risk: RiskLevel,
        /// A sustained vibration pattern is currently live on the notifier.
        sustained: bool,
    },
}

/// What the caller must do after an observation. `Emit` with a sustained
/// pattern starts continuous feedback; `CancelSustained` stops it.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertAction {
    Emit(AlertNotice),
    CancelSustained,
}

#[derive(Debug, Clone)]
struct LastAlert {
    zone_id: String,
    risk: RiskLevel,
    at: Instant,
}

/// The alerting session for one monitor run. Pure state machine: each
/// observation of a proximity result returns the actions to apply, and the
/// machine itself performs no I/O, so throttling and transitions are directly
/// unit-testable.
///
/// The throttle slot deliberately survives a return to `Idle`: stepping out
/// of a zone and straight back in within the re-alert interval stays silent
/// instead of re-firing on every boundary crossing.
#[derive(Debug)]
pub struct AlertEngine {
    cfg: AlertConfig,
    state: AlertState,
    last_alert: Option<LastAlert>,
}

impl AlertEngine {
    pub fn new(cfg: AlertConfig) -> Self {
        Self { cfg, state: AlertState::Idle, last_alert: None }
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    /// Feeds one proximity result into the session.
    pub fn observe(&mut self, hit: Option<&ZoneHit<'_>>, now: Instant) -> Vec<AlertAction> {
        let mut actions = Vec::new();
        match hit {
            None => self.exit(&mut actions),
            Some(h) => {
                let same = matches!(
                    &self.state,
                    AlertState::Alerting { zone_id, risk, .. }
                        if *zone_id == h.zone.id && *risk == h.zone.risk_level
                );
                if same {
                    self.re_alert(h, now, &mut actions);
                } else {
                    // zone or risk changed: exit the old session, enter fresh
                    self.exit(&mut actions);
                    self.enter(h, now, &mut actions);
                }
            }
        }
        actions
    }

    /// Drops the session without emitting anything; used when monitoring
    /// stops. Cancels live feedback and forgets the throttle slot.
    pub fn reset(&mut self) -> Vec<AlertAction> {
        let mut actions = Vec::new();
        self.exit(&mut actions);
        self.last_alert = None;
        actions
    }

    fn exit(&mut self, out: &mut Vec<AlertAction>) {
        if let AlertState::Alerting { sustained: true, .. } = self.state {
            out.push(AlertAction::CancelSustained);
        }
        self.state = AlertState::Idle;
    }

    fn enter(&mut self, hit: &ZoneHit<'_>, now: Instant, out: &mut Vec<AlertAction>) {
        let zone = hit.zone;
        let emitted = self.emit_if_due(hit, now, out);
        self.state = AlertState::Alerting {
            zone_id: zone.id.clone(),
            risk: zone.risk_level,
            sustained: emitted && zone.risk_level == RiskLevel::High,
        };
    }

    fn re_alert(&mut self, hit: &ZoneHit<'_>, now: Instant, out: &mut Vec<AlertAction>) {
        let emitted = self.emit_if_due(hit, now, out);
        if emitted && hit.zone.risk_level == RiskLevel::High {
            if let AlertState::Alerting { sustained, .. } = &mut self.state {
                *sustained = true;
            }
        }
    }

    fn emit_if_due(&mut self, hit: &ZoneHit<'_>, now: Instant, out: &mut Vec<AlertAction>) -> bool {
        let zone = hit.zone;
        let throttled = matches!(
            &self.last_alert,
            Some(last)
                if last.zone_id == zone.id
                    && last.risk == zone.risk_level
                    && now.duration_since(last.at) < self.cfg.re_alert_interval
        );
        if throttled {
            return false;
        }
        out.push(AlertAction::Emit(notice_for(zone, hit.distance_m)));
        self.last_alert = Some(LastAlert {
            zone_id: zone.id.clone(),
            risk: zone.risk_level,
            at: now,
        });
        true
    }
}

// Alert copy per risk level. Only the priority and the vibration persistence
// are contractual; the wording is product text.
fn notice_for(zone: &HazardZone, distance_m: f64) -> AlertNotice {
    let place = zone.address.as_deref().unwrap_or(&zone.name);
    let (title, body, priority, vibration) = match zone.risk_level {
        RiskLevel::High => (
            format!("Flood alert: {}", zone.name),
            format!("You are inside a high-risk flood area near {place}. Move to higher ground now."),
            AlertPriority::Max,
            Vibration::Sustained,
        ),
        RiskLevel::Medium => (
            format!("Flood warning: {}", zone.name),
            format!("You are in a flood-prone area near {place}. Stay alert."),
            AlertPriority::Default,
            Vibration::Burst,
        ),
        RiskLevel::Low => (
            format!("Flood advisory: {}", zone.name),
            format!("Minor flood risk reported near {place}. Avoid waterlogged areas."),
            AlertPriority::Default,
            Vibration::Burst,
        ),
    };
    AlertNotice {
        zone_id: zone.id.clone(),
        zone_name: zone.name.clone(),
        risk: zone.risk_level,
        distance_m,
        title,
        body,
        priority,
        vibration,
    }
}
