use serde::{Deserialize, Serialize};

use crate::zone::RiskLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertPriority {
    Default,
    Max,
}

/// Burst is a one-off pattern; Sustained keeps going until explicitly
/// cancelled by the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vibration {
    Burst,
    Sustained,
}

/// One notification handed to the platform notifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertNotice {
    pub zone_id: String,
    pub zone_name: String,
    pub risk: RiskLevel,
    pub distance_m: f64,
    pub title: String,
    pub body: String,
    pub priority: AlertPriority,
    pub vibration: Vibration,
}
