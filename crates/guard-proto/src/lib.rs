pub mod alert;
pub mod zone;

pub use alert::{AlertNotice, AlertPriority, Vibration};
pub use zone::{Coordinate, HazardZone, RiskLevel};
