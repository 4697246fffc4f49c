pub mod alert;
pub mod doctor;
pub mod geo;
pub mod monitor;
pub mod notify;
pub mod position;
pub mod proximity;

pub use alert::{AlertAction, AlertConfig, AlertEngine, AlertState};
pub use monitor::{Monitor, MonitorConfig, MonitorError};
pub use notify::{Notifier, NotifyError};
pub use position::{
    Position, PositionConfig, PositionError, PositionFeed, PositionFilter, PositionSource,
};
pub use proximity::{nearest_hazard, ZoneHit};
