use guard_engine::{Notifier, NotifyError};
use guard_proto::{AlertNotice, Vibration};
use tracing::info;

/// Notifier backend that writes each notice as one JSON line on stdout plus
/// a structured log event, so a supervising process (or a person watching the
/// terminal) can forward alerts to the platform's notification service.
#[derive(Debug, Default)]
pub struct LogNotifier {
    sustained_active: bool,
}

impl Notifier for LogNotifier {
    fn emit(&mut self, notice: &AlertNotice) -> Result<(), NotifyError> {
        let line = serde_json::to_string(notice).map_err(|e| NotifyError(e.to_string()))?;
        println!("{line}");
        info!(
            zone = %notice.zone_name,
            risk = notice.risk.as_str(),
            distance_m = notice.distance_m as i64,
            priority = ?notice.priority,
            "alert: {}", notice.title
        );
        if notice.vibration == Vibration::Sustained {
            self.sustained_active = true;
        }
        Ok(())
    }

    fn cancel_sustained(&mut self) {
        if self.sustained_active {
            self.sustained_active = false;
            info!("alert: sustained feedback cancelled");
        }
    }
}
