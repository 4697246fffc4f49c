use guard_proto::AlertNotice;

#[derive(Debug, thiserror::Error)]
#[error("notification dispatch failed: {0}")]
pub struct NotifyError(pub String);

/// Platform alert dispatch. Fire-and-forget from the engine's perspective:
/// delivery failures are logged by the monitor and never roll back a state
/// transition.
pub trait Notifier {
    fn emit(&mut self, notice: &AlertNotice) -> Result<(), NotifyError>;

    /// Stops any live sustained vibration pattern. Must be idempotent: safe
    /// to call when nothing is active.
    fn cancel_sustained(&mut self);
}
