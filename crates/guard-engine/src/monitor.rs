use std::time::Duration;

use guard_zones::{FetchError, ZoneCache, ZoneDirectory};
use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::alert::{AlertAction, AlertConfig, AlertEngine};
use crate::notify::Notifier;
use crate::position::{Position, PositionError, PositionFeed};
use crate::proximity;

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Distance below which a position counts as inside a zone.
    pub threshold_m: f64,
    pub re_alert_interval_s: u64,
    pub refresh_interval_s: u64,
}

impl MonitorConfig {
    pub fn re_alert_interval(&self) -> Duration {
        Duration::from_secs(self.re_alert_interval_s)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("location access denied; monitoring cannot continue")]
    PermissionDenied,
}

/// Orchestrates the pipeline: position updates and completed zone refreshes
/// both trigger an evaluate-then-transition step against the latest known
/// position and the latest committed snapshot. Steps are serialized by the
/// single select loop, so two triggers can never interleave; a refresh runs
/// as a background task and therefore never delays evaluation against the
/// previous snapshot.
pub struct Monitor<D, N> {
    cfg: MonitorConfig,
    cache: ZoneCache<D>,
    feed: PositionFeed,
    notifier: N,
}

impl<D, N> Monitor<D, N>
where
    D: ZoneDirectory + Clone + Send + Sync + 'static,
    N: Notifier,
{
    pub fn new(cfg: MonitorConfig, cache: ZoneCache<D>, feed: PositionFeed, notifier: N) -> Self {
        Self { cfg, cache, feed, notifier }
    }

    /// Runs until `shutdown` fires, the position stream ends, or position
    /// access is denied. On any exit path the session is forced to idle,
    /// live feedback is cancelled without a final alert, and every timer and
    /// task is released.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), MonitorError> {
        let Monitor { cfg, cache, mut feed, mut notifier } = self;

        let mut engine = AlertEngine::new(AlertConfig {
            re_alert_interval: cfg.re_alert_interval(),
        });
        let mut last_position: Option<Position> = None;

        // Position reads run in their own task so a slow serial line cannot
        // be cancelled mid-sentence by other triggers.
        let (pos_tx, mut pos_rx) = mpsc::channel::<Result<Position, PositionError>>(8);
        let position_task = tokio::spawn(async move {
            loop {
                let res = feed.next().await;
                let terminal = matches!(
                    res,
                    Err(PositionError::PermissionDenied) | Err(PositionError::Closed)
                );
                let retriable = !terminal && res.is_err();
                if pos_tx.send(res).await.is_err() || terminal {
                    break;
                }
                if retriable {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        });

        // First tick is immediate: one eager fetch at monitor start.
        let mut ticker = tokio::time::interval(cfg.refresh_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let (refresh_tx, mut refresh_rx) = mpsc::channel::<Result<(), FetchError>>(1);
        let mut refresh_inflight = false;
        let mut refresh_task: Option<JoinHandle<()>> = None;

        info!("monitor: started (threshold {}m)", cfg.threshold_m);

        let outcome = loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("monitor: stop requested");
                    break Ok(());
                }

                received = pos_rx.recv() => match received {
                    None | Some(Err(PositionError::Closed)) => {
                        info!("monitor: position stream ended");
                        break Ok(());
                    }
                    Some(Err(PositionError::PermissionDenied)) => {
                        warn!("monitor: position access denied");
                        break Err(MonitorError::PermissionDenied);
                    }
                    Some(Err(e)) => warn!("monitor: position source error: {e}"),
                    Some(Ok(pos)) => {
                        last_position = Some(pos);
                        step(&cfg, &cache, &mut engine, &mut notifier, last_position.as_ref());
                    }
                },

                // an in-flight refresh is never restarted by a new tick
                _ = ticker.tick(), if !refresh_inflight => {
                    refresh_inflight = true;
                    let cache = cache.clone();
                    let tx = refresh_tx.clone();
                    refresh_task = Some(tokio::spawn(async move {
                        let _ = tx.send(cache.refresh().await).await;
                    }));
                }

                completed = refresh_rx.recv() => {
                    refresh_inflight = false;
                    refresh_task = None;
                    match completed {
                        Some(Ok(())) => {
                            step(&cfg, &cache, &mut engine, &mut notifier, last_position.as_ref());
                        }
                        Some(Err(e)) => {
                            warn!("monitor: zone refresh failed, keeping previous snapshot: {e}");
                        }
                        None => {}
                    }
                }
            }
        };

        // Scoped teardown: no timers, tasks or feedback survive a stop.
        position_task.abort();
        if let Some(h) = refresh_task.take() {
            h.abort();
        }
        apply(&mut notifier, engine.reset());

        outcome
    }
}

fn step<D: ZoneDirectory, N: Notifier>(
    cfg: &MonitorConfig,
    cache: &ZoneCache<D>,
    engine: &mut AlertEngine,
    notifier: &mut N,
    position: Option<&Position>,
) {
    let Some(pos) = position else { return };
    let snapshot = cache.current();
    let hit = proximity::nearest_hazard(pos, &snapshot.zones, cfg.threshold_m);
    if let Some(h) = &hit {
        debug!(zone = %h.zone.name, distance_m = h.distance_m as i64, "monitor: nearest hazard");
    }
    let now = tokio::time::Instant::now().into_std();
    let actions = engine.observe(hit.as_ref(), now);
    apply(notifier, actions);
}

fn apply<N: Notifier>(notifier: &mut N, actions: Vec<AlertAction>) {
    for action in actions {
        match action {
            AlertAction::Emit(notice) => {
                // failure is logged only; the session keeps its transition
                if let Err(e) = notifier.emit(&notice) {
                    warn!("monitor: alert dispatch failed: {e}");
                }
            }
            AlertAction::CancelSustained => notifier.cancel_sustained(),
        }
    }
}
