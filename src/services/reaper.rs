//! Background eviction of members that stopped polling.

use std::time::{Duration, Instant};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    config::ConfigError,
    error::ServiceError,
    services::room_service,
    state::SharedState,
};

/// How often the reaper sweeps when nothing else is configured.
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(10);
/// Inactivity after which a member is evicted when nothing else is configured.
pub const DEFAULT_PRESENCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Sweep cadence and inactivity threshold.
///
/// The interval is always shorter than the timeout, otherwise a member could
/// stay past its timeout for almost a whole extra interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaperConfig {
    interval: Duration,
    timeout: Duration,
}

impl ReaperConfig {
    /// Validate a sweep interval against the presence timeout.
    pub fn new(interval: Duration, timeout: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroDuration {
                name: "REAP_INTERVAL_MS",
            });
        }
        if interval >= timeout {
            return Err(ConfigError::UnsafeReapTiming { interval, timeout });
        }
        Ok(Self { interval, timeout })
    }

    /// Time between two sweeps.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Inactivity threshold.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REAP_INTERVAL,
            timeout: DEFAULT_PRESENCE_TIMEOUT,
        }
    }
}

/// Tally of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Memberships removed.
    pub evicted: usize,
    /// Rooms deleted because their last member was evicted.
    pub rooms_deleted: usize,
    /// Rooms whose host was evicted and replaced.
    pub hosts_reassigned: usize,
    /// Pairs with nothing left to evict, or seen again mid-sweep.
    pub skipped: usize,
    /// Pairs kept for the next sweep after an error.
    pub failed: usize,
}

/// Evict every member whose last activity is older than `timeout` at `now`.
///
/// Rooms are handled one at a time under their write guard. A failure on one
/// pair never stops the sweep.
pub async fn sweep(state: &SharedState, timeout: Duration, now: Instant) -> SweepReport {
    let mut report = SweepReport::default();

    for (code, member) in state.presence().inactive_since(timeout, now) {
        match room_service::evict_inactive(state, &code, &member, timeout, now).await {
            Ok(Some(outcome)) => {
                report.evicted += 1;
                if outcome.room_deleted {
                    report.rooms_deleted += 1;
                }
                if outcome.new_host.is_some() {
                    report.hosts_reassigned += 1;
                }
                info!(
                    room = %code,
                    member = %member,
                    room_deleted = outcome.room_deleted,
                    new_host = ?outcome.new_host,
                    "evicted inactive member"
                );
            }
            Ok(None) => {
                report.skipped += 1;
                debug!(room = %code, member = %member, "member active again; not evicted");
            }
            Err(ServiceError::NotFound(reason)) => {
                state.presence().forget(&code, &member);
                report.skipped += 1;
                debug!(room = %code, member = %member, %reason, "nothing left to evict");
            }
            Err(err) => {
                report.failed += 1;
                warn!(
                    room = %code,
                    member = %member,
                    error = %err,
                    "failed to evict inactive member; retrying on next sweep"
                );
            }
        }
    }

    report
}

/// Running reaper task.
#[derive(Debug)]
pub struct ReaperHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Start sweeping every `config.interval()` until [`ReaperHandle::shutdown`].
    pub fn spawn(state: SharedState, config: ReaperConfig) -> Self {
        let (stop, mut stopped) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(config.interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; nobody can be stale yet.
            ticker.tick().await;

            info!(
                interval_ms = config.interval().as_millis() as u64,
                timeout_ms = config.timeout().as_millis() as u64,
                "membership reaper started"
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = sweep(&state, config.timeout(), Instant::now()).await;
                        if report != SweepReport::default() {
                            info!(?report, "reaper sweep finished");
                        }
                    }
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("membership reaper stopped");
        });

        Self { stop, task }
    }

    /// Signal the loop to stop and wait for the in-flight sweep to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(err) = self.task.await {
            warn!(error = %err, "membership reaper task ended abnormally");
        }
    }
}
