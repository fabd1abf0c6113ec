use crate::config::Config;
use crate::models::ScanReport;
use crate::scanner::{ScanEngine, ScanRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// How often the poller scans and how long each scan may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub deadline: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            deadline: Duration::from_secs(20),
        }
    }
}

impl PollSchedule {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.scan_interval,
            deadline: config.scan_deadline,
        }
    }
}

/// Run `request` on every tick of `schedule`, publishing each report on
/// `publisher` until `shutdown` is cancelled or nobody is listening.
/// Cancellation also interrupts a scan in progress.
///
/// The first scan runs immediately. A slow scan delays the next tick rather
/// than queueing a burst of catch-up scans.
pub async fn start_polling(
    engine: Arc<ScanEngine>,
    request: ScanRequest,
    schedule: PollSchedule,
    publisher: watch::Sender<Option<ScanReport>>,
    shutdown: CancellationToken,
) {
    info!(
        "Starting {} polling every {:?} (deadline {:?})",
        request.mode, schedule.interval, schedule.deadline
    );

    let request = request.with_deadline(schedule.deadline);
    let mut ticker = interval(schedule.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = tokio::select! {
                    report = engine.scan(&request) => report,
                    _ = shutdown.cancelled() => {
                        info!("Shutting down scan polling, abandoning scan in progress");
                        break;
                    }
                };
                debug!("Publishing scan with {} events", report.events.len());

                if publisher.send(Some(report)).is_err() {
                    info!("No subscribers left, stopping scan polling");
                    break;
                }
            }
            _ = shutdown.cancelled() => {
                info!("Shutting down scan polling");
                break;
            }
        }
    }
}
