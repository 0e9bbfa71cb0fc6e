use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration as TokioDuration};
use tracing::{error, info};

use super::handle::FeedRelayHandle;

/// Start the periodic feed scheduler
///
/// Runs a pass immediately, then once every `interval_secs`. A failed pass is
/// logged and the next one runs on schedule.
pub fn start_scheduler(handle: FeedRelayHandle, interval_secs: u64) -> JoinHandle<()> {
    let interval = TokioDuration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        loop {
            match handle.run_pass().await {
                Ok(report) => {
                    info!(
                        events = report.events_found,
                        prepared = report.prepared,
                        delivered = report.delivered,
                        failed = report.failed,
                        "Feed pass finished"
                    );
                }
                Err(e) => {
                    error!("Failed to process feed: {}", e);
                }
            }

            info!("Next feed pass in {} seconds", interval.as_secs());
            sleep(interval).await;
        }
    })
}
