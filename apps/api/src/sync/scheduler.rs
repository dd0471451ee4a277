use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::sync::SyncPipeline;

/// Spawns the background loop that syncs every connected user once per
/// `period`. The first run happens one period after startup.
///
/// A tick that fires while the previous batch is still running is skipped, so
/// two batches never overlap.
pub fn spawn_sync_loop(
    pipeline: SyncPipeline,
    period: Duration,
    concurrency: usize,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "GitHub sync scheduled every {} minutes (concurrency {})",
            period.as_secs() / 60,
            concurrency
        );

        loop {
            ticker.tick().await;
            info!("Running scheduled GitHub sync for all users...");

            let today = Utc::now().date_naive();
            if let Err(e) = pipeline.sync_all(today, concurrency).await {
                error!("Scheduled sync failed: {e}");
            }
        }
    })
}
