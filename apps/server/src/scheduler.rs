//! Background refresh of every stored account.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use pocketwise_core::sync::{
    SyncScope, SyncServiceTrait, INITIAL_REFRESH_DELAY_SECS, REFRESH_INTERVAL_JITTER_SECS,
};

/// Interval plus a jitter of up to [`REFRESH_INTERVAL_JITTER_SECS`], never below one second.
pub fn next_delay(interval: Duration, jitter_ms: u64) -> Duration {
    let jitter_bound = REFRESH_INTERVAL_JITTER_SECS.saturating_mul(1000);
    let jitter = Duration::from_millis(jitter_ms.min(jitter_bound));
    interval.saturating_add(jitter).max(Duration::from_secs(1))
}

fn random_jitter_ms() -> u64 {
    let bound = REFRESH_INTERVAL_JITTER_SECS.saturating_mul(1000);
    if bound == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..=bound)
}

/// Starts the periodic all-accounts refresh. `None` disables it.
///
/// A failed run is logged and retried on the next tick; the loop never exits
/// on its own and stops when the returned task is aborted.
pub fn spawn_refresh_loop(
    sync_service: Arc<dyn SyncServiceTrait>,
    interval: Option<Duration>,
) -> Option<JoinHandle<()>> {
    let Some(interval) = interval else {
        info!("Scheduled refresh disabled");
        return None;
    };
    info!(
        "Scheduled refresh every {}s (first run in {}s)",
        interval.as_secs(),
        INITIAL_REFRESH_DELAY_SECS
    );

    Some(tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(INITIAL_REFRESH_DELAY_SECS)).await;
        loop {
            match sync_service.run_sync(SyncScope::AllAccounts).await {
                Ok(result) if result.is_partial() => warn!(
                    "Scheduled refresh completed with failures: {} account(s), {} transaction(s) failed",
                    result.accounts_failed, result.transactions_failed
                ),
                Ok(result) => info!(
                    "Scheduled refresh inserted {} transaction(s) across {} account(s)",
                    result.transactions_inserted, result.accounts_updated
                ),
                Err(e) => warn!("Scheduled refresh failed: {}", e),
            }
            tokio::time::sleep(next_delay(interval, random_jitter_ms())).await;
        }
    }))
}
