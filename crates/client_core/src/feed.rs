//! Push reconciliation loop: one long-lived subscription that turns board
//! events into catalog refreshes and submission pulls.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use futures::StreamExt;
use shared::protocol::BoardEvent;
use tokio::{
    sync::{broadcast, RwLock},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    catalog::CatalogStore, submission::SubmissionController, ClientEvent, PushSubscriber,
};

pub const DEFAULT_FEED_RETRY_INTERVAL: Duration = Duration::from_millis(1000);

/// Availability of the push feed. Degraded availability is a state, not an
/// error: while disconnected the board simply goes stale until the next
/// successful subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Disconnected { retry_at: Option<Instant> },
    Connected,
}

impl FeedStatus {
    pub fn is_connected(self) -> bool {
        matches!(self, FeedStatus::Connected)
    }
}

/// Owns the background subscription task. Dropping the channel or calling
/// [`ReconciliationChannel::shutdown`] aborts it.
pub struct ReconciliationChannel {
    status: Arc<RwLock<FeedStatus>>,
    task: JoinHandle<()>,
}

impl ReconciliationChannel {
    /// Spawns the subscribe-dispatch-retry loop. If `subscribe` fails or an
    /// established stream ends, the loop waits `retry_interval` and tries
    /// again indefinitely.
    pub fn spawn(
        subscriber: Arc<dyn PushSubscriber>,
        catalog: Arc<CatalogStore>,
        submissions: Arc<SubmissionController>,
        retry_interval: Duration,
        events: broadcast::Sender<ClientEvent>,
    ) -> Self {
        let status = Arc::new(RwLock::new(FeedStatus::Disconnected { retry_at: None }));
        let task = tokio::spawn(run_feed(
            subscriber,
            catalog,
            submissions,
            retry_interval,
            Arc::clone(&status),
            events,
        ));
        Self { status, task }
    }

    pub async fn status(&self) -> FeedStatus {
        *self.status.read().await
    }

    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for ReconciliationChannel {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_feed(
    subscriber: Arc<dyn PushSubscriber>,
    catalog: Arc<CatalogStore>,
    submissions: Arc<SubmissionController>,
    retry_interval: Duration,
    status: Arc<RwLock<FeedStatus>>,
    events: broadcast::Sender<ClientEvent>,
) {
    loop {
        match subscriber.subscribe().await {
            Ok(mut stream) => {
                set_status(&status, &events, FeedStatus::Connected).await;
                info!("push feed connected");
                while let Some(event) = stream.next().await {
                    dispatch(event, &catalog, &submissions, &events).await;
                }
                warn!("push feed stream ended, reconnecting");
            }
            Err(err) => {
                debug!(error = %err, "push feed unavailable");
            }
        }

        let retry_at = Instant::now() + retry_interval;
        set_status(
            &status,
            &events,
            FeedStatus::Disconnected {
                retry_at: Some(retry_at),
            },
        )
        .await;
        tokio::time::sleep(retry_interval).await;
    }
}

async fn dispatch(
    event: BoardEvent,
    catalog: &Arc<CatalogStore>,
    submissions: &Arc<SubmissionController>,
    events: &broadcast::Sender<ClientEvent>,
) {
    match event {
        BoardEvent::SubmissionUpdated { id } => {
            debug!(submission = %id, "push: submission updated");
            submissions.reconcile(&id).await;
        }
        BoardEvent::CatalogUpdated => {
            debug!("push: catalog updated");
            if let Err(err) = catalog.refresh().await {
                warn!(error = %err, "catalog refresh after push failed");
                let _ = events.send(ClientEvent::Error(err.to_string()));
            }
        }
    }
}

/// Writes the new status and broadcasts a change event when the
/// connected/disconnected side flips. Repeated disconnects only move
/// `retry_at`, without spamming subscribers.
async fn set_status(
    status: &RwLock<FeedStatus>,
    events: &broadcast::Sender<ClientEvent>,
    next: FeedStatus,
) {
    let mut slot = status.write().await;
    let flipped = slot.is_connected() != next.is_connected();
    *slot = next;
    if flipped {
        let _ = events.send(ClientEvent::FeedStatusChanged(next));
    }
}

#[cfg(test)]
#[path = "tests/feed_tests.rs"]
mod tests;
