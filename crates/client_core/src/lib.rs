//! Embeddable client for the language-claim contest board.
//!
//! The crate owns the client-side state of the contest: the language catalog
//! snapshot ([`CatalogStore`]), the submission attempt lifecycle
//! ([`SubmissionController`]) and the push-driven reconciliation loop
//! ([`ReconciliationChannel`]). Transport is abstracted behind the
//! [`ContestGateway`] and [`PushSubscriber`] traits; reference reqwest and
//! tokio-tungstenite implementations live in [`http`]. A presentation layer
//! embeds [`BoardClient`], subscribes to [`ClientEvent`]s and reads
//! snapshots; it never mutates contest state directly.

use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use shared::{
    domain::SubmissionId,
    protocol::{BoardEvent, LanguageEntry, SubmissionRecord, SubmitReply, SubmitRequest},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

pub mod catalog;
pub mod config;
pub mod feed;
pub mod http;
pub mod submission;

pub use catalog::{CatalogError, CatalogSnapshot, CatalogStore, TeamCellCounts};
pub use config::{load_config, ClientConfig, ConfigError};
pub use feed::{FeedStatus, ReconciliationChannel, DEFAULT_FEED_RETRY_INTERVAL};
pub use http::{HttpContestGateway, WsEventFeed};
pub use submission::{
    AttemptPayload, AttemptPhase, AttemptView, Outcome, OutcomeSeverity, SubmissionController,
};

/// Stream of push notifications handed out by a [`PushSubscriber`]. The
/// stream ending means the underlying transport closed.
pub type BoardEventStream = BoxStream<'static, BoardEvent>;

/// Pull-side contract to the contest server: full catalog reads, single
/// submission reads and attempt intake.
#[async_trait]
pub trait ContestGateway: Send + Sync {
    async fn fetch_languages(&self) -> Result<Vec<LanguageEntry>>;
    async fn fetch_submission(&self, id: &SubmissionId) -> Result<SubmissionRecord>;
    async fn submit_attempt(&self, request: SubmitRequest) -> Result<SubmitReply>;
}

pub struct MissingContestGateway;

#[async_trait]
impl ContestGateway for MissingContestGateway {
    async fn fetch_languages(&self) -> Result<Vec<LanguageEntry>> {
        Err(anyhow!("contest gateway is unavailable"))
    }

    async fn fetch_submission(&self, id: &SubmissionId) -> Result<SubmissionRecord> {
        Err(anyhow!("contest gateway is unavailable for submission {id}"))
    }

    async fn submit_attempt(&self, _request: SubmitRequest) -> Result<SubmitReply> {
        Err(anyhow!("contest gateway is unavailable"))
    }
}

/// Push-side contract. One `subscribe` call yields one live event stream;
/// reconnection policy belongs to the caller.
#[async_trait]
pub trait PushSubscriber: Send + Sync {
    async fn subscribe(&self) -> Result<BoardEventStream>;
}

pub struct MissingPushSubscriber;

#[async_trait]
impl PushSubscriber for MissingPushSubscriber {
    async fn subscribe(&self) -> Result<BoardEventStream> {
        Err(anyhow!("push feed is unavailable"))
    }
}

/// Broadcast to the embedding view layer. Consumers that fall behind miss
/// events; every payload is re-derivable from the owning component's
/// snapshot accessors.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A new catalog snapshot was published.
    CatalogUpdated,
    /// The submission attempt changed phase or content.
    AttemptChanged(AttemptView),
    /// The reconciliation feed connected or lost its transport.
    FeedStatusChanged(FeedStatus),
    /// A background pull failed; the affected snapshot is stale until the
    /// next push or retry.
    Error(String),
}

/// Wires the catalog store, the submission controller and the
/// reconciliation feed to one gateway/subscriber pair.
pub struct BoardClient {
    subscriber: Arc<dyn PushSubscriber>,
    catalog: Arc<CatalogStore>,
    submissions: Arc<SubmissionController>,
    feed: Mutex<Option<ReconciliationChannel>>,
    feed_retry_interval: Duration,
    events: broadcast::Sender<ClientEvent>,
}

impl BoardClient {
    pub fn new() -> Arc<Self> {
        Self::new_with_dependencies(
            Arc::new(MissingContestGateway),
            Arc::new(MissingPushSubscriber),
        )
    }

    /// Builds the reference HTTP + websocket stack for the configured server.
    pub fn from_config(config: &ClientConfig) -> Arc<Self> {
        let gateway = Arc::new(HttpContestGateway::from_config(config));
        let subscriber = Arc::new(WsEventFeed::from_config(config));
        Self::build(gateway, subscriber, config.feed_retry_interval)
    }

    pub fn new_with_dependencies(
        gateway: Arc<dyn ContestGateway>,
        subscriber: Arc<dyn PushSubscriber>,
    ) -> Arc<Self> {
        Self::build(gateway, subscriber, DEFAULT_FEED_RETRY_INTERVAL)
    }

    fn build(
        gateway: Arc<dyn ContestGateway>,
        subscriber: Arc<dyn PushSubscriber>,
        feed_retry_interval: Duration,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(1024);
        let catalog = CatalogStore::new(Arc::clone(&gateway), events.clone());
        let submissions = SubmissionController::new(gateway, events.clone());
        Arc::new(Self {
            subscriber,
            catalog,
            submissions,
            feed: Mutex::new(None),
            feed_retry_interval,
            events,
        })
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    pub fn submissions(&self) -> &Arc<SubmissionController> {
        &self.submissions
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Spawns the reconciliation feed and kicks the initial catalog pull.
    /// A failed initial pull is tolerated: the board starts empty and the
    /// next push refresh fills it.
    pub async fn start(&self) {
        {
            let mut feed = self.feed.lock().await;
            if feed.is_some() {
                debug!("board client already started");
                return;
            }
            *feed = Some(ReconciliationChannel::spawn(
                Arc::clone(&self.subscriber),
                Arc::clone(&self.catalog),
                Arc::clone(&self.submissions),
                self.feed_retry_interval,
                self.events.clone(),
            ));
        }
        info!("board client started");
        if let Err(err) = self.catalog.refresh().await {
            warn!(error = %err, "initial catalog pull failed, starting with an empty board");
            let _ = self.events.send(ClientEvent::Error(err.to_string()));
        }
    }

    /// Tears the reconciliation feed down. Catalog and attempt state stay
    /// readable; `start` may be called again.
    pub async fn shutdown(&self) {
        if let Some(feed) = self.feed.lock().await.take() {
            feed.shutdown();
            info!("board client stopped");
        }
    }

    pub async fn feed_status(&self) -> FeedStatus {
        match self.feed.lock().await.as_ref() {
            Some(feed) => feed.status().await,
            None => FeedStatus::Disconnected { retry_at: None },
        }
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
