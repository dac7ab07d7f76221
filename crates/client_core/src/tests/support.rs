//! Scripted collaborators shared by the client_core test modules.

use std::{collections::VecDeque, time::Duration};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{SubmissionId, SubmissionStatus, Team},
    protocol::{
        BoardEvent, LanguageEntry, SolutionSummary, SubmissionRecord, SubmitReply, SubmitRequest,
    },
};
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio_stream::wrappers::ReceiverStream;

use crate::{BoardEventStream, ClientEvent, ContestGateway, PushSubscriber};

/// Gateway double with scripted replies, call recorders and optional gates
/// that hold a call open until the test releases it.
pub(crate) struct ScriptedGateway {
    languages_replies: Mutex<VecDeque<Result<Vec<LanguageEntry>, String>>>,
    pub languages_calls: Mutex<u32>,
    languages_gate: Mutex<Option<oneshot::Receiver<()>>>,
    submit_replies: Mutex<VecDeque<Result<SubmitReply, String>>>,
    pub submit_requests: Mutex<Vec<SubmitRequest>>,
    submit_gate: Mutex<Option<oneshot::Receiver<()>>>,
    submission_replies: Mutex<VecDeque<Result<SubmissionRecord, String>>>,
    pub submission_fetches: Mutex<Vec<SubmissionId>>,
    submission_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            languages_replies: Mutex::new(VecDeque::new()),
            languages_calls: Mutex::new(0),
            languages_gate: Mutex::new(None),
            submit_replies: Mutex::new(VecDeque::new()),
            submit_requests: Mutex::new(Vec::new()),
            submit_gate: Mutex::new(None),
            submission_replies: Mutex::new(VecDeque::new()),
            submission_fetches: Mutex::new(Vec::new()),
            submission_gate: Mutex::new(None),
        }
    }

    pub async fn push_languages(&self, entries: Vec<LanguageEntry>) {
        self.languages_replies.lock().await.push_back(Ok(entries));
    }

    pub async fn push_languages_err(&self, message: &str) {
        self.languages_replies
            .lock()
            .await
            .push_back(Err(message.to_string()));
    }

    pub async fn push_submit(&self, reply: SubmitReply) {
        self.submit_replies.lock().await.push_back(Ok(reply));
    }

    pub async fn push_submit_err(&self, message: &str) {
        self.submit_replies
            .lock()
            .await
            .push_back(Err(message.to_string()));
    }

    pub async fn push_submission(&self, record: SubmissionRecord) {
        self.submission_replies.lock().await.push_back(Ok(record));
    }

    pub async fn push_submission_err(&self, message: &str) {
        self.submission_replies
            .lock()
            .await
            .push_back(Err(message.to_string()));
    }

    /// Makes the next `fetch_languages` call block until the returned
    /// sender fires (or is dropped).
    pub async fn gate_languages(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.languages_gate.lock().await = Some(rx);
        tx
    }

    pub async fn gate_submit(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.submit_gate.lock().await = Some(rx);
        tx
    }

    pub async fn gate_submission(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.submission_gate.lock().await = Some(rx);
        tx
    }
}

#[async_trait]
impl ContestGateway for ScriptedGateway {
    async fn fetch_languages(&self) -> Result<Vec<LanguageEntry>> {
        *self.languages_calls.lock().await += 1;
        // Pop before gating so concurrent calls consume replies in call order.
        let reply = self.languages_replies.lock().await.pop_front();
        // Release the gate mutex before awaiting so ungated calls proceed.
        let gate = self.languages_gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match reply {
            Some(Ok(entries)) => Ok(entries),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted languages reply")),
        }
    }

    async fn fetch_submission(&self, id: &SubmissionId) -> Result<SubmissionRecord> {
        self.submission_fetches.lock().await.push(id.clone());
        let reply = self.submission_replies.lock().await.pop_front();
        let gate = self.submission_gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match reply {
            Some(Ok(record)) => Ok(record),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted submission reply")),
        }
    }

    async fn submit_attempt(&self, request: SubmitRequest) -> Result<SubmitReply> {
        self.submit_requests.lock().await.push(request);
        let reply = self.submit_replies.lock().await.pop_front();
        let gate = self.submit_gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match reply {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted submit reply")),
        }
    }
}

/// Subscriber double: each scripted entry is either a live stream fed from
/// the returned sender or a connection failure.
pub(crate) struct ScriptedSubscriber {
    replies: Mutex<VecDeque<Result<mpsc::Receiver<BoardEvent>, String>>>,
    pub subscribe_calls: Mutex<u32>,
}

impl ScriptedSubscriber {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            subscribe_calls: Mutex::new(0),
        }
    }

    pub async fn push_stream(&self) -> mpsc::Sender<BoardEvent> {
        let (tx, rx) = mpsc::channel(16);
        self.replies.lock().await.push_back(Ok(rx));
        tx
    }

    pub async fn push_failure(&self, message: &str) {
        self.replies
            .lock()
            .await
            .push_back(Err(message.to_string()));
    }

    pub async fn calls(&self) -> u32 {
        *self.subscribe_calls.lock().await
    }
}

#[async_trait]
impl PushSubscriber for ScriptedSubscriber {
    async fn subscribe(&self) -> Result<BoardEventStream> {
        *self.subscribe_calls.lock().await += 1;
        match self.replies.lock().await.pop_front() {
            Some(Ok(rx)) => Ok(Box::pin(ReceiverStream::new(rx))),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted subscription")),
        }
    }
}

pub(crate) fn open_language(slug: &str) -> LanguageEntry {
    LanguageEntry {
        slug: slug.to_string(),
        name: slug.to_uppercase(),
        kind: Default::default(),
        team: None,
        available: true,
        solution: None,
        detail_link: None,
    }
}

pub(crate) fn closed_language(slug: &str) -> LanguageEntry {
    LanguageEntry {
        available: false,
        ..open_language(slug)
    }
}

pub(crate) fn claimed_language(slug: &str, team: Team, byte_size: u64) -> LanguageEntry {
    LanguageEntry {
        team: Some(team),
        solution: Some(SolutionSummary {
            submission_id: SubmissionId::new(format!("sol-{slug}")),
            owner: "rivals".to_string(),
            byte_size,
        }),
        ..open_language(slug)
    }
}

pub(crate) fn unknown_language(slug: &str) -> LanguageEntry {
    LanguageEntry {
        kind: shared::domain::LanguageKind::Unknown,
        available: false,
        ..open_language(slug)
    }
}

pub(crate) fn record(id: &SubmissionId, status: SubmissionStatus) -> SubmissionRecord {
    SubmissionRecord {
        id: id.clone(),
        status,
    }
}

pub(crate) fn events_channel() -> broadcast::Sender<ClientEvent> {
    broadcast::channel(64).0
}

/// Polls a recorder until it holds `want` items, with a hard timeout.
pub(crate) async fn wait_for_len<T>(recorder: &Mutex<Vec<T>>, want: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while recorder.lock().await.len() < want {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("recorder never reached the expected length");
}

pub(crate) async fn next_event(rx: &mut broadcast::Receiver<ClientEvent>) -> ClientEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for a client event")
        .expect("event channel closed")
}

/// Receives events until one matches, returning it.
pub(crate) async fn wait_for<F>(
    rx: &mut broadcast::Receiver<ClientEvent>,
    mut want: F,
) -> ClientEvent
where
    F: FnMut(&ClientEvent) -> bool,
{
    loop {
        let event = next_event(rx).await;
        if want(&event) {
            return event;
        }
    }
}
