//! Reference transport implementations: reqwest against the contest REST
//! endpoints and tokio-tungstenite against the event websocket.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::{
    domain::SubmissionId,
    protocol::{BoardEvent, LanguageEntry, SubmissionRecord, SubmitPayload, SubmitReply, SubmitRequest},
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{info, warn};

use crate::{BoardEventStream, ClientConfig, ContestGateway, PushSubscriber};

/// Pull gateway over the contest's REST surface. Wire field names follow
/// the server (`_id`, `type`, `user`, `size`, `link`).
pub struct HttpContestGateway {
    http: Client,
    server_url: String,
    contest_id: u32,
}

impl HttpContestGateway {
    pub fn new(server_url: impl Into<String>, contest_id: u32) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into(),
            contest_id,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.server_url.clone(), config.contest_id)
    }

    fn contest_url(&self, tail: &str) -> String {
        format!("{}/contests/{}/{tail}", self.server_url, self.contest_id)
    }
}

/// Intake body. Exactly one of `code` and `file` is present; file bytes
/// travel base64-encoded inside the JSON.
#[derive(Debug, Serialize)]
struct SubmitHttpBody {
    language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
}

/// Intake reply: an id on acceptance, an in-band `error` on policy refusal.
#[derive(Debug, Deserialize)]
struct SubmitHttpReply {
    #[serde(rename = "_id", default)]
    id: Option<SubmissionId>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl ContestGateway for HttpContestGateway {
    async fn fetch_languages(&self) -> Result<Vec<LanguageEntry>> {
        let res = self
            .http
            .get(self.contest_url("languages"))
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    async fn fetch_submission(&self, id: &SubmissionId) -> Result<SubmissionRecord> {
        let res = self
            .http
            .get(self.contest_url("submission"))
            .query(&[("_id", id.as_str())])
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    async fn submit_attempt(&self, request: SubmitRequest) -> Result<SubmitReply> {
        let body = match request.payload {
            SubmitPayload::Code(code) => SubmitHttpBody {
                language: request.language,
                code: Some(code),
                file: None,
            },
            SubmitPayload::File(bytes) => SubmitHttpBody {
                language: request.language,
                code: None,
                file: Some(STANDARD.encode(bytes)),
            },
        };
        let res = self
            .http
            .post(self.contest_url("submission"))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let reply: SubmitHttpReply = res.json().await?;
        match (reply.id, reply.error) {
            (_, Some(message)) => Ok(SubmitReply::Rejected { message }),
            (Some(id), None) => Ok(SubmitReply::Accepted { id }),
            (None, None) => Err(anyhow!("submission intake replied without id or error")),
        }
    }
}

/// Event feed over the contest websocket. Each `subscribe` opens one
/// connection; the returned stream ends when the socket closes, and the
/// caller decides whether to reconnect.
pub struct WsEventFeed {
    server_url: String,
    contest_id: u32,
}

impl WsEventFeed {
    pub fn new(server_url: impl Into<String>, contest_id: u32) -> Self {
        Self {
            server_url: server_url.into(),
            contest_id,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.server_url.clone(), config.contest_id)
    }

    fn events_url(&self) -> Result<String> {
        let ws_base = if self.server_url.starts_with("https://") {
            self.server_url.replacen("https://", "wss://", 1)
        } else if self.server_url.starts_with("http://") {
            self.server_url.replacen("http://", "ws://", 1)
        } else {
            return Err(anyhow!("server url must start with http:// or https://"));
        };
        Ok(format!("{ws_base}/contests/{}/events", self.contest_id))
    }
}

#[async_trait]
impl PushSubscriber for WsEventFeed {
    async fn subscribe(&self) -> Result<BoardEventStream> {
        let url = self.events_url()?;
        let (ws_stream, _) = connect_async(&url)
            .await
            .with_context(|| format!("failed to connect event feed: {url}"))?;
        info!(url = %url, "event feed websocket connected");
        let (_, mut ws_reader) = ws_stream.split();

        let (tx, rx) = mpsc::channel(256);
        tokio::spawn(async move {
            while let Some(msg) = ws_reader.next().await {
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<BoardEvent>(&text) {
                        Ok(event) => {
                            if tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        Err(err) => {
                            warn!(error = %err, "skipping malformed event frame");
                        }
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        warn!(error = %err, "event feed receive failed");
                        break;
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
