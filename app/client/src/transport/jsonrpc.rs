//! JSON-RPC over HTTP, with server-sent events for streaming replies.

use super::{ChannelHandle, SseDecoder, Transport, TransportEvent};
use crate::{error::ChannelError, headers::HeaderSet};
use futures_util::StreamExt;
use protocol::rpc::METHOD_STREAM;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use url::Url;

/// POSTs each payload to the agent URL.
///
/// Payloads are processed one at a time, so inbound frames keep request
/// order. Streaming requests are not bounded by the timeout.
#[derive(Debug, Clone)]
pub struct JsonRpcTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for JsonRpcTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl JsonRpcTransport {
    /// A transport with its own HTTP client.
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Reuse an existing HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

impl Transport for JsonRpcTransport {
    async fn open(&self, endpoint: &Url, headers: &HeaderSet) -> Result<ChannelHandle, ChannelError> {
        let headers = headers
            .to_header_map()
            .map_err(|e| ChannelError::Open(e.to_string()))?;
        let exchange = Exchange {
            client: self.client.clone(),
            endpoint: endpoint.clone(),
            headers,
            timeout: self.timeout,
        };

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Value>();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            while let Some(payload) = out_rx.recv().await {
                if let Err(failure) = exchange.post(&payload, &in_tx).await {
                    if in_tx.send(failure).is_err() {
                        return;
                    }
                }
            }
            let _ = in_tx.send(TransportEvent::Closed(None));
        });

        tracing::debug!("json-rpc channel ready for {endpoint}");
        Ok(ChannelHandle::new(out_tx, in_rx, task))
    }
}

struct Exchange {
    client: reqwest::Client,
    endpoint: Url,
    headers: HeaderMap,
    timeout: Duration,
}

impl Exchange {
    /// Deliver one payload and forward every frame of the reply.
    ///
    /// A failure comes back as the event to report, carrying the reply text
    /// when the agent answered.
    async fn post(
        &self,
        payload: &Value,
        events: &UnboundedSender<TransportEvent>,
    ) -> Result<(), TransportEvent> {
        let streaming = payload.get("method").and_then(Value::as_str) == Some(METHOD_STREAM);
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .header(ACCEPT, "application/json, text/event-stream")
            .json(payload);
        if !streaming {
            request = request.timeout(self.timeout);
        }
        let response = request.send().await.map_err(failed)?;

        let status = response.status();
        let is_sse = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/event-stream"));

        if is_sse {
            let mut decoder = SseDecoder::default();
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(failed)?;
                for data in decoder.push(&chunk) {
                    forward(data, events);
                }
            }
            if let Some(data) = decoder.finish() {
                forward(data, events);
            }
            return Ok(());
        }

        let text = response.text().await.map_err(failed)?;
        match serde_json::from_str::<Value>(&text) {
            Ok(frame) => {
                let _ = events.send(TransportEvent::Frame(frame));
                Ok(())
            }
            Err(_) if !status.is_success() => {
                tracing::warn!("agent answered HTTP {status}");
                Err(TransportEvent::unparsed(format!("HTTP {status}"), text))
            }
            Err(e) => {
                tracing::warn!("invalid JSON reply: {e}");
                Err(TransportEvent::unparsed(format!("invalid JSON reply: {e}"), text))
            }
        }
    }
}

fn failed(e: reqwest::Error) -> TransportEvent {
    tracing::warn!("agent request failed: {e}");
    TransportEvent::error(e.to_string())
}

fn forward(data: String, events: &UnboundedSender<TransportEvent>) {
    let event = match serde_json::from_str::<Value>(&data) {
        Ok(frame) => TransportEvent::Frame(frame),
        Err(e) => {
            tracing::warn!("invalid event data: {e}");
            TransportEvent::unparsed(format!("invalid event data: {e}"), data)
        }
    };
    let _ = events.send(event);
}
