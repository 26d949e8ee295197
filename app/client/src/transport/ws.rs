//! WebSocket transport.

use super::{ChannelHandle, Transport, TransportEvent};
use crate::{error::ChannelError, headers::HeaderSet};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{
    Message as WsMessage,
    client::IntoClientRequest,
    http::{HeaderName, HeaderValue},
};
use url::Url;

/// Carries one JSON text frame per payload over a WebSocket.
///
/// The opening handshake is bounded by the timeout.
#[derive(Debug, Clone, Copy)]
pub struct WebSocketTransport {
    timeout: Duration,
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl WebSocketTransport {
    /// A transport whose handshake gives up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// Map an http(s) agent URL onto ws(s).
pub fn websocket_url(endpoint: &Url) -> Url {
    let mut url = endpoint.clone();
    let scheme = match endpoint.scheme() {
        "http" => "ws",
        "https" => "wss",
        _ => return url,
    };
    // http(s) and ws(s) are both special schemes, so this cannot fail.
    let _ = url.set_scheme(scheme);
    url
}

impl Transport for WebSocketTransport {
    async fn open(&self, endpoint: &Url, headers: &HeaderSet) -> Result<ChannelHandle, ChannelError> {
        let url = websocket_url(endpoint);
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| ChannelError::Open(e.to_string()))?;
        for (name, value) in headers.iter() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ChannelError::Open(e.to_string()))?;
            let value = HeaderValue::from_str(value).map_err(|e| ChannelError::Open(e.to_string()))?;
            request.headers_mut().insert(name, value);
        }

        let handshake = tokio_tungstenite::connect_async(request);
        let (stream, _) = tokio::time::timeout(self.timeout, handshake)
            .await
            .map_err(|_| {
                ChannelError::Open(format!(
                    "websocket handshake with {url} timed out after {}s",
                    self.timeout.as_secs_f32()
                ))
            })?
            .map_err(|e| ChannelError::Open(e.to_string()))?;
        tracing::debug!("websocket connected to {url}");
        let (mut sink, mut source) = stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Value>();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    outbound = out_rx.recv() => {
                        let Some(payload) = outbound else {
                            let _ = sink.close().await;
                            break;
                        };
                        if let Err(e) = sink.send(WsMessage::Text(payload.to_string().into())).await {
                            let _ = in_tx.send(TransportEvent::Closed(Some(e.to_string())));
                            break;
                        }
                    }
                    inbound = source.next() => match inbound {
                        Some(Ok(WsMessage::Text(text))) => {
                            let event = match serde_json::from_str::<Value>(text.as_str()) {
                                Ok(frame) => TransportEvent::Frame(frame),
                                Err(e) => {
                                    tracing::warn!("invalid websocket frame: {e}");
                                    TransportEvent::unparsed(format!("invalid frame: {e}"), text.as_str())
                                }
                            };
                            if in_tx.send(event).is_err() {
                                break;
                            }
                        }
                        Some(Ok(WsMessage::Close(frame))) => {
                            let reason = frame
                                .map(|f| f.reason.as_str().to_owned())
                                .filter(|r| !r.is_empty());
                            let _ = in_tx.send(TransportEvent::Closed(reason));
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            let _ = in_tx.send(TransportEvent::Closed(Some(e.to_string())));
                            break;
                        }
                        None => {
                            let _ = in_tx.send(TransportEvent::Closed(None));
                            break;
                        }
                    },
                }
            }
        });

        Ok(ChannelHandle::new(out_tx, in_rx, task))
    }
}
