//! Shared fixtures: in-process agent servers and an in-memory transport.

#![allow(dead_code)]

use axum::{Json, Router, routing::get};
use inspector_client::{ChannelError, ChannelHandle, HeaderSet, Transport, TransportEvent};
use serde_json::{Value, json};
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};
use tokio::{
    net::TcpListener,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
};
use url::Url;

/// A compliant card advertising `url`.
pub fn card_json(url: &str, streaming: bool) -> Value {
    json!({
        "name": "Test Agent",
        "description": "An agent for testing.",
        "url": url,
        "version": "1.0.0",
        "capabilities": {"streaming": streaming},
        "defaultInputModes": ["text/plain"],
        "defaultOutputModes": ["text/plain"],
        "skills": [{"id": "echo", "name": "Echo"}]
    })
}

/// Bind an ephemeral local port.
pub async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Serve `app` on an already bound listener.
pub fn serve(listener: TcpListener, app: Router) {
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

/// Serve `card` at the well-known path and return the base URL.
pub async fn card_server(card: impl FnOnce(&str) -> Value) -> String {
    let (listener, addr) = bind().await;
    let base = format!("http://{addr}");
    let body = card(&format!("{base}/a2a"));
    let app = Router::new().route(
        "/.well-known/agent-card.json",
        get(move || async move { Json(body) }),
    );
    serve(listener, app);
    base
}

/// A base URL nothing listens on.
pub async fn unreachable_url() -> String {
    let (listener, addr) = bind().await;
    drop(listener);
    format!("http://{addr}")
}

/// The test's end of a [`FakeTransport`] channel.
pub struct Peer {
    /// Where the channel was opened.
    pub endpoint: Url,
    /// Headers sent with the handshake.
    pub headers: HeaderSet,
    /// Payloads the client sent.
    pub outbound: UnboundedReceiver<Value>,
    /// Events to deliver to the client.
    pub inbound: UnboundedSender<TransportEvent>,
}

impl Peer {
    /// Deliver one frame.
    pub fn reply(&self, frame: Value) {
        self.inbound.send(TransportEvent::Frame(frame)).unwrap();
    }
}

/// In-memory transport handing each opened channel to the test.
#[derive(Clone, Default)]
pub struct FakeTransport {
    peers: Arc<Mutex<Vec<Peer>>>,
    refuse: bool,
}

impl FakeTransport {
    /// A transport whose channels never open.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    /// Number of channels opened so far.
    pub fn opened(&self) -> usize {
        self.peers.lock().unwrap().len()
    }

    /// Take the most recently opened channel.
    pub fn take_peer(&self) -> Peer {
        self.peers.lock().unwrap().pop().expect("no channel opened")
    }
}

impl Transport for FakeTransport {
    async fn open(&self, endpoint: &Url, headers: &HeaderSet) -> Result<ChannelHandle, ChannelError> {
        if self.refuse {
            return Err(ChannelError::Open("connection refused".into()));
        }
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        self.peers.lock().unwrap().push(Peer {
            endpoint: endpoint.clone(),
            headers: headers.clone(),
            outbound: out_rx,
            inbound: in_tx,
        });
        Ok(ChannelHandle::new(out_tx, in_rx, tokio::spawn(async {})))
    }
}
