//! In-memory connector for exercising the connection lifecycle in tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::{BoxFuture, Connector, Transport};
use crate::error::{Result, VcpError};

/// Something observable that happened on the mock connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Connect,
    Sent(String),
    Frame(String),
    Closed,
}

#[derive(Default)]
struct Log {
    events: Vec<Event>,
    connects: Vec<Instant>,
}

/// Remote end of one accepted mock connection.
///
/// Dropping the peer closes the connection from the remote side.
pub(crate) struct MockPeer {
    inbound: mpsc::UnboundedSender<Result<String>>,
    outbound: mpsc::UnboundedReceiver<String>,
}

impl MockPeer {
    /// Push a text message towards the client.
    pub(crate) fn deliver(&self, text: &str) {
        let _ = self.inbound.send(Ok(text.to_string()));
    }

    /// Make the client's next receive fail.
    pub(crate) fn fail(&self) {
        let _ = self
            .inbound
            .send(Err(VcpError::Io(std::io::ErrorKind::ConnectionReset.into())));
    }

    /// Wait for the first message the client sends on this connection.
    pub(crate) async fn wait_for_handshake(&mut self) -> Option<String> {
        self.outbound.recv().await
    }
}

pub(crate) struct MockConnector {
    accept: AtomicBool,
    hang: AtomicBool,
    log: Arc<Mutex<Log>>,
    peers: mpsc::UnboundedSender<MockPeer>,
}

impl MockConnector {
    /// Connector that accepts every attempt; accepted peers arrive on the
    /// returned channel.
    pub(crate) fn accepting() -> (Arc<Self>, mpsc::UnboundedReceiver<MockPeer>) {
        Self::with_accept(true)
    }

    /// Connector that refuses every attempt.
    pub(crate) fn refusing() -> (Arc<Self>, mpsc::UnboundedReceiver<MockPeer>) {
        Self::with_accept(false)
    }

    /// Connector whose attempts never complete, like a server that accepts
    /// TCP but never answers the upgrade.
    pub(crate) fn hanging() -> (Arc<Self>, mpsc::UnboundedReceiver<MockPeer>) {
        let (connector, peers) = Self::with_accept(false);
        connector.hang.store(true, Ordering::SeqCst);
        (connector, peers)
    }

    fn with_accept(accept: bool) -> (Arc<Self>, mpsc::UnboundedReceiver<MockPeer>) {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            accept: AtomicBool::new(accept),
            hang: AtomicBool::new(false),
            log: Arc::new(Mutex::new(Log::default())),
            peers: peers_tx,
        });
        (connector, peers_rx)
    }

    pub(crate) fn set_accept(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }

    pub(crate) fn record_frame(&self, text: &str) {
        self.log.lock().events.push(Event::Frame(text.to_string()));
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.log.lock().events.clone()
    }

    pub(crate) fn connect_times(&self) -> Vec<Instant> {
        self.log.lock().connects.clone()
    }
}

impl Connector for MockConnector {
    fn connect(&self, _url: &str) -> BoxFuture<'static, Result<Box<dyn Transport>>> {
        {
            let mut log = self.log.lock();
            log.events.push(Event::Connect);
            log.connects.push(Instant::now());
        }

        if self.hang.load(Ordering::SeqCst) {
            return Box::pin(futures::future::pending::<Result<Box<dyn Transport>>>());
        }

        let result: Result<Box<dyn Transport>> = if self.accept.load(Ordering::SeqCst) {
            let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
            let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
            let _ = self.peers.send(MockPeer {
                inbound: inbound_tx,
                outbound: outbound_rx,
            });
            Ok(Box::new(MockTransport {
                log: self.log.clone(),
                inbound: inbound_rx,
                outbound: outbound_tx,
            }))
        } else {
            Err(VcpError::Io(std::io::ErrorKind::ConnectionRefused.into()))
        };

        Box::pin(async move { result })
    }
}

struct MockTransport {
    log: Arc<Mutex<Log>>,
    inbound: mpsc::UnboundedReceiver<Result<String>>,
    outbound: mpsc::UnboundedSender<String>,
}

impl Transport for MockTransport {
    fn send(&mut self, text: String) -> BoxFuture<'_, Result<()>> {
        self.log.lock().events.push(Event::Sent(text.clone()));
        let _ = self.outbound.send(text);
        let result: Result<()> = Ok(());
        Box::pin(async move { result })
    }

    fn recv(&mut self) -> BoxFuture<'_, Option<Result<String>>> {
        Box::pin(self.inbound.recv())
    }

    fn close(&mut self) -> BoxFuture<'_, ()> {
        self.log.lock().events.push(Event::Closed);
        self.inbound.close();
        Box::pin(async {})
    }
}
