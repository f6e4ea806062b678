//! Transport abstraction and the WebSocket implementation.
//!
//! The connection manager only needs three things from a transport: send a
//! text message, receive the next text message, close. [`Connector`] creates
//! transports; [`WebSocketConnector`] is the production one, built on
//! `tokio-tungstenite`.

use std::future::Future;
use std::pin::Pin;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::{Result, VcpError};

/// Boxed future for transport operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One live duplex connection carrying text messages.
pub trait Transport: Send {
    /// Send one text message.
    fn send(&mut self, text: String) -> BoxFuture<'_, Result<()>>;

    /// Next inbound text message.
    ///
    /// `None` once the peer has closed the connection.
    fn recv(&mut self) -> BoxFuture<'_, Option<Result<String>>>;

    /// Close the connection. Errors are ignored; the transport is dropped
    /// afterwards either way.
    fn close(&mut self) -> BoxFuture<'_, ()>;
}

/// Factory for transports.
pub trait Connector: Send + Sync + 'static {
    /// Open a new transport to `url`. Resolves once the transport is ready.
    fn connect(&self, url: &str) -> BoxFuture<'static, Result<Box<dyn Transport>>>;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connects over `ws://` or `wss://`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    fn connect(&self, url: &str) -> BoxFuture<'static, Result<Box<dyn Transport>>> {
        Box::pin(open_websocket(url.to_string()))
    }
}

async fn open_websocket(url: String) -> Result<Box<dyn Transport>> {
    let (stream, _response) = connect_async(url.as_str()).await?;
    Ok(Box::new(WebSocketTransport { stream }))
}

/// A WebSocket connection.
pub struct WebSocketTransport {
    stream: WsStream,
}

impl Transport for WebSocketTransport {
    fn send(&mut self, text: String) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.stream
                .send(Message::Text(text.into()))
                .await
                .map_err(VcpError::from)
        })
    }

    fn recv(&mut self) -> BoxFuture<'_, Option<Result<String>>> {
        Box::pin(next_text(&mut self.stream))
    }

    fn close(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if let Err(e) = self.stream.close(None).await {
                tracing::debug!(error = %e, "Error closing WebSocket");
            }
        })
    }
}

async fn next_text(stream: &mut WsStream) -> Option<Result<String>> {
    loop {
        match stream.next().await? {
            Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
            Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                Ok(text) => return Some(Ok(text)),
                Err(_) => {
                    tracing::debug!(len = data.len(), "Dropping non-UTF-8 binary message");
                }
            },
            Ok(Message::Close(frame)) => {
                tracing::debug!(?frame, "Close frame received");
                return None;
            }
            // Ping/pong are answered by tungstenite itself.
            Ok(_) => {}
            Err(e) => return Some(Err(VcpError::from(e))),
        }
    }
}
