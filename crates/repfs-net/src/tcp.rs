//! TCP implementation of the socket traits.
//!
//! A [`TcpSocket`] splits the underlying stream into independent read/write
//! halves so sending and receiving can proceed concurrently without one lock
//! over the whole stream. Endpoints are `host:port` strings; hostnames are
//! resolved by the connect call.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;

use crate::error::NetError;
use crate::socket::{Listener, Socket};
use crate::transport::Connector;

pub struct TcpSocket {
    reader: Arc<Mutex<OwnedReadHalf>>,
    writer: Arc<Mutex<OwnedWriteHalf>>,
    peer_addr: Option<SocketAddr>,
    local_addr: Option<SocketAddr>,
}

impl TcpSocket {
    /// Wrap an already-connected [`tokio::net::TcpStream`].
    pub fn from_stream(stream: tokio::net::TcpStream) -> Self {
        let peer_addr = stream.peer_addr().ok();
        let local_addr = stream.local_addr().ok();
        let (read_half, write_half) = stream.into_split();

        Self {
            reader: Arc::new(Mutex::new(read_half)),
            writer: Arc::new(Mutex::new(write_half)),
            peer_addr,
            local_addr,
        }
    }
}

impl std::fmt::Debug for TcpSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpSocket")
            .field("peer_addr", &self.peer_addr)
            .field("local_addr", &self.local_addr)
            .finish()
    }
}

#[async_trait]
impl Socket for TcpSocket {
    async fn send(&self, data: Bytes) -> Result<(), NetError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(&data).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn recv_exact(&self, len: usize) -> Result<Bytes, NetError> {
        let mut buf = BytesMut::zeroed(len);
        let mut reader = self.reader.lock().await;
        match reader.read_exact(&mut buf).await {
            Ok(_) => Ok(buf.freeze()),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(NetError::ConnectionClosed)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    async fn close(&self) {
        let mut writer = self.writer.lock().await;
        let _ = writer.shutdown().await;
    }
}

/// A TCP listener wrapping [`tokio::net::TcpListener`].
pub struct TcpListener {
    inner: tokio::net::TcpListener,
    local_addr: Option<SocketAddr>,
}

impl TcpListener {
    /// Bind to an endpoint such as `"0.0.0.0:5678"` or `"127.0.0.1:0"`.
    pub async fn bind(endpoint: &str) -> Result<Self, NetError> {
        let inner = tokio::net::TcpListener::bind(endpoint).await?;
        let local_addr = inner.local_addr().ok();
        tracing::info!(?local_addr, "TCP listener bound");
        Ok(Self { inner, local_addr })
    }

    /// The port actually bound (differs from the request when port 0 was asked).
    pub fn local_port(&self) -> Option<u16> {
        self.local_addr.map(|a| a.port())
    }
}

#[async_trait]
impl Listener for TcpListener {
    type Conn = TcpSocket;

    async fn accept(&self) -> Result<TcpSocket, NetError> {
        let (stream, peer) = self.inner.accept().await?;
        tracing::debug!(%peer, "accepted TCP connection");
        Ok(TcpSocket::from_stream(stream))
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

/// Connect to a `host:port` endpoint.
pub async fn connect(endpoint: &str) -> Result<TcpSocket, NetError> {
    tracing::debug!(endpoint, "connecting via TCP");
    let stream = tokio::net::TcpStream::connect(endpoint).await?;
    Ok(TcpSocket::from_stream(stream))
}

/// [`Connector`] that opens plain TCP connections.
#[derive(Debug, Clone, Default)]
pub struct TcpConnector;

impl TcpConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector<TcpSocket> for TcpConnector {
    async fn connect(&self, endpoint: &str) -> Result<TcpSocket, NetError> {
        connect(endpoint).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listener_bind_assigns_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        assert_ne!(listener.local_port().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_connect_send_recv() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("127.0.0.1:{}", listener.local_port().unwrap());

        let accept_handle = tokio::spawn(async move { listener.accept().await.unwrap() });

        let client = connect(&endpoint).await.unwrap();
        let server_socket = accept_handle.await.unwrap();

        client.send(Bytes::from_static(b"hello")).await.unwrap();
        let received = server_socket.recv_exact(5).await.unwrap();
        assert_eq!(received, Bytes::from_static(b"hello"));

        server_socket.send(Bytes::from_static(b"ok")).await.unwrap();
        let back = client.recv_exact(2).await.unwrap();
        assert_eq!(back, Bytes::from_static(b"ok"));
    }

    #[tokio::test]
    async fn test_recv_exact_eof_is_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("127.0.0.1:{}", listener.local_port().unwrap());

        let accept_handle = tokio::spawn(async move { listener.accept().await.unwrap() });
        let client = connect(&endpoint).await.unwrap();
        let server_socket = accept_handle.await.unwrap();

        client.close().await;
        let result = server_socket.recv_exact(1).await;
        assert!(matches!(result.unwrap_err(), NetError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("127.0.0.1:{}", listener.local_port().unwrap());
        drop(listener);

        assert!(connect(&endpoint).await.is_err());
    }

    #[tokio::test]
    async fn test_large_transfer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("127.0.0.1:{}", listener.local_port().unwrap());

        let accept_handle = tokio::spawn(async move { listener.accept().await.unwrap() });
        let client = connect(&endpoint).await.unwrap();
        let server_socket = accept_handle.await.unwrap();

        let payload: Vec<u8> = (0..1_000_000).map(|i| (i % 251) as u8).collect();
        let expected = payload.clone();

        let send_handle = tokio::spawn(async move {
            client.send(Bytes::from(payload)).await.unwrap();
        });

        let received = server_socket.recv_exact(expected.len()).await.unwrap();
        send_handle.await.unwrap();
        assert_eq!(received.as_ref(), expected.as_slice());
    }
}
