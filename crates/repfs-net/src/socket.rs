use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::NetError;

/// A bidirectional, message-agnostic byte stream.
///
/// `recv_exact` must return exactly `len` bytes or fail; a clean EOF at a
/// message boundary surfaces as [`NetError::ConnectionClosed`]. Framing is
/// layered on top in [`crate::transport`].
#[async_trait]
pub trait Socket: Send + Sync + 'static {
    async fn send(&self, data: Bytes) -> Result<(), NetError>;

    async fn recv_exact(&self, len: usize) -> Result<Bytes, NetError>;

    /// Remote peer address, when the transport can observe one.
    fn peer_addr(&self) -> Option<SocketAddr>;

    fn local_addr(&self) -> Option<SocketAddr>;

    async fn close(&self);
}

/// Accepts incoming connections.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    type Conn: Socket;

    async fn accept(&self) -> Result<Self::Conn, NetError>;

    fn local_addr(&self) -> Option<SocketAddr>;
}
