//! Framed messaging and the per-endpoint connection cache.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::error::NetError;
use crate::message::{MessageHeader, MESSAGE_HEADER_SIZE, MESSAGE_MAX_SIZE};
use crate::socket::Socket;

/// Establishes new connections to a `host:port` endpoint.
#[async_trait]
pub trait Connector<S: Socket>: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<S, NetError>;
}

/// Frame a payload with a [`MessageHeader`] and send it.
pub async fn send_message<S: Socket>(socket: &S, payload: &[u8]) -> Result<(), NetError> {
    if payload.len() > MESSAGE_MAX_SIZE {
        return Err(NetError::MessageTooLarge {
            size: payload.len(),
            max: MESSAGE_MAX_SIZE,
        });
    }

    let header = MessageHeader::for_payload(payload);
    let mut frame = Vec::with_capacity(MESSAGE_HEADER_SIZE + payload.len());
    frame.extend_from_slice(&header.to_bytes());
    frame.extend_from_slice(payload);

    socket.send(Bytes::from(frame)).await
}

/// Read one framed message: exact header, then exact payload, then validate.
pub async fn recv_message<S: Socket>(socket: &S) -> Result<Bytes, NetError> {
    let header_bytes = socket.recv_exact(MESSAGE_HEADER_SIZE).await?;
    let header_arr: [u8; MESSAGE_HEADER_SIZE] = header_bytes
        .as_ref()
        .try_into()
        .expect("recv_exact returned the requested length");
    let header = MessageHeader::from_bytes(&header_arr);

    if !header.is_framed() {
        return Err(NetError::InvalidMagic((header.checksum & 0xFF) as u8));
    }
    let size = header.size as usize;
    if size > MESSAGE_MAX_SIZE {
        return Err(NetError::MessageTooLarge {
            size,
            max: MESSAGE_MAX_SIZE,
        });
    }

    let payload = socket.recv_exact(size).await?;
    header.validate(&payload)?;
    Ok(payload)
}

/// Cache of open connections keyed by endpoint, with lazy dial.
///
/// Each connection is wrapped in an async mutex so callers can hold one
/// request/response exchange exclusively; interleaved frames from concurrent
/// callers would otherwise pair responses with the wrong requests.
pub struct Transport<S: Socket> {
    connections: DashMap<String, Arc<tokio::sync::Mutex<S>>>,
}

impl<S: Socket> Transport<S> {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Retrieve a cached connection or dial a new one.
    pub async fn get_or_connect(
        &self,
        endpoint: &str,
        connector: &(dyn Connector<S> + '_),
    ) -> Result<Arc<tokio::sync::Mutex<S>>, NetError> {
        if let Some(entry) = self.connections.get(endpoint) {
            return Ok(Arc::clone(entry.value()));
        }

        let socket = connector.connect(endpoint).await?;
        let conn = Arc::new(tokio::sync::Mutex::new(socket));
        self.connections
            .insert(endpoint.to_string(), Arc::clone(&conn));
        Ok(conn)
    }

    /// Drop a connection from the cache; the next call re-dials.
    pub fn evict(&self, endpoint: &str) {
        self.connections.remove(endpoint);
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl<S: Socket> Default for Transport<S> {
    fn default() -> Self {
        Self::new()
    }
}
