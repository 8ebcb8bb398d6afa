use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use repfs_types::StatusCode;
use tokio::sync::Notify;
use tokio::task::JoinSet;

use crate::error::NetError;
use crate::service::{ServiceHandler, ServiceRegistry};
use crate::socket::{Listener, Socket};
use crate::transport::{recv_message, send_message};

/// Bytes of the request envelope: `[service_id: u16 LE][method_id: u16 LE]`.
pub const REQUEST_ENVELOPE_SIZE: usize = 4;

/// Bytes of the response envelope: `[rpc_status: u32 LE]`.
pub const RESPONSE_ENVELOPE_SIZE: usize = 4;

/// RPC server hosting registered services.
///
/// Accepts connections from a [`Listener`], reads framed requests, dispatches
/// them to the matching [`ServiceHandler`], and writes back the response.
/// Each connection runs in its own spawned task; `stop()` cancels the accept
/// loop and all connection tasks.
pub struct Server {
    services: Arc<ServiceRegistry>,
    shutdown: Arc<Notify>,
    running: bool,
}

impl Server {
    pub fn new() -> Self {
        Self {
            services: Arc::new(ServiceRegistry::new()),
            shutdown: Arc::new(Notify::new()),
            running: false,
        }
    }

    pub fn register_service(&self, service: Box<dyn ServiceHandler>) {
        self.services.register(service);
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// Start accepting connections; runs until `stop()`.
    pub fn start<L: Listener>(&mut self, listener: L) {
        if self.running {
            tracing::warn!("server already running, ignoring duplicate start");
            return;
        }
        self.running = true;

        let services = Arc::clone(&self.services);
        let shutdown = Arc::clone(&self.shutdown);
        let addr = listener.local_addr();

        tracing::info!(?addr, "server starting");

        tokio::spawn(async move {
            Self::accept_loop(listener, services, shutdown).await;
            tracing::info!(?addr, "server accept loop exited");
        });
    }

    pub fn stop(&mut self) {
        if self.running {
            tracing::info!("server stopping");
            self.shutdown.notify_waiters();
            self.running = false;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    async fn accept_loop<L: Listener>(
        listener: L,
        services: Arc<ServiceRegistry>,
        shutdown: Arc<Notify>,
    ) {
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                _ = shutdown.notified() => {
                    tracing::info!("server shutdown signal received");
                    break;
                }

                result = listener.accept() => {
                    match result {
                        Ok(socket) => {
                            let services = Arc::clone(&services);
                            let shutdown = Arc::clone(&shutdown);
                            tasks.spawn(async move {
                                if let Err(e) = Self::handle_connection(socket, services, shutdown).await {
                                    tracing::debug!("connection handler finished: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            tracing::error!("accept error: {}", e);
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        }
                    }
                }
            }
        }

        tasks.shutdown().await;
    }

    async fn handle_connection<S: Socket>(
        socket: S,
        services: Arc<ServiceRegistry>,
        shutdown: Arc<Notify>,
    ) -> Result<(), NetError> {
        let peer = socket.peer_addr();
        tracing::debug!(?peer, "new connection");

        loop {
            let payload = tokio::select! {
                biased;

                _ = shutdown.notified() => {
                    tracing::debug!(?peer, "connection shutdown");
                    return Err(NetError::ShuttingDown);
                }

                result = recv_message(&socket) => {
                    result?
                }
            };

            if payload.len() < REQUEST_ENVELOPE_SIZE {
                tracing::warn!(?peer, "request too small: {} bytes", payload.len());
                continue;
            }

            let service_id = u16::from_le_bytes([payload[0], payload[1]]);
            let method_id = u16::from_le_bytes([payload[2], payload[3]]);
            let body = payload.slice(REQUEST_ENVELOPE_SIZE..);

            tracing::debug!(
                ?peer,
                service_id,
                method_id,
                body_len = body.len(),
                "dispatching request"
            );

            let response = match services.get(service_id) {
                Some(handler) => match handler.handle(peer, method_id, body).await {
                    Ok(rsp) => encode_response(StatusCode::OK, &rsp),
                    Err(status) => {
                        tracing::warn!(
                            ?peer,
                            service_id,
                            method_id,
                            %status,
                            "dispatch failed"
                        );
                        encode_response(status.code(), &[])
                    }
                },
                None => {
                    tracing::warn!(?peer, service_id, "service not found");
                    encode_response(StatusCode::GENERIC, &[])
                }
            };

            send_message(&socket, &response).await?;
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the on-wire request payload: `[service_id][method_id][body]`.
pub fn encode_request(service_id: u16, method_id: u16, body: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(REQUEST_ENVELOPE_SIZE + body.len());
    buf.put_u16_le(service_id);
    buf.put_u16_le(method_id);
    buf.extend_from_slice(body);
    buf.freeze()
}

/// Build the on-wire response payload: `[rpc_status][body]`.
pub fn encode_response(rpc_status: u32, body: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(RESPONSE_ENVELOPE_SIZE + body.len());
    buf.put_u32_le(rpc_status);
    buf.extend_from_slice(body);
    buf.freeze()
}

/// Split a response payload into the dispatch status and the body.
pub fn decode_response(payload: &Bytes) -> Result<Bytes, NetError> {
    if payload.len() < RESPONSE_ENVELOPE_SIZE {
        return Err(NetError::ShortResponse(payload.len()));
    }
    let rpc_status = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
    if rpc_status != StatusCode::OK {
        return Err(NetError::Rpc(rpc_status));
    }
    Ok(payload.slice(RESPONSE_ENVELOPE_SIZE..))
}
