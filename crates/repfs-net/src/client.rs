use bytes::Bytes;

use crate::error::NetError;
use crate::server::{decode_response, encode_request};
use crate::socket::Socket;
use crate::transport::{recv_message, send_message, Connector, Transport};

/// An RPC client that sends requests over cached connections.
///
/// One request/response exchange holds the connection exclusively, so
/// concurrent calls to the same endpoint queue rather than interleave. A
/// transport error evicts the connection; the next call re-dials.
pub struct RpcClient<S: Socket> {
    transport: Transport<S>,
    connector: Box<dyn Connector<S>>,
}

impl<S: Socket> RpcClient<S> {
    pub fn new(connector: Box<dyn Connector<S>>) -> Self {
        Self {
            transport: Transport::new(),
            connector,
        }
    }

    /// Send one request to `endpoint` and wait for the response body.
    pub async fn call(
        &self,
        endpoint: &str,
        service_id: u16,
        method_id: u16,
        body: &[u8],
    ) -> Result<Bytes, NetError> {
        let conn = self
            .transport
            .get_or_connect(endpoint, self.connector.as_ref())
            .await?;

        let exchange = {
            let socket = conn.lock().await;
            let request = encode_request(service_id, method_id, body);
            match send_message(&*socket, &request).await {
                Ok(()) => recv_message(&*socket).await,
                Err(e) => Err(e),
            }
        };

        match exchange {
            Ok(payload) => decode_response(&payload),
            Err(e) => {
                self.transport.evict(endpoint);
                Err(e)
            }
        }
    }

    pub fn transport(&self) -> &Transport<S> {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::Server;
    use crate::service::ServiceHandler;
    use crate::tcp::{TcpConnector, TcpListener, TcpSocket};
    use async_trait::async_trait;
    use repfs_types::{Status, StatusCode};
    use std::net::SocketAddr;

    struct EchoService;

    #[async_trait]
    impl ServiceHandler for EchoService {
        fn service_id(&self) -> u16 {
            7
        }
        fn service_name(&self) -> &str {
            "echo"
        }
        async fn handle(
            &self,
            _peer: Option<SocketAddr>,
            method_id: u16,
            request: Bytes,
        ) -> Result<Bytes, Status> {
            if method_id == 99 {
                return Err(Status::new(StatusCode::GENERIC));
            }
            Ok(request)
        }
    }

    async fn spawn_echo_server() -> (String, Server) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("127.0.0.1:{}", listener.local_port().unwrap());
        let mut server = Server::new();
        server.register_service(Box::new(EchoService));
        server.start(listener);
        (endpoint, server)
    }

    #[tokio::test]
    async fn test_call_echo_over_tcp() {
        let (endpoint, _server) = spawn_echo_server().await;
        let client = RpcClient::<TcpSocket>::new(Box::new(TcpConnector::new()));

        let rsp = client.call(&endpoint, 7, 1, b"ping").await.unwrap();
        assert_eq!(rsp.as_ref(), b"ping");

        // The connection is reused for a second call.
        let rsp = client.call(&endpoint, 7, 1, b"pong").await.unwrap();
        assert_eq!(rsp.as_ref(), b"pong");
        assert_eq!(client.transport().len(), 1);
    }

    #[tokio::test]
    async fn test_call_dispatch_error() {
        let (endpoint, _server) = spawn_echo_server().await;
        let client = RpcClient::<TcpSocket>::new(Box::new(TcpConnector::new()));

        let result = client.call(&endpoint, 7, 99, b"").await;
        assert!(matches!(result.unwrap_err(), NetError::Rpc(1)));
    }

    #[tokio::test]
    async fn test_call_unknown_service() {
        let (endpoint, _server) = spawn_echo_server().await;
        let client = RpcClient::<TcpSocket>::new(Box::new(TcpConnector::new()));

        let result = client.call(&endpoint, 42, 1, b"").await;
        assert!(matches!(result.unwrap_err(), NetError::Rpc(_)));
    }

    #[tokio::test]
    async fn test_call_dial_failure() {
        // Bind then drop so the port refuses connections.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("127.0.0.1:{}", listener.local_port().unwrap());
        drop(listener);

        let client = RpcClient::<TcpSocket>::new(Box::new(TcpConnector::new()));
        assert!(client.call(&endpoint, 7, 1, b"").await.is_err());
        assert!(client.transport().is_empty());
    }
}
