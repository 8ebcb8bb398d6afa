//! Wire dispatch for the naming service.
//!
//! Decodes the request by method id, invokes the service, and encodes the
//! response. Operation outcomes travel inside each response's `ErrorStatus`;
//! only undecodable requests and unknown methods fail at this layer.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use repfs_net::ServiceHandler;
use repfs_proto::naming::{method, NAMING_SERVICE_ID};
use repfs_proto::wire;
use repfs_types::{Status, StatusCode};

use crate::service::INamingService;

pub struct NamingRpcHandler {
    service: Arc<dyn INamingService>,
}

impl NamingRpcHandler {
    pub fn new(service: Arc<dyn INamingService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ServiceHandler for NamingRpcHandler {
    fn service_id(&self) -> u16 {
        NAMING_SERVICE_ID
    }

    fn service_name(&self) -> &str {
        "naming"
    }

    async fn handle(
        &self,
        peer: Option<SocketAddr>,
        method_id: u16,
        request: Bytes,
    ) -> Result<Bytes, Status> {
        let body = match method_id {
            method::REGISTER => {
                let req = wire::decode_req(&request)?;
                let rsp = self.service.register(peer.map(|a| a.ip()), req).await;
                wire::encode_rsp(&rsp)?
            }
            method::DISCOVER => {
                let rsp = self.service.discover(wire::decode_req(&request)?).await;
                wire::encode_rsp(&rsp)?
            }
            method::CREATE_FILE => {
                let rsp = self.service.create_file(wire::decode_req(&request)?).await;
                wire::encode_rsp(&rsp)?
            }
            method::MOVE => {
                let rsp = self.service.move_entry(wire::decode_req(&request)?).await;
                wire::encode_rsp(&rsp)?
            }
            method::DELETE_FILE => {
                let rsp = self.service.delete_file(wire::decode_req(&request)?).await;
                wire::encode_rsp(&rsp)?
            }
            method::DELETE_DIRECTORY => {
                let rsp = self
                    .service
                    .delete_directory(wire::decode_req(&request)?)
                    .await;
                wire::encode_rsp(&rsp)?
            }
            method::MAKE_DIRECTORY => {
                let rsp = self
                    .service
                    .make_directory(wire::decode_req(&request)?)
                    .await;
                wire::encode_rsp(&rsp)?
            }
            method::LIST_DIRECTORY => {
                let rsp = self
                    .service
                    .list_directory(wire::decode_req(&request)?)
                    .await;
                wire::encode_rsp(&rsp)?
            }
            method::COPY => {
                let rsp = self.service.copy(wire::decode_req(&request)?).await;
                wire::encode_rsp(&rsp)?
            }
            other => {
                return Err(Status::with_message(
                    StatusCode::GENERIC,
                    format!("unknown naming method {other}"),
                ))
            }
        };
        Ok(body.into())
    }
}
