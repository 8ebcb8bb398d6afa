//! Wire dispatch for the storage service.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use repfs_net::ServiceHandler;
use repfs_proto::storage::{method, STORAGE_SERVICE_ID};
use repfs_proto::wire;
use repfs_types::{Status, StatusCode};

use crate::service::IStorageService;

pub struct StorageRpcHandler {
    service: Arc<dyn IStorageService>,
}

impl StorageRpcHandler {
    pub fn new(service: Arc<dyn IStorageService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ServiceHandler for StorageRpcHandler {
    fn service_id(&self) -> u16 {
        STORAGE_SERVICE_ID
    }

    fn service_name(&self) -> &str {
        "storage"
    }

    async fn handle(
        &self,
        _peer: Option<SocketAddr>,
        method_id: u16,
        request: Bytes,
    ) -> Result<Bytes, Status> {
        let body = match method_id {
            method::INITIALIZE => {
                let rsp = self.service.initialize(wire::decode_req(&request)?).await;
                wire::encode_rsp(&rsp)?
            }
            method::CREATE_FILE => {
                let rsp = self.service.create_file(wire::decode_req(&request)?).await;
                wire::encode_rsp(&rsp)?
            }
            method::READ_FILE => {
                let rsp = self.service.read_file(wire::decode_req(&request)?).await;
                wire::encode_rsp(&rsp)?
            }
            method::WRITE_FILE => {
                let rsp = self.service.write_file(wire::decode_req(&request)?).await;
                wire::encode_rsp(&rsp)?
            }
            method::REMOVE => {
                let rsp = self.service.remove(wire::decode_req(&request)?).await;
                wire::encode_rsp(&rsp)?
            }
            method::GET_FILE_INFO => {
                let rsp = self
                    .service
                    .get_file_info(wire::decode_req(&request)?)
                    .await;
                wire::encode_rsp(&rsp)?
            }
            method::COPY => {
                let rsp = self.service.copy_file(wire::decode_req(&request)?).await;
                wire::encode_rsp(&rsp)?
            }
            method::MOVE => {
                let rsp = self.service.move_file(wire::decode_req(&request)?).await;
                wire::encode_rsp(&rsp)?
            }
            other => {
                return Err(Status::with_message(
                    StatusCode::GENERIC,
                    format!("unknown storage method {other}"),
                ))
            }
        };
        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{StorageServiceImpl, StorageState};
    use crate::store::FileStore;
    use repfs_proto::storage::{CreateFileReq, CreateFileRsp, FileInfoReq, FileInfoRsp};
    use repfs_stubs::{MockNamingStub, MockStorageStub};
    use tempfile::TempDir;

    fn make_handler() -> (TempDir, StorageRpcHandler) {
        let dir = tempfile::tempdir().unwrap();
        let state = StorageState::new(
            "test",
            FileStore::new(dir.path().join("storage")),
            MockNamingStub::new().into_arc(),
            MockStorageStub::new().into_arc(),
        )
        .into_arc();
        (dir, StorageRpcHandler::new(Arc::new(StorageServiceImpl::new(state))))
    }

    #[tokio::test]
    async fn test_dispatch_create_and_stat() {
        let (_dir, handler) = make_handler();

        let create = wire::encode(&CreateFileReq { path: "/f".into() }).unwrap();
        let rsp_bytes = handler
            .handle(None, method::CREATE_FILE, create.into())
            .await
            .unwrap();
        let rsp: CreateFileRsp = wire::decode(&rsp_bytes).unwrap();
        assert!(rsp.status.is_ok());

        let stat = wire::encode(&FileInfoReq { path: "/f".into() }).unwrap();
        let rsp_bytes = handler
            .handle(None, method::GET_FILE_INFO, stat.into())
            .await
            .unwrap();
        let rsp: FileInfoRsp = wire::decode(&rsp_bytes).unwrap();
        assert!(rsp.status.is_ok());
        assert_eq!(rsp.file_size, 0);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_method() {
        let (_dir, handler) = make_handler();
        assert!(handler.handle(None, 999, Bytes::new()).await.is_err());
    }
}
