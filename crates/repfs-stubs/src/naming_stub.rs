//! Naming service stub trait, RPC implementation, and mock.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use repfs_net::tcp::TcpSocket;
use repfs_net::RpcClient;
use repfs_proto::naming::{
    method, CopyReq, CopyRsp, CreateFileReq, CreateFileRsp, DeleteReq, DeleteRsp, DiscoverReq,
    DiscoverRsp, ListDirectoryReq, ListDirectoryRsp, MakeDirectoryReq, MakeDirectoryRsp, MoveReq,
    MoveRsp, RegisterOutcome, RegisterReq, RegisterRsp, NAMING_SERVICE_ID,
};
use repfs_types::Result;

use crate::rpc::call_unary;

/// Client-side stub for calling the naming service.
///
/// Storage replicas use this for registration, discovery, and the bootstrap
/// namespace walk; clients use the full metadata surface.
#[async_trait]
pub trait INamingStub: Send + Sync {
    async fn register(&self, req: RegisterReq) -> Result<RegisterRsp>;
    async fn discover(&self, req: DiscoverReq) -> Result<DiscoverRsp>;
    async fn create_file(&self, req: CreateFileReq) -> Result<CreateFileRsp>;
    async fn move_entry(&self, req: MoveReq) -> Result<MoveRsp>;
    async fn delete_file(&self, req: DeleteReq) -> Result<DeleteRsp>;
    async fn delete_directory(&self, req: DeleteReq) -> Result<DeleteRsp>;
    async fn make_directory(&self, req: MakeDirectoryReq) -> Result<MakeDirectoryRsp>;
    async fn list_directory(&self, req: ListDirectoryReq) -> Result<ListDirectoryRsp>;
    async fn copy(&self, req: CopyReq) -> Result<CopyRsp>;
}

// ---------------------------------------------------------------------------
// RPC-backed implementation
// ---------------------------------------------------------------------------

/// Stub bound to one coordinator endpoint.
pub struct RpcNamingStub {
    endpoint: String,
    client: Arc<RpcClient<TcpSocket>>,
}

impl RpcNamingStub {
    pub fn new(endpoint: impl Into<String>, client: Arc<RpcClient<TcpSocket>>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<Req, Rsp>(&self, method_id: u16, req: &Req) -> Result<Rsp>
    where
        Req: serde::Serialize + Sync,
        Rsp: serde::de::DeserializeOwned,
    {
        call_unary(
            &self.client,
            &self.endpoint,
            NAMING_SERVICE_ID,
            method_id,
            req,
        )
        .await
    }
}

#[async_trait]
impl INamingStub for RpcNamingStub {
    async fn register(&self, req: RegisterReq) -> Result<RegisterRsp> {
        self.call(method::REGISTER, &req).await
    }
    async fn discover(&self, req: DiscoverReq) -> Result<DiscoverRsp> {
        self.call(method::DISCOVER, &req).await
    }
    async fn create_file(&self, req: CreateFileReq) -> Result<CreateFileRsp> {
        self.call(method::CREATE_FILE, &req).await
    }
    async fn move_entry(&self, req: MoveReq) -> Result<MoveRsp> {
        self.call(method::MOVE, &req).await
    }
    async fn delete_file(&self, req: DeleteReq) -> Result<DeleteRsp> {
        self.call(method::DELETE_FILE, &req).await
    }
    async fn delete_directory(&self, req: DeleteReq) -> Result<DeleteRsp> {
        self.call(method::DELETE_DIRECTORY, &req).await
    }
    async fn make_directory(&self, req: MakeDirectoryReq) -> Result<MakeDirectoryRsp> {
        self.call(method::MAKE_DIRECTORY, &req).await
    }
    async fn list_directory(&self, req: ListDirectoryReq) -> Result<ListDirectoryRsp> {
        self.call(method::LIST_DIRECTORY, &req).await
    }
    async fn copy(&self, req: CopyReq) -> Result<CopyRsp> {
        self.call(method::COPY, &req).await
    }
}

// ---------------------------------------------------------------------------
// Mock implementation
// ---------------------------------------------------------------------------

type Handler<Req, Rsp> = Box<dyn Fn(Req) -> Result<Rsp> + Send + Sync>;

/// A configurable mock for [`INamingStub`].
///
/// Each method can be overridden with a closure; without one the mock returns
/// a default (success) response.
#[derive(Default)]
pub struct MockNamingStub {
    pub register_handler: Mutex<Option<Handler<RegisterReq, RegisterRsp>>>,
    pub discover_handler: Mutex<Option<Handler<DiscoverReq, DiscoverRsp>>>,
    pub create_file_handler: Mutex<Option<Handler<CreateFileReq, CreateFileRsp>>>,
    pub move_handler: Mutex<Option<Handler<MoveReq, MoveRsp>>>,
    pub delete_file_handler: Mutex<Option<Handler<DeleteReq, DeleteRsp>>>,
    pub delete_directory_handler: Mutex<Option<Handler<DeleteReq, DeleteRsp>>>,
    pub make_directory_handler: Mutex<Option<Handler<MakeDirectoryReq, MakeDirectoryRsp>>>,
    pub list_directory_handler: Mutex<Option<Handler<ListDirectoryReq, ListDirectoryRsp>>>,
    pub copy_handler: Mutex<Option<Handler<CopyReq, CopyRsp>>>,
}

impl MockNamingStub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn on_register(
        &self,
        f: impl Fn(RegisterReq) -> Result<RegisterRsp> + Send + Sync + 'static,
    ) {
        *self.register_handler.lock() = Some(Box::new(f));
    }

    pub fn on_discover(
        &self,
        f: impl Fn(DiscoverReq) -> Result<DiscoverRsp> + Send + Sync + 'static,
    ) {
        *self.discover_handler.lock() = Some(Box::new(f));
    }

    pub fn on_list_directory(
        &self,
        f: impl Fn(ListDirectoryReq) -> Result<ListDirectoryRsp> + Send + Sync + 'static,
    ) {
        *self.list_directory_handler.lock() = Some(Box::new(f));
    }
}

#[async_trait]
impl INamingStub for MockNamingStub {
    async fn register(&self, req: RegisterReq) -> Result<RegisterRsp> {
        match self.register_handler.lock().as_ref() {
            Some(f) => f(req),
            None => Ok(RegisterRsp {
                outcome: RegisterOutcome::Accept,
            }),
        }
    }

    async fn discover(&self, req: DiscoverReq) -> Result<DiscoverRsp> {
        match self.discover_handler.lock().as_ref() {
            Some(f) => f(req),
            None => Ok(DiscoverRsp::default()),
        }
    }

    async fn create_file(&self, req: CreateFileReq) -> Result<CreateFileRsp> {
        match self.create_file_handler.lock().as_ref() {
            Some(f) => f(req),
            None => Ok(CreateFileRsp::default()),
        }
    }

    async fn move_entry(&self, req: MoveReq) -> Result<MoveRsp> {
        match self.move_handler.lock().as_ref() {
            Some(f) => f(req),
            None => Ok(MoveRsp::default()),
        }
    }

    async fn delete_file(&self, req: DeleteReq) -> Result<DeleteRsp> {
        match self.delete_file_handler.lock().as_ref() {
            Some(f) => f(req),
            None => Ok(DeleteRsp::default()),
        }
    }

    async fn delete_directory(&self, req: DeleteReq) -> Result<DeleteRsp> {
        match self.delete_directory_handler.lock().as_ref() {
            Some(f) => f(req),
            None => Ok(DeleteRsp::default()),
        }
    }

    async fn make_directory(&self, req: MakeDirectoryReq) -> Result<MakeDirectoryRsp> {
        match self.make_directory_handler.lock().as_ref() {
            Some(f) => f(req),
            None => Ok(MakeDirectoryRsp::default()),
        }
    }

    async fn list_directory(&self, req: ListDirectoryReq) -> Result<ListDirectoryRsp> {
        match self.list_directory_handler.lock().as_ref() {
            Some(f) => f(req),
            None => Ok(ListDirectoryRsp::default()),
        }
    }

    async fn copy(&self, req: CopyReq) -> Result<CopyRsp> {
        match self.copy_handler.lock().as_ref() {
            Some(f) => f(req),
            None => Ok(CopyRsp::default()),
        }
    }
}

/// `Arc<T>` delegates to `T` for any `T: INamingStub`.
#[async_trait]
impl<T: INamingStub + ?Sized> INamingStub for Arc<T> {
    async fn register(&self, req: RegisterReq) -> Result<RegisterRsp> {
        (**self).register(req).await
    }
    async fn discover(&self, req: DiscoverReq) -> Result<DiscoverRsp> {
        (**self).discover(req).await
    }
    async fn create_file(&self, req: CreateFileReq) -> Result<CreateFileRsp> {
        (**self).create_file(req).await
    }
    async fn move_entry(&self, req: MoveReq) -> Result<MoveRsp> {
        (**self).move_entry(req).await
    }
    async fn delete_file(&self, req: DeleteReq) -> Result<DeleteRsp> {
        (**self).delete_file(req).await
    }
    async fn delete_directory(&self, req: DeleteReq) -> Result<DeleteRsp> {
        (**self).delete_directory(req).await
    }
    async fn make_directory(&self, req: MakeDirectoryReq) -> Result<MakeDirectoryRsp> {
        (**self).make_directory(req).await
    }
    async fn list_directory(&self, req: ListDirectoryReq) -> Result<ListDirectoryRsp> {
        (**self).list_directory(req).await
    }
    async fn copy(&self, req: CopyReq) -> Result<CopyRsp> {
        (**self).copy(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repfs_proto::common::DiscoveredReplica;

    #[tokio::test]
    async fn test_mock_register_default_accepts() {
        let mock = MockNamingStub::new();
        let rsp = mock.register(RegisterReq::default()).await.unwrap();
        assert_eq!(rsp.outcome, RegisterOutcome::Accept);
    }

    #[tokio::test]
    async fn test_mock_discover_custom_handler() {
        let mock = MockNamingStub::new();
        mock.on_discover(|req| {
            assert_eq!(req.path, "/foo");
            Ok(DiscoverRsp {
                status: Default::default(),
                replicas: vec![DiscoveredReplica {
                    alias: "a".into(),
                    address: "10.0.0.1:1".into(),
                    public_address: "a:1".into(),
                }],
            })
        });

        let rsp = mock
            .discover(DiscoverReq {
                path: "/foo".into(),
                exclude_alias: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(rsp.replicas.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_via_arc() {
        let mock = MockNamingStub::new().into_arc();
        assert!(mock.list_directory(ListDirectoryReq::default()).await.is_ok());
    }
}
