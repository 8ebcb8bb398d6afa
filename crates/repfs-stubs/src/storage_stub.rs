//! Storage service stub trait, RPC implementation, and mock.
//!
//! Unlike the naming stub, every method takes the target endpoint: the
//! coordinator fans metadata side effects out to many replicas, and replicas
//! address peers discovered at runtime. Connections are cached per endpoint
//! by the underlying transport.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use repfs_net::tcp::TcpSocket;
use repfs_net::RpcClient;
use repfs_proto::storage::{
    method, CopyReq, CopyRsp, CreateFileReq, CreateFileRsp, FileInfoReq, FileInfoRsp,
    InitializeReq, InitializeRsp, MoveReq, MoveRsp, ReadFileReq, ReadFileRsp, RemoveReq,
    RemoveRsp, WriteFileReq, WriteFileRsp, STORAGE_SERVICE_ID,
};
use repfs_types::Result;

use crate::rpc::call_unary;

/// Client-side stub for calling storage replicas.
#[async_trait]
pub trait IStorageStub: Send + Sync {
    async fn initialize(&self, target: &str, req: InitializeReq) -> Result<InitializeRsp>;
    async fn create_file(&self, target: &str, req: CreateFileReq) -> Result<CreateFileRsp>;
    async fn read_file(&self, target: &str, req: ReadFileReq) -> Result<ReadFileRsp>;
    async fn write_file(&self, target: &str, req: WriteFileReq) -> Result<WriteFileRsp>;
    async fn remove(&self, target: &str, req: RemoveReq) -> Result<RemoveRsp>;
    async fn get_file_info(&self, target: &str, req: FileInfoReq) -> Result<FileInfoRsp>;
    async fn copy_file(&self, target: &str, req: CopyReq) -> Result<CopyRsp>;
    async fn move_file(&self, target: &str, req: MoveReq) -> Result<MoveRsp>;
}

// ---------------------------------------------------------------------------
// RPC-backed implementation
// ---------------------------------------------------------------------------

pub struct RpcStorageStub {
    client: Arc<RpcClient<TcpSocket>>,
}

impl RpcStorageStub {
    pub fn new(client: Arc<RpcClient<TcpSocket>>) -> Self {
        Self { client }
    }

    async fn call<Req, Rsp>(&self, target: &str, method_id: u16, req: &Req) -> Result<Rsp>
    where
        Req: serde::Serialize + Sync,
        Rsp: serde::de::DeserializeOwned,
    {
        call_unary(&self.client, target, STORAGE_SERVICE_ID, method_id, req).await
    }
}

#[async_trait]
impl IStorageStub for RpcStorageStub {
    async fn initialize(&self, target: &str, req: InitializeReq) -> Result<InitializeRsp> {
        self.call(target, method::INITIALIZE, &req).await
    }
    async fn create_file(&self, target: &str, req: CreateFileReq) -> Result<CreateFileRsp> {
        self.call(target, method::CREATE_FILE, &req).await
    }
    async fn read_file(&self, target: &str, req: ReadFileReq) -> Result<ReadFileRsp> {
        self.call(target, method::READ_FILE, &req).await
    }
    async fn write_file(&self, target: &str, req: WriteFileReq) -> Result<WriteFileRsp> {
        self.call(target, method::WRITE_FILE, &req).await
    }
    async fn remove(&self, target: &str, req: RemoveReq) -> Result<RemoveRsp> {
        self.call(target, method::REMOVE, &req).await
    }
    async fn get_file_info(&self, target: &str, req: FileInfoReq) -> Result<FileInfoRsp> {
        self.call(target, method::GET_FILE_INFO, &req).await
    }
    async fn copy_file(&self, target: &str, req: CopyReq) -> Result<CopyRsp> {
        self.call(target, method::COPY, &req).await
    }
    async fn move_file(&self, target: &str, req: MoveReq) -> Result<MoveRsp> {
        self.call(target, method::MOVE, &req).await
    }
}

// ---------------------------------------------------------------------------
// Mock implementation
// ---------------------------------------------------------------------------

type Handler<Req, Rsp> = Box<dyn Fn(&str, Req) -> Result<Rsp> + Send + Sync>;

/// A configurable mock for [`IStorageStub`].
///
/// Handlers receive the target endpoint so tests can assert routing.
#[derive(Default)]
pub struct MockStorageStub {
    pub initialize_handler: Mutex<Option<Handler<InitializeReq, InitializeRsp>>>,
    pub create_file_handler: Mutex<Option<Handler<CreateFileReq, CreateFileRsp>>>,
    pub read_file_handler: Mutex<Option<Handler<ReadFileReq, ReadFileRsp>>>,
    pub write_file_handler: Mutex<Option<Handler<WriteFileReq, WriteFileRsp>>>,
    pub remove_handler: Mutex<Option<Handler<RemoveReq, RemoveRsp>>>,
    pub get_file_info_handler: Mutex<Option<Handler<FileInfoReq, FileInfoRsp>>>,
    pub copy_handler: Mutex<Option<Handler<CopyReq, CopyRsp>>>,
    pub move_handler: Mutex<Option<Handler<MoveReq, MoveRsp>>>,
}

impl MockStorageStub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn on_create_file(
        &self,
        f: impl Fn(&str, CreateFileReq) -> Result<CreateFileRsp> + Send + Sync + 'static,
    ) {
        *self.create_file_handler.lock() = Some(Box::new(f));
    }

    pub fn on_read_file(
        &self,
        f: impl Fn(&str, ReadFileReq) -> Result<ReadFileRsp> + Send + Sync + 'static,
    ) {
        *self.read_file_handler.lock() = Some(Box::new(f));
    }

    pub fn on_write_file(
        &self,
        f: impl Fn(&str, WriteFileReq) -> Result<WriteFileRsp> + Send + Sync + 'static,
    ) {
        *self.write_file_handler.lock() = Some(Box::new(f));
    }

    pub fn on_remove(
        &self,
        f: impl Fn(&str, RemoveReq) -> Result<RemoveRsp> + Send + Sync + 'static,
    ) {
        *self.remove_handler.lock() = Some(Box::new(f));
    }

    pub fn on_move_file(
        &self,
        f: impl Fn(&str, MoveReq) -> Result<MoveRsp> + Send + Sync + 'static,
    ) {
        *self.move_handler.lock() = Some(Box::new(f));
    }
}

#[async_trait]
impl IStorageStub for MockStorageStub {
    async fn initialize(&self, target: &str, req: InitializeReq) -> Result<InitializeRsp> {
        match self.initialize_handler.lock().as_ref() {
            Some(f) => f(target, req),
            None => Ok(InitializeRsp::default()),
        }
    }

    async fn create_file(&self, target: &str, req: CreateFileReq) -> Result<CreateFileRsp> {
        match self.create_file_handler.lock().as_ref() {
            Some(f) => f(target, req),
            None => Ok(CreateFileRsp::default()),
        }
    }

    async fn read_file(&self, target: &str, req: ReadFileReq) -> Result<ReadFileRsp> {
        match self.read_file_handler.lock().as_ref() {
            Some(f) => f(target, req),
            None => Ok(ReadFileRsp::default()),
        }
    }

    async fn write_file(&self, target: &str, req: WriteFileReq) -> Result<WriteFileRsp> {
        match self.write_file_handler.lock().as_ref() {
            Some(f) => f(target, req),
            None => Ok(WriteFileRsp::default()),
        }
    }

    async fn remove(&self, target: &str, req: RemoveReq) -> Result<RemoveRsp> {
        match self.remove_handler.lock().as_ref() {
            Some(f) => f(target, req),
            None => Ok(RemoveRsp::default()),
        }
    }

    async fn get_file_info(&self, target: &str, req: FileInfoReq) -> Result<FileInfoRsp> {
        match self.get_file_info_handler.lock().as_ref() {
            Some(f) => f(target, req),
            None => Ok(FileInfoRsp::default()),
        }
    }

    async fn copy_file(&self, target: &str, req: CopyReq) -> Result<CopyRsp> {
        match self.copy_handler.lock().as_ref() {
            Some(f) => f(target, req),
            None => Ok(CopyRsp::default()),
        }
    }

    async fn move_file(&self, target: &str, req: MoveReq) -> Result<MoveRsp> {
        match self.move_handler.lock().as_ref() {
            Some(f) => f(target, req),
            None => Ok(MoveRsp::default()),
        }
    }
}

/// `Arc<T>` delegates to `T` for any `T: IStorageStub`.
#[async_trait]
impl<T: IStorageStub + ?Sized> IStorageStub for Arc<T> {
    async fn initialize(&self, target: &str, req: InitializeReq) -> Result<InitializeRsp> {
        (**self).initialize(target, req).await
    }
    async fn create_file(&self, target: &str, req: CreateFileReq) -> Result<CreateFileRsp> {
        (**self).create_file(target, req).await
    }
    async fn read_file(&self, target: &str, req: ReadFileReq) -> Result<ReadFileRsp> {
        (**self).read_file(target, req).await
    }
    async fn write_file(&self, target: &str, req: WriteFileReq) -> Result<WriteFileRsp> {
        (**self).write_file(target, req).await
    }
    async fn remove(&self, target: &str, req: RemoveReq) -> Result<RemoveRsp> {
        (**self).remove(target, req).await
    }
    async fn get_file_info(&self, target: &str, req: FileInfoReq) -> Result<FileInfoRsp> {
        (**self).get_file_info(target, req).await
    }
    async fn copy_file(&self, target: &str, req: CopyReq) -> Result<CopyRsp> {
        (**self).copy_file(target, req).await
    }
    async fn move_file(&self, target: &str, req: MoveReq) -> Result<MoveRsp> {
        (**self).move_file(target, req).await
    }
}
