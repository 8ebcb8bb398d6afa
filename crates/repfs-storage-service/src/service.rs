//! The storage service: per-file byte operations plus write replication.
//!
//! A write that is not a chain call is a primary write: after the local
//! write lands, the same bytes are forwarded synchronously to every peer
//! holding the file, marked as chain calls so receivers do not fan out
//! again. Forwarding failures are logged and swallowed; the primary answers
//! for its local write only.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use repfs_proto::common::ErrorStatus;
use repfs_proto::naming::DiscoverReq;
use repfs_proto::storage::{
    CopyReq, CopyRsp, CreateFileReq, CreateFileRsp, FileInfoReq, FileInfoRsp, InitializeReq,
    InitializeRsp, MoveReq, MoveRsp, ReadFileReq, ReadFileRsp, RemoveReq, RemoveRsp,
    WriteFileReq, WriteFileRsp,
};
use repfs_stubs::{INamingStub, IStorageStub};
use repfs_types::{Status, StatusCode};

use crate::store::FileStore;

/// The replica's RPC surface.
#[async_trait]
pub trait IStorageService: Send + Sync {
    async fn initialize(&self, req: InitializeReq) -> InitializeRsp;
    async fn create_file(&self, req: CreateFileReq) -> CreateFileRsp;
    async fn read_file(&self, req: ReadFileReq) -> ReadFileRsp;
    async fn write_file(&self, req: WriteFileReq) -> WriteFileRsp;
    async fn remove(&self, req: RemoveReq) -> RemoveRsp;
    async fn get_file_info(&self, req: FileInfoReq) -> FileInfoRsp;
    async fn copy_file(&self, req: CopyReq) -> CopyRsp;
    async fn move_file(&self, req: MoveReq) -> MoveRsp;
}

/// Shared replica state: identity, the local store, and the outbound stubs.
pub struct StorageState {
    alias: String,
    store: FileStore,
    naming: Arc<dyn INamingStub>,
    peers: Arc<dyn IStorageStub>,
}

impl StorageState {
    pub fn new(
        alias: impl Into<String>,
        store: FileStore,
        naming: Arc<dyn INamingStub>,
        peers: Arc<dyn IStorageStub>,
    ) -> Self {
        Self {
            alias: alias.into(),
            store,
            naming,
            peers,
        }
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn naming(&self) -> &Arc<dyn INamingStub> {
        &self.naming
    }

    pub fn peers(&self) -> &Arc<dyn IStorageStub> {
        &self.peers
    }
}

/// Concrete implementation of [`IStorageService`].
pub struct StorageServiceImpl {
    state: Arc<StorageState>,
}

impl StorageServiceImpl {
    pub fn new(state: Arc<StorageState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &Arc<StorageState> {
        &self.state
    }

    /// Forward a primary write to every peer replica holding the file.
    async fn replicate_write(&self, req: &WriteFileReq) {
        let discover = DiscoverReq {
            path: req.path.clone(),
            exclude_alias: self.state.alias.clone(),
        };
        let peers = match self.state.naming.discover(discover).await {
            Ok(rsp) => rsp.replicas,
            Err(e) => {
                warn!(path = %req.path, error = %e, "discover for write replication failed");
                return;
            }
        };

        for peer in peers {
            if peer.alias == self.state.alias {
                continue;
            }
            let chain = WriteFileReq {
                path: req.path.clone(),
                offset: req.offset,
                buffer: req.buffer.clone(),
                is_chain_call: true,
            };
            match self.state.peers.write_file(&peer.address, chain).await {
                Ok(rsp) if rsp.status.is_ok() => {
                    debug!(path = %req.path, peer = %peer.alias, "chain write delivered");
                }
                Ok(rsp) => warn!(
                    path = %req.path,
                    peer = %peer.alias,
                    code = rsp.status.code,
                    "chain write refused"
                ),
                Err(e) => warn!(
                    path = %req.path,
                    peer = %peer.alias,
                    error = %e,
                    "chain write failed"
                ),
            }
        }
    }
}

/// Replica file-op failures are generic on the wire, whatever the cause.
fn io_status(e: io::Error) -> ErrorStatus {
    Status::with_message(StatusCode::GENERIC, e.to_string()).into()
}

#[async_trait]
impl IStorageService for StorageServiceImpl {
    async fn initialize(&self, _req: InitializeReq) -> InitializeRsp {
        info!("initialize: wiping storage root");
        if let Err(e) = self.state.store.wipe() {
            warn!(error = %e, "failed to wipe storage root");
        }

        match self.state.store.available_space() {
            Ok(available_size) => InitializeRsp {
                status: ErrorStatus::ok(),
                available_size,
            },
            Err(e) => InitializeRsp {
                status: io_status(e),
                available_size: 0,
            },
        }
    }

    async fn create_file(&self, req: CreateFileReq) -> CreateFileRsp {
        debug!(path = %req.path, "create file");
        CreateFileRsp {
            status: match self.state.store.create_file(&req.path) {
                Ok(()) => ErrorStatus::ok(),
                Err(e) => io_status(e),
            },
        }
    }

    async fn read_file(&self, req: ReadFileReq) -> ReadFileRsp {
        debug!(path = %req.path, offset = req.offset, count = req.count, "read file");
        let count = req.count.max(0) as usize;
        let offset = req.offset.max(0) as u64;

        match self.state.store.read_at(&req.path, offset, count) {
            // EOF or empty read: success with an empty buffer.
            Ok(buf) if buf.is_empty() => ReadFileRsp {
                status: ErrorStatus::ok(),
                buffer: Vec::new(),
                count: 0,
            },
            Ok(buf) => ReadFileRsp {
                status: ErrorStatus::ok(),
                count: buf.len() as i32,
                buffer: buf,
            },
            Err(e) => ReadFileRsp {
                status: io_status(e),
                buffer: Vec::new(),
                count: 0,
            },
        }
    }

    async fn write_file(&self, req: WriteFileReq) -> WriteFileRsp {
        debug!(
            path = %req.path,
            offset = req.offset,
            len = req.buffer.len(),
            chain = req.is_chain_call,
            "write file"
        );

        let offset = req.offset.max(0) as u64;
        if let Err(e) = self.state.store.write_at(&req.path, offset, &req.buffer) {
            return WriteFileRsp {
                status: io_status(e),
            };
        }

        if !req.is_chain_call {
            self.replicate_write(&req).await;
        }

        WriteFileRsp {
            status: ErrorStatus::ok(),
        }
    }

    async fn remove(&self, req: RemoveReq) -> RemoveRsp {
        debug!(path = %req.path, "remove");
        RemoveRsp {
            status: match self.state.store.remove(&req.path) {
                Ok(()) => ErrorStatus::ok(),
                Err(e) => io_status(e),
            },
        }
    }

    async fn get_file_info(&self, req: FileInfoReq) -> FileInfoRsp {
        debug!(path = %req.path, "get file info");
        match self.state.store.file_size(&req.path) {
            Ok(file_size) => FileInfoRsp {
                status: ErrorStatus::ok(),
                file_size,
            },
            Err(e) => FileInfoRsp {
                status: io_status(e),
                file_size: 0,
            },
        }
    }

    async fn copy_file(&self, req: CopyReq) -> CopyRsp {
        debug!(path = %req.path, new_path = %req.new_path, "copy");
        CopyRsp {
            status: match self.state.store.copy(&req.path, &req.new_path) {
                Ok(()) => ErrorStatus::ok(),
                Err(e) => io_status(e),
            },
        }
    }

    async fn move_file(&self, req: MoveReq) -> MoveRsp {
        debug!(path = %req.path, new_path = %req.new_path, "move");
        MoveRsp {
            status: match self.state.store.rename(&req.path, &req.new_path) {
                Ok(()) => ErrorStatus::ok(),
                Err(e) => io_status(e),
            },
        }
    }
}
