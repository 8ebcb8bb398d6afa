//! The naming service: client-facing metadata operations.
//!
//! All operations answer with a status embedded in the response message;
//! side effects on replicas are dispatched before the response returns.
//! Replica failures during placement, move, and delete fan-out are logged
//! and skipped, never surfaced — the namespace index is the source of truth
//! and replicas converge best-effort.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use repfs_proto::common::{DirEntry, DiscoveredReplica, EntryKind, ErrorStatus};
use repfs_proto::naming::{
    CopyReq, CopyRsp, CreateFileReq, CreateFileRsp, DeleteReq, DeleteRsp, DiscoverReq,
    DiscoverRsp, ListDirectoryReq, ListDirectoryRsp, MakeDirectoryReq, MakeDirectoryRsp, MoveReq,
    MoveRsp, RegisterOutcome, RegisterReq, RegisterRsp,
};
use repfs_proto::storage as storage_proto;
use repfs_stubs::IStorageStub;
use repfs_types::path::{dir_part, name_part};
use repfs_types::{make_error_msg, Result, Status, StatusCode};

use crate::placement;
use crate::registry::{ReplicaInfo, ReplicaRegistry};
use crate::tree::{Namespace, NodeKind};

/// The coordinator's RPC surface.
///
/// `register` receives the observed peer host; the remaining operations are
/// pure functions of the request and shared state.
#[async_trait]
pub trait INamingService: Send + Sync {
    async fn register(&self, peer: Option<IpAddr>, req: RegisterReq) -> RegisterRsp;
    async fn discover(&self, req: DiscoverReq) -> DiscoverRsp;
    async fn create_file(&self, req: CreateFileReq) -> CreateFileRsp;
    async fn move_entry(&self, req: MoveReq) -> MoveRsp;
    async fn delete_file(&self, req: DeleteReq) -> DeleteRsp;
    async fn delete_directory(&self, req: DeleteReq) -> DeleteRsp;
    async fn make_directory(&self, req: MakeDirectoryReq) -> MakeDirectoryRsp;
    async fn list_directory(&self, req: ListDirectoryReq) -> ListDirectoryRsp;
    async fn copy(&self, req: CopyReq) -> CopyRsp;
}

/// Shared coordinator state.
///
/// The namespace sits behind one coarse mutex; it is never held across an
/// RPC to a replica. The registry takes its own lock for reads and writes.
pub struct NamingState {
    namespace: Mutex<Namespace>,
    registry: ReplicaRegistry,
    storage: Arc<dyn IStorageStub>,
}

impl NamingState {
    pub fn new(storage: Arc<dyn IStorageStub>) -> Self {
        Self {
            namespace: Mutex::new(Namespace::new()),
            registry: ReplicaRegistry::new(),
            storage,
        }
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn registry(&self) -> &ReplicaRegistry {
        &self.registry
    }

    pub fn namespace(&self) -> &Mutex<Namespace> {
        &self.namespace
    }
}

/// Concrete implementation of [`INamingService`].
pub struct NamingServiceImpl {
    state: Arc<NamingState>,
}

impl NamingServiceImpl {
    pub fn new(state: Arc<NamingState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &Arc<NamingState> {
        &self.state
    }

    /// Detach, rename, and re-attach an index node. Returns the aliases of
    /// the replicas that must mirror the move.
    ///
    /// Moving the root fails NOT_FOUND: its empty name part never matches a
    /// child of its parent (itself).
    fn relocate_index(&self, path: &str, new_path: &str) -> Result<Vec<String>> {
        let mut ns = self.state.namespace.lock();

        let old_parent = ns.find(dir_part(path)).ok_or_else(|| {
            Status::with_message(StatusCode::NOT_FOUND, "old parent node does not exist")
        })?;
        let old_name = name_part(path);
        let src = ns.get_child(old_parent, old_name).ok_or_else(|| {
            Status::with_message(StatusCode::NOT_FOUND, format!("no entry named {old_name}"))
        })?;

        let new_name = name_part(new_path);
        let new_parent = ns.create_if_missing(dir_part(new_path), false);
        // A destination inside the moved subtree would detach it from the
        // root forever.
        if ns.is_within(src, new_parent) {
            return make_error_msg(
                StatusCode::GENERIC,
                "cannot move an entry into its own subtree",
            );
        }
        if let Some(existing) = ns.get_child(new_parent, new_name) {
            if existing != src {
                return make_error_msg(StatusCode::GENERIC, "destination already exists");
            }
        }

        ns.detach_child(old_parent, old_name);
        ns.rename(src, new_name);
        ns.attach_child(new_parent, src);
        Ok(ns.replicas(src).to_vec())
    }

    /// Shared body of the two delete operations.
    async fn remove_path(&self, path: &str) -> Result<()> {
        {
            let mut ns = self.state.namespace.lock();
            let parent = ns.find(dir_part(path)).ok_or_else(|| {
                Status::with_message(StatusCode::NOT_FOUND, "no parent directory found")
            })?;
            ns.remove_child(parent, name_part(path));
        }

        // Every registered replica gets the removal, not only the placed
        // ones: this also clears stale mirrors.
        for replica in self.state.registry.snapshot() {
            let req = storage_proto::RemoveReq {
                path: path.to_string(),
            };
            match self.state.storage.remove(&replica.private_addr, req).await {
                Ok(rsp) if rsp.status.is_ok() => {}
                Ok(rsp) => warn!(
                    alias = %replica.alias,
                    code = rsp.status.code,
                    "replica failed to remove"
                ),
                Err(e) => warn!(alias = %replica.alias, error = %e, "remove dispatch failed"),
            }
        }
        Ok(())
    }
}

fn endpoint_for(host: &IpAddr, port: u32) -> String {
    match host {
        IpAddr::V4(v4) => format!("{v4}:{port}"),
        IpAddr::V6(v6) => format!("[{v6}]:{port}"),
    }
}

fn to_discovered(info: ReplicaInfo) -> DiscoveredReplica {
    DiscoveredReplica {
        alias: info.alias,
        address: info.private_addr,
        public_address: info.public_addr,
    }
}

#[async_trait]
impl INamingService for NamingServiceImpl {
    async fn register(&self, peer: Option<IpAddr>, req: RegisterReq) -> RegisterRsp {
        let Some(host) = peer else {
            warn!(alias = %req.server_alias, "register without observable peer address");
            return RegisterRsp {
                outcome: RegisterOutcome::Decline,
            };
        };

        let private_addr = endpoint_for(&host, req.port);
        let public_addr = format!("{}:{}", req.public_hostname, req.port);
        info!(alias = %req.server_alias, %private_addr, %public_addr, "replica registered");

        self.state.registry.upsert(ReplicaInfo {
            alias: req.server_alias,
            private_addr,
            public_addr,
        });
        RegisterRsp {
            outcome: RegisterOutcome::Accept,
        }
    }

    async fn discover(&self, req: DiscoverReq) -> DiscoverRsp {
        debug!(path = %req.path, exclude = %req.exclude_alias, "discover");

        // The empty path is the bootstrap hint: every registered replica.
        if req.path.is_empty() {
            let replicas = self
                .state
                .registry
                .snapshot()
                .into_iter()
                .map(to_discovered)
                .collect();
            return DiscoverRsp {
                status: ErrorStatus::ok(),
                replicas,
            };
        }

        let aliases = {
            let ns = self.state.namespace.lock();
            match ns.find(&req.path) {
                Some(id) => ns.replicas(id).to_vec(),
                None => {
                    debug!(path = %req.path, "discover on unknown path, returning empty list");
                    return DiscoverRsp {
                        status: ErrorStatus::ok(),
                        replicas: Vec::new(),
                    };
                }
            }
        };

        let mut replicas = Vec::new();
        for alias in aliases {
            if alias == req.exclude_alias {
                continue;
            }
            match self.state.registry.get(&alias) {
                Some(info) => replicas.push(to_discovered(info)),
                None => warn!(%alias, "placed replica missing from registry"),
            }
        }
        DiscoverRsp {
            status: ErrorStatus::ok(),
            replicas,
        }
    }

    async fn create_file(&self, req: CreateFileReq) -> CreateFileRsp {
        info!(path = %req.path, "create file");
        self.state.namespace.lock().create_if_missing(&req.path, true);

        let snapshot = self.state.registry.snapshot();
        let (first, second) = match placement::pick_two(&snapshot) {
            Ok(pair) => pair,
            Err(status) => {
                warn!(path = %req.path, %status, "placement failed");
                return CreateFileRsp {
                    status: status.into(),
                };
            }
        };

        for replica in [first, second] {
            debug!(path = %req.path, alias = %replica.alias, "sending create to replica");
            let create = storage_proto::CreateFileReq {
                path: req.path.clone(),
            };
            match self
                .state
                .storage
                .create_file(&replica.private_addr, create)
                .await
            {
                Ok(rsp) if rsp.status.is_ok() => {
                    let mut ns = self.state.namespace.lock();
                    if let Some(id) = ns.find(&req.path) {
                        ns.add_replica(id, replica.alias.clone());
                    }
                    info!(path = %req.path, alias = %replica.alias, "replica placed");
                }
                Ok(rsp) => warn!(
                    path = %req.path,
                    alias = %replica.alias,
                    code = rsp.status.code,
                    desc = %rsp.status.description,
                    "replica refused create"
                ),
                Err(e) => warn!(
                    path = %req.path,
                    alias = %replica.alias,
                    error = %e,
                    "create dispatch failed"
                ),
            }
        }

        CreateFileRsp {
            status: ErrorStatus::ok(),
        }
    }

    async fn move_entry(&self, req: MoveReq) -> MoveRsp {
        info!(path = %req.path, new_path = %req.new_path, "move");

        let replicas = match self.relocate_index(&req.path, &req.new_path) {
            Ok(aliases) => aliases,
            Err(status) => {
                return MoveRsp {
                    status: status.into(),
                }
            }
        };

        for alias in replicas {
            let Some(info) = self.state.registry.get(&alias) else {
                warn!(%alias, "placed replica missing from registry");
                continue;
            };
            let mv = storage_proto::MoveReq {
                path: req.path.clone(),
                new_path: req.new_path.clone(),
            };
            match self.state.storage.move_file(&info.private_addr, mv).await {
                Ok(rsp) if rsp.status.is_ok() => {}
                Ok(rsp) => warn!(%alias, code = rsp.status.code, "replica failed to move"),
                Err(e) => warn!(%alias, error = %e, "move dispatch failed"),
            }
        }

        MoveRsp {
            status: ErrorStatus::ok(),
        }
    }

    async fn delete_file(&self, req: DeleteReq) -> DeleteRsp {
        info!(path = %req.path, "delete file");
        DeleteRsp {
            status: ErrorStatus::from_result(self.remove_path(&req.path).await),
        }
    }

    async fn delete_directory(&self, req: DeleteReq) -> DeleteRsp {
        info!(path = %req.path, "delete directory");
        DeleteRsp {
            status: ErrorStatus::from_result(self.remove_path(&req.path).await),
        }
    }

    async fn make_directory(&self, req: MakeDirectoryReq) -> MakeDirectoryRsp {
        info!(path = %req.path, "make directory");
        self.state
            .namespace
            .lock()
            .create_if_missing(&req.path, false);
        MakeDirectoryRsp {
            status: ErrorStatus::ok(),
        }
    }

    async fn list_directory(&self, req: ListDirectoryReq) -> ListDirectoryRsp {
        debug!(path = %req.path, "list directory");
        let ns = self.state.namespace.lock();
        match ns.find(&req.path) {
            None => ListDirectoryRsp {
                status: Status::with_message(StatusCode::NOT_FOUND, "no such directory").into(),
                entries: Vec::new(),
            },
            Some(id) => {
                let entries = ns
                    .entries(id)
                    .into_iter()
                    .map(|(name, kind)| DirEntry {
                        kind: match kind {
                            NodeKind::Directory => EntryKind::Directory,
                            NodeKind::File => EntryKind::RegularFile,
                        },
                        name,
                    })
                    .collect();
                ListDirectoryRsp {
                    status: ErrorStatus::ok(),
                    entries,
                }
            }
        }
    }

    async fn copy(&self, req: CopyReq) -> CopyRsp {
        warn!(path = %req.path, "copy requested but unsupported");
        CopyRsp {
            status: Status::with_message(
                StatusCode::UNSUPPORTED,
                "copy is not supported by the naming service",
            )
            .into(),
        }
    }
}
