//! Loopback cluster tests: one coordinator plus storage replicas over real
//! TCP, driven through the client stubs.

use std::path::PathBuf;
use std::sync::Arc;

use repfs_naming_service::{NamingRpcHandler, NamingServiceImpl, NamingState};
use repfs_net::tcp::{TcpConnector, TcpListener, TcpSocket};
use repfs_net::{RpcClient, Server};
use repfs_proto::common::EntryKind;
use repfs_proto::{naming, storage};
use repfs_storage_service::{
    bootstrap, FileStore, StorageRpcHandler, StorageServiceImpl, StorageState,
};
use repfs_stubs::{INamingStub, IStorageStub, RpcNamingStub, RpcStorageStub};
use tempfile::TempDir;

fn new_client() -> Arc<RpcClient<TcpSocket>> {
    Arc::new(RpcClient::new(Box::new(TcpConnector::new())))
}

struct Coordinator {
    endpoint: String,
    _server: Server,
}

async fn spawn_coordinator() -> Coordinator {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("127.0.0.1:{}", listener.local_port().unwrap());

    let storage = Arc::new(RpcStorageStub::new(new_client()));
    let state = NamingState::new(storage).into_arc();

    let mut server = Server::new();
    server.register_service(Box::new(NamingRpcHandler::new(Arc::new(
        NamingServiceImpl::new(state),
    ))));
    server.start(listener);

    Coordinator {
        endpoint,
        _server: server,
    }
}

struct Replica {
    endpoint: String,
    root: TempDir,
    _server: Server,
}

impl Replica {
    fn mirror(&self, path: &str) -> PathBuf {
        self.root
            .path()
            .join("storage")
            .join(path.trim_start_matches('/'))
    }
}

/// Register, sync, and serve a replica, the way the server binary does.
async fn spawn_replica(alias: &str, coordinator: &str) -> Replica {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_port().unwrap();
    let root = tempfile::tempdir().unwrap();

    let client = new_client();
    let naming = Arc::new(RpcNamingStub::new(
        coordinator.to_string(),
        Arc::clone(&client),
    ));
    let peers = Arc::new(RpcStorageStub::new(client));

    bootstrap::register(naming.as_ref(), alias, port, "127.0.0.1")
        .await
        .unwrap();

    let state = StorageState::new(
        alias,
        FileStore::new(root.path().join("storage")),
        naming,
        peers,
    )
    .into_arc();
    bootstrap::sync(&state).await.unwrap();

    let mut server = Server::new();
    server.register_service(Box::new(StorageRpcHandler::new(Arc::new(
        StorageServiceImpl::new(state),
    ))));
    server.start(listener);

    Replica {
        endpoint: format!("127.0.0.1:{port}"),
        root,
        _server: server,
    }
}

struct Cluster {
    coordinator: Coordinator,
    replicas: Vec<Replica>,
    meta: RpcNamingStub,
    data: RpcStorageStub,
}

async fn spawn_cluster(aliases: &[&str]) -> Cluster {
    let coordinator = spawn_coordinator().await;
    let mut replicas = Vec::new();
    for alias in aliases {
        replicas.push(spawn_replica(alias, &coordinator.endpoint).await);
    }
    let meta = RpcNamingStub::new(coordinator.endpoint.clone(), new_client());
    let data = RpcStorageStub::new(new_client());
    Cluster {
        coordinator,
        replicas,
        meta,
        data,
    }
}

async fn discover(cluster: &Cluster, path: &str) -> Vec<String> {
    let rsp = cluster
        .meta
        .discover(naming::DiscoverReq {
            path: path.into(),
            exclude_alias: String::new(),
        })
        .await
        .unwrap();
    assert!(rsp.status.is_ok());
    let mut aliases: Vec<String> = rsp.replicas.into_iter().map(|r| r.alias).collect();
    aliases.sort();
    aliases
}

#[tokio::test]
async fn test_create_and_discover() {
    let cluster = spawn_cluster(&["a", "b"]).await;

    let rsp = cluster
        .meta
        .create_file(naming::CreateFileReq { path: "/foo".into() })
        .await
        .unwrap();
    assert!(rsp.status.is_ok());

    assert_eq!(discover(&cluster, "/foo").await, vec!["a", "b"]);

    for replica in &cluster.replicas {
        assert!(replica.mirror("/foo").is_file());
    }
}

#[tokio::test]
async fn test_move_across_directories() {
    let cluster = spawn_cluster(&["a", "b"]).await;

    cluster
        .meta
        .create_file(naming::CreateFileReq { path: "/foo".into() })
        .await
        .unwrap();
    cluster
        .meta
        .make_directory(naming::MakeDirectoryReq { path: "/d".into() })
        .await
        .unwrap();
    let rsp = cluster
        .meta
        .move_entry(naming::MoveReq {
            path: "/foo".into(),
            new_path: "/d/foo".into(),
        })
        .await
        .unwrap();
    assert!(rsp.status.is_ok());

    let root = cluster
        .meta
        .list_directory(naming::ListDirectoryReq { path: String::new() })
        .await
        .unwrap();
    let names: Vec<&str> = root.entries.iter().map(|e| e.name.as_str()).collect();
    assert!(names.contains(&"d"));
    assert!(!names.contains(&"foo"));

    let d = cluster
        .meta
        .list_directory(naming::ListDirectoryReq { path: "/d".into() })
        .await
        .unwrap();
    assert_eq!(d.entries.len(), 1);
    assert_eq!(d.entries[0].name, "foo");
    assert_eq!(d.entries[0].kind, EntryKind::RegularFile);

    assert_eq!(discover(&cluster, "/d/foo").await, vec!["a", "b"]);

    for replica in &cluster.replicas {
        assert!(replica.mirror("/d/foo").is_file());
        assert!(!replica.mirror("/foo").exists());
    }
}

#[tokio::test]
async fn test_write_replicates_to_peer() {
    let cluster = spawn_cluster(&["a", "b"]).await;

    cluster
        .meta
        .create_file(naming::CreateFileReq { path: "/foo".into() })
        .await
        .unwrap();

    // Primary write through replica a.
    let rsp = cluster
        .data
        .write_file(
            &cluster.replicas[0].endpoint,
            storage::WriteFileReq {
                path: "/foo".into(),
                offset: 0,
                buffer: vec![0x01, 0x02, 0x03],
                is_chain_call: false,
            },
        )
        .await
        .unwrap();
    assert!(rsp.status.is_ok());

    // The bytes are on replica b once the primary returns.
    let read = cluster
        .data
        .read_file(
            &cluster.replicas[1].endpoint,
            storage::ReadFileReq {
                path: "/foo".into(),
                offset: 0,
                count: 3,
            },
        )
        .await
        .unwrap();
    assert!(read.status.is_ok());
    assert_eq!(read.buffer, vec![0x01, 0x02, 0x03]);
}

#[tokio::test]
async fn test_delete_propagates() {
    let cluster = spawn_cluster(&["a", "b"]).await;

    cluster
        .meta
        .create_file(naming::CreateFileReq { path: "/foo".into() })
        .await
        .unwrap();
    for replica in &cluster.replicas {
        assert!(replica.mirror("/foo").is_file());
    }

    let rsp = cluster
        .meta
        .delete_file(naming::DeleteReq { path: "/foo".into() })
        .await
        .unwrap();
    assert!(rsp.status.is_ok());

    let root = cluster
        .meta
        .list_directory(naming::ListDirectoryReq { path: String::new() })
        .await
        .unwrap();
    assert!(root.entries.is_empty());

    assert!(discover(&cluster, "/foo").await.is_empty());

    for replica in &cluster.replicas {
        assert!(!replica.mirror("/foo").exists());
    }
}

#[tokio::test]
async fn test_bootstrap_sync_backfills_new_replica() {
    let cluster = spawn_cluster(&["a", "b"]).await;

    cluster
        .meta
        .create_file(naming::CreateFileReq { path: "/foo".into() })
        .await
        .unwrap();

    let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    cluster
        .data
        .write_file(
            &cluster.replicas[0].endpoint,
            storage::WriteFileReq {
                path: "/foo".into(),
                offset: 0,
                buffer: content.clone(),
                is_chain_call: false,
            },
        )
        .await
        .unwrap();

    // A third replica starts fresh and pulls the file during bootstrap.
    let fresh = spawn_replica("c", &cluster.coordinator.endpoint).await;
    assert_eq!(std::fs::read(fresh.mirror("/foo")).unwrap(), content);

    // Sync does not make the new replica authoritative for the file.
    assert_eq!(discover(&cluster, "/foo").await, vec!["a", "b"]);
}

#[tokio::test]
async fn test_initialize_reports_space() {
    let cluster = spawn_cluster(&["a"]).await;

    let rsp = cluster
        .data
        .initialize(&cluster.replicas[0].endpoint, storage::InitializeReq {})
        .await
        .unwrap();
    assert!(rsp.status.is_ok());
    assert!(rsp.available_size > 0);
}

#[tokio::test]
async fn test_coordinator_copy_unsupported() {
    let cluster = spawn_cluster(&[]).await;

    let rsp = cluster
        .meta
        .copy(naming::CopyReq {
            path: "/a".into(),
            new_path: "/b".into(),
        })
        .await
        .unwrap();
    assert_eq!(rsp.status.code, repfs_types::StatusCode::UNSUPPORTED);
}
