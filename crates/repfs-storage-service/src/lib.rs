//! repfs-storage-service: a storage replica.
//!
//! Serves per-file byte operations on a local mirror directory, replicates
//! primary writes to peer replicas, and back-fills its mirror from peers at
//! startup.

pub mod bootstrap;
pub mod config;
pub mod rpc;
pub mod service;
pub mod store;

pub use config::StorageConfig;
pub use rpc::StorageRpcHandler;
pub use service::{IStorageService, StorageServiceImpl, StorageState};
pub use store::FileStore;
