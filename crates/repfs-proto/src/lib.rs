//! RPC message types for the repfs naming and storage services.
//!
//! Every operation has a request and a response struct; responses carry an
//! [`ErrorStatus`] unless noted otherwise. Messages are serde structs encoded
//! with bincode (see [`wire`]); the service and method id catalogs live with
//! their modules.

pub mod common;
pub mod naming;
pub mod storage;
pub mod wire;

pub use common::{DirEntry, DiscoveredReplica, EntryKind, ErrorStatus};
