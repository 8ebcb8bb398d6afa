//! repfs-naming-service: the metadata coordinator.
//!
//! Holds the in-memory namespace index and the replica registry, places new
//! files on two replicas, and fans metadata side effects out to replicas.
//! The coordinator persists nothing; a restart empties the namespace.

pub mod config;
pub mod placement;
pub mod registry;
pub mod rpc;
pub mod service;
pub mod tree;

pub use config::NamingConfig;
pub use registry::{ReplicaInfo, ReplicaRegistry};
pub use rpc::NamingRpcHandler;
pub use service::{INamingService, NamingServiceImpl, NamingState};
