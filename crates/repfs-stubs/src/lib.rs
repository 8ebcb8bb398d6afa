//! Client-side stubs for the repfs services.
//!
//! Each service has a stub trait, an RPC-backed implementation, and a
//! configurable mock whose per-method handlers can be overridden in tests.

pub mod naming_stub;
pub mod storage_stub;

mod rpc;

pub use naming_stub::{INamingStub, MockNamingStub, RpcNamingStub};
pub use storage_stub::{IStorageStub, MockStorageStub, RpcStorageStub};
