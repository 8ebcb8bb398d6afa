use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use repfs_types::Status;

/// Trait implemented by RPC service handlers.
///
/// Each service is identified by a numeric `service_id` and exposes methods
/// identified by `method_id`. The handler receives the observed peer address
/// (some operations derive state from it) and the raw request body, and
/// returns either a raw response body or a `Status` describing a
/// dispatch-level failure.
#[async_trait]
pub trait ServiceHandler: Send + Sync {
    fn service_id(&self) -> u16;

    /// Human-readable name (used for logging / diagnostics).
    fn service_name(&self) -> &str;

    async fn handle(
        &self,
        peer: Option<SocketAddr>,
        method_id: u16,
        request: Bytes,
    ) -> Result<Bytes, Status>;
}

/// Registry mapping service ids to their handlers.
pub struct ServiceRegistry {
    services: DashMap<u16, Box<dyn ServiceHandler>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
        }
    }

    /// Register a handler, replacing any previous one with the same id.
    pub fn register(&self, service: Box<dyn ServiceHandler>) {
        let id = service.service_id();
        self.services.insert(id, service);
    }

    pub fn get(
        &self,
        service_id: u16,
    ) -> Option<dashmap::mapref::one::Ref<'_, u16, Box<dyn ServiceHandler>>> {
        self.services.get(&service_id)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
