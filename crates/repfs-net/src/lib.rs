pub mod client;
pub mod error;
pub mod message;
pub mod server;
pub mod service;
pub mod socket;
pub mod tcp;
pub mod transport;

pub use client::RpcClient;
pub use error::NetError;
pub use message::MessageHeader;
pub use server::Server;
pub use service::{ServiceHandler, ServiceRegistry};
pub use socket::{Listener, Socket};
pub use transport::{Connector, Transport};
