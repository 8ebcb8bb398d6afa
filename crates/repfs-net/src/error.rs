use thiserror::Error;

/// Errors that can occur in the networking layer.
#[derive(Debug, Error)]
pub enum NetError {
    /// The connection was closed by the remote peer.
    #[error("connection closed")]
    ConnectionClosed,

    /// An I/O error from the underlying transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The message checksum did not match the computed CRC32C.
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// The received frame does not start with a repfs header (bad magic byte).
    #[error("invalid frame: bad magic byte {0:#04x}")]
    InvalidMagic(u8),

    /// The message size exceeds the maximum allowed.
    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// The response payload is too short to carry the dispatch envelope.
    #[error("short response: {0} bytes")]
    ShortResponse(usize),

    /// The server reported a dispatch-level failure (unknown service or
    /// method, undecodable request).
    #[error("rpc dispatch failed with code {0}")]
    Rpc(u32),

    /// The server is shutting down and not accepting new requests.
    #[error("server shutting down")]
    ShuttingDown,
}
