//! Bincode encoding of message bodies.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Serialization or deserialization failure of a message body.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("encode failed: {0}")]
    Encode(#[source] bincode::Error),
    #[error("decode failed: {0}")]
    Decode(#[source] bincode::Error),
}

/// Encode a message body.
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, WireError> {
    bincode::serialize(msg).map_err(WireError::Encode)
}

/// Decode a message body.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    bincode::deserialize(bytes).map_err(WireError::Decode)
}

/// Decode a request body, mapping failures to a GENERIC status.
///
/// Used by server-side dispatch, where a malformed body is a dispatch-level
/// error rather than an operation outcome.
pub fn decode_req<T: DeserializeOwned>(bytes: &[u8]) -> repfs_types::Result<T> {
    decode(bytes).map_err(|e| {
        repfs_types::Status::with_message(repfs_types::StatusCode::GENERIC, e.to_string())
    })
}

/// Encode a response body, mapping failures to a GENERIC status.
pub fn encode_rsp<T: Serialize>(msg: &T) -> repfs_types::Result<Vec<u8>> {
    encode(msg).map_err(|e| {
        repfs_types::Status::with_message(repfs_types::StatusCode::GENERIC, e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::DiscoverReq;

    #[test]
    fn test_roundtrip() {
        let req = DiscoverReq {
            path: "/a/b".into(),
            exclude_alias: "storage-1".into(),
        };
        let bytes = encode(&req).unwrap();
        let back: DiscoverReq = decode(&bytes).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn test_decode_garbage() {
        // A truncated buffer must fail, not panic.
        let result = decode::<DiscoverReq>(&[0xFF]);
        assert!(result.is_err());
    }
}
