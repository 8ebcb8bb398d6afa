//! Types shared by both service surfaces.

use repfs_types::{Status, StatusCode};
use serde::{Deserialize, Serialize};

/// Status carried on every RPC result message.
///
/// `code == 0` means success; success carries an empty description.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorStatus {
    pub code: u32,
    pub description: String,
}

impl ErrorStatus {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::OK
    }

    /// Fold a service-layer result into a wire status.
    pub fn from_result(result: repfs_types::Result<()>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(status) => status.into(),
        }
    }
}

impl From<Status> for ErrorStatus {
    fn from(status: Status) -> Self {
        Self {
            code: status.code(),
            description: status.message().unwrap_or_default().to_string(),
        }
    }
}

/// Kind of a namespace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Directory,
    RegularFile,
}

impl EntryKind {
    pub fn is_directory(self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub kind: EntryKind,
    pub name: String,
}

/// A replica as returned by `Discover`: alias plus both endpoints.
///
/// `address` is the coordinator-facing (private) endpoint, `public_address`
/// the client-facing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredReplica {
    pub alias: String,
    pub address: String,
    pub public_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_ok() {
        let s = ErrorStatus::ok();
        assert!(s.is_ok());
        assert_eq!(s.code, 0);
        assert!(s.description.is_empty());
    }

    #[test]
    fn test_error_status_from_status() {
        let s: ErrorStatus = Status::with_message(StatusCode::NOT_FOUND, "missing").into();
        assert!(!s.is_ok());
        assert_eq!(s.code, 2);
        assert_eq!(s.description, "missing");
    }

    #[test]
    fn test_error_status_from_result() {
        assert!(ErrorStatus::from_result(Ok(())).is_ok());

        let s = ErrorStatus::from_result(Err(Status::new(StatusCode::GENERIC)));
        assert_eq!(s.code, 1);
    }

    #[test]
    fn test_entry_kind() {
        assert!(EntryKind::Directory.is_directory());
        assert!(!EntryKind::RegularFile.is_directory());
    }
}
