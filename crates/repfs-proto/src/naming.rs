//! Naming (coordinator) service RPC types.
//!
//! Service methods:
//!   1 - register(RegisterReq, RegisterRsp)
//!   2 - discover(DiscoverReq, DiscoverRsp)
//!   3 - createFile(CreateFileReq, CreateFileRsp)
//!   4 - move(MoveReq, MoveRsp)
//!   5 - deleteFile(DeleteReq, DeleteRsp)
//!   6 - deleteDirectory(DeleteReq, DeleteRsp)
//!   7 - makeDirectory(MakeDirectoryReq, MakeDirectoryRsp)
//!   8 - listDirectory(ListDirectoryReq, ListDirectoryRsp)
//!   9 - copy(CopyReq, CopyRsp) -- reserved, always unsupported

use serde::{Deserialize, Serialize};

use crate::common::{DirEntry, DiscoveredReplica, ErrorStatus};

/// Service id of the naming service.
pub const NAMING_SERVICE_ID: u16 = 1;

/// Method ids of the naming service.
pub mod method {
    pub const REGISTER: u16 = 1;
    pub const DISCOVER: u16 = 2;
    pub const CREATE_FILE: u16 = 3;
    pub const MOVE: u16 = 4;
    pub const DELETE_FILE: u16 = 5;
    pub const DELETE_DIRECTORY: u16 = 6;
    pub const MAKE_DIRECTORY: u16 = 7;
    pub const LIST_DIRECTORY: u16 = 8;
    pub const COPY: u16 = 9;
}

// ---- Register ----

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterOutcome {
    Accept,
    Decline,
}

/// Request from a storage replica announcing itself.
///
/// The coordinator derives the replica's private address from the observed
/// peer host and `port`, and its public address from `public_hostname` and
/// `port`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegisterReq {
    pub server_alias: String,
    pub port: u32,
    pub public_hostname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRsp {
    pub outcome: RegisterOutcome,
}

// ---- Discover ----

/// Request for the replicas holding `path`.
///
/// An empty path asks for every registered replica. A replica whose alias
/// equals `exclude_alias` is omitted from the per-path result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscoverReq {
    pub path: String,
    pub exclude_alias: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscoverRsp {
    pub status: ErrorStatus,
    pub replicas: Vec<DiscoveredReplica>,
}

// ---- CreateFile ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateFileReq {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateFileRsp {
    pub status: ErrorStatus,
}

// ---- Move ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveReq {
    pub path: String,
    pub new_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveRsp {
    pub status: ErrorStatus,
}

// ---- DeleteFile / DeleteDirectory ----

/// Shared by both delete methods; the two are operationally identical.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteReq {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteRsp {
    pub status: ErrorStatus,
}

// ---- MakeDirectory ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MakeDirectoryReq {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MakeDirectoryRsp {
    pub status: ErrorStatus,
}

// ---- ListDirectory ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListDirectoryReq {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListDirectoryRsp {
    pub status: ErrorStatus,
    pub entries: Vec<DirEntry>,
}

// ---- Copy ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CopyReq {
    pub path: String,
    pub new_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CopyRsp {
    pub status: ErrorStatus,
}
