//! Storage (replica) service RPC types.
//!
//! Service methods:
//!   1 - initialize(InitializeReq, InitializeRsp)
//!   2 - createFile(CreateFileReq, CreateFileRsp)
//!   3 - readFile(ReadFileReq, ReadFileRsp)
//!   4 - writeFile(WriteFileReq, WriteFileRsp)
//!   5 - remove(RemoveReq, RemoveRsp)
//!   6 - getFileInfo(FileInfoReq, FileInfoRsp)
//!   7 - copy(CopyReq, CopyRsp)
//!   8 - move(MoveReq, MoveRsp)

use serde::{Deserialize, Serialize};

use crate::common::ErrorStatus;

/// Service id of the storage service.
pub const STORAGE_SERVICE_ID: u16 = 2;

/// Method ids of the storage service.
pub mod method {
    pub const INITIALIZE: u16 = 1;
    pub const CREATE_FILE: u16 = 2;
    pub const READ_FILE: u16 = 3;
    pub const WRITE_FILE: u16 = 4;
    pub const REMOVE: u16 = 5;
    pub const GET_FILE_INFO: u16 = 6;
    pub const COPY: u16 = 7;
    pub const MOVE: u16 = 8;
}

// ---- Initialize ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InitializeReq {}

/// Reports the bytes available on the filesystem backing the replica.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InitializeRsp {
    pub status: ErrorStatus,
    pub available_size: i64,
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

// ---- ReadFile ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReadFileReq {
    pub path: String,
    pub offset: i64,
    pub count: i32,
}

/// `count == 0` with an OK status means EOF (or an empty read).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReadFileRsp {
    pub status: ErrorStatus,
    pub buffer: Vec<u8>,
    pub count: i32,
}

// ---- WriteFile ----

/// `is_chain_call` marks a replica-to-replica propagation; the receiver
/// writes locally and does not fan out again.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WriteFileReq {
    pub path: String,
    pub offset: i64,
    pub buffer: Vec<u8>,
    pub is_chain_call: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WriteFileRsp {
    pub status: ErrorStatus,
}

// ---- Remove ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoveReq {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoveRsp {
    pub status: ErrorStatus,
}

// ---- GetFileInfo ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileInfoReq {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileInfoRsp {
    pub status: ErrorStatus,
    pub file_size: u64,
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
