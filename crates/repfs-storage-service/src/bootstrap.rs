//! Replica startup: registration and the catch-up sync.
//!
//! Order matters: register first, sync before serving. A replica whose
//! registration is declined must not sync or serve.

use tracing::{debug, info, warn};

use repfs_proto::naming::{DiscoverReq, ListDirectoryReq, RegisterOutcome, RegisterReq};
use repfs_proto::storage::ReadFileReq;
use repfs_stubs::INamingStub;
use repfs_types::{make_error_msg, Result, Status, StatusCode};

use crate::service::StorageState;

/// Chunk size for pulling file contents from a peer.
pub const SYNC_CHUNK_SIZE: i32 = 4096;

/// Announce this replica to the coordinator.
///
/// Anything other than ACCEPT is an error; the caller treats it as fatal.
pub async fn register(
    naming: &dyn INamingStub,
    alias: &str,
    port: u16,
    public_hostname: &str,
) -> Result<()> {
    let rsp = naming
        .register(RegisterReq {
            server_alias: alias.to_string(),
            port: port as u32,
            public_hostname: public_hostname.to_string(),
        })
        .await?;

    match rsp.outcome {
        RegisterOutcome::Accept => {
            info!(alias, port, "registered with coordinator");
            Ok(())
        }
        RegisterOutcome::Decline => {
            make_error_msg(StatusCode::GENERIC, "coordinator declined registration")
        }
    }
}

/// Pull existing files from peers by walking the coordinator's namespace
/// depth-first.
///
/// Each file is streamed from the first peer the coordinator returns, in
/// fixed-size chunks, until a zero-count read. Files no peer holds are
/// skipped. The walk reads from peers only; the coordinator's placement
/// records are left untouched.
pub async fn sync(state: &StorageState) -> Result<()> {
    let mut stack = vec![String::new()];

    while let Some(dir) = stack.pop() {
        debug!(dir = %dir, "syncing directory");
        let entries = match state
            .naming()
            .list_directory(ListDirectoryReq { path: dir.clone() })
            .await
        {
            Ok(rsp) if rsp.status.is_ok() => rsp.entries,
            Ok(rsp) => {
                warn!(dir = %dir, code = rsp.status.code, "list failed during sync");
                continue;
            }
            Err(e) => {
                warn!(dir = %dir, error = %e, "list failed during sync");
                continue;
            }
        };

        for entry in entries {
            let child_path = format!("{}/{}", dir, entry.name);
            if entry.kind.is_directory() {
                stack.push(child_path);
            } else if let Err(e) = sync_file(state, &child_path).await {
                warn!(path = %child_path, error = %e, "file sync failed");
            }
        }
    }

    Ok(())
}

async fn sync_file(state: &StorageState, path: &str) -> Result<()> {
    let discovered = state
        .naming()
        .discover(DiscoverReq {
            path: path.to_string(),
            exclude_alias: state.alias().to_string(),
        })
        .await?;

    let Some(source) = discovered.replicas.first() else {
        debug!(path, "no peer holds this file, skipping");
        return Ok(());
    };

    info!(path, source = %source.alias, "pulling file from peer");

    let mut offset: i64 = 0;
    loop {
        let read = state
            .peers()
            .read_file(
                &source.public_address,
                ReadFileReq {
                    path: path.to_string(),
                    offset,
                    count: SYNC_CHUNK_SIZE,
                },
            )
            .await?;

        if !read.status.is_ok() {
            return Err(Status::with_message(read.status.code, read.status.description));
        }
        if read.count <= 0 {
            break;
        }

        state
            .store()
            .write_chunk(path, offset as u64, &read.buffer)
            .map_err(|e| Status::with_message(StatusCode::GENERIC, e.to_string()))?;
        offset += read.count as i64;
    }

    Ok(())
}
