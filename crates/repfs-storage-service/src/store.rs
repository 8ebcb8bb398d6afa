//! The local file store: a directory mirroring the DFS namespace.
//!
//! For a DFS path `p` the mirror path is `<root>/p`. Directories are
//! materialized lazily when a file is actually written. All operations open
//! handles for the shortest span covering the byte transfer.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::{DirBuilderExt, FileExt};
use std::path::{Path, PathBuf};

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a DFS path onto the mirror directory.
    pub fn mirror_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    fn ensure_parent(&self, mirror: &Path) -> io::Result<()> {
        if let Some(parent) = mirror.parent() {
            fs::DirBuilder::new()
                .recursive(true)
                .mode(0o777)
                .create(parent)?;
        }
        Ok(())
    }

    /// Recursively remove everything under the root.
    pub fn wipe(&self) -> io::Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Bytes available on the filesystem containing the working directory.
    pub fn available_space(&self) -> io::Result<i64> {
        let stat = nix::sys::statvfs::statvfs(".").map_err(io::Error::from)?;
        Ok(stat.blocks_available() as i64 * stat.block_size() as i64)
    }

    /// Create an empty file, materializing parent directories.
    pub fn create_file(&self, path: &str) -> io::Result<()> {
        let mirror = self.mirror_path(path);
        self.ensure_parent(&mirror)?;
        File::create(&mirror)?;
        Ok(())
    }

    /// Read up to `count` bytes at `offset`. An empty result means EOF.
    pub fn read_at(&self, path: &str, offset: u64, count: usize) -> io::Result<Vec<u8>> {
        let file = File::open(self.mirror_path(path))?;
        let mut buf = vec![0u8; count];
        let mut total = 0;
        while total < count {
            let n = file.read_at(&mut buf[total..], offset + total as u64)?;
            if n == 0 {
                break;
            }
            total += n;
        }
        buf.truncate(total);
        Ok(buf)
    }

    /// Write `data` at `offset` into an existing file.
    pub fn write_at(&self, path: &str, offset: u64, data: &[u8]) -> io::Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .open(self.mirror_path(path))?;
        file.write_all_at(data, offset)
    }

    /// Write `data` at `offset`, creating parents and the file as needed.
    ///
    /// Bootstrap sync lands chunks through this before the file exists
    /// locally.
    pub fn write_chunk(&self, path: &str, offset: u64, data: &[u8]) -> io::Result<()> {
        let mirror = self.mirror_path(path);
        self.ensure_parent(&mirror)?;
        let file = OpenOptions::new().write(true).create(true).open(mirror)?;
        file.write_all_at(data, offset)
    }

    /// Remove a file or directory tree. Removing an absent path succeeds.
    pub fn remove(&self, path: &str) -> io::Result<()> {
        let mirror = self.mirror_path(path);
        match fs::symlink_metadata(&mirror) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&mirror),
            Ok(_) => fs::remove_file(&mirror),
        }
    }

    /// Size of the mirror file in bytes (lstat).
    pub fn file_size(&self, path: &str) -> io::Result<u64> {
        Ok(fs::symlink_metadata(self.mirror_path(path))?.len())
    }

    /// Rename, materializing both parent chains first.
    pub fn rename(&self, path: &str, new_path: &str) -> io::Result<()> {
        let from = self.mirror_path(path);
        let to = self.mirror_path(new_path);
        self.ensure_parent(&from)?;
        self.ensure_parent(&to)?;
        fs::rename(from, to)
    }

    /// Byte-for-byte copy, materializing both parent chains first.
    pub fn copy(&self, path: &str, new_path: &str) -> io::Result<()> {
        let from = self.mirror_path(path);
        let to = self.mirror_path(new_path);
        self.ensure_parent(&from)?;
        self.ensure_parent(&to)?;
        fs::copy(from, to).map(|_| ())
    }
}
