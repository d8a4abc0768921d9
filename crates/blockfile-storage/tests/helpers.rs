#![allow(dead_code)]

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use blockfile_storage::ByteStore;
use tempfile::{tempdir, NamedTempFile, TempDir};

/// An empty chain file inside its own temporary directory.
pub fn create_temp_chain_file() -> (TempDir, PathBuf, File) {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("chain.blk");
    let file = open_rw(&path);
    (temp_dir, path, file)
}

/// An anonymous chain file that disappears when dropped.
pub fn create_temp_file() -> NamedTempFile {
    NamedTempFile::new().expect("Failed to create temp file")
}

pub fn open_rw(path: &Path) -> File {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .expect("Failed to open chain file")
}

pub fn teardown(temp_dir: TempDir) {
    let path = temp_dir.path().to_path_buf();
    temp_dir.close().expect("Failed to delete temp dir");
    assert!(!path.exists(), "Chain directory should be removed");
}

/// Failure a [`FaultyStore`] injects until it is cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    None,
    /// Only the first `n` bytes of each write land.
    ShortWrite(usize),
    /// The first `n` bytes land, then the write errors.
    FailAfter(usize),
    /// Asking for the length errors.
    Probe,
}

/// In-memory store that misbehaves on demand.
pub struct FaultyStore {
    pub bytes: Vec<u8>,
    pub fault: Fault,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            fault: Fault::None,
        }
    }
}

impl ByteStore for FaultyStore {
    fn len(&self) -> io::Result<u64> {
        if self.fault == Fault::Probe {
            return Err(io::Error::other("device went away"));
        }
        ByteStore::len(&self.bytes)
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.bytes.read_at(offset, buf)
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> io::Result<usize> {
        match self.fault {
            Fault::ShortWrite(n) => self.bytes.write_at(offset, &buf[..n.min(buf.len())]),
            Fault::FailAfter(n) => {
                self.bytes.write_at(offset, &buf[..n.min(buf.len())])?;
                Err(io::Error::other("no space left on device"))
            }
            Fault::None | Fault::Probe => self.bytes.write_at(offset, buf),
        }
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        ByteStore::truncate(&mut self.bytes, len)
    }
}
