//! File transfer to and from a guest.
//!
//! The CPI only needs whole-file download and upload of small settings files.
//! How the bytes travel (SSH, a mounted disk image, a staging directory) is up
//! to the [`FileTransfer`] implementation.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// Whole-file access to a guest's filesystem.
pub trait FileTransfer: Send + Sync {
    /// Read the full contents of `path` on the guest.
    fn download(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Replace the contents of `path` on the guest.
    fn upload(&self, path: &str, contents: &[u8]) -> io::Result<()>;
}

/// Guest filesystem exposed as a directory on the host.
///
/// Guest path `/var/vcap/bosh/user_data.json` maps to
/// `<root>/var/vcap/bosh/user_data.json`. Useful for a mounted guest disk or a
/// staging tree that is baked into an image.
#[derive(Debug, Clone)]
pub struct LocalFileTransfer {
    root: PathBuf,
}

impl LocalFileTransfer {
    /// Create a transfer rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Host directory standing in for the guest's `/`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a guest path to its host location.
    ///
    /// Rejects paths that would escape the root.
    fn resolve(&self, guest_path: &str) -> io::Result<PathBuf> {
        let mut resolved = self.root.clone();
        for component in Path::new(guest_path).components() {
            match component {
                Component::RootDir | Component::CurDir => {}
                Component::Normal(part) => resolved.push(part),
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("guest path escapes transfer root: {}", guest_path),
                    ));
                }
            }
        }

        if resolved == self.root {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("guest path does not name a file: {}", guest_path),
            ));
        }

        Ok(resolved)
    }
}

impl FileTransfer for LocalFileTransfer {
    fn download(&self, path: &str) -> io::Result<Vec<u8>> {
        let local = self.resolve(path)?;
        tracing::debug!(guest_path = %path, local = %local.display(), "reading guest file");
        fs::read(&local)
    }

    fn upload(&self, path: &str, contents: &[u8]) -> io::Result<()> {
        let local = self.resolve(path)?;
        let parent = local
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
        fs::create_dir_all(parent)?;

        // Write next to the target and rename so readers never see a torn file.
        let mut staged = tempfile::NamedTempFile::new_in(parent)?;
        staged.write_all(contents)?;
        staged.as_file().sync_all()?;
        staged.persist(&local).map_err(|e| e.error)?;

        tracing::debug!(
            guest_path = %path,
            local = %local.display(),
            bytes = contents.len(),
            "wrote guest file"
        );
        Ok(())
    }
}

/// Guest filesystem held in memory.
///
/// Useful for rendering a document without shipping it anywhere.
#[derive(Debug, Default)]
pub struct MemoryFileTransfer {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryFileTransfer {
    /// Create an empty in-memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents of `path`, if written.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().get(path).cloned()
    }

    /// Number of files held.
    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    /// Whether no file has been written.
    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }
}

impl FileTransfer for MemoryFileTransfer {
    fn download(&self, path: &str) -> io::Result<Vec<u8>> {
        self.get(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such file: {}", path))
        })
    }

    fn upload(&self, path: &str, contents: &[u8]) -> io::Result<()> {
        self.files.lock().insert(path.to_string(), contents.to_vec());
        Ok(())
    }
}
