// Chope — File-backed clip storage
//
// Resolves the well-known clip paths ("/alert.mp3", …) under a mount root.
// On the device the root is the SPIFFS mount point; on a host it can be any
// directory.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use super::{ClipStorage, ClipStream};

pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    /// Log every stored file with its size.  Used once at boot.
    pub fn list(&self) -> io::Result<Vec<(String, u64)>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            if meta.is_file() {
                files.push((entry.file_name().to_string_lossy().into_owned(), meta.len()));
            }
        }
        files.sort();
        for (name, size) in &files {
            log::info!("  {} ({} bytes)", name, size);
        }
        Ok(files)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ClipStorage for FsStorage {
    fn open(&mut self, path: &str) -> io::Result<ClipStream> {
        let file = File::open(self.resolve(path))?;
        Ok(Box::new(file))
    }
}
