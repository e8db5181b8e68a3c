use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A payload file in its own temporary directory, removed on drop.
///
/// Having a private directory keeps filesystem watchers from seeing
/// unrelated files. Helpers panic on I/O failure; they are for tests only.
pub struct PayloadFile {
    _dir: TempDir,
    path: PathBuf
}

impl PayloadFile {
    pub fn new(file_name: &str, contents: &str) -> Self {
        let dir = tempfile::tempdir()
            .unwrap_or_else(|e| panic!("failed to create temp dir: {}", e));
        let path = dir.path().join(file_name);
        let file = Self { _dir: dir, path };
        file.write(contents);
        file
    }

    pub fn json(contents: &str) -> Self {
        Self::new("config.json", contents)
    }

    pub fn yaml(contents: &str) -> Self {
        Self::new("config.yaml", contents)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file contents.
    pub fn write(&self, contents: &str) {
        std::fs::write(&self.path, contents)
            .unwrap_or_else(|e| panic!("failed to write {}: {}", self.path.display(), e));
    }

    pub fn remove(&self) {
        std::fs::remove_file(&self.path)
            .unwrap_or_else(|e| panic!("failed to remove {}: {}", self.path.display(), e));
    }
}
