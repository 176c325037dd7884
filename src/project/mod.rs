//! Project collaborator: where model sources live and how they are written.
//!
//! Paths handed to a [`Project`] are relative to its root (absolute paths
//! are used as they are). The bridge only reads and rewrites whole files.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Model source extensions picked up by [`FsProject::source_files`].
pub const SOURCE_EXTENSIONS: &[&str] = &["vdmrt", "vdmpp", "vdmsl"];

/// Access to the files of a model project.
pub trait Project {
    fn name(&self) -> &str;

    fn read_source(&self, path: &Path) -> io::Result<String>;

    /// Replace the content of an existing (or new) file.
    fn write_source(&mut self, path: &Path, text: &str) -> io::Result<()>;

    /// Create a new file; fails if it already exists.
    fn create_file(&mut self, path: &Path, text: &str) -> io::Result<()>;

    /// Model source files, relative to the project root, sorted.
    fn source_files(&self) -> io::Result<Vec<PathBuf>>;

    fn exists(&self, path: &Path) -> bool;
}

/// A project rooted in a directory on disk.
#[derive(Debug, Clone)]
pub struct FsProject {
    name: String,
    root: PathBuf,
}

impl FsProject {
    /// Project named after its root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, root }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl Project for FsProject {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_source(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(self.resolve(path))
    }

    fn write_source(&mut self, path: &Path, text: &str) -> io::Result<()> {
        let full = self.resolve(path);
        tracing::debug!("Writing {}", full.display());
        std::fs::write(full, text)
    }

    fn create_file(&mut self, path: &Path, text: &str) -> io::Result<()> {
        use std::io::Write;

        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)?;
        file.write_all(text.as_bytes())?;
        tracing::info!("Created {}", full.display());
        Ok(())
    }

    fn source_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = entry.map_err(io::Error::other)?;
            let path = entry.path();
            let is_source = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e));
            if entry.file_type().is_file() && is_source {
                if let Ok(relative) = path.strip_prefix(&self.root) {
                    files.push(relative.to_path_buf());
                }
            }
        }
        files.sort();
        Ok(files)
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }
}
