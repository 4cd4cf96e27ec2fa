//! Where bundled native artifacts are read from.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Read-only store of bundled artifacts addressed by `/`-separated paths
/// such as `natives/linux_64/libsurrealdb.so`.
pub trait ResourceBundle: Send + Sync + fmt::Debug {
    /// Opens the resource at `path`.
    ///
    /// Returns `Ok(None)` when the bundle has no such resource.
    ///
    /// # Errors
    ///
    /// Any I/O failure other than the resource being absent.
    fn open(&self, path: &str) -> io::Result<Option<Box<dyn Read + '_>>>;
}

/// Bundle backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    root: PathBuf,
}

impl DirectoryBundle {
    /// Creates a bundle rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceBundle for DirectoryBundle {
    fn open(&self, path: &str) -> io::Result<Option<Box<dyn Read + '_>>> {
        let full = path
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part));
        match File::open(&full) {
            Ok(file) => Ok(Some(Box::new(BufReader::new(file)))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Bundle compiled into the binary, typically via `include_bytes!`.
#[derive(Clone, Default)]
pub struct EmbeddedBundle {
    entries: HashMap<String, &'static [u8]>,
}

impl EmbeddedBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource.
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, bytes: &'static [u8]) -> Self {
        self.entries.insert(path.into(), bytes);
        self
    }

    /// Number of resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bundle holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for EmbeddedBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<_> = self.entries.keys().collect();
        paths.sort();
        f.debug_struct("EmbeddedBundle").field("paths", &paths).finish()
    }
}

impl ResourceBundle for EmbeddedBundle {
    fn open(&self, path: &str) -> io::Result<Option<Box<dyn Read + '_>>> {
        Ok(self
            .entries
            .get(path)
            .map(|bytes| Box::new(*bytes) as Box<dyn Read + '_>))
    }
}
