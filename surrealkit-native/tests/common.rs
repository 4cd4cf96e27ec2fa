//! Common test utilities shared across integration tests.

#![allow(dead_code, missing_docs)]

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use surrealkit_native::loader::{EmbeddedBundle, LoaderConfig, Linker, PlatformFacts};

pub const ARTIFACT: &[u8] = b"\x7fELF fake surrealdb payload";

/// Linker that never finds preinstalled libraries unless told to, and
/// records what it was asked to open by path.
#[derive(Default)]
pub struct FakeLinker {
    pub preinstalled: bool,
    pub fail_by_path: bool,
    pub opened: RefCell<Vec<PathBuf>>,
}

impl Linker for FakeLinker {
    type Library = Vec<u8>;

    fn open_by_name(&self, filename: &str) -> io::Result<Vec<u8>> {
        if self.preinstalled {
            Ok(filename.as_bytes().to_vec())
        } else {
            Err(io::Error::new(io::ErrorKind::NotFound, "not installed"))
        }
    }

    fn open_by_path(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.opened.borrow_mut().push(path.to_path_buf());
        if self.fail_by_path {
            return Err(io::Error::other("bad ELF header"));
        }
        fs::read(path)
    }
}

pub fn linux_facts() -> PlatformFacts {
    PlatformFacts::new("oracle corporation", "Linux", "amd64")
}

pub fn linux_config() -> LoaderConfig {
    LoaderConfig::new()
        .with_library_name("surrealdb")
        .with_platform_facts(linux_facts())
        .with_bundle(
            EmbeddedBundle::new().with("natives/linux_64/libsurrealdb.so", ARTIFACT),
        )
}
