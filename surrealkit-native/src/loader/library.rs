//! Opening dynamic libraries.

use std::ffi::{c_void, CString, OsStr};
use std::fmt;
use std::io;
use std::path::Path;
use std::ptr::NonNull;

use crate::ffi::RawLibrary;

/// Something that can open dynamic libraries.
///
/// [`SystemLinker`] uses the platform loader; tests substitute a fake to
/// drive the [`Loader`](super::Loader) state machine.
pub trait Linker {
    /// The opened library.
    type Library;

    /// Opens a library by file name, searching the platform library path.
    ///
    /// # Errors
    ///
    /// When the platform loader can't find or link the library.
    fn open_by_name(&self, filename: &str) -> io::Result<Self::Library>;

    /// Opens a library from an absolute path.
    ///
    /// # Errors
    ///
    /// When the platform loader can't link the file.
    fn open_by_path(&self, path: &Path) -> io::Result<Self::Library>;
}

/// The platform dynamic loader.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLinker;

impl Linker for SystemLinker {
    type Library = NativeLibrary;

    fn open_by_name(&self, filename: &str) -> io::Result<NativeLibrary> {
        NativeLibrary::open(OsStr::new(filename), filename.to_string())
    }

    fn open_by_path(&self, path: &Path) -> io::Result<NativeLibrary> {
        NativeLibrary::open(path.as_os_str(), path.display().to_string())
    }
}

/// A loaded native library. Unloaded when dropped.
pub struct NativeLibrary {
    raw: RawLibrary,
    location: String,
}

impl NativeLibrary {
    fn open(name: &OsStr, location: String) -> io::Result<Self> {
        let raw = RawLibrary::open(name)?;
        Ok(Self { raw, location })
    }

    /// File name or path the library was opened from.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Address of the exported symbol `name`, if present.
    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<NonNull<c_void>> {
        let name = CString::new(name).ok()?;
        self.raw.symbol(&name)
    }

    /// Whether the library exports `name`.
    #[must_use]
    pub fn has_symbol(&self, name: &str) -> bool {
        self.symbol(name).is_some()
    }
}

impl fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_fails_to_open() {
        let err = SystemLinker
            .open_by_name("libsurrealkit-definitely-missing.so")
            .expect_err("missing library");
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_nul_in_name_is_rejected() {
        let err = SystemLinker.open_by_name("bad\0name").expect_err("nul");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
