//! Raw dynamic-loader bindings, resolved at compile time via `cfg`.
//!
//! On Unix targets the symbols come from the platform `dlopen` family. On
//! Windows they come from `kernel32` (`LoadLibraryW` and friends). Other
//! targets have no dynamic loader and every open fails.
//!
//! This is the **only** file in the crate that contains `unsafe` code or C
//! types; [`RawLibrary`] is the safe owner the rest of the loader uses.

use std::ffi::{c_void, CStr, OsStr};
use std::io;
use std::ptr::NonNull;

/// An open dynamic library. Closed when dropped.
pub(crate) struct RawLibrary {
    handle: NonNull<c_void>,
}

// Safety: loader handles are process-global tokens; `dlsym`/`GetProcAddress`
// are thread-safe, and the handle is only closed once, from `Drop`.
unsafe impl Send for RawLibrary {}
unsafe impl Sync for RawLibrary {}

impl RawLibrary {
    /// Opens a library by bare file name (searched on the platform library
    /// path) or by path.
    pub(crate) fn open(name: &OsStr) -> io::Result<Self> {
        imp::open(name).map(|handle| Self { handle })
    }

    /// Looks up an exported symbol.
    pub(crate) fn symbol(&self, name: &CStr) -> Option<NonNull<c_void>> {
        imp::symbol(self.handle, name)
    }
}

impl Drop for RawLibrary {
    fn drop(&mut self) {
        imp::close(self.handle);
    }
}

// ── Unix backend ────────────────────────────────────────────────────────

#[cfg(unix)]
mod imp {
    use std::ffi::{c_char, c_int, c_void, CStr, CString, OsStr};
    use std::io;
    use std::os::unix::ffi::OsStrExt;
    use std::ptr::NonNull;

    const RTLD_NOW: c_int = 2;
    #[cfg(any(target_os = "linux", target_os = "android"))]
    const RTLD_LOCAL: c_int = 0;
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    const RTLD_LOCAL: c_int = 4;

    #[cfg_attr(all(target_os = "linux", target_env = "gnu"), link(name = "dl"))]
    extern "C" {
        fn dlopen(filename: *const c_char, flag: c_int) -> *mut c_void;
        fn dlsym(handle: *mut c_void, symbol: *const c_char) -> *mut c_void;
        fn dlclose(handle: *mut c_void) -> c_int;
        fn dlerror() -> *mut c_char;
    }

    pub(super) fn open(name: &OsStr) -> io::Result<NonNull<c_void>> {
        let name = CString::new(name.as_bytes()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "library name contains a NUL byte")
        })?;
        let handle = unsafe { dlopen(name.as_ptr(), RTLD_NOW | RTLD_LOCAL) };
        NonNull::new(handle).ok_or_else(last_error)
    }

    pub(super) fn symbol(handle: NonNull<c_void>, name: &CStr) -> Option<NonNull<c_void>> {
        NonNull::new(unsafe { dlsym(handle.as_ptr(), name.as_ptr()) })
    }

    pub(super) fn close(handle: NonNull<c_void>) {
        unsafe {
            dlclose(handle.as_ptr());
        }
    }

    fn last_error() -> io::Error {
        // The message is thread-local and valid until the next dl* call on
        // this thread, so it is copied out immediately.
        let msg = unsafe {
            let ptr = dlerror();
            if ptr.is_null() {
                "unknown dynamic loader error".to_string()
            } else {
                CStr::from_ptr(ptr).to_string_lossy().into_owned()
            }
        };
        io::Error::other(msg)
    }
}

// ── Windows backend ─────────────────────────────────────────────────────

#[cfg(windows)]
mod imp {
    use std::ffi::{c_char, c_void, CStr, OsStr};
    use std::io;
    use std::os::windows::ffi::OsStrExt;
    use std::ptr::NonNull;

    type Module = *mut c_void;

    extern "system" {
        fn LoadLibraryW(file_name: *const u16) -> Module;
        fn GetProcAddress(module: Module, proc_name: *const c_char) -> *mut c_void;
        fn FreeLibrary(module: Module) -> i32;
    }

    pub(super) fn open(name: &OsStr) -> io::Result<NonNull<c_void>> {
        let wide: Vec<u16> = name.encode_wide().chain(std::iter::once(0)).collect();
        if wide[..wide.len() - 1].contains(&0) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "library name contains a NUL character",
            ));
        }
        let handle = unsafe { LoadLibraryW(wide.as_ptr()) };
        NonNull::new(handle).ok_or_else(io::Error::last_os_error)
    }

    pub(super) fn symbol(handle: NonNull<c_void>, name: &CStr) -> Option<NonNull<c_void>> {
        NonNull::new(unsafe { GetProcAddress(handle.as_ptr(), name.as_ptr()) })
    }

    pub(super) fn close(handle: NonNull<c_void>) {
        unsafe {
            FreeLibrary(handle.as_ptr());
        }
    }
}

// ── No dynamic loader (wasm32 and friends) ──────────────────────────────

#[cfg(not(any(unix, windows)))]
mod imp {
    use std::ffi::{c_void, CStr, OsStr};
    use std::io;
    use std::ptr::NonNull;

    pub(super) fn open(_name: &OsStr) -> io::Result<NonNull<c_void>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "dynamic loading is not available on this target",
        ))
    }

    pub(super) fn symbol(_handle: NonNull<c_void>, _name: &CStr) -> Option<NonNull<c_void>> {
        None
    }

    pub(super) fn close(_handle: NonNull<c_void>) {}
}
