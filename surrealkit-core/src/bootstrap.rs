//! Host-facing entry points for native library bootstrap.

use surrealkit_native::loader::{self, LoaderConfig, NativeLibrary, Platform};

use crate::error::SurrealResult;

/// Identifier of the bundled artifact for the running platform, such as
/// `linux_64` or `osx_arm64`.
///
/// # Errors
///
/// `UnsupportedPlatform` when no artifact is bundled for this platform.
#[uniffi::export]
pub fn native_platform_id() -> SurrealResult<String> {
    Ok(Platform::current()?.id().to_string())
}

/// Loads the native library once per process, configured from the
/// environment, and returns where it was loaded from.
///
/// # Errors
///
/// The first attempt's failure, on every call.
#[uniffi::export]
pub fn bootstrap_native() -> SurrealResult<String> {
    Ok(bootstrap(&LoaderConfig::from_env())?.location().to_string())
}

/// Loads the native library once per process with `config`.
///
/// Later calls return the first outcome and ignore `config`.
///
/// # Errors
///
/// The first attempt's failure, on every call.
pub fn bootstrap(config: &LoaderConfig) -> SurrealResult<&'static NativeLibrary> {
    Ok(loader::bootstrap(config)?)
}
