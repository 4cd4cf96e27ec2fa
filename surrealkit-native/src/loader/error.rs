//! Bootstrap error types.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use super::platform::Platform;

/// Fatal failures while making the native library callable.
///
/// `Clone` so the process-wide bootstrap outcome can be handed to every
/// caller after the single attempt.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// No bundled artifact exists for the detected platform facts.
    #[error("unsupported platform: vendor `{vendor}`, os `{os}`, arch `{arch}`")]
    UnsupportedPlatform {
        /// Lower-cased runtime vendor.
        vendor: String,
        /// Lower-cased OS name.
        os: String,
        /// Lower-cased CPU architecture.
        arch: String,
    },

    /// The bundle has no artifact at the expected location.
    #[error("couldn't find resource `{path}` for platform {platform}")]
    ResourceNotFound {
        /// Platform the artifact was resolved for.
        platform: Platform,
        /// Bundle-relative path that was looked up.
        path: String,
    },

    /// I/O failure while extracting, or link failure while loading.
    #[error("couldn't load `{path}` for platform {platform}: {source}")]
    NativeLoad {
        /// Platform the artifact was resolved for.
        platform: Platform,
        /// Bundle path or extracted file involved.
        path: String,
        /// Underlying I/O or loader error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The loader already ran; bootstrap is never retried.
    #[error("native library bootstrap was already attempted")]
    AlreadyAttempted,
}

impl LoadError {
    pub(crate) fn native_load(platform: Platform, path: impl Into<String>, source: io::Error) -> Self {
        Self::NativeLoad {
            platform,
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Platform the failure relates to, when one was resolved.
    #[must_use]
    pub const fn platform(&self) -> Option<Platform> {
        match self {
            Self::ResourceNotFound { platform, .. } | Self::NativeLoad { platform, .. } => {
                Some(*platform)
            }
            Self::UnsupportedPlatform { .. } | Self::AlreadyAttempted => None,
        }
    }
}
