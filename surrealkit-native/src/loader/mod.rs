//! Making the native library callable.
//!
//! Bootstrap runs once per process:
//!
//! 1. Try a library already installed on the platform library path.
//! 2. Otherwise resolve the current [`Platform`], extract the bundled
//!    artifact into a fresh temporary directory and load it by absolute
//!    path. The directory is removed at process exit.
//!
//! Any failure on the bundled path is fatal and is never retried.

mod bundle;
pub mod cleanup;
mod error;
mod library;
mod platform;

use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use bundle::{DirectoryBundle, EmbeddedBundle, ResourceBundle};
pub use error::LoadError;
pub use library::{Linker, NativeLibrary, SystemLinker};
pub use platform::{
    host_library_filename, ArchFamily, OsFamily, Platform, PlatformFacts, NATIVES_ROOT,
};

/// Library base name when none is configured.
pub const DEFAULT_LIBRARY_NAME: &str = "surrealdb";

/// Prefix of extraction directories when none is configured.
pub const DEFAULT_TEMP_PREFIX: &str = "surrealdb-native";

/// Environment variable pointing at a directory laid out as a bundle.
pub const NATIVES_DIR_ENV: &str = "SURREALKIT_NATIVES_DIR";

/// Environment variable overriding the library base name.
pub const LIBRARY_NAME_ENV: &str = "SURREALKIT_LIBRARY_NAME";

/// Loader inputs.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    library_name: String,
    bundle: Arc<dyn ResourceBundle>,
    temp_prefix: String,
    facts: PlatformFacts,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            library_name: DEFAULT_LIBRARY_NAME.to_string(),
            bundle: Arc::new(EmbeddedBundle::new()),
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            facts: PlatformFacts::current(),
        }
    }
}

impl LoaderConfig {
    /// Defaults: library `surrealdb`, empty embedded bundle, current
    /// platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, overridden by [`NATIVES_DIR_ENV`] and [`LIBRARY_NAME_ENV`]
    /// when set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = env::var_os(NATIVES_DIR_ENV).filter(|d| !d.is_empty()) {
            config.bundle = Arc::new(DirectoryBundle::new(dir));
        }
        if let Some(name) = env::var(LIBRARY_NAME_ENV).ok().filter(|n| !n.is_empty()) {
            config.library_name = name;
        }
        config
    }

    /// Sets the library base name, without prefix or extension.
    #[must_use]
    pub fn with_library_name(mut self, name: impl Into<String>) -> Self {
        self.library_name = name.into();
        self
    }

    /// Sets the bundle artifacts are extracted from.
    #[must_use]
    pub fn with_bundle(mut self, bundle: impl ResourceBundle + 'static) -> Self {
        self.bundle = Arc::new(bundle);
        self
    }

    /// Sets the prefix of extraction directories.
    #[must_use]
    pub fn with_temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_prefix = prefix.into();
        self
    }

    /// Overrides the detected platform facts.
    #[must_use]
    pub fn with_platform_facts(mut self, facts: PlatformFacts) -> Self {
        self.facts = facts;
        self
    }

    /// Library base name.
    #[must_use]
    pub fn library_name(&self) -> &str {
        &self.library_name
    }

    /// Platform facts used for resolution.
    #[must_use]
    pub const fn platform_facts(&self) -> &PlatformFacts {
        &self.facts
    }
}

/// Where a loaded library came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// Found on the platform library path.
    Preinstalled {
        /// File name that was opened.
        filename: String,
    },
    /// Extracted from the bundle.
    Extracted {
        /// Platform the artifact was built for.
        platform: Platform,
        /// Extracted file.
        path: PathBuf,
    },
}

/// Loader progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderState {
    /// Nothing attempted yet.
    Unloaded,
    /// Trying the platform library path.
    TryPreinstalled,
    /// Mapping platform facts to a bundled artifact.
    Resolve,
    /// Copying the artifact out of the bundle.
    Extract {
        /// Resolved platform.
        platform: Platform,
    },
    /// Loading the extracted file.
    LoadExtracted {
        /// Resolved platform.
        platform: Platform,
        /// Extracted file.
        path: PathBuf,
    },
    /// The library is loaded.
    Loaded(LoadSource),
    /// Bootstrap failed for good.
    Failed,
}

/// A successfully loaded library and where it came from.
#[derive(Debug)]
pub struct Loaded<T> {
    /// The opened library.
    pub library: T,
    /// Where it came from.
    pub source: LoadSource,
}

/// Single-use bootstrap state machine.
#[derive(Debug)]
pub struct Loader<L = SystemLinker> {
    config: LoaderConfig,
    linker: L,
    state: LoaderState,
    transitions: Vec<LoaderState>,
}

impl Loader<SystemLinker> {
    /// Loader using the platform dynamic loader.
    #[must_use]
    pub const fn new(config: LoaderConfig) -> Self {
        Self::with_linker(config, SystemLinker)
    }
}

impl<L: Linker> Loader<L> {
    /// Loader using a custom linker.
    pub const fn with_linker(config: LoaderConfig, linker: L) -> Self {
        Self {
            config,
            linker,
            state: LoaderState::Unloaded,
            transitions: Vec::new(),
        }
    }

    /// Current state.
    pub const fn state(&self) -> &LoaderState {
        &self.state
    }

    /// Every state entered so far, in order.
    pub fn transitions(&self) -> &[LoaderState] {
        &self.transitions
    }

    /// Runs the state machine to completion.
    ///
    /// # Errors
    ///
    /// - [`LoadError::UnsupportedPlatform`] if no artifact matches.
    /// - [`LoadError::ResourceNotFound`] if the bundle lacks the artifact.
    /// - [`LoadError::NativeLoad`] on extraction or link failure.
    /// - [`LoadError::AlreadyAttempted`] if this loader already ran.
    pub fn load(&mut self) -> Result<Loaded<L::Library>, LoadError> {
        if self.state != LoaderState::Unloaded {
            return Err(LoadError::AlreadyAttempted);
        }

        self.enter(LoaderState::TryPreinstalled);
        let filename = host_library_filename(&self.config.library_name);
        match self.linker.open_by_name(&filename) {
            Ok(library) => {
                let source = LoadSource::Preinstalled { filename };
                return Ok(self.finish(library, source));
            }
            Err(err) => {
                log::debug!("no preinstalled {filename} ({err}); using the bundled library");
            }
        }

        self.enter(LoaderState::Resolve);
        let platform = match Platform::resolve(&self.config.facts) {
            Ok(platform) => platform,
            Err(err) => return Err(self.fail(err)),
        };

        self.enter(LoaderState::Extract { platform });
        let path = match extract(&self.config, platform) {
            Ok(path) => path,
            Err(err) => return Err(self.fail(err)),
        };

        self.enter(LoaderState::LoadExtracted {
            platform,
            path: path.clone(),
        });
        match self.linker.open_by_path(&path) {
            Ok(library) => Ok(self.finish(library, LoadSource::Extracted { platform, path })),
            Err(source) => {
                let err = LoadError::native_load(platform, path.display().to_string(), source);
                Err(self.fail(err))
            }
        }
    }

    fn enter(&mut self, state: LoaderState) {
        log::debug!("loader: {:?} -> {state:?}", self.state);
        self.transitions.push(state.clone());
        self.state = state;
    }

    fn finish(&mut self, library: L::Library, source: LoadSource) -> Loaded<L::Library> {
        match &source {
            LoadSource::Preinstalled { filename } => {
                log::info!("loaded preinstalled native library {filename}");
            }
            LoadSource::Extracted { platform, path } => {
                log::info!("loaded bundled {platform} library from {}", path.display());
            }
        }
        self.enter(LoaderState::Loaded(source.clone()));
        Loaded { library, source }
    }

    fn fail(&mut self, err: LoadError) -> LoadError {
        log::error!("native library bootstrap failed: {err}");
        self.enter(LoaderState::Failed);
        err
    }
}

/// Copies the artifact for `platform` into a fresh temporary directory and
/// returns the extracted file's path.
fn extract(config: &LoaderConfig, platform: Platform) -> Result<PathBuf, LoadError> {
    let resource = platform.resource_path(&config.library_name);
    let mut reader = config
        .bundle
        .open(&resource)
        .map_err(|source| LoadError::native_load(platform, resource.as_str(), source))?
        .ok_or_else(|| LoadError::ResourceNotFound {
            platform,
            path: resource.clone(),
        })?;

    let dir = tempfile::Builder::new()
        .prefix(&config.temp_prefix)
        .tempdir()
        .map_err(|source| LoadError::native_load(platform, resource.as_str(), source))?
        .keep();
    cleanup::register(dir.clone());

    let target = dir.join(platform.library_filename(&config.library_name));
    let mut write = |target: &PathBuf| -> io::Result<u64> {
        let mut file = File::create(target)?;
        let copied = io::copy(&mut reader, &mut file)?;
        file.flush()?;
        Ok(copied)
    };
    match write(&target) {
        Ok(bytes) => {
            log::debug!("extracted {resource} ({bytes} bytes) to {}", target.display());
            Ok(target)
        }
        Err(source) => Err(LoadError::native_load(
            platform,
            target.display().to_string(),
            source,
        )),
    }
}

static NATIVE: OnceLock<Result<NativeLibrary, LoadError>> = OnceLock::new();

/// Loads the native library once per process.
///
/// The first call runs the [`Loader`] with `config`; later calls return the
/// same outcome and ignore their argument.
///
/// # Errors
///
/// The [`LoadError`] of the first attempt, on every call.
pub fn bootstrap(config: &LoaderConfig) -> Result<&'static NativeLibrary, LoadError> {
    NATIVE
        .get_or_init(|| {
            Loader::new(config.clone())
                .load()
                .map(|loaded| loaded.library)
        })
        .as_ref()
        .map_err(Clone::clone)
}

/// The library loaded by [`bootstrap`], if it succeeded.
#[must_use]
pub fn native_library() -> Option<&'static NativeLibrary> {
    NATIVE.get().and_then(|outcome| outcome.as_ref().ok())
}
