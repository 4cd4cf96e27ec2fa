//! Loader integration tests.

use std::fs;
use std::io::{self, Read};

use surrealkit_native::loader::{
    cleanup, DirectoryBundle, EmbeddedBundle, LoadError, LoadSource, Loader, LoaderConfig,
    LoaderState, Platform, PlatformFacts, ResourceBundle,
};

mod common;
use common::{linux_config, FakeLinker, ARTIFACT};

/// Bundle whose artifact can't be read to the end.
#[derive(Debug)]
enum BrokenBundle {
    Locked,
    Truncated,
}

impl ResourceBundle for BrokenBundle {
    fn open(&self, _path: &str) -> io::Result<Option<Box<dyn Read + '_>>> {
        match self {
            Self::Locked => Err(io::Error::new(io::ErrorKind::PermissionDenied, "bundle locked")),
            Self::Truncated => Ok(Some(Box::new((&ARTIFACT[..4]).chain(TruncatedTail)))),
        }
    }
}

struct TruncatedTail;

impl Read for TruncatedTail {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "archive truncated"))
    }
}

#[test]
fn test_extracts_bundled_library_byte_for_byte() {
    let mut loader = Loader::with_linker(linux_config(), FakeLinker::default());
    let loaded = loader.load().expect("load");

    assert_eq!(loaded.library, ARTIFACT);
    let LoadSource::Extracted { platform, path } = &loaded.source else {
        panic!("expected extracted library, got {:?}", loaded.source);
    };
    assert_eq!(*platform, Platform::Linux64);
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("libsurrealdb.so"));
    assert_eq!(fs::read(path).expect("extracted file"), ARTIFACT);

    let dir = path.parent().expect("extraction dir").to_path_buf();
    let dir_name = dir.file_name().and_then(|n| n.to_str()).expect("dir name");
    assert!(dir_name.starts_with("surrealdb-native"));
    assert!(cleanup::pending().contains(&dir));

    assert!(matches!(
        loader.transitions(),
        [
            LoaderState::TryPreinstalled,
            LoaderState::Resolve,
            LoaderState::Extract { .. },
            LoaderState::LoadExtracted { .. },
            LoaderState::Loaded(LoadSource::Extracted { .. }),
        ]
    ));
}

#[test]
fn test_preinstalled_library_skips_extraction() {
    let linker = FakeLinker {
        preinstalled: true,
        ..FakeLinker::default()
    };
    let mut loader = Loader::with_linker(linux_config(), linker);
    let loaded = loader.load().expect("load");

    assert!(matches!(loaded.source, LoadSource::Preinstalled { .. }));
    assert_eq!(loader.transitions().len(), 2);
}

#[test]
fn test_missing_resource_fails() {
    let config = linux_config().with_bundle(EmbeddedBundle::new());
    let mut loader = Loader::with_linker(config, FakeLinker::default());

    let err = loader.load().expect_err("no artifact");
    match err {
        LoadError::ResourceNotFound { platform, path } => {
            assert_eq!(platform, Platform::Linux64);
            assert_eq!(path, "natives/linux_64/libsurrealdb.so");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(loader.state(), &LoaderState::Failed);
}

#[test]
fn test_unsupported_platform_fails_before_extraction() {
    let config = linux_config()
        .with_platform_facts(PlatformFacts::new("oracle corporation", "Linux", "riscv64"));
    let linker = FakeLinker::default();
    let mut loader = Loader::with_linker(config, linker);

    let err = loader.load().expect_err("unsupported");
    assert!(matches!(err, LoadError::UnsupportedPlatform { ref arch, .. } if arch == "riscv64"));
    assert!(!loader
        .transitions()
        .iter()
        .any(|s| matches!(s, LoaderState::Extract { .. })));
}

#[test]
fn test_link_failure_carries_platform_and_path() {
    let linker = FakeLinker {
        fail_by_path: true,
        ..FakeLinker::default()
    };
    let mut loader = Loader::with_linker(linux_config(), linker);

    let err = loader.load().expect_err("link failure");
    let LoadError::NativeLoad { platform, path, source } = err else {
        panic!("expected a native load error");
    };
    assert_eq!(platform, Platform::Linux64);
    assert!(path.ends_with("libsurrealdb.so"));
    assert_eq!(source.to_string(), "bad ELF header");
}

#[test]
fn test_loader_runs_only_once() {
    let mut loader = Loader::with_linker(linux_config(), FakeLinker::default());
    loader.load().expect("first load");
    assert!(matches!(loader.load(), Err(LoadError::AlreadyAttempted)));
}

#[test]
fn test_directory_bundle_feeds_the_loader() {
    let root = tempfile::tempdir().expect("tempdir");
    let platform_dir = root.path().join("natives").join("osx_arm64");
    fs::create_dir_all(&platform_dir).expect("mkdir");
    fs::write(platform_dir.join("libsurrealdb.dylib"), ARTIFACT).expect("write");

    let config = LoaderConfig::new()
        .with_platform_facts(PlatformFacts::new("apple", "Mac OS X", "aarch64"))
        .with_bundle(DirectoryBundle::new(root.path()))
        .with_temp_prefix("surrealkit-test");
    let mut loader = Loader::with_linker(config, FakeLinker::default());
    let loaded = loader.load().expect("load");

    assert_eq!(loaded.library, ARTIFACT);
    let LoadSource::Extracted { path, .. } = &loaded.source else {
        panic!("expected extracted library");
    };
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("libsurrealdb.dylib")
    );
}

#[test]
fn test_unreadable_bundle_fails_with_the_resource_path() {
    let config = linux_config().with_bundle(BrokenBundle::Locked);
    let linker = FakeLinker::default();
    let mut loader = Loader::with_linker(config, linker);

    let err = loader.load().expect_err("open failure");
    assert_eq!(err.platform(), Some(Platform::Linux64));
    let LoadError::NativeLoad { path, source, .. } = err else {
        panic!("expected a native load error");
    };
    assert_eq!(path, "natives/linux_64/libsurrealdb.so");
    assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
    assert_eq!(loader.state(), &LoaderState::Failed);
    assert!(!loader
        .transitions()
        .iter()
        .any(|s| matches!(s, LoaderState::LoadExtracted { .. })));
}

#[test]
fn test_failed_copy_fails_with_the_target_path() {
    let config = linux_config().with_bundle(BrokenBundle::Truncated);
    let linker = FakeLinker::default();
    let mut loader = Loader::with_linker(config, linker);

    let err = loader.load().expect_err("copy failure");
    let LoadError::NativeLoad { platform, path, source } = err else {
        panic!("expected a native load error");
    };
    assert_eq!(platform, Platform::Linux64);
    assert!(path.ends_with("libsurrealdb.so"), "{path}");
    assert_eq!(source.to_string(), "archive truncated");
    assert!(matches!(
        loader.transitions(),
        [.., LoaderState::Extract { .. }, LoaderState::Failed]
    ));
}
