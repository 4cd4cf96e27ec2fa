//! Environment overrides live in their own test binary: the process
//! environment is shared by every test in a binary.

use std::env;
use std::fs;

use surrealkit_native::loader::{
    LoadSource, Loader, LoaderConfig, Platform, DEFAULT_LIBRARY_NAME, LIBRARY_NAME_ENV,
    NATIVES_DIR_ENV,
};

mod common;
use common::{linux_facts, FakeLinker, ARTIFACT};

#[test]
fn test_from_env_reads_natives_dir_and_library_name() {
    let root = tempfile::tempdir().expect("tempdir");
    let platform_dir = root.path().join("natives").join("linux_64");
    fs::create_dir_all(&platform_dir).expect("mkdir");
    fs::write(platform_dir.join("libcustom.so"), ARTIFACT).expect("write");

    env::remove_var(NATIVES_DIR_ENV);
    env::set_var(LIBRARY_NAME_ENV, "");
    assert_eq!(LoaderConfig::from_env().library_name(), DEFAULT_LIBRARY_NAME);

    env::set_var(NATIVES_DIR_ENV, root.path());
    env::set_var(LIBRARY_NAME_ENV, "custom");
    let config = LoaderConfig::from_env().with_platform_facts(linux_facts());
    env::remove_var(NATIVES_DIR_ENV);
    env::remove_var(LIBRARY_NAME_ENV);

    assert_eq!(config.library_name(), "custom");
    let mut loader = Loader::with_linker(config, FakeLinker::default());
    let loaded = loader.load().expect("load from the configured directory");

    assert_eq!(loaded.library, ARTIFACT);
    let LoadSource::Extracted { platform, path } = &loaded.source else {
        panic!("expected extracted library, got {:?}", loaded.source);
    };
    assert_eq!(*platform, Platform::Linux64);
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("libcustom.so"));
}
