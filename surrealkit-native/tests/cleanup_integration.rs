//! Drains the process-wide cleanup registry, so it runs in its own test
//! binary.

use surrealkit_native::loader::{cleanup, LoadSource, Loader};

mod common;
use common::{linux_config, FakeLinker};

#[test]
fn test_run_removes_extraction_directories() {
    let mut loader = Loader::with_linker(linux_config(), FakeLinker::default());
    let loaded = loader.load().expect("load");
    let LoadSource::Extracted { path, .. } = &loaded.source else {
        panic!("expected extracted library, got {:?}", loaded.source);
    };
    let dir = path.parent().expect("extraction dir").to_path_buf();
    assert!(path.is_file());
    assert_eq!(cleanup::pending(), vec![dir.clone()]);

    cleanup::run();

    assert!(!dir.exists(), "{} survived cleanup", dir.display());
    assert!(cleanup::pending().is_empty());

    // A second run has nothing left to do.
    cleanup::run();
    assert!(cleanup::pending().is_empty());
}
