//! Removal of extraction directories at process exit.
//!
//! Every directory the loader extracts into is registered here. A
//! process-exit hook drains the registry and deletes each tree, deepest
//! entries first. Failures are logged and otherwise ignored: the loaded
//! library may still be mapped, and some platforms refuse to unlink it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

static PENDING: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());

/// Schedules `dir` for removal at process exit.
pub fn register(dir: PathBuf) {
    log::debug!("scheduling {} for removal at exit", dir.display());
    PENDING
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(dir);
}

/// Directories currently scheduled for removal.
#[must_use]
pub fn pending() -> Vec<PathBuf> {
    PENDING
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Removes every registered directory now and clears the registry.
pub fn run() {
    let dirs = std::mem::take(&mut *PENDING.lock().unwrap_or_else(PoisonError::into_inner));
    for dir in dirs {
        remove_tree(&dir);
    }
}

/// Deletes `root` and everything under it, children before parents.
pub(crate) fn remove_tree(root: &Path) {
    if !root.is_dir() {
        return;
    }
    let mut paths = vec![root.to_path_buf()];
    collect(root, &mut paths);
    // Component-wise ordering puts a parent before its children.
    paths.sort_unstable_by(|a, b| b.cmp(a));
    for path in paths {
        let result = if path.is_dir() {
            fs::remove_dir(&path)
        } else {
            fs::remove_file(&path)
        };
        if let Err(err) = result {
            log::debug!("couldn't remove {}: {err}", path.display());
        }
    }
}

fn collect(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
        out.push(path.clone());
        if is_dir {
            collect(&path, out);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[ctor::dtor]
fn remove_extracted_at_exit() {
    run();
}
