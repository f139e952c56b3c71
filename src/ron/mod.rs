//! Utilities for loading RON files and watching directories for changes.
//!
//! This module provides a small helper for reading every RON file in a
//! directory and a filesystem watcher resource that raises a shared flag
//! when files in that directory are created, modified or removed. The
//! watcher drives hot-reloading of block definitions and settings while
//! the editor runs.

use bevy::log::warn;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// File-watcher handle for RON hot-reload.
pub struct RonWatcher {
    /// Directory being watched.
    pub path: PathBuf,
    changed: Arc<AtomicBool>,
    _watcher: Option<RecommendedWatcher>, // kept alive so events keep arriving
}

impl RonWatcher {
    /// Create a stub `RonWatcher` that does not have an active OS watcher.
    ///
    /// # Return
    /// A watcher whose flag is never raised by the OS. Useful as a fallback
    /// when watcher creation fails (for example when the directory does
    /// not exist yet).
    #[must_use]
    pub fn stub() -> Self {
        RonWatcher {
            path: PathBuf::new(),
            changed: Arc::new(AtomicBool::new(false)),
            _watcher: None,
        }
    }

    /// Return whether a change was seen since the last call, clearing the flag.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }

    /// Raise the flag by hand (forces a reload on the next check).
    pub fn mark_changed(&self) {
        self.changed.store(true, Ordering::Release);
    }
}

/// Load all `.ron` files from a directory and deserialize them into `T`.
///
/// Files are read in file-name order so later files consistently win when
/// callers merge by key.
///
/// # Arguments
/// * `path` - Directory path to scan for `.ron` files.
///
/// # Return
/// A `Vec<T>` containing all successfully deserialized items found in
/// the directory. Files that fail to parse are skipped with a warning.
#[must_use]
pub fn load_ron_files<T: DeserializeOwned>(path: impl AsRef<Path>) -> Vec<T> {
    let Ok(entries) = std::fs::read_dir(path.as_ref()) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    let mut items = Vec::new();
    for file in files {
        let content = match std::fs::read_to_string(&file) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {e}", file.display());
                continue;
            }
        };
        match ron::from_str::<T>(&content) {
            Ok(item) => items.push(item),
            Err(e) => warn!("Failed to parse {}: {e}", file.display()),
        }
    }

    items
}

/// Create a `RonWatcher` that watches a directory for changes.
///
/// # Arguments
/// * `path` - Directory path to watch for `.ron` file changes.
///
/// # Return
/// A `RonWatcher` whose flag is raised when a file under the directory is
/// created, modified or removed.
///
/// # Errors
/// Returns a `notify::Error` if the underlying file-watcher cannot be
/// created or cannot be registered for the provided path.
pub fn setup_ron_watcher(path: impl AsRef<Path>) -> Result<RonWatcher, notify::Error> {
    let path = path.as_ref();
    let changed = Arc::new(AtomicBool::new(false));
    let flag = changed.clone();
    let watched_path: PathBuf = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)) {
                    return;
                }
                let relevant = event.paths.iter().any(|p| {
                    let p_canon = std::fs::canonicalize(p).unwrap_or_else(|_| p.clone());
                    p_canon.starts_with(&watched_path)
                });
                if relevant {
                    flag.store(true, Ordering::Release);
                }
            }
            Err(e) => warn!("Watch error: {e:?}"),
        },
        Config::default(),
    )?;

    watcher.watch(path, RecursiveMode::NonRecursive)?;
    Ok(RonWatcher {
        path: path.to_path_buf(),
        changed,
        _watcher: Some(watcher),
    })
}

#[cfg(test)]
pub(crate) mod test_dir {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// Fresh, empty directory under the system temp dir.
    pub fn fresh(tag: &str) -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("castle-builder-{tag}-{}-{n}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        name: String,
    }

    #[test]
    fn loads_sorted_and_skips_bad_files() {
        let dir = test_dir::fresh("ron");
        std::fs::write(dir.join("b.ron"), r#"(name: "second")"#).unwrap();
        std::fs::write(dir.join("a.ron"), r#"(name: "first")"#).unwrap();
        std::fs::write(dir.join("c.ron"), "(name: ").unwrap();
        std::fs::write(dir.join("notes.txt"), r#"(name: "ignored")"#).unwrap();

        let items: Vec<Item> = load_ron_files(&dir);
        assert_eq!(items, vec![Item { name: "first".into() }, Item { name: "second".into() }]);
    }

    #[test]
    fn missing_directory_is_empty() {
        let items: Vec<Item> = load_ron_files("does/not/exist/anywhere");
        assert!(items.is_empty());
    }

    #[test]
    fn stub_flag_is_manual() {
        let watcher = RonWatcher::stub();
        assert!(!watcher.take_changed());
        watcher.mark_changed();
        assert!(watcher.take_changed());
        assert!(!watcher.take_changed());
    }
}
