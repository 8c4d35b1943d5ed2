//! Recursive discovery of C++ source and header files.
//!
//! Directories are walked depth-first with entries sorted by name so that
//! the resulting file list (and everything downstream of it) is
//! deterministic. Unreadable entries are skipped; only a failed stat of a
//! top-level input path is fatal.

use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::ScanError;

const CPP_EXTENSIONS: &[&str] = &["cpp", "h", "hpp", "cc", "cxx", "hxx"];

/// Finds C++ files under a set of input paths, honoring directory
/// exclusions.
#[derive(Debug)]
pub struct Scanner {
    excludes: Vec<String>,
}

impl Scanner {
    pub fn new(excludes: Vec<String>) -> Self {
        Self { excludes }
    }

    /// Scan every input path in order and return absolute paths of C++
    /// files, deduplicated, first seen wins.
    pub fn scan_paths(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
        let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
        let mut files = Vec::new();

        for path in paths {
            let mut found = Vec::new();
            self.scan_path(path, &mut found)?;
            for file in found {
                let abs = absolutize(&file);
                if seen.insert(abs.clone()) {
                    files.push(abs);
                }
            }
        }

        Ok(files)
    }

    fn scan_path(&self, path: &Path, out: &mut Vec<PathBuf>) -> Result<(), ScanError> {
        let meta = fs::metadata(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if !meta.is_dir() {
            if is_cpp_file(path) {
                out.push(path.to_path_buf());
            }
            return Ok(());
        }

        self.walk_dir(path, out);
        Ok(())
    }

    /// Tolerant recursive walk: directory read failures skip the subtree.
    fn walk_dir(&self, dir: &Path, out: &mut Vec<PathBuf>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("skipping unreadable directory {}: {e}", dir.display());
                return;
            }
        };

        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_dir() {
                if !self.should_exclude(&path) {
                    self.walk_dir(&path, out);
                }
            } else if is_cpp_file(&path) && !self.should_exclude(&path) {
                out.push(path);
            }
        }
    }

    /// A path is excluded when its basename equals an exclusion, when the
    /// exclusion appears as an interior path component, or when the path
    /// ends with a separator followed by the exclusion.
    fn should_exclude(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        let base = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        self.excludes.iter().any(|exclude| {
            base == exclude
                || text.contains(&format!("{MAIN_SEPARATOR}{exclude}{MAIN_SEPARATOR}"))
                || text.ends_with(&format!("{MAIN_SEPARATOR}{exclude}"))
        })
    }
}

fn is_cpp_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| CPP_EXTENSIONS.contains(&e.as_str()))
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
