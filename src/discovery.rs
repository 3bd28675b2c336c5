//! Finding the file to rewrite and writing it back.

use crate::error::MockableError;
use crate::parser::package_name;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

lazy_static! {
    static ref BUILD_IGNORE: Regex =
        Regex::new(r"^//\s*(?:go:build\s+ignore|\+build\s+ignore)\s*$").unwrap();
}

/// The file picked for rewriting, read into memory
#[derive(Debug, Clone)]
pub struct Target {
    pub path: PathBuf,
    pub source: String,
    pub package: String,
}

impl Target {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Replace the file's contents. The new text goes to a temporary sibling
    /// that is renamed over the original, keeping its permissions.
    pub fn write(&self, contents: &str) -> Result<(), MockableError> {
        let tmp_name = format!(".{}.tmp.{}", self.file_name(), std::process::id());
        let tmp_path = self.path.with_file_name(tmp_name);

        fs::write(&tmp_path, contents).map_err(|e| MockableError::io(&tmp_path, e))?;
        if let Ok(metadata) = fs::metadata(&self.path) {
            fs::set_permissions(&tmp_path, metadata.permissions())
                .map_err(|e| MockableError::io(&tmp_path, e))?;
        }
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(MockableError::io(&self.path, e));
        }
        debug!(path = %self.path.display(), bytes = contents.len(), "wrote file");
        Ok(())
    }
}

/// Locate `file_name` among the Go files of `dir` and check that the
/// directory holds a single package.
///
/// Test files and files excluded with a `//go:build ignore` constraint are
/// not part of the package and are not looked at.
pub fn locate(dir: &Path, file_name: &str) -> Result<Target, MockableError> {
    let mut packages = BTreeSet::new();
    let mut target = None;

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "go"))
    {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy();
        if name.ends_with("_test.go") {
            continue;
        }

        let source = fs::read_to_string(path).map_err(|e| MockableError::io(path, e))?;
        if is_build_ignored(&source) {
            debug!(path = %path.display(), "skipping build-ignored file");
            continue;
        }
        let package = package_name(&source);
        debug!(path = %path.display(), package = ?package, "scanned");

        if let Some(package) = &package {
            packages.insert(package.clone());
        }
        if name == file_name {
            target = Some((path.to_path_buf(), source, package));
        }
    }

    if packages.len() > 1 {
        return Err(MockableError::MultiplePackages {
            packages: packages.into_iter().collect(),
        });
    }

    let Some((path, source, package)) = target else {
        return Err(MockableError::FileNotFound {
            name: file_name.to_string(),
            dir: dir.to_path_buf(),
        });
    };
    Ok(Target {
        path,
        source,
        package: package.unwrap_or_default(),
    })
}

/// Whether a build constraint in the file header excludes the file from
/// every build
fn is_build_ignored(source: &str) -> bool {
    source
        .lines()
        .take_while(|line| !line.trim_start().starts_with("package "))
        .any(|line| BUILD_IGNORE.is_match(line.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_ignore_header() {
        assert!(is_build_ignored("//go:build ignore\n\npackage main\n"));
        assert!(is_build_ignored("// +build ignore\n\npackage main\n"));
        assert!(!is_build_ignored("//go:build linux\n\npackage main\n"));
        // Only the header counts
        assert!(!is_build_ignored("package main\n\n//go:build ignore\n"));
    }
}
