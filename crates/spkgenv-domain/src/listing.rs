use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::trace;

use crate::metadata::{PackageStore, PackageType};

/// Filters understood by [`PackageStore::list`].
///
/// Every `has_file` must exist, no `no_file` may exist, and when `types` is
/// non-empty the package's `type` must be one of them.
#[derive(Debug, Clone, Default)]
pub struct PackageQuery {
    pub types: Vec<PackageType>,
    pub has_files: Vec<PathBuf>,
    pub no_files: Vec<PathBuf>,
    pub exclude: Vec<String>,
}

impl PackageQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type(mut self, package_type: PackageType) -> Self {
        self.types.push(package_type);
        self
    }

    #[must_use]
    pub fn has_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.has_files.push(path.into());
        self
    }

    #[must_use]
    pub fn no_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.no_files.push(path.into());
        self
    }

    #[must_use]
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.exclude.push(name.into());
        self
    }

    /// Parse a `:standard:`-style type filter.
    pub fn parse_type_filter(raw: &str) -> Option<PackageType> {
        let inner = raw.strip_prefix(':')?.strip_suffix(':')?;
        if inner.is_empty() {
            return None;
        }
        Some(PackageType::parse(inner))
    }

    fn matches(&self, store: &PackageStore, name: &str) -> Result<bool> {
        if self.exclude.iter().any(|excluded| excluded == name) {
            return Ok(false);
        }
        if !self.has_files.iter().all(|file| store.has_file(name, file)) {
            return Ok(false);
        }
        if self.no_files.iter().any(|file| store.has_file(name, file)) {
            return Ok(false);
        }
        if self.types.is_empty() {
            return Ok(true);
        }
        Ok(store
            .package_type(name)?
            .is_some_and(|package_type| self.types.contains(&package_type)))
    }
}

impl PackageStore {
    /// Identifiers of every package directory matching `query`, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error when the metadata root cannot be listed or a `type`
    /// file cannot be read.
    pub fn list(&self, query: &PackageQuery) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for name in package_dirs(self.root())? {
            if query.matches(self, &name)? {
                names.push(name);
            } else {
                trace!(package = %name, "filtered out of listing");
            }
        }
        Ok(names)
    }
}

fn package_dirs(root: &Path) -> Result<Vec<String>> {
    let entries =
        fs::read_dir(root).with_context(|| format!("failed to list {}", root.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", root.display()))?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}
