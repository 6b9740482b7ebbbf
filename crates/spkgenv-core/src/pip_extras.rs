//! Packages that only exist on PyPI go into nested `pip:` lists.

use anyhow::Result;
use serde::Serialize;
use spkgenv_domain::{
    list_pip_only_packages, DevelopPattern, PackageStore, PackageType, PipRequirements,
};
use tracing::debug;

use crate::assemble::DocumentSet;
use crate::document::DocumentKind;

#[derive(Debug, Clone, Serialize)]
pub struct PipExtra {
    pub package: String,
    pub source: &'static str,
    pub targets: Vec<&'static str>,
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipExtrasReport {
    pub injected: Vec<PipExtra>,
    /// Packages that depend on the Sage runtime and cannot be installed first.
    pub skipped: Vec<String>,
}

/// Documents that receive a pip-only package's requirement lines.
pub fn pip_targets(
    package: &str,
    package_type: Option<&PackageType>,
    develop: &DevelopPattern,
) -> &'static [DocumentKind] {
    if develop.matches(package) {
        &[DocumentKind::Dev]
    } else if package_type == Some(&PackageType::Standard) {
        &[DocumentKind::Build, DocumentKind::Library]
    } else {
        &[DocumentKind::LibraryOptional]
    }
}

/// Append requirement lines of every pip-only package to its target documents.
///
/// # Errors
///
/// Returns an error when the metadata tree cannot be listed or a present
/// metadata file cannot be read.
pub fn inject_pip_extras(
    store: &PackageStore,
    ecosystem: &str,
    develop: &DevelopPattern,
    documents: &mut DocumentSet,
) -> Result<PipExtrasReport> {
    let mut report = PipExtrasReport::default();
    for package in list_pip_only_packages(store, ecosystem)? {
        if store.requires_runtime(&package)? {
            debug!(%package, "depends on the Sage runtime, not installable via pip");
            report.skipped.push(package);
            continue;
        }
        let Some(requirements) = PipRequirements::read(store, &package)? else {
            continue;
        };
        let package_type = store.package_type(&package)?;
        let targets = pip_targets(&package, package_type.as_ref(), develop);
        for line in &requirements.lines {
            for kind in targets {
                documents.get_mut(*kind).pip_requirement(line);
            }
        }
        report.injected.push(PipExtra {
            package,
            source: requirements.source.file_name(),
            targets: targets.iter().map(|kind| kind.as_str()).collect(),
            requirements: requirements.lines,
        });
    }
    Ok(report)
}
