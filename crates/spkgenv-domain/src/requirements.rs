use anyhow::Result;

use crate::listing::PackageQuery;
use crate::metadata::{
    distros_file, strip_comments, PackageStore, PackageType, REQUIREMENTS_FILE,
    VERSION_REQUIREMENTS_FILE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementSource {
    /// `requirements.txt`
    Unconditional,
    /// `version_requirements.txt`
    Versioned,
}

impl RequirementSource {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Unconditional => REQUIREMENTS_FILE,
            Self::Versioned => VERSION_REQUIREMENTS_FILE,
        }
    }
}

/// Requirement lines for a package that is only installable from PyPI.
#[derive(Debug, Clone)]
pub struct PipRequirements {
    pub package: String,
    pub source: RequirementSource,
    pub lines: Vec<String>,
}

impl PipRequirements {
    /// Read `requirements.txt`, or `version_requirements.txt` when the former
    /// is absent. Returns `None` when neither file exists.
    ///
    /// # Errors
    ///
    /// Returns an error when a present requirements file cannot be read.
    pub fn read(store: &PackageStore, package: &str) -> Result<Option<Self>> {
        for source in [RequirementSource::Unconditional, RequirementSource::Versioned] {
            if let Some(contents) = store.read_file(package, source.file_name())? {
                return Ok(Some(Self {
                    package: package.to_string(),
                    source,
                    lines: strip_comments(&contents),
                }));
            }
        }
        Ok(None)
    }
}

/// Standard and optional packages with requirement files but no mapping to
/// `ecosystem`, sorted by name.
///
/// # Errors
///
/// Returns an error when the metadata tree cannot be listed.
pub fn list_pip_only_packages(store: &PackageStore, ecosystem: &str) -> Result<Vec<String>> {
    let base = PackageQuery::new()
        .with_type(PackageType::Standard)
        .with_type(PackageType::Optional)
        .no_file(distros_file(ecosystem));
    let unconditional = base.clone().has_file(REQUIREMENTS_FILE);
    let versioned = base
        .has_file(VERSION_REQUIREMENTS_FILE)
        .no_file(REQUIREMENTS_FILE);

    let mut names = store.list(&unconditional)?;
    names.extend(store.list(&versioned)?);
    names.sort();
    Ok(names)
}
