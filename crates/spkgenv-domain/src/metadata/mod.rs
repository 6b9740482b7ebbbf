//! Read-only access to the per-package metadata directories.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::Result;

mod text;

pub use text::{read_optional, strip_comments, tokens};
pub(crate) use text::is_package_token;

pub const TYPE_FILE: &str = "type";
pub const SPKG_CONFIGURE_FILE: &str = "spkg-configure.m4";
pub const DEPENDENCIES_FILE: &str = "dependencies";
pub const ORDER_ONLY_DEPENDENCIES_FILE: &str = "dependencies_order_only";
pub const REQUIREMENTS_FILE: &str = "requirements.txt";
pub const VERSION_REQUIREMENTS_FILE: &str = "version_requirements.txt";

/// Marker left in `spkg-configure.m4` by packages that are only importable
/// from inside the Sage library's own Python.
pub const PYTHON_PACKAGE_CHECK_MARKER: &str = "SAGE_PYTHON_PACKAGE_CHECK";

/// Dependency on the Sage runtime; such packages cannot come from PyPI first.
pub const RUNTIME_MARKER: &str = "SAGERUNTIME";

/// Relative path of the distribution mapping file for `ecosystem`.
pub fn distros_file(ecosystem: &str) -> PathBuf {
    Path::new("distros").join(format!("{ecosystem}.txt"))
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("package metadata directory {path} does not exist")]
    MissingRoot { path: PathBuf },
    #[error("{path} is not a directory")]
    NotADirectory { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PackageType {
    Base,
    Standard,
    Optional,
    Experimental,
    Other(String),
}

impl PackageType {
    pub fn parse(token: &str) -> Self {
        match token {
            "base" => Self::Base,
            "standard" => Self::Standard,
            "optional" => Self::Optional,
            "experimental" => Self::Experimental,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Base => "base",
            Self::Standard => "standard",
            Self::Optional => "optional",
            Self::Experimental => "experimental",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What `spkg-configure.m4` says about satisfying a package from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpkgConfigure {
    Missing,
    PythonPackageCheck,
    Configure,
}

impl SpkgConfigure {
    /// Packages without a usable configure check can only live inside the
    /// Sage library's environment.
    pub fn sagelib_only(self) -> bool {
        !matches!(self, SpkgConfigure::Configure)
    }
}

#[derive(Debug, Clone)]
pub struct PackageStore {
    root: PathBuf,
}

impl PackageStore {
    /// Open the metadata tree rooted at `root` (usually `build/pkgs`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when `root` is missing or not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.exists() {
            return Err(StoreError::MissingRoot { path: root });
        }
        if !root.is_dir() {
            return Err(StoreError::NotADirectory { path: root });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn has_file(&self, name: &str, relative: &Path) -> bool {
        self.package_dir(name).join(relative).is_file()
    }

    /// Read a package file, treating a missing file as empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read.
    pub fn read_file(&self, name: &str, relative: impl AsRef<Path>) -> Result<Option<String>> {
        read_optional(&self.package_dir(name).join(relative))
    }

    /// # Errors
    ///
    /// Returns an error when the `type` file exists but cannot be read.
    pub fn package_type(&self, name: &str) -> Result<Option<PackageType>> {
        let contents = self.read_file(name, TYPE_FILE)?;
        Ok(contents
            .as_deref()
            .and_then(|text| text.split_whitespace().next())
            .map(PackageType::parse))
    }

    /// Names from `distros/<ecosystem>.txt`, comments stripped.
    ///
    /// # Errors
    ///
    /// Returns an error when the mapping file exists but cannot be read.
    pub fn system_packages(&self, name: &str, ecosystem: &str) -> Result<Vec<String>> {
        let contents = self.read_file(name, distros_file(ecosystem))?;
        Ok(contents.as_deref().map(tokens).unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns an error when the configure file exists but cannot be read.
    pub fn spkg_configure(&self, name: &str) -> Result<SpkgConfigure> {
        Ok(match self.read_file(name, SPKG_CONFIGURE_FILE)? {
            None => SpkgConfigure::Missing,
            Some(text) if text.contains(PYTHON_PACKAGE_CHECK_MARKER) => {
                SpkgConfigure::PythonPackageCheck
            }
            Some(_) => SpkgConfigure::Configure,
        })
    }

    /// Whether the package's dependency declarations pull in the Sage runtime.
    ///
    /// # Errors
    ///
    /// Returns an error when a dependency file exists but cannot be read.
    pub fn requires_runtime(&self, name: &str) -> Result<bool> {
        for file in [DEPENDENCIES_FILE, ORDER_ONLY_DEPENDENCIES_FILE] {
            if let Some(contents) = self.read_file(name, file)? {
                if contents.contains(RUNTIME_MARKER) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Everything the classifier needs about one package.
    ///
    /// # Errors
    ///
    /// Returns an error when any present metadata file cannot be read.
    pub fn load(&self, name: &str, ecosystem: &str) -> Result<PackageMetadata> {
        Ok(PackageMetadata {
            name: name.to_string(),
            package_type: self.package_type(name)?,
            system_packages: self.system_packages(name, ecosystem)?,
            configure: self.spkg_configure(name)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PackageMetadata {
    pub name: String,
    pub package_type: Option<PackageType>,
    pub system_packages: Vec<String>,
    pub configure: SpkgConfigure,
}

impl PackageMetadata {
    pub fn is_standard(&self) -> bool {
        self.package_type == Some(PackageType::Standard)
    }

    pub fn sagelib_only(&self) -> bool {
        self.configure.sagelib_only()
    }
}
