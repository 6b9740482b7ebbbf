//! Bucket packages by type and by whether the environment can provide them.

use std::fmt;

use anyhow::Result;
use indexmap::IndexSet;
use serde::Serialize;
use tracing::debug;

use crate::listing::PackageQuery;
use crate::metadata::{
    distros_file, is_package_token, tokens, PackageMetadata, PackageStore, PackageType,
    DEPENDENCIES_FILE,
};

pub const DEVELOP_PACKAGE: &str = "_develop";
pub const BOOTSTRAP_PACKAGE: &str = "_bootstrap";
pub const EXCLUDED_PACKAGES: &[&str] = &[BOOTSTRAP_PACKAGE, "_sagemath"];

/// Packages treated as development-only tooling: `_develop` and the
/// identifiers on the first line of its `dependencies`.
#[derive(Debug, Clone, Default)]
pub struct DevelopPattern {
    members: IndexSet<String>,
}

impl DevelopPattern {
    /// # Errors
    ///
    /// Returns an error when `_develop/dependencies` exists but cannot be read.
    pub fn load(store: &PackageStore) -> Result<Self> {
        let mut members = IndexSet::new();
        members.insert(DEVELOP_PACKAGE.to_string());
        if let Some(contents) = store.read_file(DEVELOP_PACKAGE, DEPENDENCIES_FILE)? {
            if let Some(first) = contents.lines().next() {
                members.extend(
                    tokens(first)
                        .into_iter()
                        .filter(|token| is_package_token(token)),
                );
            }
        }
        Ok(Self { members })
    }

    pub fn from_members<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }
}

/// The bootstrap group: the `_bootstrap` pseudo-package itself, whose
/// distribution mapping lists the tools `./bootstrap` needs.
pub fn bootstrap_group(store: &PackageStore) -> IndexSet<String> {
    let mut group = IndexSet::new();
    if store.package_dir(BOOTSTRAP_PACKAGE).is_dir() {
        group.insert(BOOTSTRAP_PACKAGE.to_string());
    }
    group
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageGroup {
    Standard,
    Optional,
    SagelibStandard,
    SagelibOptional,
    Develop,
    Bootstrap,
}

impl PackageGroup {
    pub const ALL: [PackageGroup; 6] = [
        PackageGroup::Standard,
        PackageGroup::Bootstrap,
        PackageGroup::SagelibStandard,
        PackageGroup::Optional,
        PackageGroup::SagelibOptional,
        PackageGroup::Develop,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Optional => "optional",
            Self::SagelibStandard => "sagelib-standard",
            Self::SagelibOptional => "sagelib-optional",
            Self::Develop => "develop",
            Self::Bootstrap => "bootstrap",
        }
    }

    /// Bucket for a package that has at least one system package name.
    ///
    /// The develop pattern wins over the type; the type then decides between
    /// the standard and optional side.
    pub fn select(meta: &PackageMetadata, develop: &DevelopPattern) -> Self {
        if develop.matches(&meta.name) {
            return Self::Develop;
        }
        match (meta.is_standard(), meta.sagelib_only()) {
            (true, true) => Self::SagelibStandard,
            (true, false) => Self::Standard,
            (false, true) => Self::SagelibOptional,
            (false, false) => Self::Optional,
        }
    }
}

impl fmt::Display for PackageGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ClassifiedPackage {
    pub name: String,
    pub package_type: Option<PackageType>,
    pub sagelib_only: bool,
    pub group: PackageGroup,
}

impl ClassifiedPackage {
    /// `<pkg>:<type>:<yes|no>` as echoed in verbose diagnostics.
    pub fn diagnostic_line(&self) -> String {
        format!(
            "{}:{}:{}",
            self.name,
            self.package_type
                .as_ref()
                .map_or("", PackageType::as_str),
            if self.sagelib_only { "yes" } else { "no" }
        )
    }
}

/// The six package groups produced by one classification pass.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub standard: IndexSet<String>,
    pub optional: IndexSet<String>,
    pub sagelib_standard: IndexSet<String>,
    pub sagelib_optional: IndexSet<String>,
    pub develop: IndexSet<String>,
    pub bootstrap: IndexSet<String>,
    pub packages: Vec<ClassifiedPackage>,
}

impl Classification {
    pub fn group(&self, group: PackageGroup) -> &IndexSet<String> {
        match group {
            PackageGroup::Standard => &self.standard,
            PackageGroup::Optional => &self.optional,
            PackageGroup::SagelibStandard => &self.sagelib_standard,
            PackageGroup::SagelibOptional => &self.sagelib_optional,
            PackageGroup::Develop => &self.develop,
            PackageGroup::Bootstrap => &self.bootstrap,
        }
    }

    fn group_mut(&mut self, group: PackageGroup) -> &mut IndexSet<String> {
        match group {
            PackageGroup::Standard => &mut self.standard,
            PackageGroup::Optional => &mut self.optional,
            PackageGroup::SagelibStandard => &mut self.sagelib_standard,
            PackageGroup::SagelibOptional => &mut self.sagelib_optional,
            PackageGroup::Develop => &mut self.develop,
            PackageGroup::Bootstrap => &mut self.bootstrap,
        }
    }

    /// Record `meta` in its bucket. Packages without system names are skipped.
    pub fn insert(&mut self, meta: &PackageMetadata, develop: &DevelopPattern) -> Option<PackageGroup> {
        if meta.system_packages.is_empty() {
            debug!(package = %meta.name, "no system packages, skipping");
            return None;
        }
        let group = PackageGroup::select(meta, develop);
        self.group_mut(group).insert(meta.name.clone());
        self.packages.push(ClassifiedPackage {
            name: meta.name.clone(),
            package_type: meta.package_type.clone(),
            sagelib_only: meta.sagelib_only(),
            group,
        });
        Some(group)
    }
}

/// Classify every package that maps to `ecosystem`.
///
/// # Errors
///
/// Returns an error when the metadata tree cannot be listed or a present
/// metadata file cannot be read.
pub fn classify_packages(
    store: &PackageStore,
    ecosystem: &str,
    develop: &DevelopPattern,
) -> Result<Classification> {
    let mut query = PackageQuery::new().has_file(distros_file(ecosystem));
    for excluded in EXCLUDED_PACKAGES {
        query = query.exclude(*excluded);
    }

    let mut classification = Classification {
        bootstrap: bootstrap_group(store),
        ..Classification::default()
    };
    for name in store.list(&query)? {
        let meta = store.load(&name, ecosystem)?;
        classification.insert(&meta, develop);
    }
    Ok(classification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::testing::write_pkg_file;
    use crate::metadata::SpkgConfigure;

    fn meta(name: &str, package_type: &str, configure: SpkgConfigure) -> PackageMetadata {
        PackageMetadata {
            name: name.to_string(),
            package_type: Some(PackageType::parse(package_type)),
            system_packages: vec![name.to_string()],
            configure,
        }
    }

    #[test]
    fn develop_pattern_takes_precedence_over_type() {
        let develop = DevelopPattern::from_members(["_develop", "pytest"]);
        let pkg = meta("pytest", "standard", SpkgConfigure::Configure);
        assert_eq!(PackageGroup::select(&pkg, &develop), PackageGroup::Develop);
        let pkg = meta("pytest", "optional", SpkgConfigure::Missing);
        assert_eq!(PackageGroup::select(&pkg, &develop), PackageGroup::Develop);
    }

    #[test]
    fn type_and_configure_check_choose_the_bucket() {
        let develop = DevelopPattern::default();
        let cases = [
            ("gmp", "standard", SpkgConfigure::Configure, PackageGroup::Standard),
            ("numpy", "standard", SpkgConfigure::Missing, PackageGroup::SagelibStandard),
            (
                "cython",
                "standard",
                SpkgConfigure::PythonPackageCheck,
                PackageGroup::SagelibStandard,
            ),
            ("latte", "optional", SpkgConfigure::Configure, PackageGroup::Optional),
            (
                "scipy",
                "optional",
                SpkgConfigure::PythonPackageCheck,
                PackageGroup::SagelibOptional,
            ),
            ("exp", "experimental", SpkgConfigure::Configure, PackageGroup::Optional),
        ];
        for (name, package_type, configure, expected) in cases {
            let pkg = meta(name, package_type, configure);
            assert_eq!(PackageGroup::select(&pkg, &develop), expected, "{name}");
        }
    }

    #[test]
    fn packages_without_system_names_are_skipped() {
        let mut classification = Classification::default();
        let mut pkg = meta("empty", "standard", SpkgConfigure::Configure);
        pkg.system_packages.clear();
        assert_eq!(classification.insert(&pkg, &DevelopPattern::default()), None);
        assert!(classification.standard.is_empty());
        assert!(classification.packages.is_empty());
    }

    #[test]
    fn classify_packages_reads_the_tree() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        write_pkg_file(root, "_develop", "dependencies", "tox pytest | $(PYTHON)\nignored\n");
        write_pkg_file(root, "_bootstrap", "type", "optional\n");
        write_pkg_file(root, "_bootstrap", "distros/conda.txt", "autoconf automake # tools\n");
        write_pkg_file(root, "autoconf", "type", "standard\n");
        write_pkg_file(root, "autoconf", "distros/conda.txt", "autoconf\n");
        write_pkg_file(root, "autoconf", "spkg-configure.m4", "SAGE_SPKG_CONFIGURE([autoconf])\n");
        write_pkg_file(root, "_sagemath", "type", "standard\n");
        write_pkg_file(root, "_sagemath", "distros/conda.txt", "sagemath\n");
        write_pkg_file(root, "gmp", "type", "standard\n");
        write_pkg_file(root, "gmp", "distros/conda.txt", "gmp\n");
        write_pkg_file(root, "gmp", "spkg-configure.m4", "SAGE_SPKG_CONFIGURE([gmp])\n");
        write_pkg_file(root, "numpy", "type", "standard\n");
        write_pkg_file(root, "numpy", "distros/conda.txt", "numpy\n");
        write_pkg_file(root, "pytest", "type", "standard\n");
        write_pkg_file(root, "pytest", "distros/conda.txt", "pytest\n");
        write_pkg_file(root, "scipy", "type", "optional\n");
        write_pkg_file(root, "scipy", "distros/conda.txt", "scipy\n");
        write_pkg_file(
            root,
            "scipy",
            "spkg-configure.m4",
            "SAGE_PYTHON_PACKAGE_CHECK([scipy])\n",
        );
        write_pkg_file(root, "ignored", "type", "optional\n");
        write_pkg_file(root, "ignored", "distros/conda.txt", "# no conda package\n");
        let store = PackageStore::open(root)?;

        let develop = DevelopPattern::load(&store)?;
        assert!(develop.matches("_develop"));
        assert!(develop.matches("tox"));
        assert!(develop.matches("pytest"));
        assert!(!develop.matches("ignored"));

        let classification = classify_packages(&store, "conda", &develop)?;
        assert_eq!(
            classification.standard.iter().collect::<Vec<_>>(),
            ["autoconf", "gmp"]
        );
        assert_eq!(
            classification.sagelib_standard.iter().collect::<Vec<_>>(),
            ["numpy"]
        );
        assert_eq!(
            classification.sagelib_optional.iter().collect::<Vec<_>>(),
            ["scipy"]
        );
        assert_eq!(classification.develop.iter().collect::<Vec<_>>(), ["pytest"]);
        assert_eq!(
            classification.bootstrap.iter().collect::<Vec<_>>(),
            ["_bootstrap"]
        );
        assert!(classification.optional.is_empty());
        assert!(classification
            .packages
            .iter()
            .all(|pkg| !["_bootstrap", "_sagemath", "ignored"].contains(&pkg.name.as_str())));
        assert_eq!(classification.packages[0].diagnostic_line(), "autoconf:standard:no");
        Ok(())
    }

    #[test]
    fn every_identifier_lands_in_at_most_one_group() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        write_pkg_file(root, "_develop", "dependencies", "pytest\n");
        write_pkg_file(root, "_develop", "distros/conda.txt", "conda-build\n");
        write_pkg_file(root, "_bootstrap", "type", "optional\n");
        write_pkg_file(root, "_bootstrap", "distros/conda.txt", "autoconf\n");
        for (name, package_type) in [
            ("autoconf", "standard"),
            ("pytest", "standard"),
            ("numpy", "standard"),
            ("scipy", "optional"),
            ("gap", "optional"),
        ] {
            write_pkg_file(root, name, "type", &format!("{package_type}\n"));
            write_pkg_file(root, name, "distros/conda.txt", &format!("{name}\n"));
        }
        write_pkg_file(root, "gap", "spkg-configure.m4", "SAGE_SPKG_CONFIGURE([gap])\n");
        let store = PackageStore::open(root)?;
        let develop = DevelopPattern::load(&store)?;

        let classification = classify_packages(&store, "conda", &develop)?;

        let mut seen = std::collections::HashMap::new();
        for group in PackageGroup::ALL {
            for name in classification.group(group) {
                if let Some(previous) = seen.insert(name.clone(), group) {
                    panic!("{name} is in both {previous} and {group}");
                }
            }
        }
        assert_eq!(seen.get("_bootstrap"), Some(&PackageGroup::Bootstrap));
        assert_eq!(seen.get("_develop"), Some(&PackageGroup::Develop));
        assert_eq!(seen.len(), 7);
        Ok(())
    }

    #[test]
    fn bootstrap_group_is_empty_without_the_pseudo_package() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_pkg_file(dir.path(), "gmp", "type", "standard\n");
        let store = PackageStore::open(dir.path())?;
        assert!(bootstrap_group(&store).is_empty());
        Ok(())
    }
}
