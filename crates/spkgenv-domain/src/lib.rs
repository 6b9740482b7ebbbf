#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod classify;
pub mod listing;
pub mod metadata;
pub mod requirements;

pub use classify::{
    bootstrap_group, classify_packages, ClassifiedPackage, Classification,
    DevelopPattern, PackageGroup, BOOTSTRAP_PACKAGE, DEVELOP_PACKAGE, EXCLUDED_PACKAGES,
};
pub use listing::PackageQuery;
pub use metadata::{
    distros_file, PackageMetadata, PackageStore, PackageType, SpkgConfigure, StoreError,
};
pub use requirements::{list_pip_only_packages, PipRequirements, RequirementSource};
