use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::{json, Value};
use spkgenv_domain::{
    classify_packages, DevelopPattern, PackageQuery, PackageStore, PackageType, StoreError,
};
use tracing::{debug, info};

use crate::assemble::assemble_documents;
use crate::context::CommandContext;
use crate::fanout::{FanOut, DEFAULT_PYTHON_VERSIONS};
use crate::outcome::ExecutionOutcome;
use crate::pip_extras::inject_pip_extras;
use crate::translate::{
    CommandTranslator, DistrosFileTranslator, NameTranslator, TranslateError, TranslatedGroups,
};

pub const DEFAULT_ECOSYSTEM: &str = "conda";

/// Location of the source tree and its package metadata.
#[derive(Debug, Clone)]
pub struct SourceTree {
    pub sage_root: PathBuf,
    pub pkgs: Option<PathBuf>,
}

impl SourceTree {
    #[must_use]
    pub fn new(sage_root: impl Into<PathBuf>) -> Self {
        Self {
            sage_root: sage_root.into(),
            pkgs: None,
        }
    }

    pub fn metadata_root(&self) -> PathBuf {
        self.pkgs
            .clone()
            .unwrap_or_else(|| self.sage_root.join("build").join("pkgs"))
    }

    fn open(&self) -> std::result::Result<PackageStore, ExecutionOutcome> {
        PackageStore::open(self.metadata_root()).map_err(|err| {
            let path = match &err {
                StoreError::MissingRoot { path } | StoreError::NotADirectory { path } => path,
            };
            ExecutionOutcome::user_error(
                err.to_string(),
                json!({
                    "path": path.display().to_string(),
                    "hint": "run from the top of the source tree or pass --sage-root",
                }),
            )
        })
    }
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub tree: SourceTree,
    pub ecosystem: String,
    pub python_versions: Vec<String>,
    pub translator: Option<String>,
    pub dry_run: bool,
}

impl GenerateRequest {
    #[must_use]
    pub fn new(tree: SourceTree) -> Self {
        Self {
            tree,
            ecosystem: DEFAULT_ECOSYSTEM.to_string(),
            python_versions: DEFAULT_PYTHON_VERSIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
            translator: None,
            dry_run: false,
        }
    }
}

/// Regenerate every environment file from the package metadata.
///
/// # Errors
///
/// Returns an error when metadata cannot be read, the translator fails, or an
/// output file cannot be written.
pub fn generate(ctx: &CommandContext, request: &GenerateRequest) -> Result<ExecutionOutcome> {
    let store = match request.tree.open() {
        Ok(store) => store,
        Err(outcome) => return Ok(outcome),
    };
    let develop = DevelopPattern::load(&store)?;
    let classification = classify_packages(&store, &request.ecosystem, &develop)?;
    for package in &classification.packages {
        ctx.diagnostic(&package.diagnostic_line());
    }

    let translator: Box<dyn NameTranslator + '_> = match request.translator.as_deref() {
        Some(program) => {
            debug!(%program, "using external translator");
            Box::new(CommandTranslator::new(program))
        }
        None => Box::new(DistrosFileTranslator::new(&store)),
    };
    let translated = match TranslatedGroups::translate(
        ctx,
        translator.as_ref(),
        &request.ecosystem,
        &classification,
    ) {
        Ok(translated) => translated,
        Err(err) => {
            let Some(
                TranslateError::Spawn { program, .. } | TranslateError::Failed { program, .. },
            ) = err.downcast_ref::<TranslateError>()
            else {
                return Err(err);
            };
            return Ok(ExecutionOutcome::failure(
                format!("{err:#}"),
                json!({
                    "translator": program,
                    "hint": "check the program passed to --translator",
                }),
            ));
        }
    };

    let mut documents = assemble_documents(&translated);
    let extras = inject_pip_extras(&store, &request.ecosystem, &develop, &mut documents)?;

    let fanout = FanOut::new(&request.tree.sage_root, &request.python_versions);
    let report = if request.dry_run {
        fanout.preview(&documents)
    } else {
        info!("generating conda environment files");
        fanout.write(&documents)?
    };

    let groups: serde_json::Map<String, Value> = spkgenv_domain::PackageGroup::ALL
        .into_iter()
        .map(|group| {
            (
                group.to_string(),
                json!(classification.group(group).len()),
            )
        })
        .collect();
    let relative = |path: &PathBuf| relative_display(&request.tree.sage_root, path);
    let outputs: Vec<Value> = report
        .written
        .iter()
        .map(|file| {
            json!({
                "document": file.kind.as_str(),
                "python": file.version,
                "path": relative(&file.path),
            })
        })
        .collect();
    let details = json!({
        "dry_run": request.dry_run,
        "ecosystem": request.ecosystem,
        "python_versions": request.python_versions,
        "files": report.written.iter().map(|file| relative(&file.path)).collect::<Vec<_>>(),
        "outputs": outputs,
        "removed_templates": report.removed_templates.iter().map(relative).collect::<Vec<_>>(),
        "groups": groups,
        "pip_extras": extras.injected,
        "pip_skipped": extras.skipped,
    });
    let verb = if request.dry_run { "would write" } else { "wrote" };
    Ok(ExecutionOutcome::success(
        format!("{verb} {} environment files", report.written.len()),
        details,
    ))
}

#[derive(Debug, Clone)]
pub struct ListRequest {
    pub tree: SourceTree,
    pub type_filters: Vec<String>,
    pub has_files: Vec<PathBuf>,
    pub no_files: Vec<PathBuf>,
    pub exclude: Vec<String>,
}

/// Package identifiers matching the requested filters.
///
/// # Errors
///
/// Returns an error when the metadata tree cannot be listed.
pub fn list_packages(_ctx: &CommandContext, request: &ListRequest) -> Result<ExecutionOutcome> {
    let store = match request.tree.open() {
        Ok(store) => store,
        Err(outcome) => return Ok(outcome),
    };
    let mut query = PackageQuery::new();
    for raw in &request.type_filters {
        let Some(package_type) = PackageQuery::parse_type_filter(raw) else {
            return Ok(ExecutionOutcome::user_error(
                format!("invalid type filter `{raw}`"),
                json!({ "hint": "type filters look like :standard: or :optional:" }),
            ));
        };
        query = query.with_type(package_type);
    }
    for file in &request.has_files {
        query = query.has_file(file);
    }
    for file in &request.no_files {
        query = query.no_file(file);
    }
    for name in &request.exclude {
        query = query.exclude(name);
    }
    let packages = store.list(&query)?;
    Ok(ExecutionOutcome::success(
        packages.join("\n"),
        json!({ "packages": packages, "passthrough": true }),
    ))
}

#[derive(Debug, Clone)]
pub struct ClassifyRequest {
    pub tree: SourceTree,
    pub ecosystem: String,
}

/// Group assignment of every package that maps to the ecosystem.
///
/// # Errors
///
/// Returns an error when metadata cannot be read.
pub fn classify(ctx: &CommandContext, request: &ClassifyRequest) -> Result<ExecutionOutcome> {
    let store = match request.tree.open() {
        Ok(store) => store,
        Err(outcome) => return Ok(outcome),
    };
    let develop = DevelopPattern::load(&store)?;
    let classification = classify_packages(&store, &request.ecosystem, &develop)?;
    let rows: Vec<Value> = classification
        .packages
        .iter()
        .map(|package| {
            ctx.diagnostic(&package.diagnostic_line());
            json!({
                "name": package.name,
                "type": package.package_type.as_ref().map(PackageType::to_string),
                "sagelib_only": package.sagelib_only,
                "group": package.group,
            })
        })
        .collect();
    Ok(ExecutionOutcome::success(
        format!("classified {} packages", rows.len()),
        json!({
            "packages": rows,
            "bootstrap": classification.bootstrap.iter().collect::<Vec<_>>(),
            "develop_pattern": develop.members().collect::<Vec<_>>(),
        }),
    ))
}

fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
