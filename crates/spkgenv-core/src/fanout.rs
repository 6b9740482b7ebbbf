//! One environment file per document and interpreter version.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::assemble::DocumentSet;
use crate::document::DocumentKind;

pub const DEFAULT_PYTHON_VERSIONS: [&str; 3] = ["3.9", "3.10", "3.11"];

static PYTHON_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^( *- *)python *$").expect("valid python entry pattern"));

/// Pin every bare `- python` entry in `text` to `version`.
pub fn pin_python(text: &str, version: &str) -> String {
    let replacement = format!("${{1}}python={version}");
    let mut pinned = String::with_capacity(text.len() + version.len() + 1);
    for line in text.lines() {
        pinned.push_str(&PYTHON_ENTRY.replace(line, replacement.as_str()));
        pinned.push('\n');
    }
    pinned
}

/// One versioned environment file: which document, pinned to which Python.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub kind: DocumentKind,
    pub version: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PlannedFile {
    pub output: OutputFile,
    pub contents: String,
}

#[derive(Debug, Clone, Default)]
pub struct FanOutReport {
    pub written: Vec<OutputFile>,
    pub removed_templates: Vec<PathBuf>,
}

pub struct FanOut<'a> {
    output_root: &'a Path,
    versions: &'a [String],
}

impl<'a> FanOut<'a> {
    #[must_use]
    pub fn new(output_root: &'a Path, versions: &'a [String]) -> Self {
        Self {
            output_root,
            versions,
        }
    }

    pub fn versioned_path(&self, kind: DocumentKind, version: &str) -> PathBuf {
        self.output_root
            .join(format!("{}-{version}.yml", kind.stem()))
    }

    pub fn template_path(&self, kind: DocumentKind) -> PathBuf {
        self.output_root.join(format!("{}-template.yml", kind.stem()))
    }

    pub fn plan(&self, documents: &DocumentSet) -> Vec<PlannedFile> {
        let mut planned = Vec::new();
        for (kind, document) in documents.iter() {
            let template = document.render();
            for version in self.versions {
                planned.push(PlannedFile {
                    output: OutputFile {
                        kind,
                        version: version.clone(),
                        path: self.versioned_path(kind, version),
                    },
                    contents: pin_python(&template, version),
                });
            }
        }
        planned
    }

    /// Report what [`FanOut::write`] would do without touching the filesystem.
    pub fn preview(&self, documents: &DocumentSet) -> FanOutReport {
        FanOutReport {
            written: self
                .plan(documents)
                .into_iter()
                .map(|file| file.output)
                .collect(),
            removed_templates: DocumentKind::ALL
                .into_iter()
                .map(|kind| self.template_path(kind))
                .filter(|path| path.exists())
                .collect(),
        }
    }

    /// Write every versioned file, then drop unversioned templates.
    ///
    /// # Errors
    ///
    /// Returns an error when an output directory or file cannot be written or a
    /// stale template cannot be removed.
    pub fn write(&self, documents: &DocumentSet) -> Result<FanOutReport> {
        let mut report = FanOutReport::default();
        for PlannedFile { output, contents } in self.plan(documents) {
            if let Some(parent) = output.path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(&output.path, &contents)
                .with_context(|| format!("failed to write {}", output.path.display()))?;
            debug!(
                path = %output.path.display(),
                document = %output.kind,
                python = %output.version,
                "wrote environment file"
            );
            report.written.push(output);
        }
        for kind in DocumentKind::ALL {
            let template = self.template_path(kind);
            match fs::remove_file(&template) {
                Ok(()) => report.removed_templates.push(template),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("failed to remove {}", template.display()))
                }
            }
        }
        Ok(report)
    }
}
