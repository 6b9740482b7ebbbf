//! Mapping of spkg identifiers to a distribution's package names.

use std::process::{Command, Stdio};

use anyhow::Result;
use spkgenv_domain::{Classification, PackageGroup, PackageStore};
use tracing::debug;

use crate::context::CommandContext;

#[derive(thiserror::Error, Debug)]
pub enum TranslateError {
    #[error("failed to start translator {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("translator {program} exited with {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Turns a list of package identifiers into `ecosystem` package names.
///
/// Implementations may return duplicates; order follows the input.
pub trait NameTranslator {
    fn translate(&self, ecosystem: &str, packages: &[String]) -> Result<Vec<String>>;
}

/// Reads `distros/<ecosystem>.txt` of each package directly.
pub struct DistrosFileTranslator<'a> {
    store: &'a PackageStore,
}

impl<'a> DistrosFileTranslator<'a> {
    #[must_use]
    pub fn new(store: &'a PackageStore) -> Self {
        Self { store }
    }
}

impl NameTranslator for DistrosFileTranslator<'_> {
    fn translate(&self, ecosystem: &str, packages: &[String]) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for package in packages {
            names.extend(self.store.system_packages(package, ecosystem)?);
        }
        Ok(names)
    }
}

/// Runs an external helper as `<program> <ecosystem> <package>...` and splits
/// its stdout on whitespace.
pub struct CommandTranslator {
    program: String,
}

impl CommandTranslator {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl NameTranslator for CommandTranslator {
    fn translate(&self, ecosystem: &str, packages: &[String]) -> Result<Vec<String>> {
        debug!(program = %self.program, count = packages.len(), "running translator");
        let output = Command::new(&self.program)
            .arg(ecosystem)
            .args(packages)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| TranslateError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(TranslateError::Failed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .map(ToOwned::to_owned)
            .collect())
    }
}

/// Distribution names for each of the six package groups.
#[derive(Debug, Clone, Default)]
pub struct TranslatedGroups {
    pub standard: Vec<String>,
    pub optional: Vec<String>,
    pub sagelib_standard: Vec<String>,
    pub sagelib_optional: Vec<String>,
    pub develop: Vec<String>,
    pub bootstrap: Vec<String>,
}

impl TranslatedGroups {
    /// Translate every group with one translator call per group.
    ///
    /// # Errors
    ///
    /// Returns the first translator failure.
    pub fn translate(
        ctx: &CommandContext,
        translator: &dyn NameTranslator,
        ecosystem: &str,
        classification: &Classification,
    ) -> Result<Self> {
        let mut groups = Self::default();
        for group in PackageGroup::ALL {
            let packages: Vec<String> = classification.group(group).iter().cloned().collect();
            let names = translator.translate(ecosystem, &packages)?;
            ctx.diagnostic(&format!("{group}: {}", names.join(" ")));
            *groups.group_mut(group) = names;
        }
        Ok(groups)
    }

    fn group_mut(&mut self, group: PackageGroup) -> &mut Vec<String> {
        match group {
            PackageGroup::Standard => &mut self.standard,
            PackageGroup::Optional => &mut self.optional,
            PackageGroup::SagelibStandard => &mut self.sagelib_standard,
            PackageGroup::SagelibOptional => &mut self.sagelib_optional,
            PackageGroup::Develop => &mut self.develop,
            PackageGroup::Bootstrap => &mut self.bootstrap,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;

    use super::*;
    use crate::config::{Config, EnvSnapshot};

    struct RecordingTranslator {
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl NameTranslator for RecordingTranslator {
        fn translate(&self, _ecosystem: &str, packages: &[String]) -> Result<Vec<String>> {
            self.calls.borrow_mut().push(packages.to_vec());
            Ok(packages.iter().map(|pkg| format!("{pkg}-conda")).collect())
        }
    }

    #[test]
    fn translate_calls_once_per_group() -> Result<()> {
        let ctx = CommandContext::with_config(Config::from_snapshot(&EnvSnapshot::testing(&[])));
        let mut classification = Classification::default();
        classification.standard.insert("gmp".to_string());
        classification.develop.insert("pytest".to_string());
        let translator = RecordingTranslator {
            calls: RefCell::new(Vec::new()),
        };

        let groups = TranslatedGroups::translate(&ctx, &translator, "conda", &classification)?;

        assert_eq!(translator.calls.borrow().len(), 6);
        assert_eq!(groups.standard, vec!["gmp-conda"]);
        assert_eq!(groups.develop, vec!["pytest-conda"]);
        assert!(groups.optional.is_empty());
        Ok(())
    }

    #[test]
    fn distros_translator_concatenates_names_in_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        for (pkg, names) in [("pari", "pari\npari-elldata\n"), ("gmp", "gmp # bignum\n")] {
            let distros = dir.path().join(pkg).join("distros");
            fs::create_dir_all(&distros)?;
            fs::write(distros.join("conda.txt"), names)?;
        }
        let store = PackageStore::open(dir.path())?;
        let translator = DistrosFileTranslator::new(&store);
        let names = translator.translate("conda", &["pari".to_string(), "gmp".to_string()])?;
        assert_eq!(names, vec!["pari", "pari-elldata", "gmp"]);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn command_translator_reports_failures() {
        let translator = CommandTranslator::new("false");
        let err = translator
            .translate("conda", &["gmp".to_string()])
            .expect_err("false exits non-zero");
        assert!(matches!(
            err.downcast_ref::<TranslateError>(),
            Some(TranslateError::Failed { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn command_translator_splits_stdout() -> Result<()> {
        let translator = CommandTranslator::new("echo");
        let names = translator.translate("conda", &["gmp".to_string(), "mpfr".to_string()])?;
        assert_eq!(names, vec!["conda", "gmp", "mpfr"]);
        Ok(())
    }

    #[test]
    fn missing_translator_program_fails_to_spawn() {
        let translator = CommandTranslator::new("spkgenv-no-such-translator");
        let err = translator.translate("conda", &[]).expect_err("spawn fails");
        assert!(matches!(
            err.downcast_ref::<TranslateError>(),
            Some(TranslateError::Spawn { .. })
        ));
    }
}
