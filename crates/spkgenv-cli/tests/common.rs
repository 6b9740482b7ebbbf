#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use assert_cmd::{assert::Assert, cargo::cargo_bin_cmd, Command};
use serde_json::Value;
use tempfile::TempDir;

pub const PYTHON_VERSIONS: [&str; 3] = ["3.9", "3.10", "3.11"];

pub const OUTPUT_STEMS: [&str; 5] = [
    "environment",
    "environment-optional",
    "src/environment",
    "src/environment-optional",
    "src/environment-dev",
];

/// Builder for a throwaway `build/pkgs` tree.
pub struct SageTree {
    temp: TempDir,
}

impl SageTree {
    pub fn new(prefix: &str) -> Self {
        let temp = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .expect("tempdir");
        fs::create_dir_all(temp.path().join("build").join("pkgs")).expect("pkgs dir");
        Self { temp }
    }

    /// A tree holding the usual bootstrap, develop, and sagelib packages.
    pub fn sample(prefix: &str) -> Self {
        Self::new(prefix)
            .file("_bootstrap", "type", "optional\n")
            .file("_bootstrap", "distros/conda.txt", "autoconf\nautomake\n")
            .file("_develop", "dependencies", "pytest | $(PYTHON)\n")
            .file("_sagemath", "distros/conda.txt", "sagemath\n")
            .package("python3", Some("standard"), "python\n")
            .file("python3", "spkg-configure.m4", "SAGE_SPKG_CONFIGURE([python3], [])\n")
            .package("numpy", Some("standard"), "numpy\n")
            .package("scipy", Some("optional"), "scipy\n")
            .file(
                "scipy",
                "spkg-configure.m4",
                "SAGE_SPKG_CONFIGURE([scipy], [SAGE_PYTHON_PACKAGE_CHECK([scipy])])\n",
            )
            .package("pytest", Some("optional"), "pytest\n")
            .package("gap", Some("experimental"), "gap-defaults\n")
            .file("gap", "spkg-configure.m4", "SAGE_SPKG_CONFIGURE([gap], [])\n")
            .package("pari", Some("standard"), "\n")
            .file("flask", "type", "standard\n")
            .file("flask", "requirements.txt", "# web\nflask>=2.0\n")
            .file("jupyter_ext", "type", "optional\n")
            .file("jupyter_ext", "version_requirements.txt", "jupyter_ext ~= 1.2\n")
            .file("sage_conf", "type", "standard\n")
            .file("sage_conf", "requirements.txt", "sage-conf\n")
            .file("sage_conf", "dependencies", "$(PYTHON) | $(SAGERUNTIME)\n")
    }

    pub fn package(self, name: &str, package_type: Option<&str>, distros: &str) -> Self {
        let tree = self.file(name, "distros/conda.txt", distros);
        match package_type {
            Some(package_type) => tree.file(name, "type", &format!("{package_type}\n")),
            None => tree,
        }
    }

    pub fn file(self, package: &str, relative: &str, contents: &str) -> Self {
        let path = self.pkgs().join(package).join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("package dir");
        fs::write(&path, contents).expect("write metadata");
        self
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn pkgs(&self) -> PathBuf {
        self.root().join("build").join("pkgs")
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative))
            .unwrap_or_else(|err| panic!("read {relative}: {err}"))
    }

    pub fn output(&self, stem: &str, version: &str) -> String {
        self.read(&format!("{stem}-{version}.yml"))
    }

    pub fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("spkgenv");
        cmd.current_dir(self.root())
            .env_remove("BOOTSTRAP_VERBOSE")
            .env("NO_COLOR", "1");
        cmd
    }
}

pub fn dependency_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| line.strip_prefix("  - "))
        .map(ToString::to_string)
        .collect()
}

pub fn pip_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| line.strip_prefix("      - "))
        .map(ToString::to_string)
        .collect()
}

pub fn parse_json(assert: &Assert) -> Value {
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    serde_json::from_str(&stdout).unwrap_or_else(|err| panic!("invalid json {err}: {stdout}"))
}

pub fn stderr_of(assert: &Assert) -> String {
    String::from_utf8(assert.get_output().stderr.clone()).expect("utf8 stderr")
}

pub fn stdout_of(assert: &Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout")
}
