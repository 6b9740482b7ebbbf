//! Conda environment documents as ordered lines of YAML text.

use std::fmt;

pub const BUILD_ENV_NAME: &str = "sage-build";
pub const LIBRARY_ENV_NAME: &str = "sage";
pub const DEV_ENV_NAME: &str = "sage-dev";
pub const CHANNELS: [&str; 2] = ["conda-forge", "nodefaults"];

const PIP_HEADER: &str = "  - pip:";

/// The five documents written for each interpreter version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Build,
    OptionalBasic,
    Library,
    LibraryOptional,
    Dev,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::Build,
        DocumentKind::OptionalBasic,
        DocumentKind::Library,
        DocumentKind::LibraryOptional,
        DocumentKind::Dev,
    ];

    /// Output path stem relative to the source root.
    pub fn stem(self) -> &'static str {
        match self {
            DocumentKind::Build => "environment",
            DocumentKind::OptionalBasic => "environment-optional",
            DocumentKind::Library => "src/environment",
            DocumentKind::LibraryOptional => "src/environment-optional",
            DocumentKind::Dev => "src/environment-dev",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Build => "build",
            DocumentKind::OptionalBasic => "optional",
            DocumentKind::Library => "library",
            DocumentKind::LibraryOptional => "library-optional",
            DocumentKind::Dev => "dev",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An environment file under construction.
///
/// Child documents start from a clone of their parent's finished lines; the
/// `pip:` sub-list header is written lazily, at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentDocument {
    lines: Vec<String>,
    pip_open: bool,
}

impl EnvironmentDocument {
    #[must_use]
    pub fn with_header(name: &str) -> Self {
        let mut lines = vec![format!("name: {name}"), "channels:".to_string()];
        lines.extend(CHANNELS.iter().map(|channel| format!("  - {channel}")));
        lines.push("dependencies:".to_string());
        Self {
            lines,
            pip_open: false,
        }
    }

    /// Replace the `name:` line if it is exactly `name: <from>`.
    #[must_use]
    pub fn renamed(mut self, from: &str, to: &str) -> Self {
        let expected = format!("name: {from}");
        for line in &mut self.lines {
            if *line == expected {
                *line = format!("name: {to}");
            }
        }
        self
    }

    pub fn comment(&mut self, text: &str) {
        self.lines.push(format!("  # {text}"));
    }

    pub fn dependency(&mut self, name: &str) {
        self.lines.push(format!("  - {name}"));
    }

    pub fn dependencies<'n>(&mut self, names: impl IntoIterator<Item = &'n String>) {
        for name in names {
            self.dependency(name);
        }
    }

    /// Append a requirement line to the nested `pip:` list.
    pub fn pip_requirement(&mut self, line: &str) {
        if !self.pip_open {
            self.lines.push(PIP_HEADER.to_string());
            self.pip_open = true;
        }
        self.lines.push(format!("      - {line}"));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn pip_open(&self) -> bool {
        self.pip_open
    }

    pub fn name(&self) -> Option<&str> {
        self.lines
            .iter()
            .find_map(|line| line.strip_prefix("name: "))
    }

    /// Top-level dependency entries, excluding comments and the pip block.
    pub fn dependency_entries(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .skip_while(|line| line.as_str() != "dependencies:")
            .skip(1)
            .filter_map(|line| line.strip_prefix("  - "))
            .filter(|entry| *entry != "pip:")
    }

    pub fn pip_entries(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .skip_while(|line| line.as_str() != PIP_HEADER)
            .filter_map(|line| line.strip_prefix("      - "))
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}
