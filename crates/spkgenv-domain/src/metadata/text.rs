use std::{fs, io, path::Path};

use anyhow::{Context, Result};

/// Read `path`, treating a missing file as absent.
///
/// # Errors
///
/// Returns an error for any I/O failure other than the file not existing.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Drop everything from the first `#` on each line, trim, and skip blank lines.
pub fn strip_comments(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| match line.find('#') {
            Some(idx) => &line[..idx],
            None => line,
        })
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Whitespace-separated tokens of the comment-stripped contents.
pub fn tokens(contents: &str) -> Vec<String> {
    strip_comments(contents)
        .iter()
        .flat_map(|line| line.split_whitespace())
        .map(ToOwned::to_owned)
        .collect()
}

/// Tokens that name a package in a `dependencies` line.
///
/// The order-only separator `|` and make variables such as `$(PYTHON)` are not
/// package identifiers.
pub(crate) fn is_package_token(token: &str) -> bool {
    token != "|" && !token.starts_with('$')
}
