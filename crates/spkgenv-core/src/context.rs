use std::fmt;

use tracing::{debug, info};

use crate::config::Config;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandGroup {
    Generate,
    List,
    Classify,
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandGroup::Generate => "generate",
            CommandGroup::List => "list",
            CommandGroup::Classify => "classify",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    pub group: CommandGroup,
    pub name: &'static str,
}

impl CommandInfo {
    #[must_use]
    pub const fn new(group: CommandGroup, name: &'static str) -> Self {
        Self { group, name }
    }
}

pub struct CommandContext {
    config: Config,
}

impl Default for CommandContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandContext {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::from_env())
    }

    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Echo an intermediate classification or translation result.
    ///
    /// Visible at the default log level only when `BOOTSTRAP_VERBOSE` is set.
    pub fn diagnostic(&self, line: &str) {
        if self.config.diagnostics().verbose {
            info!(target: "spkgenv::diagnostics", "{line}");
        } else {
            debug!(target: "spkgenv::diagnostics", "{line}");
        }
    }
}
