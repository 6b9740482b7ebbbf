#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod assemble;
mod commands;
pub mod config;
mod context;
pub mod document;
pub mod fanout;
mod outcome;
pub mod pip_extras;
pub mod translate;

pub use crate::commands::{
    classify, generate, list_packages, ClassifyRequest, GenerateRequest, ListRequest, SourceTree,
    DEFAULT_ECOSYSTEM,
};
pub use crate::config::Config;
pub use crate::context::{CommandContext, CommandGroup, CommandInfo};
pub use crate::fanout::DEFAULT_PYTHON_VERSIONS;
pub use crate::outcome::{format_status_message, to_json_response, CommandStatus, ExecutionOutcome};
