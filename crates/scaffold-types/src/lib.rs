//! Core types shared across all scaffold crates.
//!
//! Defines the error taxonomy, the host configuration, and the option schema
//! types used by command definitions, the option merger, and the host.

pub mod config;
pub mod error;
pub mod option;
pub mod prompt;

pub use config::{HostConfig, DEFAULT_COMMAND, DEFAULT_MANIFEST_FILENAME};
pub use error::ScaffoldError;
pub use option::{core_flags, OptionKind, OptionSchema, OptionSpec, ShorthandMap, ValueKind};
pub use prompt::PromptRequest;
