//! Command definitions, discovery, registry, and option merging.
//!
//! Commands are named units of work with an option schema and a run handler.
//! They are loaded from TOML definition files in a command directory, or
//! registered in code.
//!
//! - [`CommandDefinition`] -- parsed from `<name>.toml` in the command directory
//! - [`Command`] -- a loaded command: name, schema, shorthand, handler
//! - [`CommandRegistry`] -- name -> command lookup
//! - [`CommandSource`] / [`DirectorySource`] / [`StaticSource`] -- registry population
//! - [`parse_argv`] / [`merge_options`] -- option parsing against merged schemas
//! - [`RunHandler`] / [`CommandContext`] -- the handler interface
//! - [`ScriptHandler`] -- runs a definition's script as a subprocess

pub mod command;
pub mod definition;
pub mod discovery;
pub mod executor;
pub mod options;
pub mod registry;
pub mod sdk;

pub use command::Command;
pub use definition::{parse_definition, parse_definition_file, validate_definition, CommandDefinition};
pub use discovery::{
    load_commands, CommandSource, DirectorySource, RegistryLoad, StaticSource,
    DEFINITION_EXTENSION,
};
pub use executor::ScriptHandler;
pub use options::{
    merge_options, merge_schemas, merge_shorthand, parse_argv, MergeRequest, ParsedArgs,
    ResolvedOptions,
};
pub use registry::CommandRegistry;
pub use sdk::{handler_fn, CommandContext, FnHandler, HostHandle, RunHandler};
