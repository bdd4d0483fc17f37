//! Readiness-gated command host.
//!
//! - [`Host`] / [`HostBuilder`] -- locate, initialize, and dispatch
//! - [`ReadinessGate`] / [`Lifecycle`] -- the lifecycle state machine and its
//!   queue of deferred operations
//! - [`PackageLocator`] / [`ManifestLocator`] -- source-path discovery
//! - [`Initializer`] -- custom setup that gates readiness
//! - [`InfoProvider`] -- help and version text
//! - [`Collaborators`] -- copy, asset, template, and prompt backends

pub mod collaborators;
pub mod dispatch;
pub mod gate;
pub mod host;
pub mod info;
pub mod init;
pub mod locator;
pub mod output;
pub mod package;

pub use collaborators::{
    AssetReader, Collaborators, Copier, FsAssetReader, FsCopier, PlaceholderTemplates, Prompter,
    ScriptedPrompter, Template, TemplateLoader, TerminalPrompter,
};
pub use dispatch::DispatchReport;
pub use gate::{Lifecycle, ReadinessGate};
pub use host::{
    main_fn, Host, HostBuilder, HostEvent, HostState, MainHandler, MainOutcome, MainRequest,
};
pub use info::{DefaultInfo, InfoProvider};
pub use init::{init_fn, InitContext, Initializer};
pub use locator::{ManifestLocator, PackageLocator};
pub use output::Output;
pub use package::{load_package, PackageData};
