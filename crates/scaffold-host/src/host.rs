//! The command host.
//!
//! A [`Host`] locates its source path, loads the manifest and the commands,
//! runs custom initializers, and then dispatches commands parsed from the
//! command line. Every operation that needs the host's state goes through
//! the [`ReadinessGate`]: it may be requested at any time, and is carried
//! out once the host is ready. If initialization fails those operations
//! never complete; the failure is reported through [`Host::ready`],
//! [`Host::initialize`], and a [`HostEvent::Error`] event.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::{broadcast, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use scaffold_commands::{
    merge_options, merge_schemas, merge_shorthand, parse_argv, Command, CommandRegistry,
    CommandSource, DirectorySource, HostHandle, MergeRequest, RegistryLoad, ResolvedOptions,
    StaticSource,
};
use scaffold_types::{core_flags, HostConfig, OptionSchema, PromptRequest, ScaffoldError, ShorthandMap};

use crate::collaborators::{
    resolve_against, AssetReader, Collaborators, Copier, Prompter, Template, TemplateLoader,
};
use crate::dispatch::{DispatchReport, Dispatcher};
use crate::gate::{Lifecycle, ReadinessGate};
use crate::info::{DefaultInfo, InfoProvider};
use crate::init::{InitContext, Initializer};
use crate::locator::{ManifestLocator, PackageLocator};
use crate::output::Output;
use crate::package::{load_package, PackageData};

const EVENT_CAPACITY: usize = 64;

/// Everything a ready host knows.
#[derive(Debug, Clone)]
pub struct HostState {
    /// Directory containing the manifest.
    pub source_path: PathBuf,
    pub command_path: PathBuf,
    pub asset_path: PathBuf,
    pub package: PackageData,
    pub commands: CommandRegistry,
    pub ready_at: DateTime<Utc>,
}

/// Notifications broadcast by a host.
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// Initialization finished; queued operations have been released.
    Ready,
    /// `main` finished successfully.
    Done { results: Vec<Value> },
    /// Initialization or `main` failed.
    Error(ScaffoldError),
}

/// What `main` did.
#[derive(Debug)]
pub enum MainOutcome {
    /// Ran a batch of commands.
    Batch(DispatchReport),
    /// Produced help or version text.
    Info(Result<String, ScaffoldError>),
    /// Handed control to a custom main handler.
    Handled(Result<(), ScaffoldError>),
}

impl MainOutcome {
    pub fn error(&self) -> Option<&ScaffoldError> {
        match self {
            Self::Batch(report) => report.error.as_ref(),
            Self::Info(result) => result.as_ref().err(),
            Self::Handled(result) => result.as_ref().err(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error().is_none()
    }
}

/// What a custom main handler is given.
#[derive(Debug, Clone)]
pub struct MainRequest {
    /// Command names resolved from the configuration or the command line.
    pub commands: Vec<String>,
    /// Options parsed from the command line with the global schema.
    pub options: ResolvedOptions,
    pub help: bool,
    pub version: bool,
}

/// Replaces the default dispatch performed by [`Host::main`].
#[async_trait]
pub trait MainHandler: Send + Sync {
    async fn main(&self, host: Host, request: MainRequest) -> Result<()>;
}

struct FnMain<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> MainHandler for FnMain<F>
where
    F: Fn(Host, MainRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn main(&self, host: Host, request: MainRequest) -> Result<()> {
        (self.f)(host, request).await
    }
}

/// Wrap an async closure as a main handler.
pub fn main_fn<F, Fut>(f: F) -> Arc<dyn MainHandler>
where
    F: Fn(Host, MainRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnMain { f })
}

/// Configures and builds a [`Host`].
pub struct HostBuilder {
    config: HostConfig,
    locator: Option<Arc<dyn PackageLocator>>,
    scan_command_dir: bool,
    sources: Vec<Arc<dyn CommandSource>>,
    commands: Vec<Command>,
    initializers: Vec<Arc<dyn Initializer>>,
    main_handler: Option<Arc<dyn MainHandler>>,
    info: Arc<dyn InfoProvider>,
    collaborators: Collaborators,
    output: Option<Output>,
}

impl HostBuilder {
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            locator: None,
            scan_command_dir: true,
            sources: Vec::new(),
            commands: Vec::new(),
            initializers: Vec::new(),
            main_handler: None,
            info: Arc::new(DefaultInfo),
            collaborators: Collaborators::default(),
            output: None,
        }
    }

    /// Replace the manifest locator.
    pub fn locator(mut self, locator: Arc<dyn PackageLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Whether to load definitions from the command directory. On by default.
    pub fn scan_command_dir(mut self, scan: bool) -> Self {
        self.scan_command_dir = scan;
        self
    }

    /// Register a command built in code. It wins over a definition file of
    /// the same name.
    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Add a source of commands, loaded after the command directory.
    pub fn command_source(mut self, source: Arc<dyn CommandSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn initializer(mut self, initializer: Arc<dyn Initializer>) -> Self {
        self.initializers.push(initializer);
        self
    }

    pub fn main_handler(mut self, handler: Arc<dyn MainHandler>) -> Self {
        self.main_handler = Some(handler);
        self
    }

    pub fn info_provider(mut self, info: Arc<dyn InfoProvider>) -> Self {
        self.info = info;
        self
    }

    pub fn copier(mut self, copier: Arc<dyn Copier>) -> Self {
        self.collaborators.copier = copier;
        self
    }

    pub fn asset_reader(mut self, assets: Arc<dyn AssetReader>) -> Self {
        self.collaborators.assets = assets;
        self
    }

    pub fn template_loader(mut self, templates: Arc<dyn TemplateLoader>) -> Self {
        self.collaborators.templates = templates;
        self
    }

    pub fn prompter(mut self, prompter: Arc<dyn Prompter>) -> Self {
        self.collaborators.prompter = prompter;
        self
    }

    pub fn output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    /// Build the host. The token list is parsed here with the global schema,
    /// so `--silent`, `--help` and `--version` on the command line override
    /// the configuration.
    pub fn build(self) -> Host {
        let mut config = self.config;
        let (argv, start) = config.resolved_argv();
        let default_args = merge_schemas(&config.default_args, &core_flags());

        let global = if config.parse_opts {
            merge_options(MergeRequest {
                default_schema: &default_args,
                command_schema: &OptionSchema::new(),
                default_shorthand: &config.default_shorthand,
                command_shorthand: &ShorthandMap::new(),
                argv: &argv,
                start,
                overrides: &Map::new(),
            })
        } else {
            ResolvedOptions::default()
        };
        if global.contains("silent") {
            config.silent = global.get_bool("silent");
        }
        if global.contains("help") {
            config.help = global.get_bool("help");
        }
        if global.contains("version") {
            config.version = global.get_bool("version");
        }

        let output = match self.output {
            Some(output) => {
                let silent = output.is_silent() || config.silent;
                output.with_silent(silent)
            }
            None => Output::stdio(config.silent),
        };

        let mut sources = self.sources;
        if !self.commands.is_empty() {
            sources.push(Arc::new(StaticSource::new(self.commands)));
        }
        let locator = self
            .locator
            .unwrap_or_else(|| Arc::new(ManifestLocator::new(config.manifest_file.clone())));

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Host {
            inner: Arc::new(HostInner {
                config: Arc::new(config),
                argv,
                start,
                default_args,
                global,
                gate: ReadinessGate::new(),
                events,
                output,
                locator,
                scan_command_dir: self.scan_command_dir,
                sources,
                initializers: self.initializers,
                main_handler: self.main_handler,
                info: self.info,
                collaborators: self.collaborators,
                started: AtomicBool::new(false),
            }),
        }
    }
}

struct HostInner {
    config: Arc<HostConfig>,
    argv: Vec<String>,
    start: usize,
    /// Configured default schema with the core flags merged in.
    default_args: OptionSchema,
    global: ResolvedOptions,
    gate: ReadinessGate<HostState>,
    events: broadcast::Sender<HostEvent>,
    output: Output,
    locator: Arc<dyn PackageLocator>,
    scan_command_dir: bool,
    sources: Vec<Arc<dyn CommandSource>>,
    initializers: Vec<Arc<dyn Initializer>>,
    main_handler: Option<Arc<dyn MainHandler>>,
    info: Arc<dyn InfoProvider>,
    collaborators: Collaborators,
    started: AtomicBool,
}

/// A readiness-gated command host. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Host {
    inner: Arc<HostInner>,
}

enum Stage {
    Package(Result<PackageData, ScaffoldError>),
    Commands(RegistryLoad),
    Custom(Result<(), ScaffoldError>),
}

impl Host {
    pub fn new(config: HostConfig) -> Self {
        HostBuilder::new(config).build()
    }

    pub fn builder(config: HostConfig) -> HostBuilder {
        HostBuilder::new(config)
    }

    /// The effective configuration, command-line flags applied.
    pub fn config(&self) -> &HostConfig {
        &self.inner.config
    }

    /// Options parsed from the command line with the global schema.
    pub fn global_options(&self) -> &ResolvedOptions {
        &self.inner.global
    }

    pub fn output(&self) -> &Output {
        &self.inner.output
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.gate.state()
    }

    /// The ready state, without waiting.
    pub fn state(&self) -> Option<Arc<HostState>> {
        self.inner.gate.value()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.inner.events.subscribe()
    }

    pub fn watch_lifecycle(&self) -> watch::Receiver<Lifecycle> {
        self.inner.gate.subscribe()
    }

    /// Run the initialization pipeline and wait for the outcome.
    ///
    /// Only the first call runs the pipeline; later calls wait for the same
    /// outcome.
    pub async fn initialize(&self) -> Result<Arc<HostState>, ScaffoldError> {
        if !self.inner.started.swap(true, Ordering::SeqCst) {
            self.run_pipeline().await;
        }
        self.ready().await
    }

    /// Initialize in the background and, when configured to, run `main`
    /// once ready. Resolves to `None` when `main` did not run.
    pub fn start(&self) -> JoinHandle<Option<MainOutcome>> {
        let host = self.clone();
        tokio::spawn(async move {
            match host.initialize().await {
                Ok(_) if host.inner.config.run_main => Some(host.main().await),
                Ok(_) => None,
                Err(err) => {
                    debug!(error = %err, "host failed to start");
                    None
                }
            }
        })
    }

    /// Wait until the host is ready or has failed.
    pub async fn ready(&self) -> Result<Arc<HostState>, ScaffoldError> {
        self.inner.gate.settled().await
    }

    /// Resolve with the ready state. Never resolves if initialization fails.
    pub fn when_ready(&self) -> impl Future<Output = Arc<HostState>> + Send + 'static {
        self.inner.gate.when_ready()
    }

    /// The source path, once located and the host is ready.
    pub fn get_path(&self) -> impl Future<Output = PathBuf> + Send + 'static {
        let ready = self.when_ready();
        async move { ready.await.source_path.clone() }
    }

    /// The manifest data, once the host is ready.
    pub fn package(&self) -> impl Future<Output = PackageData> + Send + 'static {
        let ready = self.when_ready();
        async move { ready.await.package.clone() }
    }

    /// Run one command by name with per-call option overrides.
    pub fn run(
        &self,
        name: impl Into<String>,
        overrides: Map<String, Value>,
    ) -> impl Future<Output = Result<Value, ScaffoldError>> + Send + 'static {
        let ready = self.when_ready();
        let host = self.clone();
        let name = name.into();
        async move {
            let state = ready.await;
            host.run_with(&state, &name, &overrides).await
        }
    }

    /// Run `names` in order. Names are not filtered: an unknown name fails
    /// the batch.
    pub fn dispatch(&self, names: Vec<String>) -> impl Future<Output = DispatchReport> + Send + 'static {
        let ready = self.when_ready();
        let host = self.clone();
        async move {
            let state = ready.await;
            host.dispatcher(&state).dispatch(&names).await
        }
    }

    /// Decide what the command line asked for and do it.
    pub fn main(&self) -> impl Future<Output = MainOutcome> + Send + 'static {
        let ready = self.when_ready();
        let host = self.clone();
        async move {
            let state = ready.await;
            host.main_with(state).await
        }
    }

    /// Copy `src` (relative to the source path) into `dst` (relative to the
    /// current directory).
    pub fn copy(
        &self,
        src: impl AsRef<Path>,
        dst: impl AsRef<Path>,
    ) -> impl Future<Output = Result<(), ScaffoldError>> + Send + 'static {
        let ready = self.when_ready();
        let host = self.clone();
        let (src, dst) = (src.as_ref().to_path_buf(), dst.as_ref().to_path_buf());
        async move {
            let state = ready.await;
            host.copy_with(&state, &src, &dst).await
        }
    }

    /// Read a file from the asset path.
    pub fn read_asset(
        &self,
        name: impl Into<String>,
    ) -> impl Future<Output = Result<String, ScaffoldError>> + Send + 'static {
        let ready = self.when_ready();
        let host = self.clone();
        let name = name.into();
        async move {
            let state = ready.await;
            host.read_asset_with(&state, &name).await
        }
    }

    /// Load a template from the asset path.
    pub fn load_template(
        &self,
        name: impl Into<String>,
    ) -> impl Future<Output = Result<Template, ScaffoldError>> + Send + 'static {
        let ready = self.when_ready();
        let host = self.clone();
        let name = name.into();
        async move {
            let state = ready.await;
            host.load_template_with(&state, &name).await
        }
    }

    /// Load a template from the asset path and render it with `vars`.
    pub fn render_template(
        &self,
        name: impl Into<String>,
        vars: Value,
    ) -> impl Future<Output = Result<String, ScaffoldError>> + Send + 'static {
        let ready = self.when_ready();
        let host = self.clone();
        let name = name.into();
        async move {
            let state = ready.await;
            host.render_template_with(&state, &name, &vars).await
        }
    }

    /// Ask each question in order.
    pub async fn prompt(&self, requests: Vec<PromptRequest>) -> Result<Vec<String>, ScaffoldError> {
        let mut answers = Vec::with_capacity(requests.len());
        for request in &requests {
            answers.push(self.inner.collaborators.prompter.ask(request).await?);
        }
        Ok(answers)
    }

    async fn run_pipeline(&self) {
        match self.build_state().await {
            Ok(state) => {
                let (source, commands) = (state.source_path.clone(), state.commands.len());
                match self.inner.gate.open(state) {
                    Ok(()) => {
                        info!(source = %source.display(), commands, "host ready");
                        self.emit(HostEvent::Ready);
                    }
                    Err(err) => warn!(error = %err, "host already settled"),
                }
            }
            Err(err) => {
                error!(error = %err, kind = err.kind(), "host initialization failed");
                self.inner.output.error(&err);
                if let Err(transition) = self.inner.gate.fail(err.clone()) {
                    warn!(error = %transition, "host already settled");
                }
                self.emit(HostEvent::Error(err));
            }
        }
    }

    async fn build_state(&self) -> Result<HostState, ScaffoldError> {
        let inner = &self.inner;
        let config = &inner.config;

        inner.gate.transition(Lifecycle::Locating)?;
        let start = config.resolved_start_dir()?;
        let source_path = inner.locator.locate(&start).await?;

        inner.gate.transition(Lifecycle::Initializing)?;
        let command_path = config
            .command_path
            .as_deref()
            .map(|p| resolve_against(&source_path, p))
            .unwrap_or_else(|| source_path.join("commands"));
        let asset_path = config
            .asset_path
            .as_deref()
            .map(|p| resolve_against(&source_path, p))
            .unwrap_or_else(|| source_path.join("assets"));

        let mut sources: Vec<Arc<dyn CommandSource>> = Vec::new();
        if inner.scan_command_dir {
            sources.push(Arc::new(DirectorySource::new(&command_path)));
        }
        sources.extend(inner.sources.iter().cloned());

        let mut tasks = JoinSet::new();
        {
            let source = source_path.clone();
            let manifest = config.manifest_file.clone();
            tasks.spawn(async move { Stage::Package(load_package(&source, &manifest).await) });
        }
        tasks.spawn(async move { Stage::Commands(load_sources(sources).await) });
        for initializer in &inner.initializers {
            let initializer = Arc::clone(initializer);
            let ctx = InitContext {
                source_path: source_path.clone(),
                config: Arc::clone(config),
            };
            tasks.spawn(async move {
                Stage::Custom(
                    initializer
                        .init(ctx)
                        .await
                        .map_err(|e| ScaffoldError::Initializer(format!("{e:#}"))),
                )
            });
        }
        debug!(tasks = tasks.len(), "initializers started");

        let mut first_error = None;
        let mut package = None;
        let mut commands = None;
        while let Some(joined) = tasks.join_next().await {
            let failure = match joined {
                Ok(Stage::Package(Ok(data))) => {
                    package = Some(data);
                    None
                }
                Ok(Stage::Package(Err(err))) => Some(err),
                Ok(Stage::Commands(load)) => {
                    commands = Some(load.registry);
                    load.error
                }
                Ok(Stage::Custom(result)) => result.err(),
                Err(join) => Some(ScaffoldError::Initializer(join.to_string())),
            };
            if let Some(err) = failure {
                warn!(error = %err, "initializer failed");
                first_error.get_or_insert(err);
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        Ok(HostState {
            source_path,
            command_path,
            asset_path,
            package: package.unwrap_or_default(),
            commands: commands.unwrap_or_default(),
            ready_at: Utc::now(),
        })
    }

    async fn main_with(&self, state: Arc<HostState>) -> MainOutcome {
        let inner = &self.inner;
        let config = &inner.config;
        let handler = inner.main_handler.clone();

        let mut names: Vec<String> = match &config.commands {
            Some(explicit) => explicit.clone(),
            None => self.requested_commands(&state),
        };
        if names.is_empty() && !config.help && handler.is_none() {
            names = config
                .default_commands
                .iter()
                .filter(|name| state.commands.contains(name))
                .cloned()
                .collect();
        }
        let help = config.help || (names.is_empty() && handler.is_none());
        debug!(commands = ?names, help, version = config.version, "main");

        if let Some(handler) = handler {
            let request = MainRequest {
                commands: names,
                options: inner.global.clone(),
                help: config.help,
                version: config.version,
            };
            let result = handler
                .main(self.clone(), request)
                .await
                .map_err(|e| ScaffoldError::command_failed("main", format!("{e:#}")));
            self.finish(result.as_ref().err(), Vec::new());
            return MainOutcome::Handled(result);
        }

        if help || config.version {
            let text = if help {
                inner.info.help(&state, &names).await
            } else {
                inner.info.version(&state).await
            };
            let results = match &text {
                Ok(text) => {
                    inner.output.print(text);
                    vec![Value::String(text.clone())]
                }
                Err(_) => Vec::new(),
            };
            self.finish(text.as_ref().err(), results);
            return MainOutcome::Info(text);
        }

        let report = self.dispatcher(&state).dispatch(&names).await;
        self.finish(report.error.as_ref(), report.results.clone());
        MainOutcome::Batch(report)
    }

    /// Positional tokens that name registered commands.
    ///
    /// The token list is parsed against the default schema merged with every
    /// registered command's options, so a value given to a declared option is
    /// consumed even when it happens to match a command name.
    fn requested_commands(&self, state: &HostState) -> Vec<String> {
        let inner = &self.inner;
        if !inner.config.parse_opts {
            return Vec::new();
        }

        let mut schema = inner.config.default_args.clone();
        let mut shorthand = inner.config.default_shorthand.clone();
        for command in state.commands.list() {
            schema = merge_schemas(&schema, &command.option_schema);
            shorthand = merge_shorthand(&shorthand, &command.shorthand);
        }
        let schema = merge_schemas(&schema, &core_flags());

        parse_argv(&schema, &shorthand, &inner.argv, inner.start)
            .remain
            .into_iter()
            .filter(|token| state.commands.contains(token))
            .collect()
    }

    fn finish(&self, err: Option<&ScaffoldError>, results: Vec<Value>) {
        match err {
            Some(err) => {
                self.inner.output.error(err);
                self.emit(HostEvent::Error(err.clone()));
            }
            None => self.emit(HostEvent::Done { results }),
        }
    }

    fn emit(&self, event: HostEvent) {
        // no subscribers is fine
        let _ = self.inner.events.send(event);
    }

    fn dispatcher<'a>(&'a self, state: &'a Arc<HostState>) -> Dispatcher<'a> {
        Dispatcher {
            state,
            default_args: &self.inner.default_args,
            default_shorthand: &self.inner.config.default_shorthand,
            argv: &self.inner.argv,
            start: self.inner.start,
            host: Arc::new(ReadyHost {
                host: self.clone(),
                state: Arc::clone(state),
            }),
        }
    }

    async fn run_with(
        &self,
        state: &Arc<HostState>,
        name: &str,
        overrides: &Map<String, Value>,
    ) -> Result<Value, ScaffoldError> {
        let mut remain = Vec::new();
        self.dispatcher(state).run_one(name, overrides, &mut remain).await
    }

    async fn copy_with(&self, state: &HostState, src: &Path, dst: &Path) -> Result<(), ScaffoldError> {
        let src = resolve_against(&state.source_path, src);
        if !tokio::fs::try_exists(&src).await.unwrap_or(false) {
            return Err(ScaffoldError::io(src.display().to_string(), "no source files"));
        }
        let cwd = std::env::current_dir().map_err(|e| ScaffoldError::io("current directory", e))?;
        let dst = resolve_against(&cwd, dst);

        let copied = self.inner.collaborators.copier.copy_tree(&src, &dst).await?;
        debug!(src = %src.display(), dst = %dst.display(), copied, "copy finished");
        Ok(())
    }

    async fn read_asset_with(&self, state: &HostState, name: &str) -> Result<String, ScaffoldError> {
        let path = resolve_against(&state.asset_path, Path::new(name));
        self.inner.collaborators.assets.read(&path).await
    }

    async fn render_template_with(
        &self,
        state: &HostState,
        name: &str,
        vars: &Value,
    ) -> Result<String, ScaffoldError> {
        Ok(self.load_template_with(state, name).await?.render(vars))
    }

    async fn load_template_with(&self, state: &HostState, name: &str) -> Result<Template, ScaffoldError> {
        let source = self.read_asset_with(state, name).await?;
        self.inner.collaborators.templates.compile(&source)
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("lifecycle", &self.lifecycle())
            .field("argv", &self.inner.argv)
            .field("silent", &self.inner.config.silent)
            .finish_non_exhaustive()
    }
}

async fn load_sources(sources: Vec<Arc<dyn CommandSource>>) -> RegistryLoad {
    let mut combined = RegistryLoad::default();
    for source in sources {
        let load = source.load().await;
        combined.registry.merge(load.registry);
        if let Some(err) = load.error {
            combined.error.get_or_insert(err);
        }
    }
    combined
}

/// The host as seen by a running command.
struct ReadyHost {
    host: Host,
    state: Arc<HostState>,
}

#[async_trait]
impl HostHandle for ReadyHost {
    fn source_path(&self) -> &Path {
        &self.state.source_path
    }

    fn asset_path(&self) -> &Path {
        &self.state.asset_path
    }

    fn config(&self) -> &HostConfig {
        self.host.config()
    }

    async fn copy(&self, src: &Path, dst: &Path) -> Result<(), ScaffoldError> {
        self.host.copy_with(&self.state, src, dst).await
    }

    async fn read_asset(&self, name: &str) -> Result<String, ScaffoldError> {
        self.host.read_asset_with(&self.state, name).await
    }

    async fn render_template(&self, name: &str, vars: &Value) -> Result<String, ScaffoldError> {
        self.host.render_template_with(&self.state, name, vars).await
    }

    async fn prompt(&self, requests: Vec<PromptRequest>) -> Result<Vec<String>, ScaffoldError> {
        self.host.prompt(requests).await
    }

    async fn run(&self, name: &str, overrides: Map<String, Value>) -> Result<Value, ScaffoldError> {
        self.host.run_with(&self.state, name, &overrides).await
    }
}
