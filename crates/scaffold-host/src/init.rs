//! Custom initializers.
//!
//! An initializer is extra asynchronous setup that must finish before the
//! host becomes ready. Initializers run concurrently with each other and with
//! the built-in manifest and command loading; there is no ordering between
//! them.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use scaffold_types::HostConfig;

/// What an initializer can see of the host being set up.
#[derive(Debug, Clone)]
pub struct InitContext {
    /// The located source path.
    pub source_path: PathBuf,
    pub config: Arc<HostConfig>,
}

/// Setup work that gates readiness.
#[async_trait]
pub trait Initializer: Send + Sync {
    async fn init(&self, ctx: InitContext) -> Result<()>;
}

struct FnInitializer<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Initializer for FnInitializer<F>
where
    F: Fn(InitContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn init(&self, ctx: InitContext) -> Result<()> {
        (self.f)(ctx).await
    }
}

/// Wrap an async closure as an initializer.
pub fn init_fn<F, Fut>(f: F) -> Arc<dyn Initializer>
where
    F: Fn(InitContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnInitializer { f })
}
