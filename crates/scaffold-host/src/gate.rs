//! Readiness gate -- the host lifecycle state machine.
//!
//! The gate moves through `Uninitialized -> Locating -> Initializing ->
//! Ready`, or ends in `Failed`. Transitions only go forward and both `Ready`
//! and `Failed` are terminal.
//!
//! Operations requested before `Ready` are queued as deferred continuations.
//! Entering `Ready` releases each one exactly once, in the order they were
//! queued. Entering `Failed` releases nothing: queued continuations stay
//! parked for the lifetime of the gate, so a future waiting on one never
//! resolves. The failure is only observable through [`ReadinessGate::settled`]
//! or a [`ReadinessGate::subscribe`] receiver.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{oneshot, watch};
use tracing::debug;

use scaffold_types::ScaffoldError;

/// The lifecycle state of a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed; nothing has started.
    Uninitialized,
    /// Searching for the manifest directory.
    Locating,
    /// Loading the manifest, the commands, and running custom initializers.
    Initializing,
    /// Ready to accept work.
    Ready,
    /// Initialization failed.
    Failed(ScaffoldError),
}

impl Lifecycle {
    fn rank(&self) -> u8 {
        match self {
            Self::Uninitialized => 0,
            Self::Locating => 1,
            Self::Initializing => 2,
            Self::Ready | Self::Failed(_) => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Locating => write!(f, "Locating"),
            Self::Initializing => write!(f, "Initializing"),
            Self::Ready => write!(f, "Ready"),
            Self::Failed(err) => write!(f, "Failed({err})"),
        }
    }
}

type Deferred<T> = Box<dyn FnOnce(&Arc<T>) + Send>;

struct GateInner<T> {
    value: Option<Arc<T>>,
    queue: VecDeque<Deferred<T>>,
    /// Set while `open` releases the queue; new operations queue behind it.
    draining: bool,
}

/// A state machine holding a value of type `T` once ready.
pub struct ReadinessGate<T> {
    inner: Mutex<GateInner<T>>,
    status: watch::Sender<Lifecycle>,
}

impl<T: Send + Sync + 'static> ReadinessGate<T> {
    pub fn new() -> Self {
        let (status, _) = watch::channel(Lifecycle::Uninitialized);
        Self {
            inner: Mutex::new(GateInner {
                value: None,
                queue: VecDeque::new(),
                draining: false,
            }),
            status,
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateInner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state.
    pub fn state(&self) -> Lifecycle {
        self.status.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.status.borrow().is_ready()
    }

    /// The ready value, without waiting.
    pub fn value(&self) -> Option<Arc<T>> {
        self.lock().value.clone()
    }

    /// Number of operations waiting for `Ready`.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<Lifecycle> {
        self.status.subscribe()
    }

    /// Move to `Locating` or `Initializing`.
    pub fn transition(&self, next: Lifecycle) -> Result<(), ScaffoldError> {
        if next.is_terminal() {
            return Err(invalid(&self.state(), &next));
        }
        let _guard = self.lock();
        self.advance(next)
    }

    /// Enter `Ready` with `value` and release every queued operation in FIFO
    /// order.
    pub fn open(&self, value: T) -> Result<(), ScaffoldError> {
        let value = Arc::new(value);
        {
            let mut inner = self.lock();
            self.advance(Lifecycle::Ready)?;
            inner.value = Some(Arc::clone(&value));
            inner.draining = true;
        }

        let mut released = 0usize;
        loop {
            let next = {
                let mut inner = self.lock();
                match inner.queue.pop_front() {
                    Some(op) => op,
                    None => {
                        inner.draining = false;
                        break;
                    }
                }
            };
            next(&value);
            released += 1;
        }
        debug!(released, "readiness gate opened");
        Ok(())
    }

    /// Enter `Failed`. Queued operations are kept but never released.
    pub fn fail(&self, err: ScaffoldError) -> Result<(), ScaffoldError> {
        let inner = self.lock();
        self.advance(Lifecycle::Failed(err))?;
        debug!(parked = inner.queue.len(), "readiness gate failed");
        Ok(())
    }

    /// Run `op` with the ready value: immediately when ready, otherwise once
    /// the gate opens.
    pub fn defer<F>(&self, op: F)
    where
        F: FnOnce(&Arc<T>) + Send + 'static,
    {
        let value = {
            let mut inner = self.lock();
            match (&inner.value, inner.draining) {
                (Some(value), false) => Arc::clone(value),
                _ => {
                    inner.queue.push_back(Box::new(op));
                    return;
                }
            }
        };
        op(&value);
    }

    /// Resolve with the ready value once the gate opens.
    ///
    /// The operation is queued when this is called, not when the future is
    /// first polled. If the gate fails, the future never resolves.
    pub fn when_ready(&self) -> impl Future<Output = Arc<T>> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        self.defer(move |value| {
            let _ = tx.send(Arc::clone(value));
        });
        async move {
            match rx.await {
                Ok(value) => value,
                Err(_) => std::future::pending().await,
            }
        }
    }

    /// Wait for a terminal state: the ready value, or the failure.
    pub async fn settled(&self) -> Result<Arc<T>, ScaffoldError> {
        let mut rx = self.status.subscribe();
        let outcome = match rx.wait_for(Lifecycle::is_terminal).await {
            Ok(state) => match &*state {
                Lifecycle::Failed(err) => Err(err.clone()),
                _ => Ok(()),
            },
            // the sender lives as long as `self`
            Err(_) => Ok(()),
        };
        outcome?;
        self.value().ok_or_else(|| ScaffoldError::InvalidTransition {
            from: self.state().to_string(),
            to: Lifecycle::Ready.to_string(),
        })
    }

    /// Validate and publish a transition. Callers hold the inner lock so
    /// transitions are serialized with queue changes.
    fn advance(&self, next: Lifecycle) -> Result<(), ScaffoldError> {
        let current = self.state();
        if current.is_terminal() || next.rank() <= current.rank() {
            return Err(invalid(&current, &next));
        }
        debug!(from = %current, to = %next, "lifecycle transition");
        self.status.send_replace(next);
        Ok(())
    }
}

impl<T: Send + Sync + 'static> Default for ReadinessGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(from: &Lifecycle, to: &Lifecycle) -> ScaffoldError {
    ScaffoldError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}
