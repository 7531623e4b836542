//! Single-flight lease around an async operation
//!
//! The first caller installs a lease holding a shared future; every caller
//! that arrives while the lease is held awaits that same future instead of
//! starting another operation. The lease is released by the operation itself
//! once it settles (success or failure), before any waiter sees the outcome,
//! so the next caller after completion always starts a fresh run.
//!
//! Inside a Tokio runtime the operation is driven on a spawned task, so it
//! runs to completion even when every waiter has gone away (or when it was
//! triggered with no waiter). Outside a runtime the awaiting callers drive it.

use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

type SharedOutcome<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

/// Mutex-guarded lazy future shared by concurrent callers
pub struct SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    name: &'static str,
    lease: Arc<Mutex<Option<SharedOutcome<T, E>>>>,
}

impl<T, E> SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self { name, lease: Arc::new(Mutex::new(None)) }
    }

    /// Whether an operation currently holds the lease
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.lease.lock().is_some()
    }

    /// Join the in-flight operation, or start `operation` if none is running.
    ///
    /// `operation` is only invoked by the caller that acquires the lease.
    pub async fn run<F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.acquire(operation).await
    }

    /// Start `operation` unless one is already running, without waiting.
    ///
    /// Needs a Tokio runtime to drive the operation; outside one the call is
    /// logged and ignored.
    pub fn trigger<F, Fut>(&self, operation: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        if tokio::runtime::Handle::try_current().is_err() {
            warn!(lease = self.name, "no Tokio runtime; trigger ignored");
            return;
        }
        drop(self.acquire(operation));
    }

    fn acquire<F, Fut>(&self, operation: F) -> SharedOutcome<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let mut guard = self.lease.lock();
        if let Some(existing) = guard.as_ref() {
            trace!(lease = self.name, "joining in-flight operation");
            return existing.clone();
        }

        debug!(lease = self.name, "acquired lease");
        let lease = Arc::clone(&self.lease);
        let name = self.name;
        // `operation` runs on first poll, never while the lease mutex is held.
        let shared = async move {
            let outcome = operation().await;
            lease.lock().take();
            debug!(lease = name, ok = outcome.is_ok(), "released lease");
            outcome
        }
        .boxed()
        .shared();

        *guard = Some(shared.clone());
        drop(guard);

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => drop(runtime.spawn(shared.clone().map(drop))),
            Err(_) => trace!(lease = name, "no Tokio runtime; callers drive the operation"),
        }
        shared
    }
}

impl<T, E> std::fmt::Debug for SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("name", &self.name)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
