//! Remote data mirrored into observable client state.
//!
//! A [`Resource`] fetches once when mounted and again whenever its key
//! changes or [`Resource::refetch`] is called. Each fetch runs as a spawned
//! Tokio task wrapped in [`Abortable`]; starting a newer fetch or dropping the
//! resource aborts the previous one. Every fetch also carries an epoch number
//! checked under a lock before it writes, so a fetch that was superseded or
//! torn down never publishes state.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{AbortHandle, Abortable, BoxFuture};
use tokio::sync::watch;
use tracing::debug;

use crate::error::ClientError;

/// Snapshot of a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    /// Last successful value. Kept while a refetch is running.
    pub data: Option<T>,
    /// Whether a fetch is in flight.
    pub loading: bool,
    /// Error from the last fetch, cleared when a new fetch starts.
    pub error: Option<ClientError>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// Something whose data can be re-read on demand.
///
/// Controllers hold invalidation targets through this trait so they do not
/// need to know each resource's key or value type.
pub trait Refetch: Send + Sync {
    /// Start a fresh fetch, superseding any running one.
    fn refetch(&self);
}

type Fetcher<K, T> = Arc<dyn Fn(K) -> BoxFuture<'static, Result<T, ClientError>> + Send + Sync>;

struct Inflight<K> {
    key: K,
    epoch: u64,
    handle: Option<AbortHandle>,
}

struct Shared<K, T> {
    state: watch::Sender<ResourceState<T>>,
    inflight: Mutex<Inflight<K>>,
}

impl<K, T> Shared<K, T> {
    fn lock(&self) -> MutexGuard<'_, Inflight<K>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Data fetched with a key of type `K`.
pub struct Resource<K, T> {
    fetcher: Fetcher<K, T>,
    shared: Arc<Shared<K, T>>,
}

impl<K, T> fmt::Debug for Resource<K, T>
where
    K: fmt::Debug,
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inflight = self.shared.lock();
        f.debug_struct("Resource")
            .field("key", &inflight.key)
            .field("epoch", &inflight.epoch)
            .field("state", &*self.shared.state.borrow())
            .finish_non_exhaustive()
    }
}

impl<K, T> Resource<K, T>
where
    K: Clone + PartialEq + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Create the resource and start the first fetch.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn mount<F>(key: K, fetcher: F) -> Self
    where
        F: Fn(K) -> BoxFuture<'static, Result<T, ClientError>> + Send + Sync + 'static,
    {
        let (state, _) = watch::channel(ResourceState::default());
        let resource = Self {
            fetcher: Arc::new(fetcher),
            shared: Arc::new(Shared {
                state,
                inflight: Mutex::new(Inflight {
                    key,
                    epoch: 0,
                    handle: None,
                }),
            }),
        };
        resource.start();
        resource
    }

    /// Observe state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.shared.state.subscribe()
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> ResourceState<T> {
        self.shared.state.borrow().clone()
    }

    /// Current dependency key.
    #[must_use]
    pub fn key(&self) -> K {
        self.shared.lock().key.clone()
    }

    /// Change the dependency key. Fetches again only if it differs.
    pub fn set_key(&self, key: K) {
        {
            let mut inflight = self.shared.lock();
            if inflight.key == key {
                return;
            }
            inflight.key = key;
        }
        self.start();
    }

    fn start(&self) {
        let mut inflight = self.shared.lock();
        if let Some(previous) = inflight.handle.take() {
            previous.abort();
        }
        inflight.epoch += 1;
        let epoch = inflight.epoch;
        let fetch = (self.fetcher)(inflight.key.clone());

        self.shared.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let (handle, registration) = AbortHandle::new_pair();
        inflight.handle = Some(handle);
        drop(inflight);

        let shared = Arc::clone(&self.shared);
        let task = Abortable::new(
            async move {
                let outcome = fetch.await;
                let inflight = shared.lock();
                if inflight.epoch != epoch {
                    debug!(epoch, current = inflight.epoch, "discarding superseded fetch");
                    return;
                }
                shared.state.send_modify(|state| {
                    state.loading = false;
                    match outcome {
                        Ok(data) => {
                            state.data = Some(data);
                            state.error = None;
                        }
                        Err(error) => state.error = Some(error),
                    }
                });
            },
            registration,
        );
        tokio::spawn(task);
    }
}

impl<K, T> Refetch for Resource<K, T>
where
    K: Clone + PartialEq + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn refetch(&self) {
        self.start();
    }
}

impl<K, T> Drop for Resource<K, T> {
    fn drop(&mut self) {
        let mut inflight = self.shared.lock();
        inflight.epoch += 1;
        if let Some(handle) = inflight.handle.take() {
            handle.abort();
        }
    }
}
