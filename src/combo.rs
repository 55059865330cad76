//! Loader facade: wires the endpoint detector, registry, batch dispatcher
//! and resource loader together behind the `ensure` entry point.
//!
//! `ComboLoader` is a cheap clone-able handle; all state sits behind one
//! shared inner. Shared maps are guarded by short mutex sections that are
//! never held across an await, so interleaved completions cannot observe a
//! half-applied transition.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::ComboConfig;
use crate::dispatch::{self, BatchQueue};
use crate::endpoint::EndpointState;
use crate::fetch::{HttpResourceLoader, LoadSignal, ResourceLoader};
use crate::outcome::{FailureKind, FragmentLoadError, LoadOutcome};
use crate::registry::{self, Admission, FragmentRegistry};

/// Maps a fragment id to the relative path segment identifying its
/// artifact. Supplied by the build-time collaborator; the only hook point
/// the scheduler needs.
pub type PathFor = Arc<dyn Fn(&str) -> String + Send + Sync>;

struct Inner {
    cfg: ComboConfig,
    path_for: PathFor,
    loader: Arc<dyn ResourceLoader>,
    endpoint: Mutex<EndpointState>,
    registry: Mutex<FragmentRegistry>,
    queue: Mutex<BatchQueue>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

/// On-demand fragment loader with combo batching.
///
/// Callers use `ensure` to load a fragment and `mark_installed` to report
/// that a loaded fragment registered itself. The embedding environment may
/// reassign the delivery endpoint at any time via `set_endpoint`; while the
/// endpoint is combo-capable, first requests are batched on a fixed timer
/// into one combined request.
#[derive(Clone)]
pub struct ComboLoader {
    inner: Arc<Inner>,
}

impl ComboLoader {
    pub fn new(cfg: ComboConfig, path_for: PathFor, loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                path_for,
                loader,
                endpoint: Mutex::new(EndpointState::default()),
                registry: Mutex::new(FragmentRegistry::default()),
                queue: Mutex::new(BatchQueue::default()),
                timer: Mutex::new(None),
            }),
        }
    }

    /// Construct with the curl-backed production loader.
    pub fn with_http(cfg: ComboConfig, path_for: PathFor) -> Self {
        let loader = Arc::new(HttpResourceLoader::new(cfg.clone()));
        Self::new(cfg, path_for, loader)
    }

    /// Assign the delivery endpoint, recompute combo capability, and swap
    /// the dispatch timer accordingly. Synchronous, no failure mode; must
    /// be called within a tokio runtime. Loads already dispatched are not
    /// affected, only newly queued requests.
    pub fn set_endpoint(&self, value: impl Into<String>) {
        let value = value.into();
        let combo_capable = self
            .inner
            .endpoint
            .lock()
            .unwrap()
            .set(value.clone(), &self.inner.cfg.allow_list);
        tracing::info!(endpoint = %value, combo = combo_capable, "endpoint updated");

        let mut timer = self.inner.timer.lock().unwrap();
        if let Some(handle) = timer.take() {
            handle.abort();
        }
        if combo_capable {
            // The tick task holds only a weak handle so dropping the last
            // ComboLoader clone shuts the timer down.
            let weak = Arc::downgrade(&self.inner);
            let interval = self.inner.cfg.poll_interval().max(Duration::from_millis(1));
            *timer = Some(tokio::spawn(async move {
                let mut tick = tokio::time::interval(interval);
                tick.tick().await; // the first tick completes immediately
                loop {
                    tick.tick().await;
                    let Some(inner) = weak.upgrade() else { break };
                    ComboLoader { inner }.flush();
                }
            }));
        }
    }

    /// Latest endpoint value.
    pub fn endpoint(&self) -> String {
        self.inner.endpoint.lock().unwrap().value().to_string()
    }

    /// Whether the latest endpoint qualifies for request combination.
    pub fn combo_capable(&self) -> bool {
        self.inner.endpoint.lock().unwrap().combo_capable()
    }

    /// Load one fragment. The first request for an id starts a load —
    /// queued for the next batch in combo mode, or dispatched individually
    /// otherwise; concurrent requests for the same id join the in-flight
    /// record without issuing further network activity. Resolves exactly
    /// once with success or a classified failure. There is no caching: a
    /// repeated request after a successful settle starts a new load.
    pub async fn ensure(&self, id: &str) -> LoadOutcome {
        let (tx, rx) = oneshot::channel();
        let admission = self.inner.registry.lock().unwrap().register(id, tx);

        if admission == Admission::FirstRequest {
            let (endpoint, combo_capable) = {
                let ep = self.inner.endpoint.lock().unwrap();
                (ep.value().to_string(), ep.combo_capable())
            };
            if combo_capable {
                self.inner.queue.lock().unwrap().push(id);
                tracing::debug!(fragment = %id, "queued for combined load");
            } else {
                let target = format!("{}{}", endpoint, (self.inner.path_for)(id));
                tracing::debug!(fragment = %id, url = %target, "individual load");
                let this = self.clone();
                let id = id.to_string();
                tokio::spawn(async move {
                    let signal = this.inner.loader.load(&target).await;
                    this.settle_load(&id, signal, &target);
                });
            }
        }

        match rx.await {
            Ok(outcome) => outcome,
            // Settle always sends before the waiter is dropped; a closed
            // channel means the runtime tore the load task down mid-flight.
            Err(_) => Err(FragmentLoadError::new(id, FailureKind::NetworkError, "")),
        }
    }

    /// Report that a fragment registered itself after its code ran. Settles
    /// the in-flight record with success; a no-op when nothing is in
    /// flight for `id`.
    pub fn mark_installed(&self, id: &str) {
        let Some(waiters) = self.inner.registry.lock().unwrap().take(id) else {
            return;
        };
        tracing::debug!(fragment = %id, waiters = waiters.len(), "fragment installed");
        for waiter in waiters {
            let _ = waiter.send(Ok(()));
        }
    }

    /// One dispatch tick: drain the queue, issue a single combined load and
    /// forward its signal to every drained fragment in enqueue order.
    /// A no-op on an empty queue; never issues a zero-fragment request.
    /// Normally driven by the endpoint timer but directly callable.
    pub fn flush(&self) {
        let batch = self.inner.queue.lock().unwrap().drain();
        if batch.is_empty() {
            return;
        }
        let endpoint = self.endpoint();
        let target = dispatch::combo_target(&endpoint, &batch, &self.inner.path_for, &self.inner.cfg);
        tracing::debug!(fragments = batch.len(), url = %target, "dispatching combined load");

        let this = self.clone();
        tokio::spawn(async move {
            let signal = this.inner.loader.load(&target).await;
            for id in &batch {
                this.settle_load(id, signal, &target);
            }
        });
    }

    /// Settle a fragment with the raw signal of a finished load. Fragments
    /// already settled (e.g. installed while the transfer was in flight)
    /// are left alone; for the rest a `Loaded` signal means the install
    /// side effect never happened and classifies as missing.
    fn settle_load(&self, id: &str, signal: LoadSignal, target: &str) {
        let Some(waiters) = self.inner.registry.lock().unwrap().take(id) else {
            return;
        };
        let outcome = registry::outcome_for_unsettled(id, signal, target);
        if let Err(e) = &outcome {
            tracing::warn!(fragment = %id, kind = %e.kind, request = %e.request, "fragment load failed");
        }
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}
