//! Resource loader: the leaf primitive performing one network load.
//!
//! The scheduler only depends on this trait; the production implementation
//! (`HttpResourceLoader`) performs a real HTTP GET, while tests substitute
//! a fake to simulate each signal kind.

mod http;
mod request;

pub use http::HttpResourceLoader;

use async_trait::async_trait;

/// Raw completion signal of one load, before the registry decides whether a
/// successful transfer actually installed anything. `missing` is never
/// produced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSignal {
    /// The transfer completed without error.
    Loaded,
    /// The hard deadline expired first.
    TimedOut,
    /// The transfer failed (connection error, non-2xx status, bad URL).
    NetworkError,
}

/// Performs one network load (combined or individual) against `target` and
/// reports exactly one signal. Implementations must bound the load by the
/// configured hard timeout.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    async fn load(&self, target: &str) -> LoadSignal;
}
