//! Load outcomes and the public fragment-load error type.

use std::fmt;

/// Why a fragment load failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Hard deadline expired before any completion signal.
    Timeout,
    /// The transfer itself failed (connection error, non-2xx, blocked load).
    NetworkError,
    /// The transfer completed but the fragment never reported installation
    /// (combo or CDN inconsistency, not a transport failure).
    Missing,
}

impl FailureKind {
    /// Stable string tag, matching the `type` field callers key on.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::NetworkError => "network-error",
            FailureKind::Missing => "missing",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error delivered to every waiter of a failed fragment.
///
/// Carries the fragment id, the failure classification, and the URL the
/// load was attempted against (the combined URL for batched loads).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("loading fragment {fragment} failed ({kind}: {request})")]
pub struct FragmentLoadError {
    /// Fragment id the caller asked for.
    pub fragment: String,
    /// Failure classification.
    pub kind: FailureKind,
    /// Attempted URL.
    pub request: String,
}

impl FragmentLoadError {
    pub fn new(fragment: &str, kind: FailureKind, request: &str) -> Self {
        Self {
            fragment: fragment.to_string(),
            kind,
            request: request.to_string(),
        }
    }
}

/// Terminal result of one fragment load, delivered to each waiter exactly once.
pub type LoadOutcome = Result<(), FragmentLoadError>;
