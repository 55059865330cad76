//! Fragment load registry: per-fragment in-flight records and waiters.
//!
//! One record exists per fragment id from the first request until the
//! outcome settles; concurrent requests for the same id join the record
//! instead of issuing another load. Settling removes the record and sends
//! the identical outcome to every waiter in registration order. The
//! registry performs no network I/O itself.

use std::collections::HashMap;

use tokio::sync::oneshot;

use crate::fetch::LoadSignal;
use crate::outcome::{FailureKind, FragmentLoadError, LoadOutcome};

pub(crate) type Waiter = oneshot::Sender<LoadOutcome>;

/// Result of registering a waiter for a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// No record existed; the caller must start a load for this fragment.
    FirstRequest,
    /// A load is already in flight; the waiter was appended to it.
    Joined,
}

#[derive(Default)]
pub(crate) struct FragmentRegistry {
    in_flight: HashMap<String, Vec<Waiter>>,
}

impl FragmentRegistry {
    /// Append a waiter for `id`, creating the in-flight record if absent.
    pub(crate) fn register(&mut self, id: &str, waiter: Waiter) -> Admission {
        match self.in_flight.get_mut(id) {
            Some(waiters) => {
                waiters.push(waiter);
                Admission::Joined
            }
            None => {
                self.in_flight.insert(id.to_string(), vec![waiter]);
                Admission::FirstRequest
            }
        }
    }

    /// Remove and return the waiters for `id`, if a record is in flight.
    pub(crate) fn take(&mut self, id: &str) -> Option<Vec<Waiter>> {
        self.in_flight.remove(id)
    }

    pub(crate) fn is_in_flight(&self, id: &str) -> bool {
        self.in_flight.contains_key(id)
    }
}

/// Map a raw load signal to the outcome for a fragment that is still in
/// flight. A `Loaded` signal with the record untouched means the fragment
/// never registered as installed, so it settles as `missing`.
pub(crate) fn outcome_for_unsettled(id: &str, signal: LoadSignal, request: &str) -> LoadOutcome {
    let kind = match signal {
        LoadSignal::Loaded => FailureKind::Missing,
        LoadSignal::TimedOut => FailureKind::Timeout,
        LoadSignal::NetworkError => FailureKind::NetworkError,
    };
    Err(FragmentLoadError::new(id, kind, request))
}
