//! HTTP resource loader backed by curl (libcurl).
//!
//! One GET per load, headers from the configured attributes, and a hard
//! deadline enforced twice: `tokio::time::timeout` classifies the signal,
//! and curl carries the same deadline so an abandoned transfer does not
//! outlive the load on its blocking thread.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ComboConfig;

use super::request::request_headers;
use super::{LoadSignal, ResourceLoader};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

pub struct HttpResourceLoader {
    cfg: ComboConfig,
    nonce: OnceLock<String>,
}

impl HttpResourceLoader {
    pub fn new(cfg: ComboConfig) -> Self {
        Self {
            cfg,
            nonce: OnceLock::new(),
        }
    }

    /// Set the process-wide integrity nonce. Settable once; later calls are
    /// ignored and return false.
    pub fn set_nonce(&self, nonce: &str) -> bool {
        self.nonce.set(nonce.to_string()).is_ok()
    }

    pub fn nonce(&self) -> Option<&str> {
        self.nonce.get().map(String::as_str)
    }
}

#[async_trait]
impl ResourceLoader for HttpResourceLoader {
    async fn load(&self, target: &str) -> LoadSignal {
        let headers = request_headers(target, &self.cfg, self.nonce());
        let url = target.to_string();
        let deadline = self.cfg.load_timeout();

        let transfer =
            tokio::task::spawn_blocking(move || perform(&url, &headers, deadline));
        let signal = match tokio::time::timeout(deadline, transfer).await {
            Err(_) => LoadSignal::TimedOut,
            Ok(Err(join_err)) => {
                tracing::warn!("load task failed: {}", join_err);
                LoadSignal::NetworkError
            }
            Ok(Ok(signal)) => signal,
        };
        tracing::debug!(url = %target, ?signal, "fragment load finished");
        signal
    }
}

fn perform(url: &str, headers: &[(String, String)], deadline: Duration) -> LoadSignal {
    match perform_inner(url, headers, deadline) {
        Ok(code) if (200..300).contains(&code) => LoadSignal::Loaded,
        Ok(_) => LoadSignal::NetworkError,
        Err(e) if e.is_operation_timedout() => LoadSignal::TimedOut,
        Err(_) => LoadSignal::NetworkError,
    }
}

fn perform_inner(
    url: &str,
    headers: &[(String, String)],
    deadline: Duration,
) -> Result<u32, curl::Error> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.connect_timeout(CONNECT_TIMEOUT.min(deadline))?;
    easy.timeout(deadline)?;

    let mut list = curl::easy::List::new();
    for (name, value) in headers {
        list.append(&format!("{}: {}", name, value))?;
    }
    if !headers.is_empty() {
        easy.http_headers(list)?;
    }

    {
        let mut transfer = easy.transfer();
        // The body is the fragment's code; installation is reported by the
        // embedder, so the bytes are drained and discarded here.
        transfer.write_function(|data| Ok(data.len()))?;
        transfer.perform()?;
    }

    easy.response_code()
}
