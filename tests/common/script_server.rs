//! Minimal HTTP/1.1 server for integration tests: serves one static body
//! for any GET and records every request it sees.
//!
//! Knobs cover the failure modes the loader must classify: a non-2xx
//! status and a response delay (long enough to trip the hard timeout).

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ScriptServerOptions {
    /// Status line returned for every request.
    pub status: u16,
    /// Delay before writing the response.
    pub delay: Duration,
}

impl Default for ScriptServerOptions {
    fn default() -> Self {
        Self {
            status: 200,
            delay: Duration::ZERO,
        }
    }
}

pub struct ScriptServer {
    /// Base URL, e.g. "http://127.0.0.1:12345/".
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptServer {
    /// Raw requests received so far (request line + headers).
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Request paths received so far, in arrival order.
    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|req| req.lines().next()?.split_whitespace().nth(1))
            .map(str::to_string)
            .collect()
    }
}

/// Starts a server in a background thread serving `body`. Runs until the
/// process exits.
pub fn start(body: Vec<u8>, opts: ScriptServerOptions) -> ScriptServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let recorded = Arc::clone(&recorded);
            thread::spawn(move || handle(stream, &body, opts, &recorded));
        }
    });
    ScriptServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    body: &[u8],
    opts: ScriptServerOptions,
    recorded: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(10)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(10)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    if let Ok(request) = std::str::from_utf8(&buf[..n]) {
        recorded.lock().unwrap().push(request.to_string());
    }
    if !opts.delay.is_zero() {
        thread::sleep(opts.delay);
    }
    let status_line = match opts.status {
        200 => "200 OK",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        _ => "503 Service Unavailable",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: text/javascript\r\n\r\n",
        status_line,
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}
