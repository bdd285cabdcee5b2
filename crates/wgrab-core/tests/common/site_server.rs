//! Minimal HTTP/1.1 server that serves a fixed set of paths for integration tests.
//!
//! Every GET for a registered path returns 200 with its body; anything else
//! is 404. A path can be made to answer 503 a given number of times before
//! succeeding, to exercise retries. Request targets are matched verbatim
//! (percent escapes are not decoded).

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Default)]
pub struct Site {
    bodies: HashMap<String, Vec<u8>>,
    transient_failures: HashMap<String, u32>,
}

impl Site {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` at `path` (e.g. "/game/index.html").
    pub fn page(mut self, path: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(path.to_string(), body.into());
        self
    }

    /// Answers 503 for the first `n` requests to `path`.
    pub fn flaky(mut self, path: &str, n: u32) -> Self {
        self.transient_failures.insert(path.to_string(), n);
        self
    }
}

pub struct SiteServer {
    /// e.g. "http://127.0.0.1:12345"
    pub origin: String,
    site: Arc<Mutex<Site>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl SiteServer {
    /// Adds or replaces a page while the server runs (for pages that embed the origin).
    pub fn serve(&self, path: &str, body: impl Into<Vec<u8>>) {
        self.site
            .lock()
            .unwrap()
            .bodies
            .insert(path.to_string(), body.into());
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    /// Request targets received so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|p| p.as_str() == path).count()
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(site: Site) -> SiteServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let site = Arc::new(Mutex::new(site));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let shared = Arc::clone(&site);
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let site = Arc::clone(&shared);
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &site, &log));
        }
    });
    SiteServer {
        origin: format!("http://127.0.0.1:{}", port),
        site,
        requests,
    }
}

fn handle(mut stream: TcpStream, site: &Mutex<Site>, log: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("").to_string();
    log.lock().unwrap().push(target.clone());

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }

    let (status, body) = {
        let mut site = site.lock().unwrap();
        let failing = match site.transient_failures.get_mut(&target) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        };
        if failing {
            ("503 Service Unavailable", Vec::new())
        } else {
            match site.bodies.get(&target) {
                Some(body) => ("200 OK", body.clone()),
                None => ("404 Not Found", b"not found".to_vec()),
            }
        }
    };
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&body);
}
