//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves fixed bodies by request path; unknown paths get 404. Stands in for
//! both the releases API and the asset download host.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// What a route answers with.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }
}

/// Running server. Routes can be changed after start (e.g. once the base URL
/// is known and release JSON can point back at the server).
#[derive(Clone)]
pub struct AssetServer {
    pub base_url: String,
    routes: Arc<Mutex<HashMap<String, Reply>>>,
}

impl AssetServer {
    pub fn route(&self, path: &str, reply: Reply) {
        self.routes.lock().unwrap().insert(path.to_string(), reply);
    }

    /// `http://127.0.0.1:<port>/<path>` for a path without leading slash.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Starts a server in a background thread. Runs until the process exits.
pub fn start() -> AssetServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<Mutex<HashMap<String, Reply>>> = Arc::default();
    let server_routes = Arc::clone(&routes);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&server_routes);
            thread::spawn(move || handle(stream, &routes));
        }
    });
    AssetServer {
        base_url: format!("http://127.0.0.1:{}", port),
        routes,
    }
}

fn handle(mut stream: TcpStream, routes: &Mutex<HashMap<String, Reply>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    let request = String::from_utf8_lossy(&request);
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/");
    let path = path.split('?').next().unwrap_or(path);

    let reply = if method.eq_ignore_ascii_case("GET") {
        routes
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Reply::status(404))
    } else {
        Reply::status(405)
    };

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        reply.status,
        reason(reply.status),
        reply.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&reply.body);
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
