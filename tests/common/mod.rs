//! In-process mock rendering service built on tiny_http.
//!
//! Each request is answered on its own thread so delayed replies do not hold
//! up the others.

#![allow(dead_code)]

use std::io::Read;
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tiny_http::{Header, Response, Server};

/// Scripted answer for one request.
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
    pub delay: Duration,
}

impl Reply {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A request as the mock saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub body: String,
}

impl Seen {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

pub struct MockServer {
    server: Arc<Server>,
    pub url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
    hits: Arc<AtomicUsize>,
}

impl MockServer {
    /// Starts a server on an ephemeral port answering every request with `handler`.
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&Seen) -> Reply + Send + Sync + 'static,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let url = format!("http://{}", server.server_addr());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(handler);

        let (srv, seen_log, counter) = (server.clone(), seen.clone(), hits.clone());
        thread::spawn(move || {
            for mut request in srv.incoming_requests() {
                let (handler, seen_log, counter) = (handler.clone(), seen_log.clone(), counter.clone());
                thread::spawn(move || {
                    let mut body = String::new();
                    let _ = request.as_reader().read_to_string(&mut body);
                    let entry = Seen {
                        method: request.method().to_string(),
                        path: request.url().to_string(),
                        body,
                    };
                    counter.fetch_add(1, Ordering::SeqCst);
                    seen_log.lock().unwrap().push(entry.clone());

                    let reply = (*handler)(&entry);
                    if !reply.delay.is_zero() {
                        thread::sleep(reply.delay);
                    }
                    let response = Response::from_data(reply.body)
                        .with_status_code(reply.status)
                        .with_header("Content-Type: application/octet-stream".parse::<Header>().unwrap());
                    let _ = request.respond(response);
                });
            }
        });

        MockServer {
            server,
            url,
            seen,
            hits,
        }
    }

    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.server.unblock();
    }
}

/// Address where nothing is listening.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
