//! One-shot HTTP/1.0 server on a std `TcpListener`.
//!
//! Each accepted connection has its request head recorded, receives the
//! canned response for its path, and is closed, which is how an HTTP/1.0
//! server marks the end of the body.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

pub struct CannedServer {
    pub port: u16,
    requests: Arc<Mutex<Vec<String>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CannedServer {
    /// Serves exactly `connections` requests, answering by request path.
    /// Paths missing from `routes` get a 404.
    pub fn start(routes: HashMap<String, Vec<u8>>, connections: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind localhost");
        let port = listener.local_addr().expect("local addr").port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        let handle = thread::spawn(move || {
            for _ in 0..connections {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
                let mut head = String::new();
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap_or(0) == 0 {
                        break;
                    }
                    head.push_str(&line);
                    if line == "\r\n" {
                        break;
                    }
                }

                let path = head
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();
                let response = routes.get(&path).cloned().unwrap_or_else(|| {
                    b"HTTP/1.0 404 Not Found\r\nContent-Type: text/plain\r\n\r\nmissing".to_vec()
                });
                log.lock().expect("request log").push(head);
                // Client may hang up early (size cap tests).
                let _ = stream.write_all(&response);
            }
        });

        Self {
            port,
            requests,
            handle: Some(handle),
        }
    }

    /// Serves a single request with `response`, whatever the path.
    pub fn once(response: &[u8]) -> Self {
        let mut routes = HashMap::new();
        for path in ["/", "/page", "/big", "/index.html"] {
            routes.insert(path.to_string(), response.to_vec());
        }
        Self::start(routes, 1)
    }

    /// Waits for the server thread and returns every request head it saw.
    pub fn finish(mut self) -> Vec<String> {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("server thread");
        }
        self.requests.lock().expect("request log").clone()
    }
}

pub fn ok_response(body: &str) -> Vec<u8> {
    format!("HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\n{body}").into_bytes()
}
