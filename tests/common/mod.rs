#![allow(dead_code)]

use jsonrpc_cgi::client::{Connection, HttpReply};
use jsonrpc_cgi::protocol::RpcError;
use jsonrpc_cgi::rpc::{Dispatcher, Registry};
use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Connection that hands the body straight to an in-process dispatcher.
pub struct Loopback {
    pub dispatcher: Dispatcher,
    pub registry: Registry,
}

impl Connection for Loopback {
    fn request(
        &self,
        _method: &str,
        _path: &str,
        headers: &[(&str, String)],
        body: Vec<u8>,
    ) -> Result<HttpReply, RpcError> {
        let declared = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .expect("proxy must send Content-Length");
        let text = self
            .dispatcher
            .handle_reader(&self.registry, declared, Cursor::new(body));
        Ok(HttpReply {
            status: 200,
            reason: "OK".to_string(),
            headers: vec![("Content-Length".to_string(), text.len().to_string())],
            body: Box::new(Cursor::new(text.into_bytes())),
        })
    }
}

/// Minimal HTTP/1.1 server answering `requests` POSTs with the dispatcher,
/// one connection each.
pub fn spawn_http_server(registry: Registry, requests: usize) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr").to_string();
    let registry = Arc::new(registry);

    let handle = std::thread::spawn(move || {
        let dispatcher = Dispatcher::default();
        for _ in 0..requests {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone"));
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("read header");
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().expect("content length");
                    }
                }
            }

            let body = dispatcher.handle_reader(&registry, content_length, &mut reader);
            let (status, body) = if body.contains("\"code\":103") {
                ("404 Not Found", body)
            } else {
                ("200 OK", body)
            };
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Type: application/json; charset=UTF-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            )
            .expect("write response");
            stream.flush().expect("flush");
        }
    });

    (addr, handle)
}
