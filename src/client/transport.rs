// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Client transport boundary.
//!
//! The proxy only needs one POST-style exchange per call: send method, path,
//! headers and body, get back status, reason, headers and a body reader.
//! [`HttpConnection`] provides that over HTTP with a blocking reqwest client;
//! tests substitute an in-process [`Connection`].

use crate::config::Config;
use crate::protocol::constants::http;
use crate::protocol::errors::RpcError;
use reqwest::blocking::Client;
use reqwest::Method;
use std::io::Read;
use tracing::debug;

/// Reply to a single exchange.
pub struct HttpReply {
    pub status: u16,
    /// Reason phrase. [`HttpConnection`] reports the canonical phrase for the
    /// status code, not the text the server sent.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Box<dyn Read + Send>,
}

impl HttpReply {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_length(&self) -> Option<u64> {
        self.header(http::CONTENT_LENGTH)
            .and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl std::fmt::Debug for HttpReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpReply")
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// A point-to-point connection able to carry one request per call.
pub trait Connection: Send + Sync {
    fn request(
        &self,
        method: &str,
        path: &str,
        headers: &[(&str, String)],
        body: Vec<u8>,
    ) -> Result<HttpReply, RpcError>;
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn request(
        &self,
        method: &str,
        path: &str,
        headers: &[(&str, String)],
        body: Vec<u8>,
    ) -> Result<HttpReply, RpcError> {
        (**self).request(method, path, headers, body)
    }
}

/// HTTP connection to one host.
#[derive(Debug, Clone)]
pub struct HttpConnection {
    base_url: String,
    client: Client,
}

impl HttpConnection {
    /// `host` is either `host[:port]` or a full `scheme://host[:port]` base.
    pub fn new(host: &str, config: &Config) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .no_proxy()
            .build()
            .map_err(|e| RpcError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = if host.contains("://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", host.trim_end_matches('/'))
        };

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl Connection for HttpConnection {
    fn request(
        &self,
        method: &str,
        path: &str,
        headers: &[(&str, String)],
        body: Vec<u8>,
    ) -> Result<HttpReply, RpcError> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| RpcError::Transport(format!("Invalid HTTP method '{}': {}", method, e)))?;
        let url = self.url(path);
        debug!("{} {} ({} bytes)", method, url, body.len());

        let mut builder = self.client.request(method, &url);
        for (name, value) in headers {
            // reqwest derives Content-Length from the body
            if name.eq_ignore_ascii_case(http::CONTENT_LENGTH) {
                continue;
            }
            builder = builder.header(*name, value.as_str());
        }

        let response = builder
            .body(body)
            .send()
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();

        Ok(HttpReply {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body: Box::new(response),
        })
    }
}
