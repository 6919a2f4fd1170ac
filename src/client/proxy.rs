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

//! Client proxy.
//!
//! [`RpcProxy::call`] is the mirror image of the dispatcher: pack the
//! arguments, wrap them in a request with the next id, post it, and unwrap
//! the response. Failures come back as distinct [`RpcError`] variants so a
//! caller can tell a dead connection from a malformed reply from a
//! remote-reported error.

use crate::client::transport::Connection;
use crate::protocol::args;
use crate::protocol::codec;
use crate::protocol::constants::{http, limits};
use crate::protocol::errors::RpcError;
use crate::protocol::models::{Request, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

pub struct RpcProxy<C: Connection> {
    connection: C,
    uri: String,
    next_id: AtomicU64,
}

impl<C: Connection> RpcProxy<C> {
    pub fn new(connection: C, uri: impl Into<String>) -> Self {
        Self {
            connection,
            uri: uri.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Id the next call will carry.
    pub fn peek_id(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }

    /// Callable bound to one method name.
    pub fn method(&self, name: impl Into<String>) -> RemoteMethod<'_, C> {
        RemoteMethod {
            proxy: self,
            name: name.into(),
        }
    }

    /// Build the request for a call, consuming one id.
    pub fn build_request(
        &self,
        name: &str,
        positional: Vec<Value>,
        named: Map<String, Value>,
    ) -> Request {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Request::new(name, Some(args::pack(positional, named)), Some(Value::from(id)))
    }

    pub fn call(
        &self,
        name: &str,
        positional: Vec<Value>,
        named: Map<String, Value>,
    ) -> Result<Value, RpcError> {
        let request = self.build_request(name, positional, named);
        let body = codec::encode_value(&request).map_err(RpcError::Encode)?;
        debug!(method = %name, id = ?request.id, "Calling remote procedure");

        let headers = [
            (http::CONTENT_TYPE, http::REQUEST_CONTENT_TYPE.to_string()),
            (http::ACCEPT_HEADER, http::ACCEPT.to_string()),
            (http::CONTENT_LENGTH, body.len().to_string()),
        ];
        let reply = self
            .connection
            .request("POST", &self.uri, &headers, body.into_bytes())?;

        if !reply.is_success() {
            warn!("Remote call '{}' failed with HTTP {} {}", name, reply.status, reply.reason);
            return Err(RpcError::Http {
                status: reply.status,
                reason: reply.reason,
            });
        }

        let limit = reply
            .content_length()
            .unwrap_or(limits::MAX_MESSAGE_SIZE_BYTES)
            .min(limits::MAX_MESSAGE_SIZE_BYTES);
        let mut raw = Vec::new();
        reply
            .body
            .take(limit)
            .read_to_end(&mut raw)
            .map_err(|e| RpcError::Transport(format!("Failed to read response body: {}", e)))?;

        let value = codec::decode_slice(&raw).map_err(|source| RpcError::Parse {
            body: String::from_utf8_lossy(&raw).into_owned(),
            source,
        })?;

        let response: Response = serde_json::from_value(value)
            .map_err(|e| RpcError::MalformedResponse(e.to_string()))?;

        response.into_result().map_err(|info| {
            warn!("Remote call '{}' returned error {}: {}", name, info.code, info.message);
            RpcError::Protocol(Box::new(info))
        })
    }

    /// Call and convert the result into `T`.
    pub fn call_as<T: DeserializeOwned>(
        &self,
        name: &str,
        positional: Vec<Value>,
        named: Map<String, Value>,
    ) -> Result<T, RpcError> {
        let value = self.call(name, positional, named)?;
        serde_json::from_value(value).map_err(RpcError::ResultType)
    }
}

/// A remote procedure bound to a name.
pub struct RemoteMethod<'a, C: Connection> {
    proxy: &'a RpcProxy<C>,
    name: String,
}

impl<C: Connection> RemoteMethod<'_, C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoke(&self, positional: Vec<Value>, named: Map<String, Value>) -> Result<Value, RpcError> {
        self.proxy.call(&self.name, positional, named)
    }

    pub fn positional(&self, positional: Vec<Value>) -> Result<Value, RpcError> {
        self.invoke(positional, Map::new())
    }

    pub fn named(&self, named: Map<String, Value>) -> Result<Value, RpcError> {
        self.invoke(Vec::new(), named)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::HttpReply;
    use serde_json::json;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Replies with a canned status and body, recording what was sent.
    struct Canned {
        status: u16,
        reason: &'static str,
        body: String,
        content_length: Option<String>,
        sent: Mutex<Vec<(String, Vec<(String, String)>, String)>>,
    }

    impl Canned {
        fn new(status: u16, reason: &'static str, body: &str) -> Self {
            Self {
                status,
                reason,
                body: body.to_string(),
                content_length: Some(body.len().to_string()),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl Connection for Canned {
        fn request(
            &self,
            method: &str,
            path: &str,
            headers: &[(&str, String)],
            body: Vec<u8>,
        ) -> Result<HttpReply, RpcError> {
            assert_eq!(method, "POST");
            let headers = headers.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
            self.sent.lock().unwrap().push((
                path.to_string(),
                headers,
                String::from_utf8(body).unwrap(),
            ));
            let mut reply_headers = Vec::new();
            if let Some(len) = &self.content_length {
                reply_headers.push(("Content-Length".to_string(), len.clone()));
            }
            Ok(HttpReply {
                status: self.status,
                reason: self.reason.to_string(),
                headers: reply_headers,
                body: Box::new(Cursor::new(self.body.clone().into_bytes())),
            })
        }
    }

    #[test]
    fn test_request_shape_and_headers() {
        let proxy = RpcProxy::new(
            Canned::new(200, "OK", r#"{"version":"2.0","id":1,"result":5,"error":null}"#),
            "/cgi-bin/rpc",
        );
        let result = proxy.call("add", vec![json!(2), json!(3)], Map::new()).unwrap();
        assert_eq!(result, json!(5));

        let sent = proxy.connection().sent.lock().unwrap();
        let (path, headers, body) = &sent[0];
        assert_eq!(path, "/cgi-bin/rpc");
        assert_eq!(body, r#"{"version":"2.0","method":"add","params":[2,3],"id":1}"#);
        assert!(headers.contains(&("Content-Type".to_string(), "text/plain".to_string())));
        assert!(headers.contains(&("Accept".to_string(), "application/json".to_string())));
        assert!(headers.contains(&("Content-Length".to_string(), body.len().to_string())));
    }

    #[test]
    fn test_ids_increment_per_call() {
        let proxy = RpcProxy::new(
            Canned::new(200, "OK", r#"{"version":"2.0","result":null,"error":null}"#),
            "/rpc",
        );
        assert_eq!(proxy.peek_id(), 1);
        for _ in 0..3 {
            proxy.method("ping").positional(vec![]).unwrap();
        }
        assert_eq!(proxy.peek_id(), 4);

        let sent = proxy.connection().sent.lock().unwrap();
        assert!(sent[2].2.ends_with(r#""id":3}"#));
    }

    #[test]
    fn test_http_status_is_transport_fault() {
        let proxy = RpcProxy::new(Canned::new(500, "Internal Server Error", "<html>"), "/rpc");
        let err = proxy.call("add", vec![], Map::new()).unwrap_err();
        assert_eq!(err.status(), Some(500));
        match err {
            RpcError::Http { reason, .. } => assert_eq!(reason, "Internal Server Error"),
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_body_is_local_parse_fault() {
        let proxy = RpcProxy::new(Canned::new(200, "OK", "<html>oops</html>"), "/rpc");
        match proxy.call("add", vec![], Map::new()).unwrap_err() {
            RpcError::Parse { body, .. } => assert_eq!(body, "<html>oops</html>"),
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_envelope_is_malformed() {
        let proxy = RpcProxy::new(Canned::new(200, "OK", "[1,2,3]"), "/rpc");
        assert!(matches!(
            proxy.call("add", vec![], Map::new()),
            Err(RpcError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_remote_error_is_protocol_fault() {
        let body = r#"{"version":"2.0","error":{"name":"JSONRPCError","code":103,"message":"Procedure 'nope' not found","request":"{}"}}"#;
        let proxy = RpcProxy::new(Canned::new(200, "OK", body), "/rpc");
        let err = proxy.call("nope", vec![], Map::new()).unwrap_err();
        assert_eq!(err.code(), Some(103));
        assert!(err.is_remote());
    }

    #[test]
    fn test_reads_only_declared_length() {
        let mut canned = Canned::new(200, "OK", r#"{"result":1,"error":null}trailing junk"#);
        canned.content_length = Some(r#"{"result":1,"error":null}"#.len().to_string());
        let proxy = RpcProxy::new(canned, "/rpc");
        assert_eq!(proxy.call("one", vec![], Map::new()).unwrap(), json!(1));
    }

    #[test]
    fn test_missing_content_length_reads_to_end() {
        let mut canned = Canned::new(200, "OK", r#"{"result":"all","error":null}"#);
        canned.content_length = None;
        let proxy = RpcProxy::new(canned, "/rpc");
        assert_eq!(proxy.call("all", vec![], Map::new()).unwrap(), json!("all"));
    }

    #[test]
    fn test_call_as_typed() {
        let proxy = RpcProxy::new(
            Canned::new(200, "OK", r#"{"result":[1,2],"error":null}"#),
            "/rpc",
        );
        let pair: (i32, i32) = proxy.call_as("pair", vec![], Map::new()).unwrap();
        assert_eq!(pair, (1, 2));

        let err = proxy.call_as::<String>("pair", vec![], Map::new()).unwrap_err();
        assert!(matches!(err, RpcError::ResultType(_)));
    }
}
