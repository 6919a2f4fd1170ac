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

//! Request dispatcher.
//!
//! Turns one request text into one response text against a [`Registry`].
//! Every failure path, including a panicking handler, converges into a
//! well-formed error response:
//!
//! | Fault | Code | Dump |
//! |---|---|---|
//! | body is not JSON | 101 | no |
//! | JSON is not a request envelope | 101 | yes |
//! | no capability with that name | 103 | yes |
//! | handler returned a user fault | 104 | yes |
//! | bad params, internal fault, panic | 102 | yes |
//!
//! The dump's `traceback` member is only filled in debug mode.

use crate::protocol::args;
use crate::protocol::codec;
use crate::protocol::constants::{codes, faults, limits};
use crate::protocol::errors::ServiceFault;
use crate::protocol::models::{DebugDump, ErrorInfo, Request, Response};
use crate::rpc::registry::{Method, Registry};
use serde_json::{Map, Value};
use std::io::Read;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

// Returned when the response itself cannot be encoded.
const FALLBACK_RESPONSE: &str = r#"{"version":"2.0","error":{"name":"JSONRPCError","code":102,"message":"Server error (response encoding)","request":""}}"#;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Attach tracebacks to debug dumps
    pub debug: bool,
}

/// A fault that escaped the handler body.
enum Failure {
    Fault(ServiceFault),
    Panic(String),
}

/// Stateless dispatcher, safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(options: DispatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> DispatchOptions {
        self.options
    }

    /// Handle one request text and return the encoded response.
    pub fn handle(&self, registry: &Registry, request_text: &str) -> String {
        let response = self.dispatch(registry, request_text);
        Self::encode_response(&response)
    }

    /// Read exactly `content_length` bytes from `reader` and handle them.
    pub fn handle_reader<R: Read>(
        &self,
        registry: &Registry,
        content_length: usize,
        reader: R,
    ) -> String {
        match self.read_body(content_length, reader) {
            Ok(text) => self.handle(registry, &text),
            Err(response) => Self::encode_response(&response),
        }
    }

    /// Build the response for a request text without encoding it.
    pub fn dispatch(&self, registry: &Registry, request_text: &str) -> Response {
        let value = match codec::decode(request_text) {
            Ok(value) => value,
            Err(e) => {
                info!("Rejecting unparseable request: {}", e);
                return Response::failure(None, ErrorInfo::new(codes::PARSE_ERROR, "Parse error", request_text));
            }
        };

        // Echo the id even when the rest of the envelope is unusable.
        let raw_id = value.get("id").cloned();
        let request: Request = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                info!("Rejecting invalid request envelope: {}", e);
                let dump = self.dump(faults::INVALID_REQUEST, e.to_string(), None);
                let info = ErrorInfo::new(codes::PARSE_ERROR, "Invalid request", request_text).with_dump(dump);
                return Response::failure(raw_id, info);
            }
        };

        if request.method.is_empty() {
            let dump = self.dump(faults::INVALID_REQUEST, "method must be a non-empty string", None);
            let info = ErrorInfo::new(codes::PARSE_ERROR, "Invalid request", request_text).with_dump(dump);
            return Response::failure(request.id, info);
        }

        debug!(method = %request.method, id = ?request.id, "Dispatching request");

        let Some(method) = registry.resolve(&request.method) else {
            warn!("Procedure '{}' not found", request.method);
            let message = format!("Procedure '{}' not found", request.method);
            let dump = self.dump(faults::METHOD_NOT_FOUND, message.clone(), None);
            let info = ErrorInfo::new(codes::METHOD_NOT_FOUND, message, request_text).with_dump(dump);
            return Response::failure(request.id, info);
        };

        match Self::invoke(method, request.params) {
            Ok(result) => Response::success(request.id, result),
            Err(failure) => {
                let info = self.classify(&request.method, failure, request_text);
                Response::failure(request.id, info)
            }
        }
    }

    fn read_body<R: Read>(&self, content_length: usize, reader: R) -> Result<String, Response> {
        if content_length as u64 > limits::MAX_MESSAGE_SIZE_BYTES {
            let detail = format!(
                "declared length {} exceeds limit of {} bytes",
                content_length,
                limits::MAX_MESSAGE_SIZE_BYTES
            );
            return Err(self.read_failure(detail, ""));
        }

        let mut buf = Vec::with_capacity(content_length);
        if let Err(e) = reader.take(content_length as u64).read_to_end(&mut buf) {
            let partial = String::from_utf8_lossy(&buf).into_owned();
            return Err(self.read_failure(format!("failed to read request body: {}", e), &partial));
        }
        if buf.len() < content_length {
            debug!("Request body shorter than declared: {} < {}", buf.len(), content_length);
        }

        String::from_utf8(buf).map_err(|e| {
            let lossy = String::from_utf8_lossy(e.as_bytes()).into_owned();
            self.read_failure(format!("request body is not UTF-8: {}", e.utf8_error()), &lossy)
        })
    }

    fn read_failure(&self, detail: String, raw: &str) -> Response {
        info!("Rejecting request body: {}", detail);
        let dump = self.dump(faults::PARSE_ERROR, detail, None);
        Response::failure(None, ErrorInfo::new(codes::PARSE_ERROR, "Parse error", raw).with_dump(dump))
    }

    fn unpack(params: Option<Value>) -> Result<(Vec<Value>, Map<String, Value>), ServiceFault> {
        match params {
            None => Ok((Vec::new(), Map::new())),
            Some(value) if is_empty_scalar(&value) => Ok((Vec::new(), Map::new())),
            Some(Value::Array(items)) => Ok((items, Map::new())),
            Some(Value::Object(map)) => Ok(args::split(&map)),
            Some(_) => Err(ServiceFault::InvalidParams(
                "params must be an array or an object".to_string(),
            )),
        }
    }

    fn invoke(method: &Method, params: Option<Value>) -> Result<Value, Failure> {
        let (positional, named) = Self::unpack(params).map_err(Failure::Fault)?;
        let bound = method
            .signature()
            .bind(positional, named)
            .map_err(|e| Failure::Fault(e.into()))?;

        match panic::catch_unwind(AssertUnwindSafe(|| method.invoke(&bound))) {
            Ok(result) => result.map_err(Failure::Fault),
            Err(payload) => {
                let message = if let Some(s) = payload.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                Err(Failure::Panic(message))
            }
        }
    }

    fn classify(&self, method: &str, failure: Failure, request_text: &str) -> ErrorInfo {
        match failure {
            Failure::Fault(fault @ ServiceFault::User { .. }) => {
                warn!("User code exception in '{}': {}", method, fault);
                let dump = self.dump(fault.fault_name(), fault.to_string(), Some(&fault));
                ErrorInfo::new(codes::USER_CODE, "User code exception", request_text).with_dump(dump)
            }
            Failure::Fault(ServiceFault::InvalidParams(detail)) => {
                warn!("Invalid params for '{}': {}", method, detail);
                let message = format!("Invalid params at '{}': {}", method, detail);
                let dump = self.dump(faults::INVALID_PARAMS, detail, None);
                ErrorInfo::new(codes::SERVER_ERROR, message, request_text).with_dump(dump)
            }
            Failure::Fault(fault) => {
                error!("Server error at '{}': {:#}", method, fault);
                let dump = self.dump(fault.fault_name(), fault.to_string(), Some(&fault));
                ErrorInfo::new(codes::SERVER_ERROR, format!("Server error at '{}'", method), request_text)
                    .with_dump(dump)
            }
            Failure::Panic(message) => {
                error!("Handler for '{}' panicked: {}", method, message);
                let dump = self.dump(faults::PANIC, message, None);
                ErrorInfo::new(codes::SERVER_ERROR, format!("Server error at '{}'", method), request_text)
                    .with_dump(dump)
            }
        }
    }

    fn dump(&self, name: &str, message: impl Into<String>, fault: Option<&ServiceFault>) -> DebugDump {
        let message = message.into();
        let dump = DebugDump::new(name, message.clone());
        if !self.options.debug {
            return dump;
        }
        let traceback = match fault {
            // anyhow's Debug form carries the cause chain and, when captured, the backtrace
            Some(ServiceFault::Internal(e)) => format!("{:?}", e),
            Some(fault) => chain(fault),
            None => format!("{}: {}", name, message),
        };
        dump.with_traceback(traceback)
    }

    fn encode_response(response: &Response) -> String {
        match codec::encode_value(response) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to encode response: {}", e);
                FALLBACK_RESPONSE.to_string()
            }
        }
    }
}

/// `null`, `false`, zero and `""` carry no arguments.
fn is_empty_scalar(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    if source.is_some() {
        out.push_str("\n\nCaused by:");
    }
    while let Some(cause) = source {
        out.push_str(&format!("\n    {}", cause));
        source = cause.source();
    }
    out
}
