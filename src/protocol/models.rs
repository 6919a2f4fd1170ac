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

//! Wire envelopes.
//!
//! Pure data structures for the request, the response and the error block.
//! Field order here is the field order on the wire.

use crate::protocol::constants::envelope;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn default_version() -> String {
    envelope::VERSION.to_string()
}

fn default_error_name() -> String {
    envelope::ERROR_NAME.to_string()
}

// A member that is present with a `null` value deserializes to `Some(Null)`,
// an absent member to `None` (through `#[serde(default)]`).
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

// Only a string `version` is kept; any other value reads as the default.
fn lenient_version<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(version) => Ok(version),
        _ => Ok(default_version()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "default_version", deserialize_with = "lenient_version")]
    pub version: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub id: Option<Value>,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Option<Value>, id: Option<Value>) -> Self {
        Self {
            version: default_version(),
            method: method.into(),
            params,
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default = "default_version", deserialize_with = "lenient_version")]
    pub version: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub id: Option<Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub result: Option<Value>,
    /// Always serialized; `null` on success.
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

impl Response {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            version: default_version(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<Value>, error: ErrorInfo) -> Self {
        Self {
            version: default_version(),
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Unwrap the result, or hand back the remote error block.
    pub fn into_result(self) -> Result<Value, ErrorInfo> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(default = "default_error_name")]
    pub name: String,
    pub code: i64,
    pub message: String,
    /// Raw text of the request that failed
    #[serde(default)]
    pub request: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DebugDump>,
}

impl ErrorInfo {
    pub fn new(code: i64, message: impl Into<String>, request: impl Into<String>) -> Self {
        Self {
            name: default_error_name(),
            code,
            message: message.into(),
            request: request.into(),
            error: None,
        }
    }

    #[must_use]
    pub fn with_dump(mut self, dump: DebugDump) -> Self {
        self.error = Some(dump);
        self
    }
}

/// Diagnostic block attached to error responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugDump {
    pub name: String,
    pub message: String,
    /// Only populated in debug mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

impl DebugDump {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            traceback: None,
        }
    }

    #[must_use]
    pub fn with_traceback(mut self, traceback: impl Into<String>) -> Self {
        self.traceback = Some(traceback.into());
        self
    }
}
