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

//! Error types for both ends of a call.
//!
//! Server-side faults ([`ServiceFault`], [`BindError`]) never leave the
//! dispatcher; they are classified into a response code. Client-side faults
//! ([`RpcError`]) are surfaced to the caller as distinguishable variants.

use crate::protocol::constants::{codes, faults};
use crate::protocol::models::ErrorInfo;
use thiserror::Error;

/// Value codec errors
#[derive(Error, Debug)]
pub enum CodecError {
    /// Malformed wire text
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Value could not be written
    #[error("Encode error: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Fault returned by a service handler.
#[derive(Error, Debug)]
pub enum ServiceFault {
    /// Business logic explicitly signalled failure (code 104)
    #[error("{message}")]
    User { name: String, message: String },

    /// Arguments did not fit the handler (code 102)
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Any other fault raised while invoking (code 102)
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceFault {
    /// Domain fault raised by the procedure itself.
    pub fn user(message: impl Into<String>) -> Self {
        ServiceFault::User {
            name: faults::USER_CODE.to_string(),
            message: message.into(),
        }
    }

    /// Domain fault with a custom class name for the debug dump.
    pub fn user_named(name: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceFault::User {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ServiceFault::Internal(anyhow::anyhow!(message.into()))
    }

    /// Response code this fault maps to.
    pub fn code(&self) -> i64 {
        match self {
            ServiceFault::User { .. } => codes::USER_CODE,
            ServiceFault::InvalidParams(_) | ServiceFault::Internal(_) => codes::SERVER_ERROR,
        }
    }

    /// Fault class reported in the debug dump.
    pub fn fault_name(&self) -> &str {
        match self {
            ServiceFault::User { name, .. } => name,
            ServiceFault::InvalidParams(_) => faults::INVALID_PARAMS,
            ServiceFault::Internal(_) => faults::SERVER_ERROR,
        }
    }
}

/// Argument binding failures, reported as invalid params.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("takes at most {expected} positional arguments ({given} given)")]
    TooManyPositional { expected: usize, given: usize },

    #[error("unexpected keyword argument '{0}'")]
    UnknownKeyword(String),

    #[error("got multiple values for argument '{0}'")]
    Duplicate(String),

    #[error("missing required argument '{0}'")]
    Missing(String),
}

impl From<BindError> for ServiceFault {
    fn from(err: BindError) -> Self {
        ServiceFault::InvalidParams(err.to_string())
    }
}

/// Client proxy errors
#[derive(Error, Debug)]
pub enum RpcError {
    /// Non-success status from the connection, reported before the body is read as JSON-RPC
    #[error("HTTP error {status}: {reason}")]
    Http { status: u16, reason: String },

    /// The connection failed to carry the request
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request could not be encoded
    #[error("Failed to encode request: {0}")]
    Encode(#[source] CodecError),

    /// Response body is not valid JSON
    #[error("Failed to parse response: {source}")]
    Parse {
        body: String,
        #[source]
        source: CodecError,
    },

    /// Response is JSON but not a response envelope
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Well-formed response carrying a non-null error
    #[error("Remote error {}: {}", .0.code, .0.message)]
    Protocol(Box<ErrorInfo>),

    /// Result could not be converted into the requested type
    #[error("Unexpected result type: {0}")]
    ResultType(#[source] serde_json::Error),
}

impl RpcError {
    /// Remote error code for protocol faults.
    pub fn code(&self) -> Option<i64> {
        match self {
            RpcError::Protocol(info) => Some(info.code),
            _ => None,
        }
    }

    /// HTTP status for transport faults.
    pub fn status(&self) -> Option<u16> {
        match self {
            RpcError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, RpcError::Protocol(_))
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}
