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

//! Constants - Single source of truth for protocol literals and configuration keys.
//!
//! This module centralizes error codes, envelope literals, header values and
//! environment variable names so the dispatcher, the client and the CGI
//! layer agree on them.

/// JSON-RPC envelope literals
pub mod envelope {
    /// Value of the `version` member on every request and response
    pub const VERSION: &str = "2.0";
    /// Value of `error.name` on every error response
    pub const ERROR_NAME: &str = "JSONRPCError";
}

/// Error codes of the fixed taxonomy
pub mod codes {
    /// Malformed request body
    pub const PARSE_ERROR: i64 = 101;
    /// Uncaught fault while invoking a resolved procedure
    pub const SERVER_ERROR: i64 = 102;
    /// Requested method name has no matching capability
    pub const METHOD_NOT_FOUND: i64 = 103;
    /// Fault explicitly signaled by the invoked procedure's own logic
    pub const USER_CODE: i64 = 104;
}

/// Fault class names used in debug dumps
pub mod faults {
    pub const PARSE_ERROR: &str = "ParseError";
    pub const INVALID_REQUEST: &str = "InvalidRequest";
    pub const METHOD_NOT_FOUND: &str = "MethodNotFound";
    pub const INVALID_PARAMS: &str = "InvalidParams";
    pub const USER_CODE: &str = "UserCodeException";
    pub const SERVER_ERROR: &str = "ServerError";
    pub const PANIC: &str = "Panic";
}

/// HTTP/CGI header values
pub mod http {
    pub const RESPONSE_CONTENT_TYPE: &str = "application/json; charset=UTF-8";
    pub const REQUEST_CONTENT_TYPE: &str = "text/plain";
    pub const ACCEPT: &str = "application/json";
    pub const GZIP: &str = "gzip";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const CONTENT_LENGTH: &str = "Content-Length";
    pub const CONTENT_ENCODING: &str = "Content-Encoding";
    pub const ACCEPT_HEADER: &str = "Accept";
}

/// Configuration Environment Variables
pub mod config {
    pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
    pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
    pub const ENV_DEBUG: &str = "JSONRPC_DEBUG";
    pub const ENV_TIMEOUT_SECS: &str = "JSONRPC_TIMEOUT_SECS";
    pub const ENV_CONNECT_TIMEOUT_SECS: &str = "JSONRPC_CONNECT_TIMEOUT_SECS";

    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
}

/// CGI environment contract
pub mod cgi {
    pub const ENV_CONTENT_LENGTH: &str = "CONTENT_LENGTH";
    pub const ENV_ACCEPT_ENCODING: &str = "HTTP_ACCEPT_ENCODING";
}

/// Transport Limits (DoS Protection)
pub mod limits {
    /// Maximum accepted request or response body (10 MB)
    pub const MAX_MESSAGE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
}
