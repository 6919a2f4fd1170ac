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

//! Shared protocol layer: value codec, argument convention, wire models,
//! constants and error types. Free of I/O.

pub mod args;
pub mod codec;
pub mod constants;
pub mod errors;
pub mod models;

pub use errors::{BindError, CodecError, ConfigError, RpcError, ServiceFault};
pub use models::{DebugDump, ErrorInfo, Request, Response};
