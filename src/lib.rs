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

//! jsonrpc-cgi: JSON-RPC 2.0 over a single request/response exchange.
//!
//! The crate is split along the two ends of a call:
//!
//! - [`rpc`] holds the server side: a capability [`Registry`](rpc::Registry)
//!   built once per service and a stateless [`Dispatcher`](rpc::Dispatcher)
//!   that turns request text into response text.
//! - [`client`] holds the mirror image: an [`RpcProxy`](client::RpcProxy)
//!   that packs arguments, posts the request over a [`Connection`](client::Connection)
//!   and unwraps the result.
//!
//! Both ends share the value codec, the argument convention and the wire
//! models in [`protocol`]. The [`cgi`] module hosts a dispatcher behind the CGI
//! environment contract.

pub mod cgi;
pub mod client;
pub mod config;
pub mod demo;
pub mod protocol;
pub mod rpc;
pub mod utils;
