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

//! Capability registry.
//!
//! Maps method names to handlers with a declared [`Signature`]. A registry is
//! built once per service and is read-only afterwards, so one instance can
//! be shared by any number of dispatch calls.
//!
//! ```ignore
//! let registry = Registry::builder()
//!     .method("add", Signature::new().required("a").required("b"), |args| {
//!         Ok(args.get::<i64>("a")? + args.get::<i64>("b")?)
//!     })
//!     .build();
//! ```

use crate::protocol::codec::to_value_lossy;
use crate::protocol::errors::ServiceFault;
use crate::rpc::signature::{Args, Signature};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Type-erased handler.
pub type HandlerFn = dyn Fn(&Args) -> Result<Value, ServiceFault> + Send + Sync;

/// A registered capability.
pub struct Method {
    name: String,
    signature: Signature,
    handler: Box<HandlerFn>,
}

impl Method {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn invoke(&self, args: &Args) -> Result<Value, ServiceFault> {
        (self.handler)(args)
    }
}

impl std::fmt::Debug for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Registry mapping method names to handlers.
#[derive(Debug, Default)]
pub struct Registry {
    methods: BTreeMap<String, Method>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Exact-name lookup.
    pub fn resolve(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    methods: BTreeMap<String, Method>,
}

impl RegistryBuilder {
    /// Register a handler. The handler's return value is converted with the
    /// lossy codec conversion, so unrepresentable results become a
    /// placeholder string rather than a fault.
    #[must_use]
    pub fn method<F, T>(mut self, name: impl Into<String>, signature: Signature, handler: F) -> Self
    where
        F: Fn(&Args) -> Result<T, ServiceFault> + Send + Sync + 'static,
        T: Serialize,
    {
        let name = name.into();
        let erased: Box<HandlerFn> = Box::new(move |args| handler(args).map(|v| to_value_lossy(&v)));
        let method = Method {
            name: name.clone(),
            signature,
            handler: erased,
        };
        if self.methods.insert(name.clone(), method).is_some() {
            warn!("Method '{}' registered twice, keeping the last handler", name);
        }
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            methods: self.methods,
        }
    }
}
