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

//! Parameter binding.
//!
//! Every registered method declares the shape it accepts. Unpacked
//! positional and keyword arguments are bound against that shape before the
//! handler runs, so arity mismatches surface as [`BindError`]s instead of
//! reaching the handler.

use crate::protocol::errors::{BindError, ServiceFault};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Value>,
}

/// Declared parameter list of a method.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
    rest: bool,
    rest_named: bool,
}

impl Signature {
    /// Method taking no arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Method accepting any arguments, all of them collected as extras.
    pub fn variadic() -> Self {
        Self::new().rest().rest_named()
    }

    #[must_use]
    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: None,
        });
        self
    }

    #[must_use]
    pub fn optional(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: Some(default.into()),
        });
        self
    }

    /// Collect surplus positional arguments instead of rejecting them.
    #[must_use]
    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }

    /// Collect unknown keyword arguments instead of rejecting them.
    #[must_use]
    pub fn rest_named(mut self) -> Self {
        self.rest_named = true;
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn bind(
        &self,
        positional: Vec<Value>,
        named: Map<String, Value>,
    ) -> Result<Args, BindError> {
        if positional.len() > self.params.len() && !self.rest {
            return Err(BindError::TooManyPositional {
                expected: self.params.len(),
                given: positional.len(),
            });
        }

        let mut slots: Vec<Option<Value>> = vec![None; self.params.len()];
        let mut rest = Vec::new();
        for (i, arg) in positional.into_iter().enumerate() {
            match slots.get_mut(i) {
                Some(slot) => *slot = Some(arg),
                None => rest.push(arg),
            }
        }

        let mut rest_named = Map::new();
        for (key, arg) in named {
            match self.params.iter().position(|p| p.name == key) {
                Some(i) if slots[i].is_some() => return Err(BindError::Duplicate(key)),
                Some(i) => slots[i] = Some(arg),
                None if self.rest_named => {
                    rest_named.insert(key, arg);
                }
                None => return Err(BindError::UnknownKeyword(key)),
            }
        }

        let mut bound = Map::with_capacity(self.params.len());
        for (param, slot) in self.params.iter().zip(slots) {
            let arg = match slot.or_else(|| param.default.clone()) {
                Some(arg) => arg,
                None => return Err(BindError::Missing(param.name.clone())),
            };
            bound.insert(param.name.clone(), arg);
        }

        Ok(Args {
            bound,
            rest,
            rest_named,
        })
    }
}

/// Arguments bound to a signature, handed to the handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    bound: Map<String, Value>,
    rest: Vec<Value>,
    rest_named: Map<String, Value>,
}

impl Args {
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.bound.get(name)
    }

    /// Typed access to a declared parameter.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, ServiceFault> {
        let value = self
            .bound
            .get(name)
            .ok_or_else(|| ServiceFault::InvalidParams(format!("no parameter named '{}'", name)))?;
        T::deserialize(value)
            .map_err(|e| ServiceFault::InvalidParams(format!("argument '{}': {}", name, e)))
    }

    /// Surplus positional arguments.
    pub fn rest(&self) -> &[Value] {
        &self.rest
    }

    /// Undeclared keyword arguments.
    pub fn rest_named(&self) -> &Map<String, Value> {
        &self.rest_named
    }
}
