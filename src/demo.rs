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

//! Demonstration service served by the `cgi` subcommand.

use crate::protocol::errors::ServiceFault;
use crate::rpc::{Registry, Signature};
use serde_json::Value;

pub fn registry() -> Registry {
    Registry::builder()
        .method("add", Signature::new().required("a").required("b"), |args| {
            let a: Value = args.get("a")?;
            let b: Value = args.get("b")?;
            match (a.as_i64(), b.as_i64()) {
                (Some(a), Some(b)) => a
                    .checked_add(b)
                    .map(Value::from)
                    .ok_or_else(|| ServiceFault::user("integer overflow")),
                _ => Ok(Value::from(args.get::<f64>("a")? + args.get::<f64>("b")?)),
            }
        })
        .method("echo", Signature::new().required("message"), |args| {
            Ok(args.value("message").cloned().unwrap_or(Value::Null))
        })
        .method("concat", Signature::variadic(), |args| {
            let sep = match args.rest_named().get("sep") {
                Some(Value::String(s)) => s.clone(),
                Some(_) => return Err(ServiceFault::InvalidParams("'sep' must be a string".to_string())),
                None => String::new(),
            };
            let parts: Vec<String> = args
                .rest()
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            Ok(parts.join(&sep))
        })
        .method("divide", Signature::new().required("a").required("b"), |args| {
            let a: f64 = args.get("a")?;
            let b: f64 = args.get("b")?;
            if b == 0.0 {
                return Err(ServiceFault::user_named("ZeroDivisionError", "division by zero"));
            }
            Ok(a / b)
        })
        .method("fail", Signature::new(), |_| -> Result<(), ServiceFault> {
            Err(anyhow::anyhow!("demo service failure").into())
        })
        .method("panic", Signature::new(), |_| -> Result<(), ServiceFault> {
            panic!("demo service panic")
        })
        .build()
}
