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

use crate::protocol::constants::config as keys;
use crate::protocol::errors::ConfigError;
use crate::rpc::DispatchOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub log_level: String,
    pub log_format: String, // "json" or "text"
    /// Attach tracebacks to error responses
    pub debug: bool,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value == "1" || value == "true" || value == "yes" || value == "on"
}

fn parse_secs(key: &str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            log_level: lookup(keys::ENV_LOG_LEVEL).unwrap_or_else(|| "info".to_string()),
            log_format: lookup(keys::ENV_LOG_FORMAT).unwrap_or_else(|| "text".to_string()),
            debug: lookup(keys::ENV_DEBUG)
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            timeout_secs: parse_secs(
                keys::ENV_TIMEOUT_SECS,
                lookup(keys::ENV_TIMEOUT_SECS),
                keys::DEFAULT_TIMEOUT_SECS,
            )?,
            connect_timeout_secs: parse_secs(
                keys::ENV_CONNECT_TIMEOUT_SECS,
                lookup(keys::ENV_CONNECT_TIMEOUT_SECS),
                keys::DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
        })
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions { debug: self.debug }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            debug: false,
            timeout_secs: keys::DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: keys::DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}
