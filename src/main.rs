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

// Main entry point for the jsonrpc-cgi binary
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracing::{error, info};

use jsonrpc_cgi::cgi::{handle_cgi, CgiEnv};
use jsonrpc_cgi::client::{HttpConnection, RpcProxy};
use jsonrpc_cgi::config::Config;
use jsonrpc_cgi::demo;
use jsonrpc_cgi::rpc::Dispatcher;
use jsonrpc_cgi::utils::logging::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "jsonrpc-cgi", version, about = "jsonrpc-cgi: JSON-RPC 2.0 over CGI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve a single CGI request against the demo service
    Cgi,

    /// Call a remote procedure and print its result
    Call {
        /// Host (host[:port] or scheme://host[:port])
        #[arg(long)]
        host: String,

        /// Path of the JSON-RPC endpoint
        #[arg(long, default_value = "/")]
        uri: String,

        /// Method name
        method: String,

        /// Positional arguments (JSON literals, bare words are strings)
        args: Vec<String>,

        /// Keyword arguments as key=value
        #[arg(long = "kw", value_name = "KEY=VALUE")]
        kw: Vec<String>,
    },

    /// List the demo service's methods
    Methods,

    /// Print the effective configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    install_panic_hook();

    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!(
            "Warning: Failed to load config from env, using defaults: {}",
            e
        );
        Config::default()
    });

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to init tracing: {}", e);
    }

    if let Err(e) = run(cli.command, &config) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Command, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Cgi => {
            let registry = demo::registry();
            let dispatcher = Dispatcher::new(config.dispatch_options());
            let cgi_env = CgiEnv::from_env();
            info!("Serving CGI request ({:?} bytes)", cgi_env.content_length);
            handle_cgi(
                &dispatcher,
                &registry,
                &cgi_env,
                std::io::stdin().lock(),
                std::io::stdout().lock(),
            )?;
        }
        Command::Call {
            host,
            uri,
            method,
            args,
            kw,
        } => {
            let connection = HttpConnection::new(&host, config)?;
            let proxy = RpcProxy::new(connection, uri);
            let positional = args.iter().map(|a| parse_arg(a)).collect();
            let named = parse_keywords(&kw)?;
            let result = proxy.call(&method, positional, named)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Methods => {
            for method in demo::registry().methods() {
                let params: Vec<&str> = method
                    .signature()
                    .params()
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect();
                println!("{}({})", method.name(), params.join(", "));
            }
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }
    Ok(())
}

/// JSON literal when it parses, plain string otherwise.
fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_keywords(pairs: &[String]) -> anyhow::Result<Map<String, Value>> {
    let mut named = Map::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("keyword argument '{}' must be KEY=VALUE", pair))?;
        named.insert(key.to_string(), parse_arg(value));
    }
    Ok(named)
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("PANIC: {} at {}", message, location);
    }));
}
