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

//! CGI hosting layer.
//!
//! Reads `CONTENT_LENGTH` bytes of request body, runs the dispatcher and
//! writes a CGI response: content type, optional gzip encoding when
//! `HTTP_ACCEPT_ENCODING` mentions gzip, content length, blank line, body.

use crate::protocol::constants::{cgi as keys, http};
use crate::rpc::{Dispatcher, Registry};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::env;
use std::io::{self, Read, Write};
use tracing::{debug, warn};

/// The slice of the CGI environment the handler consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CgiEnv {
    pub content_length: Option<usize>,
    pub accept_encoding: String,
}

impl CgiEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            content_length: lookup(keys::ENV_CONTENT_LENGTH).and_then(|v| v.trim().parse().ok()),
            accept_encoding: lookup(keys::ENV_ACCEPT_ENCODING).unwrap_or_default(),
        }
    }

    pub fn accepts_gzip(&self) -> bool {
        self.accept_encoding.contains(http::GZIP)
    }
}

/// Serve one request from `reader` and write the CGI response to `writer`.
pub fn handle_cgi<R, W>(
    dispatcher: &Dispatcher,
    registry: &Registry,
    cgi_env: &CgiEnv,
    reader: R,
    mut writer: W,
) -> io::Result<()>
where
    R: Read,
    W: Write,
{
    let content_length = cgi_env.content_length.unwrap_or_else(|| {
        warn!("{} missing or invalid, treating body as empty", keys::ENV_CONTENT_LENGTH);
        0
    });
    let body = dispatcher.handle_reader(registry, content_length, reader);
    let payload = render_response(&body, cgi_env.accepts_gzip())?;
    writer.write_all(&payload)?;
    writer.flush()
}

/// Headers and (possibly compressed) body as written to stdout.
pub fn render_response(body: &str, gzip: bool) -> io::Result<Vec<u8>> {
    let mut head = format!("{}: {}\n", http::CONTENT_TYPE, http::RESPONSE_CONTENT_TYPE);

    let data = if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(body.as_bytes())?;
        head.push_str(&format!("{}: {}\n", http::CONTENT_ENCODING, http::GZIP));
        encoder.finish()?
    } else {
        body.as_bytes().to_vec()
    };
    debug!("CGI response body: {} bytes (gzip: {})", data.len(), gzip);

    head.push_str(&format!("{}: {}\n\n", http::CONTENT_LENGTH, data.len()));
    let mut out = head.into_bytes();
    out.extend_from_slice(&data);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::Signature;
    use flate2::read::GzDecoder;

    fn registry() -> Registry {
        Registry::builder()
            .method("echo", Signature::new().required("message"), |args| {
                args.get::<String>("message")
            })
            .build()
    }

    fn env(content_length: Option<usize>, accept_encoding: &str) -> CgiEnv {
        CgiEnv {
            content_length,
            accept_encoding: accept_encoding.to_string(),
        }
    }

    #[test]
    fn test_env_from_lookup() {
        let cgi_env = CgiEnv::from_lookup(|key| match key {
            "CONTENT_LENGTH" => Some("42".to_string()),
            "HTTP_ACCEPT_ENCODING" => Some("deflate, gzip".to_string()),
            _ => None,
        });
        assert_eq!(cgi_env.content_length, Some(42));
        assert!(cgi_env.accepts_gzip());

        let bad = CgiEnv::from_lookup(|key| (key == "CONTENT_LENGTH").then(|| "lots".to_string()));
        assert_eq!(bad, CgiEnv::default());
    }

    #[test]
    fn test_plain_response() {
        let body = r#"{"method":"echo","params":["hi"],"id":1}"#;
        let mut out = Vec::new();
        handle_cgi(
            &Dispatcher::default(),
            &registry(),
            &env(Some(body.len()), ""),
            body.as_bytes(),
            &mut out,
        )
        .unwrap();

        let expected_body = r#"{"version":"2.0","id":1,"result":"hi","error":null}"#;
        let expected = format!(
            "Content-Type: application/json; charset=UTF-8\nContent-Length: {}\n\n{}",
            expected_body.len(),
            expected_body
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_gzip_response() {
        let body = r#"{"method":"echo","params":{"message":"squeeze me"}}"#;
        let mut out = Vec::new();
        handle_cgi(
            &Dispatcher::default(),
            &registry(),
            &env(Some(body.len()), "gzip, deflate"),
            body.as_bytes(),
            &mut out,
        )
        .unwrap();

        let split = out.windows(2).position(|w| w == b"\n\n").unwrap();
        let head = std::str::from_utf8(&out[..split]).unwrap();
        let data = &out[split + 2..];
        assert!(head.contains("Content-Encoding: gzip"));
        assert!(head.contains(&format!("Content-Length: {}", data.len())));

        let mut decoded = String::new();
        GzDecoder::new(data).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, r#"{"version":"2.0","result":"squeeze me","error":null}"#);
    }

    #[test]
    fn test_missing_content_length_is_parse_error() {
        let mut out = Vec::new();
        handle_cgi(
            &Dispatcher::default(),
            &registry(),
            &env(None, ""),
            &b"{\"method\":\"echo\"}"[..],
            &mut out,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(r#""code":101"#));
    }
}
