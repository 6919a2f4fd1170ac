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

//! Value Codec.
//!
//! Encodes values to the canonical wire text and decodes any conformant JSON
//! back. Encoding goes through [`WireFormatter`], which keeps two-character
//! escapes only for backslash, double quote, newline and tab and writes every
//! other control character as `\u00XX`.

use crate::protocol::errors::CodecError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::{CharEscape, Formatter, Serializer};
use serde_json::Value;
use std::io;
use tracing::{debug, trace};

/// Compact formatter with the wire escaping rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct WireFormatter;

fn write_unicode_escape<W>(writer: &mut W, byte: u8) -> io::Result<()>
where
    W: ?Sized + io::Write,
{
    write!(writer, "\\u{:04x}", byte)
}

impl Formatter for WireFormatter {
    fn write_char_escape<W>(&mut self, writer: &mut W, char_escape: CharEscape) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        match char_escape {
            CharEscape::Quote => writer.write_all(b"\\\""),
            CharEscape::ReverseSolidus => writer.write_all(b"\\\\"),
            CharEscape::Solidus => writer.write_all(b"\\/"),
            CharEscape::LineFeed => writer.write_all(b"\\n"),
            CharEscape::Tab => writer.write_all(b"\\t"),
            CharEscape::Backspace => write_unicode_escape(writer, 0x08),
            CharEscape::FormFeed => write_unicode_escape(writer, 0x0c),
            CharEscape::CarriageReturn => write_unicode_escape(writer, 0x0d),
            CharEscape::AsciiControl(byte) => write_unicode_escape(writer, byte),
        }
    }
}

/// Encode a value to wire text.
pub fn encode(value: &Value) -> Result<String, CodecError> {
    encode_value(value)
}

/// Encode any serializable type with the wire formatter.
pub fn encode_value<T>(value: &T) -> Result<String, CodecError>
where
    T: ?Sized + Serialize,
{
    let mut buf = Vec::with_capacity(128);
    let mut serializer = Serializer::with_formatter(&mut buf, WireFormatter);
    value.serialize(&mut serializer).map_err(CodecError::Encode)?;
    // serde_json only ever writes UTF-8
    String::from_utf8(buf).map_err(|e| CodecError::Encode(serde::ser::Error::custom(e)))
}

/// Decode wire text into a value.
pub fn decode(text: &str) -> Result<Value, CodecError> {
    let value = serde_json::from_str(text).map_err(CodecError::Parse)?;
    trace!("Decoded value: {:?}", value);
    Ok(value)
}

/// Decode raw bytes; invalid UTF-8 is a parse error.
pub fn decode_slice(bytes: &[u8]) -> Result<Value, CodecError> {
    serde_json::from_slice(bytes).map_err(CodecError::Parse)
}

/// Decode wire text straight into a model type.
pub fn decode_as<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    serde_json::from_str(text).map_err(CodecError::Parse)
}

/// Convert to a value, degrading unrepresentable types to a placeholder string.
pub fn to_value_lossy<T>(value: &T) -> Value
where
    T: ?Sized + Serialize,
{
    match serde_json::to_value(value) {
        Ok(v) => v,
        Err(e) => {
            let type_name = std::any::type_name::<T>();
            debug!("Value of type {} is not representable: {}", type_name, e);
            Value::String(format!("unknown type - {}", type_name))
        }
    }
}
