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

//! Argument Convention.
//!
//! `params` on the wire is either an array or an object, never both. Mixed
//! calls are carried in one object where positional argument `i` sits under
//! the string key `"i"` next to the named arguments. [`pack`] builds that
//! shape on the client, [`split`] takes it apart on the server.

use serde_json::{Map, Value};

/// Pack positional and named arguments into one `params` value.
///
/// Named keys that look like integers collide with positional indices when
/// both kinds are present; that combination is not supported and not checked.
pub fn pack(positional: Vec<Value>, named: Map<String, Value>) -> Value {
    if named.is_empty() {
        return Value::Array(positional);
    }
    if positional.is_empty() {
        return Value::Object(named);
    }

    let mut merged = Map::with_capacity(positional.len() + named.len());
    for (i, arg) in positional.into_iter().enumerate() {
        merged.insert(i.to_string(), arg);
    }
    merged.extend(named);
    Value::Object(merged)
}

/// Key parses as a non-negative integer.
///
/// Only plain decimal digits within `u64` count: `" 1"` and keys above
/// `u64::MAX` are named arguments.
pub fn index_of(key: &str) -> Option<u64> {
    key.parse::<u64>().ok()
}

/// Split an object into positional and named arguments.
///
/// Index-like entries become positional arguments in ascending numeric key
/// order. Gaps are not detected: `{"0": a, "5": b}` yields `[a, b]`.
pub fn split(params: &Map<String, Value>) -> (Vec<Value>, Map<String, Value>) {
    let mut indexed: Vec<(u64, &Value)> = Vec::new();
    let mut named = Map::new();

    for (key, value) in params {
        match index_of(key) {
            Some(i) => indexed.push((i, value)),
            None => {
                named.insert(key.clone(), value.clone());
            }
        }
    }

    indexed.sort_by_key(|(i, _)| *i);
    let positional = indexed.into_iter().map(|(_, v)| v.clone()).collect();
    (positional, named)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_pack_positional_only() {
        assert_eq!(pack(vec![json!(1), json!("x")], Map::new()), json!([1, "x"]));
    }

    #[test]
    fn test_pack_both_empty_is_empty_array() {
        assert_eq!(pack(vec![], Map::new()), json!([]));
    }

    #[test]
    fn test_pack_named_only() {
        let kw = named(json!({"a": 1, "b": 2}));
        assert_eq!(pack(vec![], kw), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_pack_mixed_uses_string_indices() {
        let kw = named(json!({"b": 3}));
        let packed = pack(vec![json!(2), json!(9)], kw);
        assert_eq!(packed, json!({"0": 2, "1": 9, "b": 3}));
    }

    #[test]
    fn test_split_mixed() {
        let (args, kw) = split(&named(json!({"b": 3, "0": 2})));
        assert_eq!(args, vec![json!(2)]);
        assert_eq!(kw, named(json!({"b": 3})));
    }

    #[test]
    fn test_split_sorts_numerically_not_lexically() {
        let mut params = Map::new();
        for i in (0..12).rev() {
            params.insert(i.to_string(), json!(i));
        }
        let (args, kw) = split(&params);
        assert_eq!(args, (0..12).map(|i| json!(i)).collect::<Vec<_>>());
        assert!(kw.is_empty());
    }

    #[test]
    fn test_split_negative_and_non_numeric_keys_are_named() {
        let (args, kw) = split(&named(json!({"-1": "neg", "1a": "mixed", "x": 0})));
        assert!(args.is_empty());
        assert_eq!(kw.len(), 3);
    }

    #[test]
    fn test_index_of_accepts_plain_digits_only() {
        assert_eq!(index_of("0"), Some(0));
        assert_eq!(index_of("42"), Some(42));
        assert_eq!(index_of(" 1"), None);
        assert_eq!(index_of("18446744073709551616"), None);
    }

    // Gaps in the index keys are not detected: values are taken in key
    // order, so the second value lands at position 1 instead of 5.
    #[test]
    fn test_split_non_contiguous_indices_compact() {
        let (args, kw) = split(&named(json!({"5": "b", "0": "a"})));
        assert_eq!(args, vec![json!("a"), json!("b")]);
        assert!(kw.is_empty());
    }

    #[test]
    fn test_round_trip_mixed() {
        let positional = vec![json!(1), json!([2, 3]), json!({"k": null})];
        let kw = named(json!({"alpha": "x", "beta": 2.5}));
        let packed = pack(positional.clone(), kw.clone());
        let Value::Object(map) = packed else {
            panic!("mixed pack must produce an object");
        };
        assert_eq!(split(&map), (positional, kw));
    }
}
