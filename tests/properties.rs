use jsonrpc_cgi::protocol::args::{pack, split};
use jsonrpc_cgi::protocol::codec::{decode, encode};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<i64>().prop_map(Value::from),
        (-1.0e9f64..1.0e9f64).prop_map(Value::from),
        "\\PC*".prop_map(Value::from),
        // control characters exercise the escaping rules
        proptest::collection::vec(0u8..0x20, 0..8)
            .prop_map(|bytes| Value::from(bytes.into_iter().map(char::from).collect::<String>())),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            proptest::collection::vec(("[a-z]{1,6}", inner), 0..8)
                .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

fn keywords() -> impl Strategy<Value = Map<String, Value>> {
    // Names start with a letter so they never look like an index.
    proptest::collection::vec(("[a-z][a-z0-9_]{0,6}", leaf()), 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}

proptest! {
    #[test]
    fn test_codec_round_trip(v in value()) {
        let text = encode(&v).unwrap();
        let back = decode(&text).unwrap();
        prop_assert_eq!(back, v);
    }

    #[test]
    fn test_encoding_is_deterministic(v in value()) {
        prop_assert_eq!(encode(&v).unwrap(), encode(&v).unwrap());
    }

    #[test]
    fn test_encoded_strings_have_no_raw_controls(s in "\\PC*|[\\x00-\\x1f]{0,8}") {
        let text = encode(&Value::from(s)).unwrap();
        prop_assert!(text.bytes().all(|b| b >= 0x20));
    }

    #[test]
    fn test_argument_convention_round_trip(
        positional in proptest::collection::vec(value(), 0..6),
        named in keywords(),
    ) {
        let packed = pack(positional.clone(), named.clone());
        let (args, kw) = match packed {
            Value::Array(items) => (items, Map::new()),
            Value::Object(map) => split(&map),
            other => panic!("pack produced {:?}", other),
        };
        prop_assert_eq!(args, positional);
        prop_assert_eq!(kw, named);
    }

    #[test]
    fn test_decode_never_panics(s in "\\PC*") {
        let _ = decode(&s);
    }
}
