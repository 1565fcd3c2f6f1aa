use jsonrt_core::{parse, Map, Value};

fn sample_map() -> Map {
    [
        ("z", Value::from(1)),
        ("a", Value::from("x")),
        ("m", Value::Null),
    ]
    .into_iter()
    .collect()
}

// ============================================================================
// Map
// ============================================================================

#[test]
fn map_keeps_insertion_order() {
    let map = sample_map();
    let keys: Vec<&str> = map.keys().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn map_overwrite_keeps_position() {
    let mut map = sample_map();
    let old = map.insert("z", Value::Bool(true));
    assert_eq!(old, Some(Value::from(1)));
    assert_eq!(map.len(), 3);
    assert_eq!(map.iter().next(), Some(("z", &Value::Bool(true))));
}

#[test]
fn map_insert_new_key_appends() {
    let mut map = sample_map();
    assert_eq!(map.insert("b", Value::from(2)), None);
    assert_eq!(map.keys().last(), Some("b"));
}

#[test]
fn map_remove_preserves_rest() {
    let mut map = sample_map();
    assert_eq!(map.remove("a"), Some(Value::from("x")));
    assert_eq!(map.remove("a"), None);
    let keys: Vec<&str> = map.keys().collect();
    assert_eq!(keys, vec!["z", "m"]);
}

#[test]
fn map_lookup() {
    let mut map = sample_map();
    assert!(map.contains_key("m"));
    assert!(!map.contains_key("q"));
    assert_eq!(map.get("a"), Some(&Value::from("x")));

    if let Some(slot) = map.get_mut("a") {
        *slot = Value::from("y");
    }
    assert_eq!(map.get("a"), Some(&Value::from("y")));
}

#[test]
fn map_empty_and_into_iter() {
    assert!(Map::new().is_empty());
    let pairs: Vec<(String, Value)> = sample_map().into_iter().collect();
    assert_eq!(pairs[2], ("m".to_string(), Value::Null));
}

#[test]
fn map_equality_is_order_sensitive() {
    let ab: Map = [("a", Value::Null), ("b", Value::Null)].into_iter().collect();
    let ba: Map = [("b", Value::Null), ("a", Value::Null)].into_iter().collect();
    assert_ne!(ab, ba);
}

#[test]
fn map_equality_compares_members() {
    let one: Map = [("a", Value::from(1)), ("b", Value::Null)].into_iter().collect();
    let same: Map = [("a", Value::from(1)), ("b", Value::Null)].into_iter().collect();
    let shorter: Map = [("a", Value::from(1))].into_iter().collect();
    assert_eq!(one, same);
    assert_ne!(one, shorter);
}

#[test]
fn wide_map_lookup_and_removal() {
    let mut map: Map = (0..50_000).map(|i| (format!("k{i}"), Value::from(i))).collect();
    assert_eq!(map.len(), 50_000);
    assert_eq!(map.get("k49999"), Some(&Value::from(49_999)));
    assert_eq!(map.remove("k0"), Some(Value::from(0)));
    assert_eq!(map.keys().next(), Some("k1"));
    assert_eq!(map.keys().last(), Some("k49999"));
}

// ============================================================================
// Accessors and indexing
// ============================================================================

#[test]
fn typed_accessors() {
    assert!(Value::Null.is_null());
    assert_eq!(Value::Bool(false).as_bool(), Some(false));
    assert_eq!(Value::from(2.5).as_f64(), Some(2.5));
    assert_eq!(Value::from("s").as_str(), Some("s"));
    assert_eq!(Value::from(1).as_str(), None);
    assert_eq!(
        Value::from(vec![Value::Null]).as_array().map(<[Value]>::len),
        Some(1)
    );
    assert!(Value::from(sample_map()).as_object().is_some());
    assert_eq!(Value::default(), Value::Null);
}

#[test]
fn index_misses_yield_null() {
    let value = parse(r#"{"a":[1,{"b":true}]}"#).unwrap();
    assert_eq!(value["a"][1]["b"], Value::Bool(true));
    assert_eq!(value["missing"], Value::Null);
    assert_eq!(value["a"][9], Value::Null);
    assert_eq!(value["a"]["not-an-object"], Value::Null);
    assert_eq!(value[0], Value::Null);
    assert_eq!(value.get("a").and_then(|a| a.get("b")), None);
}

// ============================================================================
// Display
// ============================================================================

#[test]
fn display_is_compact_json() {
    let value = Value::from(sample_map());
    assert_eq!(value.to_string(), r#"{"z":1,"a":"x","m":null}"#);
    assert_eq!(Value::from(1e21).to_string(), "1e+21");
    assert_eq!(Value::from(f64::NAN).to_string(), "null");
}

// ============================================================================
// serde interop
// ============================================================================

#[test]
fn serde_serialize_matches_tree() {
    let value = parse(r#"{"b":[1,"two",null],"a":{"c":false}}"#).unwrap();
    let text = serde_json::to_string(&value).unwrap();
    // serde_json writes whole floats with a fraction
    assert_eq!(text, r#"{"b":[1.0,"two",null],"a":{"c":false}}"#);
}

#[test]
fn serde_serialize_non_finite_as_null() {
    let value = Value::from(vec![Value::from(f64::INFINITY), Value::from(f64::NAN)]);
    assert_eq!(serde_json::to_string(&value).unwrap(), "[null,null]");
}

#[test]
fn converts_from_serde_json_preserving_order() {
    let theirs = serde_json::json!({"z": 1, "a": [true, "s", null], "m": 2.5});
    let ours = Value::from(theirs);
    assert_eq!(ours, parse(r#"{"z":1,"a":[true,"s",null],"m":2.5}"#).unwrap());
}

#[test]
fn converts_into_serde_json() {
    let ours = parse(r#"{"n":1.5,"s":"x","l":[null]}"#).unwrap();
    let theirs = serde_json::Value::from(&ours);
    assert_eq!(theirs, serde_json::json!({"n": 1.5, "s": "x", "l": [null]}));
}

#[test]
fn non_finite_converts_to_serde_null() {
    let theirs = serde_json::Value::from(&Value::from(f64::NEG_INFINITY));
    assert_eq!(theirs, serde_json::Value::Null);
}
