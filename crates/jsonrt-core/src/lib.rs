//! # jsonrt-core
//!
//! A JSON codec following the `JSON.parse` / `JSON.stringify` contract of
//! JavaScript runtimes, in pure Rust:
//!
//! - **Reviver**: a per-member callback applied bottom-up while parsing.
//! - **Replacer**: a per-member callback, or a key allow-list, applied while
//!   serializing.
//! - **`ToJson`**: values that serialize themselves.
//! - **Recovery**: a pluggable failure observer and fallback parser.
//!
//! ## Quick start
//!
//! ```rust
//! use jsonrt_core::{parse, parse_with_reviver, stringify, Node, Space, Value};
//!
//! let value = parse(r#"{"name":"Alice","scores":[95,87]}"#).unwrap();
//! assert_eq!(value["scores"][0], Value::Number(95.0));
//!
//! // Double every number, children before parents
//! let doubled = parse_with_reviver("[1,2]", |_holder, _key, v| match v {
//!     Value::Number(n) => Value::Number(n * 2.0),
//!     other => other,
//! })
//! .unwrap();
//! assert_eq!(doubled.to_string(), "[2,4]");
//!
//! let pretty = stringify(&Node::from(&value), None, Some(&Space::Count(2)));
//! assert!(pretty.starts_with("{\n  \"name\": \"Alice\""));
//! ```
//!
//! ## Modules
//!
//! - [`parser`] — text → [`Value`], with optional reviver
//! - [`serializer`] — [`Node`] → text, with optional replacer and indentation
//! - [`recovery`] — failure observers and fallback parsers
//! - [`value`] — the [`Value`] tree and its insertion-ordered [`Map`]
//! - [`error`] — [`ParseError`] and its kinds

pub mod error;
pub mod parser;
pub mod recovery;
pub mod serializer;
pub mod value;

pub use error::{ParseError, ParseErrorKind, Result};
pub use parser::{parse, parse_with_reviver, revive, Holder, ParseOptions, Parser, Reviver};
pub use recovery::{
    FallbackParser, NoFallback, NoopObserver, ParseFailureObserver, RecoveringParser,
    SerdeJsonFallback, TracingObserver,
};
pub use serializer::{
    stringify, to_string, to_string_pretty, Node, Replacer, Space, ToJson, MAX_INDENT,
};
pub use value::{Map, Value};
